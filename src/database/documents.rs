use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde_json::{json, Value};
use sqlx::{types::Json, FromRow};
use thiserror::Error;
use uuid::Uuid;

use crate::database::manager::{Database, DatabaseError};

/// Errors raised by document stores
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Invalid document: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => StoreError::Unavailable(err.to_string()),
            sqlx::Error::RowNotFound => StoreError::NotFound("row not found".to_string()),
            other => StoreError::Query(other.to_string()),
        }
    }
}

impl From<DatabaseError> for StoreError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Sqlx(e) => e.into(),
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}

/// A JSON document stored in a named collection
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: Uuid,
    pub collection: String,
    pub body: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Document store capability set used by the resource routers
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert(&self, collection: &str, body: Value) -> Result<Document, StoreError>;

    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<Document>, StoreError>;

    /// Newest first
    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError>;

    async fn count(&self, collection: &str) -> Result<u64, StoreError>;

    /// Documents whose top-level `field` equals `value`, newest first
    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, StoreError>;

    /// Replace the body. Returns `None` when the document does not exist.
    async fn update(&self, collection: &str, id: Uuid, body: Value) -> Result<Option<Document>, StoreError>;

    async fn delete(&self, collection: &str, id: Uuid) -> Result<bool, StoreError>;
}

/// In-process store; documents are kept in insertion order
#[derive(Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<Vec<Document>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn insert(&self, collection: &str, body: Value) -> Result<Document, StoreError> {
        if !body.is_object() {
            return Err(StoreError::Query("document body must be a JSON object".to_string()));
        }
        let now = Utc::now();
        let doc = Document {
            id: Uuid::new_v4(),
            collection: collection.to_string(),
            body,
            created_at: now,
            updated_at: now,
        };
        self.documents.write().push(doc.clone());
        Ok(doc)
    }

    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<Document>, StoreError> {
        Ok(self
            .documents
            .read()
            .iter()
            .find(|d| d.collection == collection && d.id == id)
            .cloned())
    }

    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        Ok(self
            .documents
            .read()
            .iter()
            .rev()
            .filter(|d| d.collection == collection)
            .cloned()
            .collect())
    }

    async fn count(&self, collection: &str) -> Result<u64, StoreError> {
        Ok(self
            .documents
            .read()
            .iter()
            .filter(|d| d.collection == collection)
            .count() as u64)
    }

    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, StoreError> {
        Ok(self
            .documents
            .read()
            .iter()
            .rev()
            .filter(|d| d.collection == collection && d.body.get(field) == Some(value))
            .cloned()
            .collect())
    }

    async fn update(&self, collection: &str, id: Uuid, body: Value) -> Result<Option<Document>, StoreError> {
        let mut documents = self.documents.write();
        match documents
            .iter_mut()
            .find(|d| d.collection == collection && d.id == id)
        {
            Some(doc) => {
                doc.body = body;
                doc.updated_at = Utc::now();
                Ok(Some(doc.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, collection: &str, id: Uuid) -> Result<bool, StoreError> {
        let mut documents = self.documents.write();
        let before = documents.len();
        documents.retain(|d| !(d.collection == collection && d.id == id));
        Ok(documents.len() != before)
    }
}

#[derive(FromRow)]
struct DocumentRow {
    id: Uuid,
    collection: String,
    body: Json<Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Self {
            id: row.id,
            collection: row.collection,
            body: row.body.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Postgres-backed store keeping every collection in one JSONB table
#[derive(Clone)]
pub struct PgDocumentStore {
    database: Database,
}

impl PgDocumentStore {
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

const DOCUMENT_COLUMNS: &str = "id, collection, body, created_at, updated_at";

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn insert(&self, collection: &str, body: Value) -> Result<Document, StoreError> {
        let pool = self.database.ready().await?;
        let query = format!(
            "INSERT INTO documents (id, collection, body) VALUES ($1, $2, $3) RETURNING {}",
            DOCUMENT_COLUMNS
        );
        let row = sqlx::query_as::<_, DocumentRow>(&query)
            .bind(Uuid::new_v4())
            .bind(collection)
            .bind(Json(body))
            .fetch_one(pool)
            .await?;
        Ok(row.into())
    }

    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<Document>, StoreError> {
        let pool = self.database.ready().await?;
        let query = format!(
            "SELECT {} FROM documents WHERE collection = $1 AND id = $2",
            DOCUMENT_COLUMNS
        );
        let row = sqlx::query_as::<_, DocumentRow>(&query)
            .bind(collection)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Document::from))
    }

    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let pool = self.database.ready().await?;
        let query = format!(
            "SELECT {} FROM documents WHERE collection = $1 ORDER BY created_at DESC",
            DOCUMENT_COLUMNS
        );
        let rows = sqlx::query_as::<_, DocumentRow>(&query)
            .bind(collection)
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(Document::from).collect())
    }

    async fn count(&self, collection: &str) -> Result<u64, StoreError> {
        let pool = self.database.ready().await?;
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents WHERE collection = $1")
            .bind(collection)
            .fetch_one(pool)
            .await?;
        Ok(count as u64)
    }

    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, StoreError> {
        let pool = self.database.ready().await?;
        // JSONB containment on a single top-level key
        let query = format!(
            "SELECT {} FROM documents WHERE collection = $1 AND body @> $2 ORDER BY created_at DESC",
            DOCUMENT_COLUMNS
        );
        let rows = sqlx::query_as::<_, DocumentRow>(&query)
            .bind(collection)
            .bind(Json(json!({ field: value })))
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(Document::from).collect())
    }

    async fn update(&self, collection: &str, id: Uuid, body: Value) -> Result<Option<Document>, StoreError> {
        let pool = self.database.ready().await?;
        let query = format!(
            "UPDATE documents SET body = $3, updated_at = now() WHERE collection = $1 AND id = $2 RETURNING {}",
            DOCUMENT_COLUMNS
        );
        let row = sqlx::query_as::<_, DocumentRow>(&query)
            .bind(collection)
            .bind(id)
            .bind(Json(body))
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Document::from))
    }

    async fn delete(&self, collection: &str, id: Uuid) -> Result<bool, StoreError> {
        let pool = self.database.ready().await?;
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
