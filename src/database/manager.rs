use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{error, info};

use crate::config::DatabaseConfig;

/// Errors from Database bootstrap
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Invalid database URL: {0}")]
    InvalidDatabaseUrl(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Outcome of the single startup connection attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connected { database: String },
    Unavailable { reason: String },
}

impl ConnectionStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionStatus::Connected { .. })
    }
}

/// Process-wide database handle, constructed once in `main` and injected
/// into the stores that need it.
///
/// Tables are created the first time any store asks for the pool through
/// `ready`, so a database that comes up after the server still gets them.
#[derive(Debug, Clone)]
pub struct Database {
    pool: PgPool,
    display_url: String,
    schema: Arc<OnceCell<()>>,
}

impl Database {
    /// Build the pool without touching the network. Only a malformed URL
    /// fails here; reachability is checked separately by `connect_once`.
    pub fn bootstrap(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let parsed = url::Url::parse(&config.url)
            .map_err(|e| DatabaseError::InvalidDatabaseUrl(e.to_string()))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect_lazy(&config.url)?;

        Ok(Self {
            pool,
            display_url: redact_url(&parsed),
            schema: Arc::new(OnceCell::new()),
        })
    }

    /// The pool, once the tables exist. A failed schema attempt is not
    /// remembered; the next caller tries again.
    pub async fn ready(&self) -> Result<&PgPool, DatabaseError> {
        self.schema
            .get_or_try_init(|| async {
                self.create_schema().await?;
                info!("Database tables ready");
                Ok::<(), DatabaseError>(())
            })
            .await?;
        Ok(&self.pool)
    }

    pub fn schema_ready(&self) -> bool {
        self.schema.initialized()
    }

    /// Attempt exactly one connection. Failure is logged and reported, never
    /// raised: requests that need the store fail on their own later.
    pub async fn connect_once(&self) -> ConnectionStatus {
        match self.current_database().await {
            Ok(database) => {
                info!("Connected to database! Database name: \"{}\"", database);
                if let Err(e) = self.ready().await {
                    error!("Failed to prepare tables in \"{}\": {}", database, e);
                }
                ConnectionStatus::Connected { database }
            }
            Err(e) => {
                error!("Error connecting to database at {}: {}", self.display_url, e);
                ConnectionStatus::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Pings the pool to report connectivity on `/health`
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn current_database(&self) -> Result<String, DatabaseError> {
        let name: String = sqlx::query_scalar("SELECT current_database()")
            .fetch_one(&self.pool)
            .await?;
        Ok(name)
    }

    async fn create_schema(&self) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                id UUID PRIMARY KEY,
                collection TEXT NOT NULL,
                body JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS documents_collection_idx ON documents (collection, created_at DESC)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                data JSONB NOT NULL,
                expires_at TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// Strip credentials so the connection string can be logged
pub fn redact_url(url: &url::Url) -> String {
    let mut url = url.clone();
    if !url.username().is_empty() {
        let _ = url.set_username("***");
    }
    if url.password().is_some() {
        let _ = url.set_password(Some("***"));
    }
    url.to_string()
}
