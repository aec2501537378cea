use async_trait::async_trait;
use parking_lot::RwLock;
use sqlx::types::Json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tower_sessions::{
    session::{Id, Record},
    session_store, ExpiredDeletion, SessionStore,
};

use crate::database::Database;

/// In-process sessions. Clones share one map.
///
/// Expired records are never returned by `load`; they stay in the map until
/// `delete_expired` sweeps them.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<RwLock<HashMap<Id, Record>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        let mut sessions = self.sessions.write();
        while sessions.contains_key(&record.id) {
            record.id = Id::default();
        }
        sessions.insert(record.id, record.clone());
        Ok(())
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        self.sessions.write().insert(record.id, record.clone());
        Ok(())
    }

    async fn load(&self, id: &Id) -> session_store::Result<Option<Record>> {
        let now = OffsetDateTime::now_utc();
        Ok(self
            .sessions
            .read()
            .get(id)
            .filter(|record| record.expiry_date > now)
            .cloned())
    }

    async fn delete(&self, id: &Id) -> session_store::Result<()> {
        self.sessions.write().remove(id);
        Ok(())
    }
}

#[async_trait]
impl ExpiredDeletion for MemorySessionStore {
    async fn delete_expired(&self) -> session_store::Result<()> {
        let now = OffsetDateTime::now_utc();
        self.sessions.write().retain(|_, record| record.expiry_date > now);
        Ok(())
    }
}

/// Sessions persisted in the `sessions` table of the application database.
///
/// Saves are last-write-wins per id: two concurrent requests sharing a
/// session can overwrite each other's changes.
#[derive(Debug, Clone)]
pub struct PgSessionStore {
    database: Database,
}

impl PgSessionStore {
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

fn backend(err: impl std::fmt::Display) -> session_store::Error {
    session_store::Error::Backend(err.to_string())
}

fn expires_at(record: &Record) -> f64 {
    record.expiry_date.unix_timestamp() as f64
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        let pool = self.database.ready().await.map_err(backend)?;
        loop {
            let inserted = sqlx::query(
                r#"
                INSERT INTO sessions (id, data, expires_at) VALUES ($1, $2, to_timestamp($3))
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .bind(record.id.to_string())
            .bind(Json(&*record))
            .bind(expires_at(record))
            .execute(pool)
            .await
            .map_err(backend)?;

            if inserted.rows_affected() > 0 {
                return Ok(());
            }
            record.id = Id::default();
        }
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        let pool = self.database.ready().await.map_err(backend)?;
        sqlx::query(
            r#"
            INSERT INTO sessions (id, data, expires_at) VALUES ($1, $2, to_timestamp($3))
            ON CONFLICT (id) DO UPDATE SET data = EXCLUDED.data, expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(record.id.to_string())
        .bind(Json(record))
        .bind(expires_at(record))
        .execute(pool)
        .await
        .map_err(backend)?;
        Ok(())
    }

    async fn load(&self, id: &Id) -> session_store::Result<Option<Record>> {
        let pool = self.database.ready().await.map_err(backend)?;
        let row: Option<Json<Record>> =
            sqlx::query_scalar("SELECT data FROM sessions WHERE id = $1 AND expires_at > now()")
                .bind(id.to_string())
                .fetch_optional(pool)
                .await
                .map_err(backend)?;
        Ok(row.map(|Json(record)| record))
    }

    async fn delete(&self, id: &Id) -> session_store::Result<()> {
        let pool = self.database.ready().await.map_err(backend)?;
        sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id.to_string())
            .execute(pool)
            .await
            .map_err(backend)?;
        Ok(())
    }
}

#[async_trait]
impl ExpiredDeletion for PgSessionStore {
    async fn delete_expired(&self) -> session_store::Result<()> {
        let pool = self.database.ready().await.map_err(backend)?;
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= now()")
            .execute(pool)
            .await
            .map_err(backend)?;
        tracing::debug!("Deleted {} expired session(s)", result.rows_affected());
        Ok(())
    }
}

/// The session store the application runs on
#[derive(Debug, Clone)]
pub enum SessionBackend {
    Memory(MemorySessionStore),
    Postgres(PgSessionStore),
}

impl From<MemorySessionStore> for SessionBackend {
    fn from(store: MemorySessionStore) -> Self {
        SessionBackend::Memory(store)
    }
}

impl From<PgSessionStore> for SessionBackend {
    fn from(store: PgSessionStore) -> Self {
        SessionBackend::Postgres(store)
    }
}

#[async_trait]
impl SessionStore for SessionBackend {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        match self {
            SessionBackend::Memory(store) => store.create(record).await,
            SessionBackend::Postgres(store) => store.create(record).await,
        }
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        match self {
            SessionBackend::Memory(store) => store.save(record).await,
            SessionBackend::Postgres(store) => store.save(record).await,
        }
    }

    async fn load(&self, id: &Id) -> session_store::Result<Option<Record>> {
        match self {
            SessionBackend::Memory(store) => store.load(id).await,
            SessionBackend::Postgres(store) => store.load(id).await,
        }
    }

    async fn delete(&self, id: &Id) -> session_store::Result<()> {
        match self {
            SessionBackend::Memory(store) => store.delete(id).await,
            SessionBackend::Postgres(store) => store.delete(id).await,
        }
    }
}

#[async_trait]
impl ExpiredDeletion for SessionBackend {
    async fn delete_expired(&self) -> session_store::Result<()> {
        match self {
            SessionBackend::Memory(store) => store.delete_expired().await,
            SessionBackend::Postgres(store) => store.delete_expired().await,
        }
    }
}

/// Sweep expired sessions every `period` until the runtime shuts down.
/// A failed sweep is logged and retried on the next tick.
pub fn spawn_expired_deletion<S>(store: S, period: Duration) -> JoinHandle<()>
where
    S: ExpiredDeletion,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(e) = store.delete_expired().await {
                tracing::warn!("Failed to delete expired sessions: {}", e);
            }
        }
    })
}
