use std::sync::Arc;

use crate::auth::Authenticator;
use crate::config::AppConfig;
use crate::database::models::{Gym, Pool, Rdv};
use crate::database::{Database, DocumentStore, Repository};
use crate::session::SessionBackend;

/// Handles shared by every stage and router. Constructed once in `main`
/// (or per test) and passed in explicitly.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub sessions: SessionBackend,
    pub authenticator: Authenticator,
    pub gyms: Repository<Gym>,
    pub pools: Repository<Pool>,
    pub rdvs: Repository<Rdv>,
    /// Absent when the app runs on non-Postgres stores
    pub database: Option<Database>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        sessions: impl Into<SessionBackend>,
        documents: Arc<dyn DocumentStore>,
        database: Option<Database>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            sessions: sessions.into(),
            authenticator: Authenticator::new(Repository::new(documents.clone())),
            gyms: Repository::new(documents.clone()),
            pools: Repository::new(documents.clone()),
            rdvs: Repository::new(documents),
            database,
        }
    }
}
