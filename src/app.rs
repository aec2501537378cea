//! Application assembly and server lifecycle.

use anyhow::Context;
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use crate::config::AppConfig;
use crate::database::{Database, PgDocumentStore};
use crate::handlers::{index, MountTable};
use crate::pipeline::Pipeline;
use crate::session::{spawn_expired_deletion, PgSessionStore};
use crate::state::AppState;

/// The full application: standard pipeline around the standard routers
pub fn build_app(state: AppState) -> Router {
    build_app_with(state, &Pipeline::standard(), MountTable::standard())
}

pub fn build_app_with(state: AppState, pipeline: &Pipeline, mounts: MountTable) -> Router {
    for descriptor in pipeline.describe() {
        tracing::debug!("Pipeline stage '{}': {}", descriptor.stage, descriptor.provides);
    }
    tracing::debug!("Routers mounted in order: {}", mounts.names().join(", "));

    let routes = mounts.into_router(state.clone());
    let site = pipeline.apply(routes, &state);

    Router::new()
        .merge(index::health_routes())
        .with_state(state)
        .fallback_service(site)
}

/// Wire Postgres-backed stores into an `AppState`.
///
/// A malformed `DATABASE_URL` is fatal. An unreachable database is not:
/// the single connection attempt is logged and the server starts anyway.
pub async fn bootstrap_state(config: AppConfig) -> anyhow::Result<AppState> {
    let database = Database::bootstrap(&config.database).context("database configuration")?;
    let status = database.connect_once().await;
    if !status.is_connected() {
        tracing::warn!("Starting without a database; store-backed requests will fail until it is reachable");
    }

    let sessions = PgSessionStore::new(database.clone());
    let documents = Arc::new(PgDocumentStore::new(database.clone()));

    Ok(AppState::new(config, sessions, documents, Some(database)))
}

pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    tracing::info!("Starting SportsBuddies in {:?} mode", config.environment);

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let purge_every = Duration::from_secs(config.session.purge_interval_secs);
    let state = bootstrap_state(config).await?;

    let purge = spawn_expired_deletion(state.sessions.clone(), purge_every);
    let app = build_app(state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    purge.abort();
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}
