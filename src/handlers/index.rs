// handlers/index.rs - GET / and GET /health

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Json},
    routing::get,
    Router,
};
use serde_json::json;

use crate::error::AppError;
use crate::state::AppState;
use crate::views::{pages, RenderContext};

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(home))
}

/// Routes answered ahead of the pipeline. They carry no session, so a
/// dead session store cannot hide the process behind a 500.
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

/// GET / - Landing page with a count of each resource
pub async fn home(
    State(state): State<AppState>,
    ctx: RenderContext,
) -> Result<Html<String>, AppError> {
    let gyms = state.gyms.count().await?;
    let pools = state.pools.count().await?;
    let rdvs = state.rdvs.count().await?;

    Ok(ctx.render("Home", &pages::home(&ctx.title, gyms, pools, rdvs)))
}

/// GET /health - Database reachability
///
/// Responds 200 when the database answers and 503 otherwise, so a running
/// process with a dead store is still observable. Deployments on in-memory
/// stores always report ok.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    let Some(database) = &state.database else {
        return (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": { "status": "ok", "timestamp": now, "database": "memory" }
            })),
        );
    };

    match database.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok",
                    "schema": database.schema_ready()
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": { "status": "degraded", "timestamp": now }
                })),
            )
        }
    }
}
