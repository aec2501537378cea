use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::AppError;
use crate::session::{short_id, Session};

const VISITS_KEY: &str = "visits";

/// Count the visit on every request.
///
/// The session layer only writes sessions whose data changed, so bumping
/// the counter here gives every visitor a stored session and a refreshed
/// cookie, whatever the response status.
pub async fn session_middleware(session: Session, request: Request, next: Next) -> Response {
    let visits = match session.get::<u64>(VISITS_KEY).await {
        Ok(visits) => visits.unwrap_or(0),
        Err(e) => {
            tracing::error!("Failed to load session: {}", e);
            return AppError::from(e).into_response();
        }
    };

    // Unknown or expired cookies leave no id behind once the session loads
    match session.id() {
        Some(id) => tracing::debug!("Resumed session {}", short_id(&id.to_string())),
        None => tracing::debug!("Starting a new session"),
    }

    if let Err(e) = session.insert(VISITS_KEY, visits.saturating_add(1)).await {
        tracing::error!("Failed to update session: {}", e);
        return AppError::from(e).into_response();
    }

    next.run(request).await
}
