use axum::{
    async_trait,
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::auth::{AuthSession, AuthState, Principal};
use crate::error::AppError;
use crate::session::{FlashExt, FlashMessage, Session};

/// Resolve the session's principal and attach an `AuthState` to the request.
///
/// Never rejects: access control belongs to the routes, which see
/// `Anonymous` or `Error` when no principal could be attached.
pub async fn authentication_middleware(
    auth_session: AuthSession,
    session: Session,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_state = auth_session
        .backend
        .deserialize_user(&session, auth_session.user.clone())
        .await;

    match &auth_state {
        AuthState::Authenticated(principal) => {
            tracing::debug!("Request authenticated as {} ({})", principal.username, principal.id)
        }
        AuthState::Anonymous => tracing::trace!("Anonymous request"),
        AuthState::Error(e) => tracing::debug!("Authentication unavailable: {}", e),
    }

    request.extensions_mut().insert(auth_state);
    next.run(request).await
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthState
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<AuthState>().cloned().ok_or_else(|| {
            tracing::error!("AuthState missing; authentication stage is not installed");
            AppError::internal_server_error("Authentication unavailable")
        })
    }
}

/// Extractor for routes that require a logged-in user. Anonymous visitors
/// are sent to the login page with an explanation queued as a flash message.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Principal);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        if let AuthState::Authenticated(principal) = auth_state {
            return Ok(CurrentUser(principal));
        }

        if let Some(session) = parts.extensions.get::<Session>() {
            if let Err(e) = session.flash(FlashMessage::error("Log in to continue.")).await {
                tracing::warn!("Failed to queue login reminder: {}", e);
            }
        }
        Err(Redirect::to("/login").into_response())
    }
}
