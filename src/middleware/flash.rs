use axum::{
    async_trait,
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::AppError;
use crate::session::{FlashExt, FlashMessage, Session};

/// Messages queued by the previous request, drained for this one
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlashMessages(pub Vec<FlashMessage>);

/// Move queued flash messages out of the session and onto the request.
///
/// Draining happens before the handler runs, so a message queued during
/// this request survives to the next one. The drained session is saved
/// right away: the session layer skips saving after a 5xx, and a message
/// must not be shown twice.
pub async fn flash_relay_middleware(session: Session, mut request: Request, next: Next) -> Response {
    let messages = match session.take_flash().await {
        Ok(messages) => messages,
        Err(e) => return AppError::from(e).into_response(),
    };

    if !messages.is_empty() {
        tracing::trace!("Relaying {} flash message(s)", messages.len());
        if let Err(e) = session.save().await {
            return AppError::from(e).into_response();
        }
    }

    request.extensions_mut().insert(FlashMessages(messages));
    next.run(request).await
}

#[async_trait]
impl<S> FromRequestParts<S> for FlashMessages
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<FlashMessages>().cloned().unwrap_or_default())
    }
}
