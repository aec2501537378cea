use axum::{
    async_trait,
    extract::{rejection::FormRejection, rejection::JsonRejection, FromRequest, Request},
    http::{header::CONTENT_TYPE, StatusCode},
    Form, Json,
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// A request body decoded from either a urlencoded form or JSON, chosen by
/// the `Content-Type` header. Anything else is a 415.
#[derive(Debug, Clone)]
pub struct Payload<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = request
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .map(|mime| mime.trim().to_ascii_lowercase())
            .unwrap_or_default();

        match content_type.as_str() {
            "application/json" => Json::<T>::from_request(request, state)
                .await
                .map(|Json(value)| Payload(value))
                .map_err(|e: JsonRejection| rejected(e.status(), e.body_text())),
            "application/x-www-form-urlencoded" => Form::<T>::from_request(request, state)
                .await
                .map(|Form(value)| Payload(value))
                .map_err(|e: FormRejection| rejected(e.status(), e.body_text())),
            other => {
                tracing::debug!("Rejected request body of type '{}'", other);
                Err(AppError::unsupported_media_type(
                    "Expected a form or JSON request body",
                ))
            }
        }
    }
}

fn rejected(status: StatusCode, detail: String) -> AppError {
    tracing::debug!("Rejected request body: {}", detail);
    match status {
        StatusCode::PAYLOAD_TOO_LARGE => AppError::payload_too_large("Request body is too large"),
        StatusCode::UNSUPPORTED_MEDIA_TYPE => {
            AppError::unsupported_media_type("Expected a form or JSON request body")
        }
        _ => AppError::bad_request(detail),
    }
}
