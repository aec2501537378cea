// HTTP error types rendered as HTML error pages
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse},
};

use tower_sessions::{session, session_store};

use crate::auth::{AuthError, Authenticator};
use crate::database::StoreError;

/// Per-request failure with an appropriate status code and a client-safe message
#[derive(Debug)]
pub enum AppError {
    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 413 Payload Too Large
    PayloadTooLarge(String),

    // 415 Unsupported Media Type
    UnsupportedMediaType(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::PayloadTooLarge(msg)
            | AppError::UnsupportedMediaType(msg)
            | AppError::InternalServerError(msg)
            | AppError::ServiceUnavailable(msg) => msg,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            AppError::UnsupportedMediaType(_) => "UNSUPPORTED_MEDIA_TYPE",
            AppError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            AppError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        AppError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        AppError::Conflict(message.into())
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        AppError::PayloadTooLarge(message.into())
    }

    pub fn unsupported_media_type(message: impl Into<String>) -> Self {
        AppError::UnsupportedMediaType(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        AppError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        AppError::ServiceUnavailable(message.into())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => AppError::not_found(format!("Not found: {}", msg)),
            StoreError::Unavailable(msg) => {
                tracing::error!("Store unavailable: {}", msg);
                AppError::service_unavailable("Database temporarily unavailable")
            }
            StoreError::Query(msg) => {
                // Don't expose internal SQL errors to clients
                tracing::error!("Store query error: {}", msg);
                AppError::internal_server_error("An error occurred while processing your request")
            }
            StoreError::Serialization(e) => {
                tracing::error!("Stored document could not be decoded: {}", e);
                AppError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => AppError::unauthorized(err.to_string()),
            AuthError::EmailTaken(_) => AppError::conflict(err.to_string()),
            AuthError::PrincipalNotFound(_)
            | AuthError::Session(_)
            | AuthError::Store(_)
            | AuthError::Hash(_) => {
                tracing::error!("Authentication failure: {}", err);
                AppError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

impl From<session::Error> for AppError {
    fn from(err: session::Error) -> Self {
        match err {
            session::Error::Store(session_store::Error::Backend(msg)) => {
                tracing::error!("Session store unavailable: {}", msg);
                AppError::service_unavailable("Session store temporarily unavailable")
            }
            other => {
                tracing::error!("Session error: {}", other);
                AppError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

impl From<axum_login::Error<Authenticator>> for AppError {
    fn from(err: axum_login::Error<Authenticator>) -> Self {
        match err {
            axum_login::Error::Session(e) => e.into(),
            axum_login::Error::Backend(e) => e.into(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let body = crate::views::error_page(status, self.message());
        (status, Html(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_client_safe_statuses() {
        let not_found: AppError = StoreError::NotFound("gyms 1".into()).into();
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);

        let down: AppError = StoreError::Unavailable("refused".into()).into();
        assert_eq!(down.status_code(), StatusCode::SERVICE_UNAVAILABLE);

        let query: AppError = StoreError::Query("syntax error at SELECT".into()).into();
        assert_eq!(query.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!query.message().contains("SELECT"));
    }

    #[test]
    fn auth_errors_map() {
        let e: AppError = AuthError::InvalidCredentials.into();
        assert_eq!(e.error_code(), "UNAUTHORIZED");
        let e: AppError = AuthError::EmailTaken("a@b.c".into()).into();
        assert_eq!(e.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn session_store_outage_is_unavailable() {
        let e: AppError = session::Error::Store(session_store::Error::Backend("refused".into())).into();
        assert_eq!(e.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(!e.message().contains("refused"));

        let e: AppError = session::Error::Store(session_store::Error::Decode("bad".into())).into();
        assert_eq!(e.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
