//! HTTP transports for the returns backend.

pub mod http;
#[cfg(feature = "in-process")]
pub mod http_oneshot;

pub use http::{HttpClient, NetworkHttpClient};
#[cfg(feature = "in-process")]
pub use http_oneshot::OneshotHttpClient;

use crate::error::{ApiErrorResponse, ClientError};

/// Map a non-success response body to a [`ClientError`].
///
/// Structured backend errors keep their code and message; anything else
/// falls back to the HTTP status.
pub(crate) fn error_from_body(status: ::http::StatusCode, text: String) -> ClientError {
    if let Ok(api_err) = serde_json::from_str::<ApiErrorResponse>(&text) {
        return ClientError::Api {
            code: api_err.code,
            message: api_err.message,
            details: api_err.details,
        };
    }
    match status {
        ::http::StatusCode::UNAUTHORIZED => ClientError::Unauthorized(text),
        ::http::StatusCode::FORBIDDEN => ClientError::Forbidden(text),
        ::http::StatusCode::NOT_FOUND => ClientError::NotFound(text),
        ::http::StatusCode::BAD_REQUEST => ClientError::Validation(text),
        _ => ClientError::Internal(text),
    }
}
