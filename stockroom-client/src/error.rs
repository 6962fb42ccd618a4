//! Client error types

use serde_json::Value;
use shared::ErrorCode;
use std::collections::HashMap;
use thiserror::Error;

/// Error body returned by the backend (`ApiResponse` without data)
#[derive(Debug, serde::Deserialize)]
pub struct ApiErrorResponse {
    pub code: u16,
    pub message: String,
    #[serde(default)]
    pub details: Option<HashMap<String, Value>>,
}

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a structured error; `message` is the backend's own text
    #[error("{message}")]
    Api {
        code: u16,
        message: String,
        details: Option<HashMap<String, Value>>,
    },

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Authentication required
    #[error("Authentication required: {0}")]
    Unauthorized(String),

    /// Permission denied
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// Backend error code, when the backend sent a structured error
    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            Self::Api { code, .. } => ErrorCode::try_from(*code).ok(),
            _ => None,
        }
    }

    /// True when the request may or may not have reached the backend.
    ///
    /// An unreadable success response counts: the backend answered, so the
    /// change may already be recorded. `Serialization` only comes from
    /// encoding the request body, before anything is sent.
    /// A submission that fails this way must not be retried automatically.
    pub fn is_ambiguous(&self) -> bool {
        match self {
            Self::Http(e) => !e.is_builder() && !e.is_connect(),
            Self::Internal(_) | Self::InvalidResponse(_) => true,
            _ => false,
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_from_api_error() {
        let err = ClientError::Api {
            code: 5001,
            message: "Line item a: requested 6, only 5 can be returned".into(),
            details: None,
        };
        assert_eq!(err.error_code(), Some(ErrorCode::ReturnQuantityExceeded));
        assert_eq!(
            err.to_string(),
            "Line item a: requested 6, only 5 can be returned"
        );
        assert!(!err.is_ambiguous());
    }

    #[test]
    fn test_unreadable_success_is_ambiguous() {
        let err = ClientError::InvalidResponse("Missing credit note reference data".into());
        assert!(err.is_ambiguous());
        let err = ClientError::InvalidResponse("JSON parse error: EOF".into());
        assert!(err.is_ambiguous());

        let encode = serde_json::from_str::<u32>("x").unwrap_err();
        assert!(!ClientError::Serialization(encode).is_ambiguous());
        assert!(!ClientError::NotFound("CN-1".into()).is_ambiguous());
    }

    #[test]
    fn test_unknown_code_is_none() {
        let err = ClientError::Api {
            code: 4999,
            message: "?".into(),
            details: None,
        };
        assert_eq!(err.error_code(), None);
        assert_eq!(ClientError::NotFound("x".into()).error_code(), None);
    }

    #[test]
    fn test_parse_error_body() {
        let body = r#"{"code":4001,"message":"Transaction not found","details":{"id":"TX-9"}}"#;
        let parsed: ApiErrorResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.code, 4001);
        assert_eq!(parsed.details.unwrap()["id"], "TX-9");
    }
}
