//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            Self::NotFound
            | Self::TransactionNotFound
            | Self::LineItemNotFound
            | Self::CreditNoteNotFound => StatusCode::NOT_FOUND,

            Self::AlreadyExists | Self::DuplicateLineItem => StatusCode::CONFLICT,

            // Business rule violations the client could not have caught
            // locally (stale returnable quantity, price drift).
            Self::ReturnQuantityExceeded | Self::RefundMismatch | Self::LineItemNotStocked => {
                StatusCode::UNPROCESSABLE_ENTITY
            }

            Self::Unknown
            | Self::ValidationFailed
            | Self::RequiredField
            | Self::ValueOutOfRange
            | Self::ReturnReasonRequired
            | Self::ReturnEmpty
            | Self::InvalidReturnQuantity => StatusCode::BAD_REQUEST,

            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,

            Self::InternalError | Self::StorageError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(ErrorCode::Success.http_status(), StatusCode::OK);
        assert_eq!(
            ErrorCode::TransactionNotFound.http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ErrorCode::ReturnQuantityExceeded.http_status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ErrorCode::ReturnReasonRequired.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorCode::DuplicateLineItem.http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ErrorCode::InternalError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
