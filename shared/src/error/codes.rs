//! Unified error codes for Stockroom
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 4xxx: Transaction errors
//! - 5xxx: Return / credit note errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Represented as u16 on the wire so the dashboard and the backend agree on
/// a single numeric table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 4xxx: Transaction ====================
    /// Transaction not found
    TransactionNotFound = 4001,
    /// Line item does not belong to the transaction
    LineItemNotFound = 4002,
    /// Line item has no inventory linkage
    LineItemNotStocked = 4003,

    // ==================== 5xxx: Return ====================
    /// Requested return quantity exceeds what is still returnable
    ReturnQuantityExceeded = 5001,
    /// Return reason is missing
    ReturnReasonRequired = 5002,
    /// Return request contains no items
    ReturnEmpty = 5003,
    /// Client refund total does not match the backend computation
    RefundMismatch = 5004,
    /// Same line item listed twice in one return
    DuplicateLineItem = 5005,
    /// Credit note not found
    CreditNoteNotFound = 5006,
    /// Return quantity must be positive
    InvalidReturnQuantity = 5007,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Storage error
    StorageError = 9002,
    /// Service unavailable
    ServiceUnavailable = 9003,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Transaction
            ErrorCode::TransactionNotFound => "Transaction not found",
            ErrorCode::LineItemNotFound => "Line item not found in transaction",
            ErrorCode::LineItemNotStocked => "Line item is not linked to inventory",

            // Return
            ErrorCode::ReturnQuantityExceeded => "Return quantity exceeds the returnable quantity",
            ErrorCode::ReturnReasonRequired => "Return reason is required",
            ErrorCode::ReturnEmpty => "Return contains no items",
            ErrorCode::RefundMismatch => "Refund total does not match the sold prices",
            ErrorCode::DuplicateLineItem => "Line item listed more than once",
            ErrorCode::CreditNoteNotFound => "Credit note not found",
            ErrorCode::InvalidReturnQuantity => "Return quantity must be positive",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::StorageError => "Storage error",
            ErrorCode::ServiceUnavailable => "Service unavailable",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Transaction
            4001 => Ok(ErrorCode::TransactionNotFound),
            4002 => Ok(ErrorCode::LineItemNotFound),
            4003 => Ok(ErrorCode::LineItemNotStocked),

            // Return
            5001 => Ok(ErrorCode::ReturnQuantityExceeded),
            5002 => Ok(ErrorCode::ReturnReasonRequired),
            5003 => Ok(ErrorCode::ReturnEmpty),
            5004 => Ok(ErrorCode::RefundMismatch),
            5005 => Ok(ErrorCode::DuplicateLineItem),
            5006 => Ok(ErrorCode::CreditNoteNotFound),
            5007 => Ok(ErrorCode::InvalidReturnQuantity),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::StorageError),
            9003 => Ok(ErrorCode::ServiceUnavailable),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
