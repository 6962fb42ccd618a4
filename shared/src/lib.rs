//! Shared types for Stockroom
//!
//! Wire and domain models exchanged between the returns client and the
//! backend, money helpers, and the unified error system.

pub mod error;
pub mod models;
pub mod money;

// Re-exports
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use models::{
    ClientContact, CreditNoteLine, CreditNoteRecord, LineItemError, LineItemRecord, Operator, ReturnLine,
    ReturnRequest, SoldLineItem, SubmitReturnResponse,
};
