//! Data models
//!
//! Shared between the returns client and the backend (via API).
//! Money fields travel as JSON numbers and are held as `Decimal`.

pub mod credit_note;
pub mod line_item;
pub mod operator;
pub mod return_request;

// Re-exports
pub use credit_note::*;
pub use line_item::*;
pub use operator::*;
pub use return_request::*;
