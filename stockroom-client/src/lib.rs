//! Stockroom Client - typed HTTP client for the returns backend
//!
//! Provides the [`ReturnsApi`] contract used by the returns workflow and two
//! transports behind the [`HttpClient`] trait:
//! - [`NetworkHttpClient`]: reqwest over the network
//! - `OneshotHttpClient`: in-process calls into an axum Router
//!   (feature `in-process`)

pub mod api;
pub mod client;
pub mod config;
pub mod error;

pub use api::{ReturnsApi, ReturnsClient};
pub use client::{HttpClient, NetworkHttpClient};
#[cfg(feature = "in-process")]
pub use client::OneshotHttpClient;
pub use config::ClientConfig;
pub use error::{ApiErrorResponse, ClientError, ClientResult};

// Re-export shared types for convenience
pub use shared::{
    ApiResponse, CreditNoteRecord, ErrorCode, LineItemRecord, ReturnRequest,
    SubmitReturnResponse,
};
