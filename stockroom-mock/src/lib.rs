//! In-memory reference backend for the stockroom returns workflow.
//!
//! Serves the three contracts the dashboard client depends on:
//!
//! | Path | Method | Payload |
//! |------|--------|---------|
//! | /api/transactions/{id}/line-items | GET | `LineItemRecord[]` |
//! | /api/returns | POST | `ReturnRequest` -> `{ credit_note_id }` |
//! | /api/credit-notes/{id} | GET | `CreditNoteRecord` |
//! | /api/health | GET | liveness |

pub mod api;
pub mod config;
pub mod logger;
pub mod state;
pub mod store;

pub use api::build_app;
pub use config::Config;
pub use state::AppState;
pub use store::MemoryStore;
