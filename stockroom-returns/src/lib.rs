//! Stockroom Returns - multi-item sales-return workflow
//!
//! Flow:
//!
//! ```text
//! TransactionLookup -> ReturnSelectionState -> ReturnSubmission -> backend
//!                                                                    |
//!                                    CreditNoteRenderer <- credit note id
//! ```
//!
//! [`ReturnSession`] sequences one authoring session over a [`ReturnsApi`]
//! backend: one backend call in flight at a time, and nothing from a call
//! issued before [`ReturnSession::reset`] ever lands in the fresh session.
//!
//! [`ReturnsApi`]: stockroom_client::ReturnsApi

pub mod credit_note;
pub mod error;
pub mod lookup;
pub mod selection;
pub mod session;
pub mod submission;

pub use credit_note::{CreditNoteRenderer, DEFAULT_LINE_WIDTH};
pub use error::{LoadError, LookupError, SelectionError, SessionError, SubmissionError};
pub use lookup::{CandidateSet, LookupOutcome, NoCandidates, TransactionLookup};
pub use selection::{QuantityIssue, ReturnSelectionState, SelectedLine};
pub use session::{RefreshOutcome, ReturnSession, SessionPhase};
pub use submission::{
    ReturnSubmission, ValidationErrors, ValidationField, ValidationIssue, validate_and_build,
};
