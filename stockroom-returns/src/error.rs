//! Workflow error types
//!
//! Every class maps to its own user-facing message. Backend messages are
//! passed through verbatim.

use shared::{ErrorCode, LineItemError};
use stockroom_client::ClientError;
use thiserror::Error;

use crate::submission::ValidationErrors;

/// Transaction lookup failure
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Enter a transaction id to look up")]
    EmptyIdentifier,

    #[error("{0}")]
    Backend(#[from] ClientError),

    #[error("Backend returned an unreadable line item: {0}")]
    Malformed(#[from] LineItemError),
}

/// Selection mutation failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("Line item {0} is not available for return in this transaction")]
    UnknownLineItem(String),

    #[error("Line item {0} is not selected")]
    NotSelected(String),

    #[error("Line item {line_item_id}: quantity must be a whole number of at least 1")]
    InvalidQuantity { line_item_id: String, input: String },

    #[error("Line item {line_item_id}: at most {max} can be returned")]
    ExceedsAvailable {
        line_item_id: String,
        requested: u32,
        max: u32,
    },
}

/// Backend failure while submitting a return
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// The backend has less returnable stock than the local view assumed,
    /// typically after a concurrent return on the same transaction.
    #[error("{message}")]
    QuantityConflict {
        message: String,
        line_item_id: Option<String>,
        available: Option<u32>,
    },

    #[error("{0}")]
    Backend(ClientError),
}

impl SubmissionError {
    /// The request may have been applied even though no answer came back.
    ///
    /// The operator should check for a new credit note before resubmitting.
    pub fn outcome_unknown(&self) -> bool {
        matches!(self, Self::Backend(e) if e.is_ambiguous())
    }
}

impl From<ClientError> for SubmissionError {
    fn from(err: ClientError) -> Self {
        if err.error_code() != Some(ErrorCode::ReturnQuantityExceeded) {
            return Self::Backend(err);
        }
        let (message, details) = match err {
            ClientError::Api {
                message, details, ..
            } => (message, details),
            other => return Self::Backend(other),
        };
        let line_item_id = details
            .as_ref()
            .and_then(|d| d.get("line_item_id"))
            .and_then(|v| v.as_str())
            .map(str::to_string);
        let available = details
            .as_ref()
            .and_then(|d| d.get("available"))
            .and_then(|v| v.as_u64())
            .and_then(|n| u32::try_from(n).ok());
        Self::QuantityConflict {
            message,
            line_item_id,
            available,
        }
    }
}

/// Credit note load failure
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Enter a credit note id to load")]
    EmptyIdentifier,

    #[error("{0}")]
    Backend(#[from] ClientError),
}

/// Failure of a [`ReturnSession`](crate::ReturnSession) operation
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Another request is still in progress")]
    Busy,

    #[error("The return was discarded before the response arrived")]
    Discarded,

    #[error("Look up a transaction first")]
    NoTransaction,

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Submission(#[from] SubmissionError),

    #[error(transparent)]
    Load(#[from] LoadError),
}

impl SessionError {
    /// Backend rejected the submission for lack of returnable stock
    pub fn is_quantity_conflict(&self) -> bool {
        matches!(
            self,
            Self::Submission(SubmissionError::QuantityConflict { .. })
        )
    }
}
