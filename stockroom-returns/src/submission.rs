//! Return submission
//!
//! Aggregate validation of a selection into a [`ReturnRequest`], and the
//! single backend call that turns it into a credit note.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde::ser::SerializeMap;
use shared::models::MAX_REASON_LEN;
use shared::money::format_money;
use shared::{Operator, ReturnLine, ReturnRequest, SubmitReturnResponse};
use stockroom_client::ReturnsApi;

use crate::error::SubmissionError;
use crate::selection::{QuantityIssue, ReturnSelectionState};

/// Where a validation problem belongs
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValidationField {
    TransactionId,
    Reason,
    Items,
    /// A selected line, by line item id
    Line(String),
}

impl fmt::Display for ValidationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TransactionId => f.write_str("transaction_id"),
            Self::Reason => f.write_str("reason"),
            Self::Items => f.write_str("items"),
            Self::Line(id) => f.write_str(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    Required,
    TooLong { max: usize },
    NoItems,
    InvalidQuantity,
    ExceedsAvailable { requested: u32, max: u32 },
    NotReturnable,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => f.write_str("required"),
            Self::TooLong { max } => write!(f, "must be at most {max} characters"),
            Self::NoItems => f.write_str("select at least one item"),
            Self::InvalidQuantity => f.write_str("quantity must be a whole number of at least 1"),
            Self::ExceedsAvailable { max, .. } => write!(f, "at most {max} can be returned"),
            Self::NotReturnable => f.write_str("no longer available for return"),
        }
    }
}

/// Every problem found in one validation pass, in check order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<(ValidationField, ValidationIssue)>,
}

impl ValidationErrors {
    fn push(&mut self, field: ValidationField, issue: ValidationIssue) {
        self.errors.push((field, issue));
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn get(&self, field: &ValidationField) -> Option<&ValidationIssue> {
        self.errors.iter().find(|(f, _)| f == field).map(|(_, i)| i)
    }

    /// Issue recorded for a selected line
    pub fn line(&self, line_item_id: &str) -> Option<&ValidationIssue> {
        self.get(&ValidationField::Line(line_item_id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ValidationField, &ValidationIssue)> {
        self.errors.iter().map(|(f, i)| (f, i))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Return is incomplete: ")?;
        for (i, (field, issue)) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Serializes as `{ "<field>": "<issue>" }` for rendering next to inputs
impl Serialize for ValidationErrors {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.errors.len()))?;
        for (field, issue) in &self.errors {
            map.serialize_entry(&field.to_string(), &issue.to_string())?;
        }
        map.end()
    }
}

/// Validate the whole selection and build the request.
///
/// Every rule is checked, so one call reports every problem. Items keep
/// selection order and the request is stamped with `operator`.
pub fn validate_and_build(
    selection: &ReturnSelectionState,
    reason: &str,
    transaction_id: &str,
    operator: &Operator,
) -> Result<ReturnRequest, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let transaction_id = transaction_id.trim();
    if transaction_id.is_empty() {
        errors.push(ValidationField::TransactionId, ValidationIssue::Required);
    }

    let reason = reason.trim();
    if reason.is_empty() {
        errors.push(ValidationField::Reason, ValidationIssue::Required);
    } else if reason.chars().count() > MAX_REASON_LEN {
        errors.push(
            ValidationField::Reason,
            ValidationIssue::TooLong {
                max: MAX_REASON_LEN,
            },
        );
    }

    let lines = selection.lines();
    if lines.is_empty() {
        errors.push(ValidationField::Items, ValidationIssue::NoItems);
    }

    let same_transaction = transaction_id.is_empty() || transaction_id == selection.transaction_id();
    for line in &lines {
        let field = ValidationField::Line(line.item.id.clone());
        let max = line.item.quantity_returnable;
        let issue = match line.issue {
            _ if !same_transaction || !line.item.is_candidate() => {
                Some(ValidationIssue::NotReturnable)
            }
            Some(QuantityIssue::Invalid { .. }) => Some(ValidationIssue::InvalidQuantity),
            Some(QuantityIssue::ExceedsAvailable { requested, max }) => {
                Some(ValidationIssue::ExceedsAvailable {
                    requested: *requested,
                    max: *max,
                })
            }
            None if line.quantity == 0 => Some(ValidationIssue::InvalidQuantity),
            None if line.quantity > max => Some(ValidationIssue::ExceedsAvailable {
                requested: line.quantity,
                max,
            }),
            None => None,
        };
        if let Some(issue) = issue {
            errors.push(field, issue);
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ReturnRequest {
        transaction_id: transaction_id.to_string(),
        reason: reason.to_string(),
        items: lines
            .iter()
            .map(|l| ReturnLine {
                line_item_id: l.item.id.clone(),
                quantity: l.quantity,
            })
            .collect(),
        refund_total: selection.total_refund(),
        processed_by: None,
    }
    .with_operator(operator.id.clone()))
}

/// Sends validated return requests to the backend
#[derive(Clone)]
pub struct ReturnSubmission {
    api: Arc<dyn ReturnsApi>,
}

impl fmt::Debug for ReturnSubmission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReturnSubmission").finish_non_exhaustive()
    }
}

impl ReturnSubmission {
    pub fn new(api: Arc<dyn ReturnsApi>) -> Self {
        Self { api }
    }

    /// Submit once. Failures are returned as-is and never retried here.
    pub async fn submit(
        &self,
        request: &ReturnRequest,
    ) -> Result<SubmitReturnResponse, SubmissionError> {
        tracing::info!(
            transaction_id = %request.transaction_id,
            lines = request.items.len(),
            quantity = request.total_quantity(),
            refund = %format_money(request.refund_total),
            "Submitting return"
        );
        match self.api.submit_return(request).await {
            Ok(response) => {
                tracing::info!(
                    transaction_id = %request.transaction_id,
                    credit_note_id = %response.credit_note_id,
                    "Return accepted"
                );
                Ok(response)
            }
            Err(e) => {
                let err = SubmissionError::from(e);
                tracing::warn!(
                    transaction_id = %request.transaction_id,
                    error = %err,
                    outcome_unknown = err.outcome_unknown(),
                    "Return submission failed"
                );
                Err(err)
            }
        }
    }
}
