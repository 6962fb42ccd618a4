//! Transaction lookup
//!
//! Fetches the sold line items of a transaction, converts them into typed
//! [`SoldLineItem`]s and splits out the return candidates.

use std::sync::Arc;

use shared::SoldLineItem;
use stockroom_client::ReturnsApi;

use crate::error::LookupError;

/// Why a valid transaction has nothing to return
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoCandidates {
    /// The backend holds no line items for this id
    NotFound,
    /// Every line item has already been returned in full
    FullyReturned,
    /// Some quantity remains, but only on items not tracked in inventory
    NotStocked,
}

impl NoCandidates {
    pub fn message(&self) -> &'static str {
        match self {
            Self::NotFound => "No sale was found for this transaction id",
            Self::FullyReturned => "Every item in this transaction has already been returned",
            Self::NotStocked => {
                "The remaining items in this transaction are not tracked in inventory and cannot be returned"
            }
        }
    }
}

impl std::fmt::Display for NoCandidates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Return candidates of one transaction, in backend order
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateSet {
    transaction_id: String,
    items: Vec<SoldLineItem>,
}

impl CandidateSet {
    pub fn new(transaction_id: impl Into<String>, items: Vec<SoldLineItem>) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            items,
        }
    }

    pub fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    pub fn items(&self) -> &[SoldLineItem] {
        &self.items
    }

    pub fn get(&self, line_item_id: &str) -> Option<&SoldLineItem> {
        self.items.iter().find(|i| i.id == line_item_id)
    }

    pub fn contains(&self, line_item_id: &str) -> bool {
        self.get(line_item_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Result of a lookup that reached the backend
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Found(CandidateSet),
    NoCandidates {
        transaction_id: String,
        reason: NoCandidates,
    },
}

impl LookupOutcome {
    /// Classify backend records for `transaction_id`
    ///
    /// Empty input is `NotFound`. A non-empty input without candidates is
    /// `FullyReturned` when nothing is left to return, else `NotStocked`.
    pub fn from_items(transaction_id: &str, items: Vec<SoldLineItem>) -> Self {
        if items.is_empty() {
            return Self::NoCandidates {
                transaction_id: transaction_id.to_string(),
                reason: NoCandidates::NotFound,
            };
        }
        let nothing_left = items.iter().all(|i| i.quantity_returnable == 0);
        let candidates: Vec<SoldLineItem> = items.into_iter().filter(|i| i.is_candidate()).collect();
        if !candidates.is_empty() {
            return Self::Found(CandidateSet::new(transaction_id, candidates));
        }
        let reason = if nothing_left {
            NoCandidates::FullyReturned
        } else {
            NoCandidates::NotStocked
        };
        Self::NoCandidates {
            transaction_id: transaction_id.to_string(),
            reason,
        }
    }

    pub fn candidates(&self) -> Option<&CandidateSet> {
        match self {
            Self::Found(set) => Some(set),
            Self::NoCandidates { .. } => None,
        }
    }
}

/// Looks up return candidates over a [`ReturnsApi`] backend
#[derive(Clone)]
pub struct TransactionLookup {
    api: Arc<dyn ReturnsApi>,
}

impl std::fmt::Debug for TransactionLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionLookup").finish_non_exhaustive()
    }
}

impl TransactionLookup {
    pub fn new(api: Arc<dyn ReturnsApi>) -> Self {
        Self { api }
    }

    /// Look up the return candidates of `transaction_id`.
    ///
    /// A blank id fails before any network call. Backend failures are never
    /// reported as "not found", and one malformed record fails the lookup.
    pub async fn lookup(&self, transaction_id: &str) -> Result<LookupOutcome, LookupError> {
        let transaction_id = transaction_id.trim();
        if transaction_id.is_empty() {
            return Err(LookupError::EmptyIdentifier);
        }

        let records = self
            .api
            .transaction_line_items(transaction_id)
            .await
            .inspect_err(|e| {
                tracing::warn!(transaction_id = %transaction_id, error = %e, "Line item lookup failed");
            })?;

        let items = records
            .into_iter()
            .map(SoldLineItem::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let outcome = LookupOutcome::from_items(transaction_id, items);
        match &outcome {
            LookupOutcome::Found(set) => {
                tracing::info!(transaction_id = %transaction_id, candidates = set.len(), "Transaction loaded");
            }
            LookupOutcome::NoCandidates { reason, .. } => {
                tracing::info!(transaction_id = %transaction_id, reason = ?reason, "No return candidates");
            }
        }
        Ok(outcome)
    }
}
