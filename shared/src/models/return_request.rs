//! Return request payload (`POST /api/returns`)

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Maximum length of a return reason, in characters
pub const MAX_REASON_LEN: usize = 500;

/// One returned line: which sold line item, and how many units
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReturnLine {
    pub line_item_id: String,
    pub quantity: u32,
}

/// Normalized return request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReturnRequest {
    pub transaction_id: String,
    /// Trimmed, non-empty
    pub reason: String,
    /// In selection order
    pub items: Vec<ReturnLine>,
    /// Refund computed client-side with the shared rounding policy
    #[serde(with = "rust_decimal::serde::float")]
    pub refund_total: Decimal,
    /// Operator id recording the return
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_by: Option<String>,
}

impl ReturnRequest {
    /// Attach the acting operator
    pub fn with_operator(mut self, operator_id: impl Into<String>) -> Self {
        self.processed_by = Some(operator_id.into());
        self
    }

    /// Sum of returned units
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// First line item id listed more than once, if any
    pub fn duplicate_line_item(&self) -> Option<&str> {
        let mut seen = HashSet::new();
        self.items
            .iter()
            .find(|l| !seen.insert(l.line_item_id.as_str()))
            .map(|l| l.line_item_id.as_str())
    }
}

/// Response of `POST /api/returns`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubmitReturnResponse {
    pub credit_note_id: String,
}
