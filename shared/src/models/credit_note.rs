//! Credit note model (read-only, owned by the backend)

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::line_item::SoldLineItem;

/// One resolved line of a finalized return
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreditNoteLine {
    /// Snapshot of the sold line at the time of return
    pub line_item: SoldLineItem,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub refund: Decimal,
}

/// Finalized return record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreditNoteRecord {
    pub credit_note_id: String,
    pub transaction_id: String,
    pub reason: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub processed_by: Option<String>,
    pub items: Vec<CreditNoteLine>,
}

impl CreditNoteRecord {
    /// Units returned across all lines
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Refund across all lines
    pub fn total_refund(&self) -> Decimal {
        self.items.iter().map(|l| l.refund).sum()
    }
}
