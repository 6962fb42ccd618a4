//! In-memory return bookkeeping
//!
//! Holds sold line items per transaction and the credit notes recorded
//! against them. A return is checked and applied under a single write lock,
//! so two concurrent returns can never both consume the same remaining
//! quantity.

use std::collections::HashMap;

use chrono::Utc;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use shared::models::MAX_REASON_LEN;
use shared::money::{format_money, money_eq};
use shared::{
    AppError, AppResult, CreditNoteLine, CreditNoteRecord, ErrorCode, LineItemRecord,
    ReturnRequest, SoldLineItem,
};

/// First credit note number handed out
const FIRST_CREDIT_NOTE_NUMBER: u64 = 100;

#[derive(Debug)]
struct Inner {
    /// transaction id -> line items, in sale order
    transactions: HashMap<String, Vec<LineItemRecord>>,
    credit_notes: HashMap<String, CreditNoteRecord>,
    next_credit_note: u64,
}

#[derive(Debug)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                transactions: HashMap::new(),
                credit_notes: HashMap::new(),
                next_credit_note: FIRST_CREDIT_NOTE_NUMBER,
            }),
        }
    }

    /// Store with the demo transactions loaded
    pub fn with_demo_data() -> Self {
        let store = Self::new();
        for record in demo_line_items() {
            store.insert_line_item(record);
        }
        store
    }

    /// Add (or replace, by id) a sold line item
    pub fn insert_line_item(&self, record: LineItemRecord) {
        let mut inner = self.inner.write();
        let items = inner
            .transactions
            .entry(record.transaction_id.clone())
            .or_default();
        match items.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record,
            None => items.push(record),
        }
    }

    /// Line items of a transaction; empty when the transaction is unknown
    pub fn line_items(&self, transaction_id: &str) -> Vec<LineItemRecord> {
        self.inner
            .read()
            .transactions
            .get(transaction_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn credit_note(&self, credit_note_id: &str) -> Option<CreditNoteRecord> {
        self.inner.read().credit_notes.get(credit_note_id).cloned()
    }

    /// Validate and apply a return, returning the new credit note id.
    ///
    /// Nothing is changed unless every line passes.
    pub fn record_return(&self, request: &ReturnRequest) -> AppResult<String> {
        let reason = request.reason.trim();
        if reason.is_empty() {
            return Err(AppError::new(ErrorCode::ReturnReasonRequired));
        }
        if reason.chars().count() > MAX_REASON_LEN {
            return Err(AppError::with_message(
                ErrorCode::ValueOutOfRange,
                format!("Return reason exceeds {MAX_REASON_LEN} characters"),
            )
            .with_detail("field", "reason"));
        }
        if request.items.is_empty() {
            return Err(AppError::new(ErrorCode::ReturnEmpty));
        }
        if let Some(id) = request.duplicate_line_item() {
            return Err(AppError::with_message(
                ErrorCode::DuplicateLineItem,
                format!("Line item {id} listed more than once"),
            )
            .with_detail("line_item_id", id));
        }

        let mut inner = self.inner.write();
        let Some(records) = inner.transactions.get(&request.transaction_id) else {
            return Err(AppError::with_message(
                ErrorCode::TransactionNotFound,
                format!("Transaction {} not found", request.transaction_id),
            ));
        };

        let mut lines = Vec::with_capacity(request.items.len());
        let mut positions = Vec::with_capacity(request.items.len());
        for line in &request.items {
            let Some(pos) = records.iter().position(|r| r.id == line.line_item_id) else {
                return Err(AppError::with_message(
                    ErrorCode::LineItemNotFound,
                    format!("Line item {} not found", line.line_item_id),
                )
                .with_detail("line_item_id", line.line_item_id.clone()));
            };
            let item = SoldLineItem::try_from(records[pos].clone()).map_err(|e| {
                AppError::with_message(ErrorCode::StorageError, e.to_string())
            })?;
            if item.stock_item_id.is_none() {
                return Err(AppError::with_message(
                    ErrorCode::LineItemNotStocked,
                    format!("Line item {} is not linked to inventory", item.id),
                )
                .with_detail("line_item_id", item.id));
            }
            if line.quantity == 0 {
                return Err(AppError::with_message(
                    ErrorCode::InvalidReturnQuantity,
                    format!("Line item {}: quantity must be at least 1", item.id),
                )
                .with_detail("line_item_id", item.id));
            }
            if line.quantity > item.quantity_returnable {
                return Err(AppError::quantity_exceeded(
                    &item.id,
                    line.quantity,
                    item.quantity_returnable,
                ));
            }
            let refund = item.refund_for(line.quantity);
            positions.push((pos, line.quantity));
            lines.push(CreditNoteLine {
                line_item: item,
                quantity: line.quantity,
                refund,
            });
        }

        let expected: Decimal = lines.iter().map(|l| l.refund).sum();
        if !money_eq(expected, request.refund_total) {
            return Err(AppError::with_message(
                ErrorCode::RefundMismatch,
                format!(
                    "Refund total {} does not match {}",
                    format_money(request.refund_total),
                    format_money(expected)
                ),
            )
            .with_detail("expected", format_money(expected))
            .with_detail("submitted", format_money(request.refund_total)));
        }

        if let Some(records) = inner.transactions.get_mut(&request.transaction_id) {
            for (pos, quantity) in positions {
                records[pos].quantity_returnable -= quantity;
            }
        }

        let credit_note_id = format!("CN-{}", inner.next_credit_note);
        inner.next_credit_note += 1;
        inner.credit_notes.insert(
            credit_note_id.clone(),
            CreditNoteRecord {
                credit_note_id: credit_note_id.clone(),
                transaction_id: request.transaction_id.clone(),
                reason: reason.to_string(),
                created_at: Utc::now(),
                processed_by: request.processed_by.clone(),
                items: lines,
            },
        );

        tracing::info!(
            credit_note_id = %credit_note_id,
            transaction_id = %request.transaction_id,
            lines = request.items.len(),
            refund = %format_money(expected),
            "Return recorded"
        );
        Ok(credit_note_id)
    }
}

fn demo_record(
    transaction_id: &str,
    id: &str,
    name: &str,
    quantity_sold: u32,
    quantity_returnable: u32,
    unit_price: i64,
) -> LineItemRecord {
    LineItemRecord {
        id: id.to_string(),
        transaction_id: transaction_id.to_string(),
        quantity_sold,
        quantity_returnable,
        sold_price: None,
        unit_price: Some(Decimal::from(unit_price)),
        stock_item_id: Some(format!("stock-{id}")),
        item_name: Some(name.to_string()),
        sku: Some(format!("SKU-{}", id.to_ascii_uppercase())),
        client_name: Some("Walk-in customer".to_string()),
        client_email: None,
        client_phone: None,
    }
}

/// Demo data served when `SEED_DEMO_DATA` is on
///
/// - `TX-001`: `a` (5 × 1000, fully returnable) and `b` (already returned)
/// - `TX-002`: everything already returned
/// - `TX-003`: remaining quantity only on an item not tracked in inventory
/// - `TX-004`: a lump-priced line (100 for 3 units)
pub fn demo_line_items() -> Vec<LineItemRecord> {
    let mut untracked = demo_record("TX-003", "c", "Gift wrapping", 2, 2, 50);
    untracked.stock_item_id = None;
    untracked.sku = None;

    let mut lump = demo_record("TX-004", "d", "Notebook bundle", 3, 3, 0);
    lump.unit_price = None;
    lump.sold_price = Some(Decimal::from(100));

    vec![
        demo_record("TX-001", "a", "Rice 5kg", 5, 5, 1000),
        demo_record("TX-001", "b", "Cooking oil 1L", 2, 0, 500),
        demo_record("TX-002", "e", "Soap bar", 4, 0, 150),
        untracked,
        lump,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::ReturnLine;

    fn request(lines: &[(&str, u32)], refund_total: i64) -> ReturnRequest {
        ReturnRequest {
            transaction_id: "TX-001".into(),
            reason: "Defective".into(),
            items: lines
                .iter()
                .map(|(id, q)| ReturnLine {
                    line_item_id: id.to_string(),
                    quantity: *q,
                })
                .collect(),
            refund_total: Decimal::from(refund_total),
            processed_by: Some("emp-1".into()),
        }
    }

    #[test]
    fn test_record_return_decrements_and_numbers_sequentially() {
        let store = MemoryStore::with_demo_data();
        let id = store.record_return(&request(&[("a", 2)], 2000)).unwrap();
        assert_eq!(id, "CN-100");

        let a = store
            .line_items("TX-001")
            .into_iter()
            .find(|r| r.id == "a")
            .unwrap();
        assert_eq!(a.quantity_returnable, 3);

        let note = store.credit_note("CN-100").unwrap();
        assert_eq!(note.total_quantity(), 2);
        assert_eq!(note.total_refund(), Decimal::from(2000));
        assert_eq!(note.processed_by.as_deref(), Some("emp-1"));

        let next = store.record_return(&request(&[("a", 1)], 1000)).unwrap();
        assert_eq!(next, "CN-101");
    }

    #[test]
    fn test_quantity_exceeded_leaves_store_untouched() {
        let store = MemoryStore::with_demo_data();
        let err = store.record_return(&request(&[("a", 6)], 6000)).unwrap_err();
        assert_eq!(err.code, ErrorCode::ReturnQuantityExceeded);
        assert_eq!(store.line_items("TX-001")[0].quantity_returnable, 5);
        assert!(store.credit_note("CN-100").is_none());
    }

    #[test]
    fn test_refund_mismatch_rejected() {
        let store = MemoryStore::with_demo_data();
        let err = store.record_return(&request(&[("a", 2)], 1999)).unwrap_err();
        assert_eq!(err.code, ErrorCode::RefundMismatch);
    }

    #[test]
    fn test_rejections() {
        let store = MemoryStore::with_demo_data();

        let mut blank = request(&[("a", 1)], 1000);
        blank.reason = "   ".into();
        assert_eq!(
            store.record_return(&blank).unwrap_err().code,
            ErrorCode::ReturnReasonRequired
        );
        assert_eq!(
            store.record_return(&request(&[], 0)).unwrap_err().code,
            ErrorCode::ReturnEmpty
        );
        assert_eq!(
            store
                .record_return(&request(&[("a", 1), ("a", 1)], 2000))
                .unwrap_err()
                .code,
            ErrorCode::DuplicateLineItem
        );
        assert_eq!(
            store.record_return(&request(&[("zz", 1)], 0)).unwrap_err().code,
            ErrorCode::LineItemNotFound
        );
        assert_eq!(
            store.record_return(&request(&[("a", 0)], 0)).unwrap_err().code,
            ErrorCode::InvalidReturnQuantity
        );

        let mut unknown_tx = request(&[("a", 1)], 1000);
        unknown_tx.transaction_id = "TX-404".into();
        assert_eq!(
            store.record_return(&unknown_tx).unwrap_err().code,
            ErrorCode::TransactionNotFound
        );

        let mut untracked = request(&[("c", 1)], 50);
        untracked.transaction_id = "TX-003".into();
        assert_eq!(
            store.record_return(&untracked).unwrap_err().code,
            ErrorCode::LineItemNotStocked
        );
    }

    #[test]
    fn test_lump_priced_line_uses_rounded_unit_price() {
        let store = MemoryStore::with_demo_data();
        let mut req = request(&[("d", 3)], 0);
        req.transaction_id = "TX-004".into();
        req.refund_total = "99.99".parse().unwrap();
        let id = store.record_return(&req).unwrap();
        let note = store.credit_note(&id).unwrap();
        assert_eq!(
            note.items[0].line_item.unit_price,
            "33.33".parse::<Decimal>().unwrap()
        );
    }

    #[test]
    fn test_unknown_transaction_has_no_line_items() {
        let store = MemoryStore::with_demo_data();
        assert!(store.line_items("TX-404").is_empty());
    }
}
