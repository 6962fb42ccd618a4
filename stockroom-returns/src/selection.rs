//! Return selection state
//!
//! Which candidate lines are being returned and how many units of each.
//! Entries keep selection order. A quantity edit that fails validation is
//! recorded against its line and blocks submission; the line keeps its last
//! valid quantity so totals never reflect an invalid value.

use rust_decimal::Decimal;
use shared::SoldLineItem;
use shared::money::round_money;

use crate::error::SelectionError;
use crate::lookup::CandidateSet;

/// Pending quantity problem on a selected line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuantityIssue {
    /// Not a whole number, or not at least 1
    Invalid { input: String },
    /// More than the line can still return
    ExceedsAvailable { requested: u32, max: u32 },
}

impl QuantityIssue {
    pub fn message(&self) -> String {
        match self {
            Self::Invalid { .. } => "Quantity must be a whole number of at least 1".to_string(),
            Self::ExceedsAvailable { max, .. } => format!("At most {max} can be returned"),
        }
    }

    fn to_error(&self, line_item_id: &str) -> SelectionError {
        match self {
            Self::Invalid { input } => SelectionError::InvalidQuantity {
                line_item_id: line_item_id.to_string(),
                input: input.clone(),
            },
            Self::ExceedsAvailable { requested, max } => SelectionError::ExceedsAvailable {
                line_item_id: line_item_id.to_string(),
                requested: *requested,
                max: *max,
            },
        }
    }
}

/// Check typed input against the returnable maximum
fn parse_quantity(input: &str, max: u32) -> Result<u32, QuantityIssue> {
    let trimmed = input.trim();
    let value: i64 = trimmed.parse().map_err(|_| QuantityIssue::Invalid {
        input: trimmed.to_string(),
    })?;
    if value <= 0 {
        return Err(QuantityIssue::Invalid {
            input: trimmed.to_string(),
        });
    }
    let requested = u32::try_from(value).unwrap_or(u32::MAX);
    if requested > max {
        return Err(QuantityIssue::ExceedsAvailable { requested, max });
    }
    Ok(requested)
}

#[derive(Debug, Clone)]
struct Entry {
    line_item_id: String,
    /// Last valid quantity
    quantity: u32,
    /// Latest typed value, shown back to the operator
    input: String,
    issue: Option<QuantityIssue>,
}

/// Read-only view of one selected line
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedLine<'a> {
    pub item: &'a SoldLineItem,
    pub quantity: u32,
    pub input: &'a str,
    pub issue: Option<&'a QuantityIssue>,
    pub refund: Decimal,
}

/// Selection of candidate lines for one authoring session
#[derive(Debug, Clone)]
pub struct ReturnSelectionState {
    candidates: CandidateSet,
    entries: Vec<Entry>,
}

impl ReturnSelectionState {
    pub fn new(candidates: CandidateSet) -> Self {
        Self {
            candidates,
            entries: Vec::new(),
        }
    }

    pub fn candidates(&self) -> &CandidateSet {
        &self.candidates
    }

    pub fn transaction_id(&self) -> &str {
        self.candidates.transaction_id()
    }

    fn entry(&self, line_item_id: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.line_item_id == line_item_id)
    }

    pub fn is_selected(&self, line_item_id: &str) -> bool {
        self.entry(line_item_id).is_some()
    }

    /// Select a candidate with quantity 1; selecting it again changes nothing
    pub fn select(&mut self, line_item_id: &str) -> Result<(), SelectionError> {
        if !self.candidates.contains(line_item_id) {
            return Err(SelectionError::UnknownLineItem(line_item_id.to_string()));
        }
        if self.is_selected(line_item_id) {
            return Ok(());
        }
        self.entries.push(Entry {
            line_item_id: line_item_id.to_string(),
            quantity: 1,
            input: "1".to_string(),
            issue: None,
        });
        Ok(())
    }

    /// Select every candidate not yet selected, returning how many were added
    pub fn select_all(&mut self) -> usize {
        let missing: Vec<String> = self
            .candidates
            .items()
            .iter()
            .filter(|i| !self.is_selected(&i.id))
            .map(|i| i.id.clone())
            .collect();
        let added = missing.len();
        for id in missing {
            self.entries.push(Entry {
                line_item_id: id,
                quantity: 1,
                input: "1".to_string(),
                issue: None,
            });
        }
        added
    }

    /// Remove a line; unknown ids are ignored
    pub fn deselect(&mut self, line_item_id: &str) {
        self.entries.retain(|e| e.line_item_id != line_item_id);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Apply a typed quantity to a selected line.
    ///
    /// On failure the issue is also recorded on the line and the previous
    /// valid quantity is kept. A valid value clears any recorded issue.
    pub fn set_quantity(&mut self, line_item_id: &str, value: &str) -> Result<(), SelectionError> {
        let max = self
            .candidates
            .get(line_item_id)
            .map(|i| i.quantity_returnable)
            .ok_or_else(|| SelectionError::NotSelected(line_item_id.to_string()))?;
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.line_item_id == line_item_id)
            .ok_or_else(|| SelectionError::NotSelected(line_item_id.to_string()))?;

        entry.input = value.trim().to_string();
        match parse_quantity(value, max) {
            Ok(quantity) => {
                entry.quantity = quantity;
                entry.issue = None;
                Ok(())
            }
            Err(issue) => {
                let err = issue.to_error(line_item_id);
                entry.issue = Some(issue);
                Err(err)
            }
        }
    }

    /// Quantity currently counted for a line
    pub fn quantity(&self, line_item_id: &str) -> Option<u32> {
        self.entry(line_item_id).map(|e| e.quantity)
    }

    pub fn line_error(&self, line_item_id: &str) -> Option<&QuantityIssue> {
        self.entry(line_item_id).and_then(|e| e.issue.as_ref())
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|e| e.issue.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Selected lines in selection order
    pub fn lines(&self) -> Vec<SelectedLine<'_>> {
        self.entries
            .iter()
            .filter_map(|e| {
                let item = self.candidates.get(&e.line_item_id)?;
                Some(SelectedLine {
                    item,
                    quantity: e.quantity,
                    input: &e.input,
                    issue: e.issue.as_ref(),
                    refund: item.refund_for(e.quantity),
                })
            })
            .collect()
    }

    pub fn total_selected_count(&self) -> usize {
        self.entries.len()
    }

    pub fn total_quantity(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.quantity)).sum()
    }

    pub fn total_refund(&self) -> Decimal {
        self.lines().iter().map(|l| l.refund).sum()
    }

    /// Refund per returned unit; zero when nothing is selected
    pub fn average_refund_per_unit(&self) -> Decimal {
        let quantity = self.total_quantity();
        if quantity == 0 {
            return Decimal::ZERO;
        }
        round_money(self.total_refund() / Decimal::from(quantity))
    }

    /// Swap in a fresh candidate set after a re-lookup.
    ///
    /// Lines whose id disappeared are dropped and returned. Kept lines are
    /// re-checked against the new returnable quantity; an overflow is
    /// recorded as an issue, never clamped. A different transaction clears
    /// the selection.
    pub fn replace_candidates(&mut self, candidates: CandidateSet) -> Vec<String> {
        if candidates.transaction_id() != self.candidates.transaction_id() {
            let dropped = self.entries.drain(..).map(|e| e.line_item_id).collect();
            self.candidates = candidates;
            return dropped;
        }

        let mut dropped = Vec::new();
        self.entries.retain(|e| {
            let keep = candidates.contains(&e.line_item_id);
            if !keep {
                dropped.push(e.line_item_id.clone());
            }
            keep
        });

        for entry in &mut self.entries {
            let Some(item) = candidates.get(&entry.line_item_id) else {
                continue;
            };
            match parse_quantity(&entry.input, item.quantity_returnable) {
                Ok(quantity) => {
                    entry.quantity = quantity;
                    entry.issue = None;
                }
                Err(QuantityIssue::Invalid { .. }) if entry.quantity <= item.quantity_returnable => {
                    // Keep the pending typing error
                }
                Err(_) if entry.quantity > item.quantity_returnable => {
                    entry.issue = Some(QuantityIssue::ExceedsAvailable {
                        requested: entry.quantity,
                        max: item.quantity_returnable,
                    });
                }
                Err(issue) => entry.issue = Some(issue),
            }
        }

        self.candidates = candidates;
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::ClientContact;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn item(id: &str, returnable: u32, unit_price: &str) -> SoldLineItem {
        SoldLineItem {
            id: id.to_string(),
            transaction_id: "TX-001".to_string(),
            quantity_sold: 5,
            quantity_returnable: returnable,
            unit_price: d(unit_price),
            stock_item_id: Some(format!("stock-{id}")),
            item_name: None,
            sku: None,
            client: ClientContact::default(),
        }
    }

    fn state() -> ReturnSelectionState {
        ReturnSelectionState::new(CandidateSet::new(
            "TX-001",
            vec![item("a", 5, "1000"), item("c", 3, "33.33")],
        ))
    }

    #[test]
    fn test_select_defaults_to_one() {
        let mut s = state();
        s.select("a").unwrap();
        assert_eq!(s.quantity("a"), Some(1));
        assert_eq!(s.total_refund(), d("1000"));
    }

    #[test]
    fn test_select_twice_keeps_quantity() {
        let mut s = state();
        s.select("a").unwrap();
        s.set_quantity("a", "3").unwrap();
        s.select("a").unwrap();
        assert_eq!(s.quantity("a"), Some(3));
        assert_eq!(s.total_selected_count(), 1);
    }

    #[test]
    fn test_stale_id_rejected() {
        let mut s = state();
        assert_eq!(
            s.select("b"),
            Err(SelectionError::UnknownLineItem("b".into()))
        );
        assert!(s.is_empty());
        assert_eq!(s.total_selected_count(), 0);
    }

    #[test]
    fn test_exceeds_available_keeps_last_valid() {
        let mut s = state();
        s.select("a").unwrap();
        s.set_quantity("a", "5").unwrap();
        assert_eq!(s.total_refund(), d("5000"));

        let err = s.set_quantity("a", "6").unwrap_err();
        assert!(err.to_string().contains('5'));
        assert_eq!(
            s.line_error("a"),
            Some(&QuantityIssue::ExceedsAvailable { requested: 6, max: 5 })
        );
        assert_eq!(s.total_refund(), d("5000"));
        assert!(s.has_errors());
        assert!(s.is_selected("a"));
    }

    #[test]
    fn test_invalid_inputs_recorded() {
        let mut s = state();
        s.select("a").unwrap();
        for bad in ["", "abc", "0", "-2", "1.5"] {
            assert!(matches!(
                s.set_quantity("a", bad),
                Err(SelectionError::InvalidQuantity { .. })
            ));
            assert!(matches!(s.line_error("a"), Some(QuantityIssue::Invalid { .. })));
            assert_eq!(s.quantity("a"), Some(1));
        }
        s.set_quantity("a", " 2 ").unwrap();
        assert_eq!(s.line_error("a"), None);
        assert_eq!(s.quantity("a"), Some(2));
        assert!(!s.has_errors());
    }

    #[test]
    fn test_huge_input_is_exceeds_available() {
        let mut s = state();
        s.select("a").unwrap();
        assert!(matches!(
            s.set_quantity("a", "99999999999"),
            Err(SelectionError::ExceedsAvailable { max: 5, .. })
        ));
    }

    #[test]
    fn test_set_quantity_on_unselected_line() {
        let mut s = state();
        assert_eq!(
            s.set_quantity("a", "2"),
            Err(SelectionError::NotSelected("a".into()))
        );
        assert_eq!(
            s.set_quantity("zz", "2"),
            Err(SelectionError::NotSelected("zz".into()))
        );
    }

    #[test]
    fn test_quantity_bound_holds_after_edits() {
        let mut s = state();
        s.select("a").unwrap();
        s.select("c").unwrap();
        let edits = [("a", "4"), ("c", "9"), ("a", "x"), ("c", "3"), ("a", "5"), ("c", "0")];
        for (id, value) in edits {
            let _ = s.set_quantity(id, value);
            for line in s.lines() {
                if line.issue.is_none() {
                    assert!(line.quantity > 0);
                    assert!(line.quantity <= line.item.quantity_returnable);
                }
            }
        }
    }

    #[test]
    fn test_refund_additivity() {
        let mut s = state();
        s.select("a").unwrap();
        s.select("c").unwrap();
        s.set_quantity("a", "2").unwrap();
        s.set_quantity("c", "3").unwrap();
        let expected: Decimal = s
            .lines()
            .iter()
            .map(|l| l.item.unit_price * Decimal::from(l.quantity))
            .sum();
        assert_eq!(s.total_refund(), expected);
        assert_eq!(s.total_refund(), d("2099.99"));

        let before = s.total_refund();
        s.deselect("c");
        assert!(s.total_refund() < before);
        assert_eq!(s.total_refund(), d("2000"));
    }

    #[test]
    fn test_totals_past_u32_range() {
        let big = |id: &str| SoldLineItem {
            quantity_sold: 3_000_000_000,
            ..item(id, 3_000_000_000, "1")
        };
        let mut s =
            ReturnSelectionState::new(CandidateSet::new("TX-001", vec![big("a"), big("b")]));
        s.select_all();
        s.set_quantity("a", "3000000000").unwrap();
        s.set_quantity("b", "3000000000").unwrap();

        assert_eq!(s.total_quantity(), 6_000_000_000);
        assert_eq!(s.total_refund(), d("6000000000"));
        assert_eq!(s.average_refund_per_unit(), d("1"));
    }

    #[test]
    fn test_average_is_zero_without_quantity() {
        let s = state();
        assert_eq!(s.total_quantity(), 0);
        assert_eq!(s.average_refund_per_unit(), Decimal::ZERO);
    }

    #[test]
    fn test_average_rounded() {
        let mut s = state();
        s.select("a").unwrap();
        s.select("c").unwrap();
        // (1000 + 33.33) / 2 = 516.665 -> 516.67
        assert_eq!(s.average_refund_per_unit(), d("516.67"));
    }

    #[test]
    fn test_deselect_absent_is_noop() {
        let mut s = state();
        s.select("a").unwrap();
        s.deselect("zz");
        s.deselect("c");
        assert_eq!(s.total_selected_count(), 1);
        s.deselect("a");
        s.deselect("a");
        assert!(s.is_empty());
    }

    #[test]
    fn test_select_all_and_clear_keep_order() {
        let mut s = state();
        s.select("c").unwrap();
        assert_eq!(s.select_all(), 1);
        let ids: Vec<&str> = s.lines().iter().map(|l| l.item.id.as_str()).collect();
        assert_eq!(ids, ["c", "a"]);
        assert_eq!(s.select_all(), 0);
        s.clear();
        assert!(s.is_empty());
    }

    #[test]
    fn test_replace_candidates_drops_and_flags() {
        let mut s = state();
        s.select("a").unwrap();
        s.select("c").unwrap();
        s.set_quantity("a", "4").unwrap();

        let dropped = s.replace_candidates(CandidateSet::new(
            "TX-001",
            vec![item("a", 2, "1000")],
        ));
        assert_eq!(dropped, vec!["c".to_string()]);
        assert_eq!(
            s.line_error("a"),
            Some(&QuantityIssue::ExceedsAvailable { requested: 4, max: 2 })
        );
        assert_eq!(s.quantity("a"), Some(4));

        s.set_quantity("a", "2").unwrap();
        assert!(!s.has_errors());
    }

    #[test]
    fn test_replace_candidates_clears_previous_error_when_room_returns() {
        let mut s = state();
        s.select("a").unwrap();
        s.set_quantity("a", "5").unwrap();
        let _ = s.set_quantity("a", "7");
        s.replace_candidates(CandidateSet::new("TX-001", vec![item("a", 8, "1000")]));
        assert_eq!(s.line_error("a"), None);
        assert_eq!(s.quantity("a"), Some(7));
    }

    #[test]
    fn test_replace_candidates_other_transaction_clears() {
        let mut s = state();
        s.select("a").unwrap();
        let dropped = s.replace_candidates(CandidateSet::new("TX-002", vec![item("a", 5, "1")]));
        assert_eq!(dropped, vec!["a".to_string()]);
        assert!(s.is_empty());
        assert_eq!(s.transaction_id(), "TX-002");
    }
}
