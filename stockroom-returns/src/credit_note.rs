//! Credit note loading, printable text and JSON export

use std::fmt;
use std::sync::Arc;

use shared::CreditNoteRecord;
use shared::money::format_money;
use stockroom_client::ReturnsApi;

use crate::error::LoadError;

/// 80mm receipt paper
pub const DEFAULT_LINE_WIDTH: usize = 48;

const MIN_LINE_WIDTH: usize = 24;

/// Plain-text receipt builder
struct TextBuilder {
    buf: String,
    width: usize,
}

impl TextBuilder {
    fn new(width: usize) -> Self {
        Self {
            buf: String::with_capacity(width * 24),
            width,
        }
    }

    fn line(&mut self, s: &str) -> &mut Self {
        self.buf.push_str(s.trim_end());
        self.buf.push('\n');
        self
    }

    fn center(&mut self, s: &str) -> &mut Self {
        let w = s.chars().count();
        if w >= self.width {
            return self.line(s);
        }
        let pad = (self.width - w) / 2;
        self.line(&format!("{}{}", " ".repeat(pad), s))
    }

    fn sep_double(&mut self) -> &mut Self {
        self.line(&"=".repeat(self.width))
    }

    fn sep_single(&mut self) -> &mut Self {
        self.line(&"-".repeat(self.width))
    }

    /// Left and right text on one line, right text flush with the edge
    fn line_lr(&mut self, left: &str, right: &str) -> &mut Self {
        let lw = left.chars().count();
        let rw = right.chars().count();
        if lw + rw >= self.width {
            let indent = left.chars().take_while(|c| *c == ' ').count();
            self.wrapped(left, indent);
            if rw > self.width {
                return self.wrapped(right, 0);
            }
            let pad = self.width - rw;
            return self.line(&format!("{}{}", " ".repeat(pad), right));
        }
        self.line(&format!("{}{}{}", left, " ".repeat(self.width - lw - rw), right))
    }

    /// Word-wrap `s` to the line width, indenting every line by `indent`
    fn wrapped(&mut self, s: &str, indent: usize) -> &mut Self {
        let room = self.width.saturating_sub(indent).max(1);
        let prefix = " ".repeat(indent);
        let mut current = String::new();
        for word in s.split_whitespace() {
            let mut word = word.to_string();
            // Hard-split words longer than a whole line
            while word.chars().count() > room {
                if !current.is_empty() {
                    self.line(&format!("{prefix}{current}"));
                    current.clear();
                }
                let head: String = word.chars().take(room).collect();
                word = word.chars().skip(room).collect();
                self.line(&format!("{prefix}{head}"));
            }
            let needed = if current.is_empty() {
                word.chars().count()
            } else {
                current.chars().count() + 1 + word.chars().count()
            };
            if needed > room {
                self.line(&format!("{prefix}{current}"));
                current.clear();
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(&word);
        }
        if !current.is_empty() {
            self.line(&format!("{prefix}{current}"));
        }
        self
    }

    fn build(self) -> String {
        self.buf
    }
}

/// Loads finalized returns and renders them for print or export
#[derive(Clone)]
pub struct CreditNoteRenderer {
    api: Arc<dyn ReturnsApi>,
}

impl fmt::Debug for CreditNoteRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreditNoteRenderer").finish_non_exhaustive()
    }
}

impl CreditNoteRenderer {
    pub fn new(api: Arc<dyn ReturnsApi>) -> Self {
        Self { api }
    }

    pub async fn load(&self, credit_note_id: &str) -> Result<CreditNoteRecord, LoadError> {
        let credit_note_id = credit_note_id.trim();
        if credit_note_id.is_empty() {
            return Err(LoadError::EmptyIdentifier);
        }
        let record = self.api.credit_note(credit_note_id).await.inspect_err(|e| {
            tracing::warn!(credit_note_id = %credit_note_id, error = %e, "Credit note load failed");
        })?;
        tracing::debug!(
            credit_note_id = %record.credit_note_id,
            lines = record.items.len(),
            "Credit note loaded"
        );
        Ok(record)
    }

    /// Fixed-width printable credit note; widths below 24 are widened
    pub fn render_text(record: &CreditNoteRecord, width: usize) -> String {
        let width = width.max(MIN_LINE_WIDTH);
        let mut b = TextBuilder::new(width);

        b.sep_double().center("CREDIT NOTE").sep_double();
        b.line_lr("Credit note", &record.credit_note_id)
            .line_lr("Transaction", &record.transaction_id)
            .line_lr(
                "Date",
                &record.created_at.format("%Y-%m-%d %H:%M UTC").to_string(),
            );
        if let Some(operator) = &record.processed_by {
            b.line_lr("Processed by", operator);
        }
        let customer = record
            .items
            .iter()
            .find_map(|l| l.line_item.client.name.as_deref());
        if let Some(customer) = customer {
            b.line_lr("Customer", customer);
        }

        b.sep_single();
        for line in &record.items {
            let item = &line.line_item;
            b.wrapped(item.display_name(), 0);
            b.line_lr(
                &format!("  {} x {}", line.quantity, format_money(item.unit_price)),
                &format_money(line.refund),
            );
            if let Some(sku) = &item.sku {
                b.line(&format!("  SKU {sku}"));
            }
        }

        b.sep_single()
            .line_lr("Items returned", &record.total_quantity().to_string())
            .line_lr("REFUND TOTAL", &format_money(record.total_refund()))
            .sep_single()
            .line("Reason:")
            .wrapped(&record.reason, 2)
            .sep_double();
        b.build()
    }

    /// Pretty JSON export of the full record
    pub fn export_json(record: &CreditNoteRecord) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(record)
    }
}
