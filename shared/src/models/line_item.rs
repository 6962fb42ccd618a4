//! Sold line item model
//!
//! The backend sends [`LineItemRecord`]s with loosely populated optional
//! fields. They are converted once, at the boundary, into [`SoldLineItem`]
//! so downstream logic never re-checks field presence.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::money;

/// Line item as returned by `GET /api/transactions/{id}/line-items`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItemRecord {
    pub id: String,
    pub transaction_id: String,
    pub quantity_sold: u32,
    pub quantity_returnable: u32,
    /// Lump price recorded for the whole line
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub sold_price: Option<Decimal>,
    /// Per-unit price recorded at sale time
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub unit_price: Option<Decimal>,
    /// Stocked item reference (None = external/untracked item)
    #[serde(default)]
    pub stock_item_id: Option<String>,
    #[serde(default)]
    pub item_name: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub client_email: Option<String>,
    #[serde(default)]
    pub client_phone: Option<String>,
}

/// Client contact fields copied from the transaction (display only)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientContact {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Validated sold line item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SoldLineItem {
    pub id: String,
    pub transaction_id: String,
    /// Original quantity sold (>= 1)
    pub quantity_sold: u32,
    /// Quantity still eligible for return (<= quantity_sold)
    pub quantity_returnable: u32,
    /// Unit price, already rounded to 2 decimal places
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    pub stock_item_id: Option<String>,
    pub item_name: Option<String>,
    pub sku: Option<String>,
    #[serde(default)]
    pub client: ClientContact,
}

impl SoldLineItem {
    /// A candidate can be returned: something left to return and linked to inventory
    pub fn is_candidate(&self) -> bool {
        self.quantity_returnable > 0 && self.stock_item_id.is_some()
    }

    /// Name shown on screens and credit notes
    pub fn display_name(&self) -> &str {
        self.item_name.as_deref().unwrap_or("Unnamed item")
    }

    /// Refund owed for `quantity` units of this line
    pub fn refund_for(&self, quantity: u32) -> Decimal {
        money::line_refund(self.unit_price, quantity)
    }
}

/// A backend record that cannot be turned into a [`SoldLineItem`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineItemError {
    #[error("line item {id}: quantity sold must be at least 1")]
    ZeroQuantitySold { id: String },

    #[error("line item {id}: returnable quantity {returnable} exceeds sold quantity {sold}")]
    ReturnableExceedsSold { id: String, returnable: u32, sold: u32 },

    #[error("line item {id}: no sold price or unit price recorded")]
    MissingPrice { id: String },

    #[error("line item {id}: price must not be negative")]
    NegativePrice { id: String },
}

impl TryFrom<LineItemRecord> for SoldLineItem {
    type Error = LineItemError;

    fn try_from(record: LineItemRecord) -> Result<Self, Self::Error> {
        if record.quantity_sold == 0 {
            return Err(LineItemError::ZeroQuantitySold { id: record.id });
        }
        if record.quantity_returnable > record.quantity_sold {
            return Err(LineItemError::ReturnableExceedsSold {
                id: record.id,
                returnable: record.quantity_returnable,
                sold: record.quantity_sold,
            });
        }

        // A lump sold price wins over the recorded per-unit price.
        let unit_price = match (record.sold_price, record.unit_price) {
            (Some(lump), _) => money::unit_price_from_lump(lump, record.quantity_sold),
            (None, Some(unit)) => Some(money::round_money(unit)),
            (None, None) => None,
        };
        let Some(unit_price) = unit_price else {
            return Err(LineItemError::MissingPrice { id: record.id });
        };
        if unit_price < Decimal::ZERO {
            return Err(LineItemError::NegativePrice { id: record.id });
        }

        Ok(Self {
            id: record.id,
            transaction_id: record.transaction_id,
            quantity_sold: record.quantity_sold,
            quantity_returnable: record.quantity_returnable,
            unit_price,
            stock_item_id: record.stock_item_id,
            item_name: record.item_name,
            sku: record.sku,
            client: ClientContact {
                name: record.client_name,
                email: record.client_email,
                phone: record.client_phone,
            },
        })
    }
}
