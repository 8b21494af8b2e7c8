//! Finalized order models
//!
//! Read-only input of the print engine, produced by the ordering flow.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

fn default_quantity() -> u32 {
    1
}

/// Order header
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub business_id: i64,
    pub table_number: Option<String>,
    pub notes: Option<String>,
    /// Cash payment still to be collected
    #[serde(default)]
    pub cash_pending: bool,
    #[serde(default)]
    pub total: Decimal,
    /// Creation time (Unix millis)
    pub created_at: i64,
}

/// Paid extra attached to a line item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderExtra {
    pub name: String,
    pub price: Decimal,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

impl OrderExtra {
    /// `price * quantity`, `None` when it does not fit a `Decimal`
    pub fn amount(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.quantity))
    }
}

/// Order line item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: String,
    pub product_id: Option<String>,
    #[serde(default)]
    pub name: String,
    pub category_id: Option<i64>,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    pub unit_price: Decimal,
    #[serde(default)]
    pub extras: Vec<OrderExtra>,
    #[serde(default)]
    pub modifications: Vec<String>,
    pub notes: Option<String>,
    /// Total as computed by the ordering flow (informational)
    pub line_total: Option<Decimal>,
}

impl OrderItem {
    /// `quantity * unit_price + sum(extra.price * extra.quantity)`
    ///
    /// `None` on overflow.
    pub fn computed_total(&self) -> Option<Decimal> {
        let base = self.unit_price.checked_mul(Decimal::from(self.quantity))?;
        self.extras
            .iter()
            .try_fold(base, |acc, e| acc.checked_add(e.amount()?))
    }
}

/// Order together with its items, as handed over at finalize time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalizedOrder {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

impl FinalizedOrder {
    /// First item whose amounts cannot be represented
    ///
    /// Line totals are also accumulated in absolute value, so any subset of
    /// the items (one zone ticket) has a representable total.
    pub fn first_out_of_range_item(&self) -> Option<&OrderItem> {
        let mut gross = Decimal::ZERO;
        for item in &self.items {
            match item
                .computed_total()
                .and_then(|total| gross.checked_add(total.abs()))
            {
                Some(sum) => gross = sum,
                None => return Some(item),
            }
        }
        None
    }
}
