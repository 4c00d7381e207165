//! Dashboard rows and views.
//!
//! `*Row` types are what the sales store returns for a time range; the other
//! types are the derived views served to the operator dashboard.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use norkys_core::{CartId, ItemId, PaymentMethod};

/// Per-cart figures the analytics engine aggregates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartTotalRow {
    pub cart_id: CartId,
    pub created_at: DateTime<Utc>,
    pub total: Decimal,
    pub payment_method: Option<PaymentMethod>,
    pub is_guest: bool,
}

/// One cart line joined with its cart timestamp and the item's cost basis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSaleRow {
    pub cart_id: CartId,
    pub created_at: DateTime<Utc>,
    pub item_id: ItemId,
    pub item_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub cost_basis: Decimal,
}

impl LineSaleRow {
    /// `quantity × unit_price`.
    #[must_use]
    pub fn revenue(&self) -> Decimal {
        Decimal::from(self.quantity) * self.unit_price
    }

    /// `quantity × (unit_price − cost_basis)`.
    #[must_use]
    pub fn profit(&self) -> Decimal {
        Decimal::from(self.quantity) * (self.unit_price - self.cost_basis)
    }
}

/// One bar of the daily sales chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySales {
    pub day: NaiveDate,
    pub total: Decimal,
    pub orders: u32,
}

/// One slice of the payment method pie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethodShare {
    pub method: String,
    pub orders: u32,
    pub total: Decimal,
}

/// A product row in a top-N ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRanking {
    pub item_id: ItemId,
    pub item_name: String,
    pub quantity: i64,
    pub revenue: Decimal,
    pub profit: Decimal,
}

/// Scalar figures for the dashboard header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KpiSummary {
    pub days: u32,
    pub total_revenue: Decimal,
    pub order_count: u32,
    pub average_order_value: Decimal,
    pub units_sold: i64,
    pub gross_profit: Decimal,
    pub guest_order_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_line_profit_uses_captured_price() {
        let row = LineSaleRow {
            cart_id: CartId::new(1),
            created_at: Utc.with_ymd_and_hms(2026, 10, 1, 18, 0, 0).single().unwrap_or_default(),
            item_id: ItemId::new(2),
            item_name: "Chicha morada 1L".to_owned(),
            quantity: 4,
            unit_price: Decimal::new(900, 2),
            cost_basis: Decimal::new(350, 2),
        };
        assert_eq!(row.revenue(), Decimal::new(3600, 2));
        assert_eq!(row.profit(), Decimal::new(2200, 2));
    }
}
