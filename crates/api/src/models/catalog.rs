//! Catalog item as seen by the order core.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use norkys_core::ItemId;

/// A sellable item resolved through the catalog lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: ItemId,
    pub name: String,
    /// Current list price, captured into cart lines.
    pub price: Decimal,
    /// Unit cost used for profit figures.
    pub cost_basis: Decimal,
}
