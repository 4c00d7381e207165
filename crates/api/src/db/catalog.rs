//! Database operations for catalog items.

use rust_decimal::Decimal;
use sqlx::PgPool;

use norkys_core::ItemId;

use super::RepositoryError;
use crate::models::CatalogItem;

#[derive(Debug, sqlx::FromRow)]
struct CatalogItemRow {
    id: i32,
    name: String,
    price: Decimal,
    cost_basis: Decimal,
}

impl From<CatalogItemRow> for CatalogItem {
    fn from(row: CatalogItemRow) -> Self {
        Self {
            id: ItemId::new(row.id),
            name: row.name,
            price: row.price,
            cost_basis: row.cost_basis,
        }
    }
}

/// Repository for catalog reads.
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an item with its current price and cost basis.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ItemId) -> Result<Option<CatalogItem>, RepositoryError> {
        let row = sqlx::query_as::<_, CatalogItemRow>(
            "SELECT id, name, price, cost_basis FROM norkys.catalog_item WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(CatalogItem::from))
    }
}
