//! Read-only range queries feeding the analytics engine.
//!
//! Aggregation happens in the service layer so the Postgres and in-memory
//! stores share one implementation of every dashboard view. These queries
//! only select the raw rows for a time range.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use norkys_core::{CartId, ItemId, PaymentMethod};

use super::RepositoryError;
use crate::models::{CartTotalRow, LineSaleRow};

#[derive(Debug, sqlx::FromRow)]
struct CartTotalDbRow {
    id: i32,
    created_at: DateTime<Utc>,
    total: Decimal,
    payment_method: Option<String>,
    is_guest: bool,
}

impl From<CartTotalDbRow> for CartTotalRow {
    fn from(row: CartTotalDbRow) -> Self {
        Self {
            cart_id: CartId::new(row.id),
            created_at: row.created_at,
            total: row.total,
            payment_method: row.payment_method.as_deref().and_then(PaymentMethod::parse),
            is_guest: row.is_guest,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct LineSaleDbRow {
    cart_id: i32,
    created_at: DateTime<Utc>,
    item_id: i32,
    item_name: String,
    quantity: i32,
    unit_price: Decimal,
    cost_basis: Decimal,
}

impl From<LineSaleDbRow> for LineSaleRow {
    fn from(row: LineSaleDbRow) -> Self {
        Self {
            cart_id: CartId::new(row.cart_id),
            created_at: row.created_at,
            item_id: ItemId::new(row.item_id),
            item_name: row.item_name,
            quantity: row.quantity,
            unit_price: row.unit_price,
            cost_basis: row.cost_basis,
        }
    }
}

/// Repository for analytics reads.
pub struct SalesRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SalesRepository<'a> {
    /// Create a new sales repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Per-cart totals for carts created in `[from, to)`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn cart_totals_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<CartTotalRow>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartTotalDbRow>(
            r"
            SELECT id, created_at, total, payment_method, (user_id IS NULL) AS is_guest
            FROM norkys.cart
            WHERE created_at >= $1 AND created_at < $2
            ORDER BY created_at
            ",
        )
        .bind(from)
        .bind(to)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(CartTotalRow::from).collect())
    }

    /// Cart lines joined with their cart timestamp and the item's current cost
    /// basis, for carts created in `[from, to)`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn line_sales_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<LineSaleRow>, RepositoryError> {
        let rows = sqlx::query_as::<_, LineSaleDbRow>(
            r"
            SELECT l.cart_id, c.created_at, l.item_id, i.name AS item_name,
                   l.quantity, l.unit_price, i.cost_basis
            FROM norkys.cart_line l
            JOIN norkys.cart c ON c.id = l.cart_id
            JOIN norkys.catalog_item i ON i.id = l.item_id
            WHERE c.created_at >= $1 AND c.created_at < $2
            ORDER BY c.created_at, l.id
            ",
        )
        .bind(from)
        .bind(to)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(LineSaleRow::from).collect())
    }

    /// Every cart that has a payment method recorded.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn payment_method_rows(&self) -> Result<Vec<CartTotalRow>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartTotalDbRow>(
            r"
            SELECT id, created_at, total, payment_method, (user_id IS NULL) AS is_guest
            FROM norkys.cart
            WHERE payment_method IS NOT NULL
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(CartTotalRow::from).collect())
    }

    /// The most recent `limit` calendar days with at least one cart, newest
    /// first. Days are computed in the reporting zone `offset_secs` east of UTC.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn recent_order_days(
        &self,
        limit: u32,
        offset_secs: i32,
    ) -> Result<Vec<NaiveDate>, RepositoryError> {
        let days: Vec<NaiveDate> = sqlx::query_scalar(
            r"
            SELECT DISTINCT ((created_at AT TIME ZONE 'UTC') + make_interval(secs => $2))::date AS day
            FROM norkys.cart
            ORDER BY day DESC
            LIMIT $1
            ",
        )
        .bind(i64::from(limit))
        .bind(f64::from(offset_secs))
        .fetch_all(self.pool)
        .await?;

        Ok(days)
    }
}
