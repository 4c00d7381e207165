//! `PostgreSQL` implementation of the collaborator contracts.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use norkys_core::{AddressId, CartId, CartStatus, ItemId, PaymentMethod, UserId, WishlistEntryId};

use super::{AddressStore, CartStore, CatalogLookup, IdentityLookup, SalesStore, WishlistStore};
use crate::db::{
    AddressRepository, CartRepository, CatalogRepository, RepositoryError, SalesRepository,
    UserRepository, WishlistRepository,
};
use crate::models::{
    Address, Cart, CartLine, CartTotalRow, CatalogItem, LineSaleRow, NewCart, UserSummary,
    WishlistEntry,
};

/// Owns the pool and hands it to the borrowed repositories per call.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
    reserved_admin: UserId,
}

impl PgStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool, reserved_admin: UserId) -> Self {
        Self {
            pool,
            reserved_admin,
        }
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl IdentityLookup for PgStore {
    async fn resolve_user(&self, id: UserId) -> Result<Option<UserSummary>, RepositoryError> {
        UserRepository::new(&self.pool).get(id).await
    }

    fn is_reserved_admin(&self, id: UserId) -> bool {
        id == self.reserved_admin
    }
}

#[async_trait]
impl CatalogLookup for PgStore {
    async fn resolve_item(&self, id: ItemId) -> Result<Option<CatalogItem>, RepositoryError> {
        CatalogRepository::new(&self.pool).get(id).await
    }
}

#[async_trait]
impl AddressStore for PgStore {
    async fn resolve_address(&self, id: AddressId) -> Result<Option<Address>, RepositoryError> {
        AddressRepository::new(&self.pool).get(id).await
    }

    async fn belongs_to(&self, id: AddressId, user_id: UserId) -> Result<bool, RepositoryError> {
        AddressRepository::new(&self.pool)
            .belongs_to(id, user_id)
            .await
    }
}

#[async_trait]
impl CartStore for PgStore {
    async fn create_cart_atomic(&self, cart: &NewCart) -> Result<CartId, RepositoryError> {
        CartRepository::new(&self.pool).create(cart).await
    }

    async fn get_cart(&self, id: CartId) -> Result<Option<Cart>, RepositoryError> {
        CartRepository::new(&self.pool).get(id).await
    }

    async fn list_by_owner(&self, user_id: UserId) -> Result<Vec<Cart>, RepositoryError> {
        CartRepository::new(&self.pool).list_by_owner(user_id).await
    }

    async fn list_by_status(&self, status: CartStatus) -> Result<Vec<Cart>, RepositoryError> {
        CartRepository::new(&self.pool).list_by_status(status).await
    }

    async fn update_status(
        &self,
        id: CartId,
        status: CartStatus,
        expected: Option<CartStatus>,
    ) -> Result<bool, RepositoryError> {
        CartRepository::new(&self.pool)
            .update_status(id, status, expected)
            .await
    }

    async fn update_payment_method(
        &self,
        id: CartId,
        method: &PaymentMethod,
    ) -> Result<bool, RepositoryError> {
        CartRepository::new(&self.pool)
            .update_payment_method(id, method)
            .await
    }

    async fn bind_address(&self, id: CartId, address: &Address) -> Result<bool, RepositoryError> {
        CartRepository::new(&self.pool)
            .bind_address(id, address)
            .await
    }

    async fn delete_cart(&self, id: CartId) -> Result<bool, RepositoryError> {
        CartRepository::new(&self.pool).delete(id).await
    }

    async fn get_lines(&self, id: CartId) -> Result<Vec<CartLine>, RepositoryError> {
        CartRepository::new(&self.pool).lines(id).await
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        CartRepository::new(&self.pool).ping().await
    }
}

#[async_trait]
impl SalesStore for PgStore {
    async fn cart_totals_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<CartTotalRow>, RepositoryError> {
        SalesRepository::new(&self.pool)
            .cart_totals_between(from, to)
            .await
    }

    async fn line_sales_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<LineSaleRow>, RepositoryError> {
        SalesRepository::new(&self.pool)
            .line_sales_between(from, to)
            .await
    }

    async fn payment_method_rows(&self) -> Result<Vec<CartTotalRow>, RepositoryError> {
        SalesRepository::new(&self.pool).payment_method_rows().await
    }

    async fn recent_order_days(
        &self,
        limit: u32,
        offset_secs: i32,
    ) -> Result<Vec<NaiveDate>, RepositoryError> {
        SalesRepository::new(&self.pool)
            .recent_order_days(limit, offset_secs)
            .await
    }
}

#[async_trait]
impl WishlistStore for PgStore {
    async fn add(
        &self,
        user_id: UserId,
        item_id: ItemId,
    ) -> Result<Option<WishlistEntry>, RepositoryError> {
        WishlistRepository::new(&self.pool).add(user_id, item_id).await
    }

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<WishlistEntry>, RepositoryError> {
        WishlistRepository::new(&self.pool).list_by_user(user_id).await
    }

    async fn delete(&self, id: WishlistEntryId) -> Result<bool, RepositoryError> {
        WishlistRepository::new(&self.pool).delete(id).await
    }
}
