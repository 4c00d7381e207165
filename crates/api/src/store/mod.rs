//! Collaborator contracts for the order services.
//!
//! Services never touch a database handle directly. They go through these
//! traits, which have two implementations:
//!
//! - [`PgStore`] - `PostgreSQL` via the repositories in [`crate::db`]
//! - [`MemoryStore`] - process-local state for tests and `NORKYS_STORE=memory`
//!
//! [`Stores`] bundles one handle per contract so the application state can
//! hold them as trait objects.

pub mod demo;
pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use norkys_core::{AddressId, CartId, CartStatus, ItemId, PaymentMethod, UserId, WishlistEntryId};

use crate::db::RepositoryError;
use crate::models::{
    Address, Cart, CartLine, CartTotalRow, CatalogItem, LineSaleRow, NewCart, UserSummary,
    WishlistEntry,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Resolves user accounts.
#[async_trait]
pub trait IdentityLookup: Send + Sync {
    /// Look up a user by id.
    async fn resolve_user(&self, id: UserId) -> Result<Option<UserSummary>, RepositoryError>;

    /// Whether `id` is the reserved administrator account.
    fn is_reserved_admin(&self, id: UserId) -> bool;
}

/// Resolves catalog items with their current price and cost basis.
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    async fn resolve_item(&self, id: ItemId) -> Result<Option<CatalogItem>, RepositoryError>;
}

/// Saved delivery addresses.
#[async_trait]
pub trait AddressStore: Send + Sync {
    async fn resolve_address(&self, id: AddressId) -> Result<Option<Address>, RepositoryError>;

    async fn belongs_to(&self, id: AddressId, user_id: UserId) -> Result<bool, RepositoryError>;
}

/// Durable cart storage.
///
/// Single-field updates return `false` when no row matched, which the
/// lifecycle manager reports as not found.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Persist a header and all lines, or nothing.
    async fn create_cart_atomic(&self, cart: &NewCart) -> Result<CartId, RepositoryError>;

    async fn get_cart(&self, id: CartId) -> Result<Option<Cart>, RepositoryError>;

    async fn list_by_owner(&self, user_id: UserId) -> Result<Vec<Cart>, RepositoryError>;

    async fn list_by_status(&self, status: CartStatus) -> Result<Vec<Cart>, RepositoryError>;

    /// Compare-and-set when `expected` is given, plain overwrite otherwise.
    async fn update_status(
        &self,
        id: CartId,
        status: CartStatus,
        expected: Option<CartStatus>,
    ) -> Result<bool, RepositoryError>;

    async fn update_payment_method(
        &self,
        id: CartId,
        method: &PaymentMethod,
    ) -> Result<bool, RepositoryError>;

    /// Bind only if the cart is owned by `address.user_id`.
    async fn bind_address(&self, id: CartId, address: &Address) -> Result<bool, RepositoryError>;

    async fn delete_cart(&self, id: CartId) -> Result<bool, RepositoryError>;

    async fn get_lines(&self, id: CartId) -> Result<Vec<CartLine>, RepositoryError>;

    /// Connectivity check for readiness probes.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Read-only range queries for the analytics engine.
#[async_trait]
pub trait SalesStore: Send + Sync {
    /// Carts created in `[from, to)`.
    async fn cart_totals_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<CartTotalRow>, RepositoryError>;

    /// Lines of carts created in `[from, to)`, with current cost basis.
    async fn line_sales_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<LineSaleRow>, RepositoryError>;

    /// Every cart with a payment method, regardless of age.
    async fn payment_method_rows(&self) -> Result<Vec<CartTotalRow>, RepositoryError>;

    /// Most recent `limit` days with at least one cart, newest first.
    async fn recent_order_days(
        &self,
        limit: u32,
        offset_secs: i32,
    ) -> Result<Vec<NaiveDate>, RepositoryError>;
}

/// Wishlist storage.
#[async_trait]
pub trait WishlistStore: Send + Sync {
    /// Returns `None` when the pair already exists.
    async fn add(
        &self,
        user_id: UserId,
        item_id: ItemId,
    ) -> Result<Option<WishlistEntry>, RepositoryError>;

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<WishlistEntry>, RepositoryError>;

    async fn delete(&self, id: WishlistEntryId) -> Result<bool, RepositoryError>;
}

/// One handle per collaborator contract.
#[derive(Clone)]
pub struct Stores {
    pub identity: Arc<dyn IdentityLookup>,
    pub catalog: Arc<dyn CatalogLookup>,
    pub addresses: Arc<dyn AddressStore>,
    pub carts: Arc<dyn CartStore>,
    pub sales: Arc<dyn SalesStore>,
    pub wishlist: Arc<dyn WishlistStore>,
}

impl Stores {
    /// Back every contract with one `PostgreSQL` pool.
    #[must_use]
    pub fn postgres(pool: sqlx::PgPool, reserved_admin: UserId) -> Self {
        Self::shared(Arc::new(PgStore::new(pool, reserved_admin)))
    }

    /// Back every contract with one in-memory store.
    #[must_use]
    pub fn memory(store: Arc<MemoryStore>) -> Self {
        Self::shared(store)
    }

    fn shared<S>(store: Arc<S>) -> Self
    where
        S: IdentityLookup
            + CatalogLookup
            + AddressStore
            + CartStore
            + SalesStore
            + WishlistStore
            + 'static,
    {
        Self {
            identity: store.clone(),
            catalog: store.clone(),
            addresses: store.clone(),
            carts: store.clone(),
            sales: store.clone(),
            wishlist: store,
        }
    }
}
