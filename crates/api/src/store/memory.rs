//! Process-local implementation of the collaborator contracts.
//!
//! Backs the integration tests and `NORKYS_STORE=memory` dev mode. All state
//! sits behind one `tokio::sync::RwLock`, so a cart header and its lines are
//! written inside a single critical section.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use norkys_core::{
    AddressId, CartId, CartLineId, CartStatus, GeoPoint, ItemId, PaymentMethod, UserId,
    WishlistEntryId,
};

use super::{
    AddressStore, CartStore, CatalogLookup, IdentityLookup, SalesStore, WishlistStore, demo,
};
use crate::db::RepositoryError;
use crate::models::{
    Address, Cart, CartLine, CartTotalRow, CatalogItem, LineSaleRow, NewCart, UserSummary,
    WishlistEntry,
};

#[derive(Debug, Default)]
struct MemoryState {
    users: BTreeMap<UserId, UserSummary>,
    items: BTreeMap<ItemId, CatalogItem>,
    addresses: BTreeMap<AddressId, Address>,
    carts: BTreeMap<CartId, Cart>,
    lines: BTreeMap<CartId, Vec<CartLine>>,
    wishlist: BTreeMap<WishlistEntryId, WishlistEntry>,
    last_cart_id: i32,
    last_line_id: i32,
    last_wishlist_id: i32,
}

impl MemoryState {
    fn next_cart_id(&mut self) -> CartId {
        self.last_cart_id += 1;
        CartId::new(self.last_cart_id)
    }

    fn next_line_id(&mut self) -> CartLineId {
        self.last_line_id += 1;
        CartLineId::new(self.last_line_id)
    }

    fn next_wishlist_id(&mut self) -> WishlistEntryId {
        self.last_wishlist_id += 1;
        WishlistEntryId::new(self.last_wishlist_id)
    }

    fn insert_cart(&mut self, cart: &NewCart, created_at: DateTime<Utc>) -> CartId {
        let id = self.next_cart_id();
        self.carts.insert(
            id,
            Cart {
                id,
                owner: cart.owner.clone(),
                delivery: cart.delivery.clone(),
                address_id: None,
                status: CartStatus::Pending,
                payment_method: None,
                total: cart.total(),
                created_at,
            },
        );
        id
    }

    fn insert_lines(&mut self, id: CartId, cart: &NewCart) -> Result<(), RepositoryError> {
        let mut lines = Vec::with_capacity(cart.lines.len());
        for line in &cart.lines {
            let Some(item) = self.items.get(&line.item_id) else {
                return Err(RepositoryError::Conflict(format!(
                    "catalog item {} no longer exists",
                    line.item_id
                )));
            };
            let item_name = item.name.clone();
            lines.push(CartLine {
                id: self.next_line_id(),
                cart_id: id,
                item_id: line.item_id,
                item_name,
                quantity: line.quantity,
                unit_price: line.unit_price,
            });
        }
        self.lines.insert(id, lines);
        Ok(())
    }

    fn carts_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> impl Iterator<Item = &Cart> {
        self.carts
            .values()
            .filter(move |cart| cart.created_at >= from && cart.created_at < to)
    }
}

fn total_row(cart: &Cart) -> CartTotalRow {
    CartTotalRow {
        cart_id: cart.id,
        created_at: cart.created_at,
        total: cart.total,
        payment_method: cart.payment_method.clone(),
        is_guest: cart.owner.is_guest(),
    }
}

fn newest_first(carts: &mut [Cart]) {
    carts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

/// In-memory store with test fixtures.
#[derive(Debug)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
    reserved_admin: UserId,
    fail_after_header: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new(reserved_admin: UserId) -> Self {
        Self {
            state: RwLock::new(MemoryState::default()),
            reserved_admin,
            fail_after_header: AtomicBool::new(false),
        }
    }

    /// Make the next cart creations fail after the header is staged.
    ///
    /// The staged header is rolled back, exercising the all-or-nothing path.
    pub fn fail_after_header(&self, fail: bool) {
        self.fail_after_header.store(fail, Ordering::SeqCst);
    }

    /// Add or replace a user.
    pub async fn insert_user(&self, id: UserId, display_name: &str) {
        self.state.write().await.users.insert(
            id,
            UserSummary {
                id,
                display_name: display_name.to_owned(),
                created_at: Utc::now(),
            },
        );
    }

    /// Add or replace a catalog item.
    pub async fn insert_item(&self, id: ItemId, name: &str, price: Decimal, cost_basis: Decimal) {
        self.state.write().await.items.insert(
            id,
            CatalogItem {
                id,
                name: name.to_owned(),
                price,
                cost_basis,
            },
        );
    }

    /// Add or replace a saved address.
    pub async fn insert_address(&self, address: Address) {
        self.state
            .write()
            .await
            .addresses
            .insert(address.id, address);
    }

    /// Persist a cart with a chosen timestamp, status and payment method.
    ///
    /// Used to backdate carts for analytics fixtures.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a line references an unknown item.
    pub async fn insert_cart_at(
        &self,
        cart: &NewCart,
        created_at: DateTime<Utc>,
        status: CartStatus,
        payment_method: Option<PaymentMethod>,
    ) -> Result<CartId, RepositoryError> {
        let mut state = self.state.write().await;
        let id = state.insert_cart(cart, created_at);
        if let Err(e) = state.insert_lines(id, cart) {
            state.carts.remove(&id);
            return Err(e);
        }
        if let Some(stored) = state.carts.get_mut(&id) {
            stored.status = status;
            stored.payment_method = payment_method;
        }
        Ok(id)
    }

    /// Number of stored carts.
    pub async fn cart_count(&self) -> usize {
        self.state.read().await.carts.len()
    }

    /// Number of stored cart lines across all carts.
    pub async fn line_count(&self) -> usize {
        self.state.read().await.lines.values().map(Vec::len).sum()
    }

    /// Fill the store with the demo data set used for local runs.
    pub async fn seed_demo(&self) {
        self.insert_user(self.reserved_admin, "Administrator").await;
        for user in &demo::USERS {
            self.insert_user(UserId::new(user.id), user.display_name).await;
        }
        for item in &demo::ITEMS {
            self.insert_item(ItemId::new(item.id), item.name, item.price(), item.cost_basis())
                .await;
        }
        for address in &demo::ADDRESSES {
            self.insert_address(Address {
                id: AddressId::new(address.id),
                user_id: UserId::new(address.user_id),
                title: address.title.to_owned(),
                address: address.address.to_owned(),
                reference: address.reference.map(str::to_owned),
                phone_primary: address.phone_primary.to_owned(),
                phone_secondary: address.phone_secondary.map(str::to_owned),
                location: GeoPoint::from_parts(address.latitude, address.longitude),
            })
            .await;
        }
    }
}

#[async_trait]
impl IdentityLookup for MemoryStore {
    async fn resolve_user(&self, id: UserId) -> Result<Option<UserSummary>, RepositoryError> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    fn is_reserved_admin(&self, id: UserId) -> bool {
        id == self.reserved_admin
    }
}

#[async_trait]
impl CatalogLookup for MemoryStore {
    async fn resolve_item(&self, id: ItemId) -> Result<Option<CatalogItem>, RepositoryError> {
        Ok(self.state.read().await.items.get(&id).cloned())
    }
}

#[async_trait]
impl AddressStore for MemoryStore {
    async fn resolve_address(&self, id: AddressId) -> Result<Option<Address>, RepositoryError> {
        Ok(self.state.read().await.addresses.get(&id).cloned())
    }

    async fn belongs_to(&self, id: AddressId, user_id: UserId) -> Result<bool, RepositoryError> {
        Ok(self
            .state
            .read()
            .await
            .addresses
            .get(&id)
            .is_some_and(|address| address.user_id == user_id))
    }
}

#[async_trait]
impl CartStore for MemoryStore {
    async fn create_cart_atomic(&self, cart: &NewCart) -> Result<CartId, RepositoryError> {
        let mut state = self.state.write().await;
        let id = state.insert_cart(cart, Utc::now());

        if self.fail_after_header.load(Ordering::SeqCst) {
            state.carts.remove(&id);
            return Err(RepositoryError::Unavailable(
                "injected failure after cart header".to_owned(),
            ));
        }

        if let Err(e) = state.insert_lines(id, cart) {
            state.carts.remove(&id);
            return Err(e);
        }

        Ok(id)
    }

    async fn get_cart(&self, id: CartId) -> Result<Option<Cart>, RepositoryError> {
        Ok(self.state.read().await.carts.get(&id).cloned())
    }

    async fn list_by_owner(&self, user_id: UserId) -> Result<Vec<Cart>, RepositoryError> {
        let state = self.state.read().await;
        let mut carts: Vec<Cart> = state
            .carts
            .values()
            .filter(|cart| cart.owner.user_id() == Some(user_id))
            .cloned()
            .collect();
        newest_first(&mut carts);
        Ok(carts)
    }

    async fn list_by_status(&self, status: CartStatus) -> Result<Vec<Cart>, RepositoryError> {
        let state = self.state.read().await;
        let mut carts: Vec<Cart> = state
            .carts
            .values()
            .filter(|cart| cart.status == status)
            .cloned()
            .collect();
        newest_first(&mut carts);
        Ok(carts)
    }

    async fn update_status(
        &self,
        id: CartId,
        status: CartStatus,
        expected: Option<CartStatus>,
    ) -> Result<bool, RepositoryError> {
        let mut state = self.state.write().await;
        match state.carts.get_mut(&id) {
            Some(cart) if expected.is_none_or(|e| e == cart.status) => {
                cart.status = status;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn update_payment_method(
        &self,
        id: CartId,
        method: &PaymentMethod,
    ) -> Result<bool, RepositoryError> {
        let mut state = self.state.write().await;
        let Some(cart) = state.carts.get_mut(&id) else {
            return Ok(false);
        };
        cart.payment_method = Some(method.clone());
        Ok(true)
    }

    async fn bind_address(&self, id: CartId, address: &Address) -> Result<bool, RepositoryError> {
        let mut state = self.state.write().await;
        match state.carts.get_mut(&id) {
            Some(cart) if cart.owner.user_id() == Some(address.user_id) => {
                cart.address_id = Some(address.id);
                cart.delivery = address.delivery_info();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_cart(&self, id: CartId) -> Result<bool, RepositoryError> {
        let mut state = self.state.write().await;
        state.lines.remove(&id);
        Ok(state.carts.remove(&id).is_some())
    }

    async fn get_lines(&self, id: CartId) -> Result<Vec<CartLine>, RepositoryError> {
        Ok(self
            .state
            .read()
            .await
            .lines
            .get(&id)
            .cloned()
            .unwrap_or_default())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[async_trait]
impl SalesStore for MemoryStore {
    async fn cart_totals_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<CartTotalRow>, RepositoryError> {
        let state = self.state.read().await;
        let mut rows: Vec<CartTotalRow> = state.carts_between(from, to).map(total_row).collect();
        rows.sort_by_key(|row| row.created_at);
        Ok(rows)
    }

    async fn line_sales_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<LineSaleRow>, RepositoryError> {
        let state = self.state.read().await;
        let mut rows = Vec::new();
        for cart in state.carts_between(from, to) {
            for line in state.lines.get(&cart.id).into_iter().flatten() {
                let cost_basis = state
                    .items
                    .get(&line.item_id)
                    .map_or(Decimal::ZERO, |item| item.cost_basis);
                rows.push(LineSaleRow {
                    cart_id: cart.id,
                    created_at: cart.created_at,
                    item_id: line.item_id,
                    item_name: line.item_name.clone(),
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    cost_basis,
                });
            }
        }
        rows.sort_by_key(|row| row.created_at);
        Ok(rows)
    }

    async fn payment_method_rows(&self) -> Result<Vec<CartTotalRow>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .carts
            .values()
            .filter(|cart| cart.payment_method.is_some())
            .map(total_row)
            .collect())
    }

    async fn recent_order_days(
        &self,
        limit: u32,
        offset_secs: i32,
    ) -> Result<Vec<NaiveDate>, RepositoryError> {
        let state = self.state.read().await;
        let offset = Duration::seconds(i64::from(offset_secs));
        let days: BTreeSet<NaiveDate> = state
            .carts
            .values()
            .map(|cart| (cart.created_at + offset).date_naive())
            .collect();
        Ok(days
            .into_iter()
            .rev()
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .collect())
    }
}

#[async_trait]
impl WishlistStore for MemoryStore {
    async fn add(
        &self,
        user_id: UserId,
        item_id: ItemId,
    ) -> Result<Option<WishlistEntry>, RepositoryError> {
        let mut state = self.state.write().await;
        if state
            .wishlist
            .values()
            .any(|entry| entry.user_id == user_id && entry.item_id == item_id)
        {
            return Ok(None);
        }
        let entry = WishlistEntry {
            id: state.next_wishlist_id(),
            user_id,
            item_id,
            created_at: Utc::now(),
        };
        state.wishlist.insert(entry.id, entry.clone());
        Ok(Some(entry))
    }

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<WishlistEntry>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .wishlist
            .values()
            .rev()
            .filter(|entry| entry.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: WishlistEntryId) -> Result<bool, RepositoryError> {
        Ok(self.state.write().await.wishlist.remove(&id).is_some())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::NewCartLine;
    use norkys_core::{CartOwner, DeliveryInfo};

    fn registered_cart(user_id: i32, item_id: i32, quantity: i32) -> NewCart {
        NewCart {
            owner: CartOwner::Registered {
                user_id: UserId::new(user_id),
            },
            delivery: DeliveryInfo {
                title: "Casa".to_owned(),
                address: "Av. Arequipa 1234".to_owned(),
                reference: None,
                phone_primary: "987654321".to_owned(),
                phone_secondary: None,
                location: None,
            },
            lines: vec![NewCartLine {
                item_id: ItemId::new(item_id),
                quantity,
                unit_price: Decimal::new(900, 2),
            }],
        }
    }

    async fn store() -> MemoryStore {
        let store = MemoryStore::new(UserId::new(1));
        store.seed_demo().await;
        store
    }

    #[tokio::test]
    async fn test_create_persists_header_and_lines() {
        let store = store().await;
        let id = store
            .create_cart_atomic(&registered_cart(2, 7, 3))
            .await
            .unwrap();

        let cart = store.get_cart(id).await.unwrap().unwrap();
        assert_eq!(cart.status, CartStatus::Pending);
        assert_eq!(cart.total, Decimal::new(2700, 2));

        let lines = store.get_lines(id).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].item_name, "Chicha morada 1L");
    }

    #[tokio::test]
    async fn test_injected_failure_leaves_nothing_behind() {
        let store = store().await;
        store.fail_after_header(true);

        let result = store.create_cart_atomic(&registered_cart(2, 7, 1)).await;
        assert!(matches!(result, Err(RepositoryError::Unavailable(_))));
        assert_eq!(store.cart_count().await, 0);
        assert_eq!(store.line_count().await, 0);
    }

    #[tokio::test]
    async fn test_unknown_item_rolls_back_header() {
        let store = store().await;
        let result = store.create_cart_atomic(&registered_cart(2, 99, 1)).await;
        assert!(matches!(result, Err(RepositoryError::Conflict(_))));
        assert_eq!(store.cart_count().await, 0);
    }

    #[tokio::test]
    async fn test_status_compare_and_set() {
        let store = store().await;
        let id = store
            .create_cart_atomic(&registered_cart(2, 1, 1))
            .await
            .unwrap();

        let stale = store
            .update_status(id, CartStatus::InDelivery, Some(CartStatus::Confirmed))
            .await
            .unwrap();
        assert!(!stale);

        let applied = store
            .update_status(id, CartStatus::Confirmed, Some(CartStatus::Pending))
            .await
            .unwrap();
        assert!(applied);
    }

    #[tokio::test]
    async fn test_bind_address_requires_matching_owner() {
        let store = store().await;
        let id = store
            .create_cart_atomic(&registered_cart(2, 1, 1))
            .await
            .unwrap();
        let foreign = store
            .resolve_address(AddressId::new(2))
            .await
            .unwrap()
            .unwrap();
        assert!(!store.bind_address(id, &foreign).await.unwrap());

        let own = store
            .resolve_address(AddressId::new(1))
            .await
            .unwrap()
            .unwrap();
        assert!(store.bind_address(id, &own).await.unwrap());
        let cart = store.get_cart(id).await.unwrap().unwrap();
        assert_eq!(cart.address_id, Some(AddressId::new(1)));
        assert_eq!(cart.delivery.title, "Casa");
    }

    #[tokio::test]
    async fn test_recent_days_are_distinct_and_descending() {
        let store = store().await;
        let base = Utc::now() - Duration::days(10);
        for offset in [0, 0, 2, 5] {
            store
                .insert_cart_at(
                    &registered_cart(2, 1, 1),
                    base + Duration::days(offset),
                    CartStatus::Completed,
                    None,
                )
                .await
                .unwrap();
        }

        let days = store.recent_order_days(2, 0).await.unwrap();
        assert_eq!(days.len(), 2);
        assert!(days[0] > days[1]);
    }

    #[tokio::test]
    async fn test_wishlist_rejects_duplicate_pair() {
        let store = store().await;
        let first = store.add(UserId::new(2), ItemId::new(3)).await.unwrap();
        assert!(first.is_some());
        let second = store.add(UserId::new(2), ItemId::new(3)).await.unwrap();
        assert!(second.is_none());
    }
}
