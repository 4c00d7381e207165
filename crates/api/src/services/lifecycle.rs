//! Cart lifecycle: creation, status transitions, payment method, address
//! binding, deletion and listings.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use norkys_core::{AddressId, CartId, CartStatus, PaymentMethod, StatusPolicy, UserId};

use super::error::{Missing, ServiceError, ValidationError};
use super::validator::CartValidator;
use crate::models::{Cart, CartDetail, CreateCartInput};
use crate::store::{AddressStore, CartStore, IdentityLookup};

/// Orchestrates cart writes through the store contracts.
#[derive(Clone)]
pub struct CartLifecycle {
    carts: Arc<dyn CartStore>,
    identity: Arc<dyn IdentityLookup>,
    addresses: Arc<dyn AddressStore>,
    validator: CartValidator,
    policy: StatusPolicy,
}

impl CartLifecycle {
    /// Create a lifecycle manager.
    #[must_use]
    pub fn new(
        carts: Arc<dyn CartStore>,
        identity: Arc<dyn IdentityLookup>,
        addresses: Arc<dyn AddressStore>,
        validator: CartValidator,
        policy: StatusPolicy,
    ) -> Self {
        Self {
            carts,
            identity,
            addresses,
            validator,
            policy,
        }
    }

    /// The transition policy in force.
    #[must_use]
    pub const fn policy(&self) -> StatusPolicy {
        self.policy
    }

    /// Validate and persist a new cart with all of its lines.
    ///
    /// # Errors
    ///
    /// Returns whatever the validator rejects, or `ServiceError::Store` if the
    /// atomic write fails (in which case nothing was persisted).
    #[instrument(skip(self, input))]
    pub async fn create(&self, input: &CreateCartInput) -> Result<CartId, ServiceError> {
        let cart = self.validator.validate(input).await?;
        let id = self.carts.create_cart_atomic(&cart).await?;

        info!(
            cart_id = %id,
            guest = cart.owner.is_guest(),
            lines = cart.lines.len(),
            total = %cart.total(),
            "Cart created"
        );
        Ok(id)
    }

    /// A cart header with its lines.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the cart does not exist.
    #[instrument(skip(self))]
    pub async fn detail(&self, id: CartId) -> Result<CartDetail, ServiceError> {
        let cart = self.carts.get_cart(id).await?.ok_or(Missing::Cart)?;
        let lines = self.carts.get_lines(id).await?;
        Ok(CartDetail { cart, lines })
    }

    /// Carts owned by a registered user, newest first. An empty list is a
    /// success.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the user does not exist.
    #[instrument(skip(self))]
    pub async fn list_by_owner(&self, user_id: UserId) -> Result<Vec<Cart>, ServiceError> {
        self.identity
            .resolve_user(user_id)
            .await?
            .ok_or(Missing::Owner)?;
        Ok(self.carts.list_by_owner(user_id).await?)
    }

    /// Carts currently holding the status named by `label`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::BlankStatus` for a blank label and
    /// `ServiceError::NoResults` when nothing matches, including labels
    /// outside the known set.
    #[instrument(skip(self))]
    pub async fn list_by_status(&self, label: &str) -> Result<Vec<Cart>, ServiceError> {
        if label.trim().is_empty() {
            return Err(ValidationError::BlankStatus.into());
        }

        let Ok(status) = label.parse::<CartStatus>() else {
            debug!(label, "Status label matches no stored cart");
            return Err(ServiceError::NoResults);
        };

        let carts = self.carts.list_by_status(status).await?;
        if carts.is_empty() {
            return Err(ServiceError::NoResults);
        }
        Ok(carts)
    }

    /// Move a cart to the status named by `label`.
    ///
    /// Reapplying the current status succeeds without a write. Under the
    /// strict policy the write is conditional on the status that was read, so
    /// a concurrent change surfaces as a conflict.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for a blank, unknown or illegal
    /// target, `ServiceError::NotFound` if the cart is missing (or deleted
    /// mid-flight), and `ServiceError::Conflict` if another writer won.
    #[instrument(skip(self))]
    pub async fn transition(&self, id: CartId, label: &str) -> Result<(), ServiceError> {
        if label.trim().is_empty() {
            return Err(ValidationError::BlankStatus.into());
        }
        let target = label
            .parse::<CartStatus>()
            .map_err(|e| ValidationError::UnknownStatus(e.0))?;

        let cart = self.carts.get_cart(id).await?.ok_or(Missing::Cart)?;
        let from = cart.status;
        if from == target {
            debug!(cart_id = %id, status = %target, "Status already applied");
            return Ok(());
        }

        if !self.policy.allows(from, target) {
            return Err(ValidationError::IllegalTransition { from, to: target }.into());
        }

        let expected = match self.policy {
            StatusPolicy::Strict => Some(from),
            StatusPolicy::Permissive => None,
        };
        if self.carts.update_status(id, target, expected).await? {
            info!(cart_id = %id, %from, to = %target, "Cart status changed");
            return Ok(());
        }

        match self.carts.get_cart(id).await? {
            None => Err(Missing::Cart.into()),
            Some(current) => Err(ServiceError::Conflict(format!(
                "cart {id} moved to {} while changing from {from}",
                current.status
            ))),
        }
    }

    /// Record the payment method of a cart. Last writer wins.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::BlankPaymentMethod` for a blank label and
    /// `ServiceError::NotFound` if the cart does not exist.
    #[instrument(skip(self))]
    pub async fn set_payment_method(&self, id: CartId, label: &str) -> Result<(), ServiceError> {
        let method = PaymentMethod::parse(label).ok_or(ValidationError::BlankPaymentMethod)?;
        if !method.is_recommended() {
            warn!(
                cart_id = %id,
                method = %method,
                recommended = ?PaymentMethod::RECOMMENDED,
                "Storing payment method outside the recommended set"
            );
        }

        if !self.carts.update_payment_method(id, &method).await? {
            return Err(Missing::Cart.into());
        }
        info!(cart_id = %id, method = %method, "Payment method recorded");
        Ok(())
    }

    /// Bind a registered user's cart to one of their saved addresses.
    ///
    /// # Errors
    ///
    /// Returns `Missing::CartOrAddress` when the cart or address is missing,
    /// the cart belongs to a guest, or the address belongs to someone else.
    #[instrument(skip(self))]
    pub async fn bind_address(
        &self,
        id: CartId,
        address_id: AddressId,
    ) -> Result<(), ServiceError> {
        let cart = self
            .carts
            .get_cart(id)
            .await?
            .ok_or(Missing::CartOrAddress)?;
        let owner = cart.owner.user_id().ok_or(Missing::CartOrAddress)?;
        let address = self
            .addresses
            .resolve_address(address_id)
            .await?
            .ok_or(Missing::CartOrAddress)?;

        if !self.addresses.belongs_to(address_id, owner).await?
            || !self.carts.bind_address(id, &address).await?
        {
            return Err(Missing::CartOrAddress.into());
        }

        info!(cart_id = %id, address_id = %address_id, "Cart bound to address");
        Ok(())
    }

    /// Delete a cart and its lines.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the cart does not exist.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: CartId) -> Result<(), ServiceError> {
        if !self.carts.delete_cart(id).await? {
            return Err(Missing::Cart.into());
        }
        info!(cart_id = %id, "Cart deleted");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::CartLineInput;
    use crate::store::MemoryStore;
    use norkys_core::ItemId;

    async fn lifecycle(policy: StatusPolicy) -> (Arc<MemoryStore>, CartLifecycle) {
        let store = Arc::new(MemoryStore::new(UserId::new(1)));
        store.seed_demo().await;
        let validator = CartValidator::new(store.clone(), store.clone());
        let lifecycle =
            CartLifecycle::new(store.clone(), store.clone(), store.clone(), validator, policy);
        (store, lifecycle)
    }

    fn input(owner_id: Option<i32>) -> CreateCartInput {
        CreateCartInput {
            owner_id,
            name: Some("Ana".to_owned()),
            surname: Some("Torres".to_owned()),
            email: Some("ana@example.com".to_owned()),
            national_id: Some("45678912".to_owned()),
            address_title: Some("Home".to_owned()),
            address: Some("123 Main".to_owned()),
            phone_primary: Some("555-0100".to_owned()),
            lines: vec![CartLineInput {
                item_id: ItemId::new(7),
                quantity: 2,
            }],
            ..CreateCartInput::default()
        }
    }

    #[tokio::test]
    async fn test_failed_write_leaves_no_cart() {
        let (store, lifecycle) = lifecycle(StatusPolicy::Strict).await;
        store.fail_after_header(true);

        let err = lifecycle.create(&input(None)).await.unwrap_err();
        assert_eq!(err.kind(), "internal");
        assert_eq!(store.cart_count().await, 0);
        assert_eq!(store.line_count().await, 0);
    }

    #[tokio::test]
    async fn test_strict_walks_forward_only() {
        let (_, lifecycle) = lifecycle(StatusPolicy::Strict).await;
        let id = lifecycle.create(&input(Some(2))).await.unwrap();

        for label in ["confirmed", "in_delivery", "completed"] {
            lifecycle.transition(id, label).await.unwrap();
        }
        let err = lifecycle.transition(id, "pending").await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Validation(ValidationError::IllegalTransition {
                from: CartStatus::Completed,
                to: CartStatus::Pending
            })
        ));
        lifecycle.transition(id, "completed").await.unwrap();
    }

    #[tokio::test]
    async fn test_permissive_overwrites() {
        let (_, lifecycle) = lifecycle(StatusPolicy::Permissive).await;
        let id = lifecycle.create(&input(Some(2))).await.unwrap();

        lifecycle.transition(id, "completed").await.unwrap();
        lifecycle.transition(id, "pending").await.unwrap();
        lifecycle.transition(id, "pending").await.unwrap();
        assert_eq!(
            lifecycle.detail(id).await.unwrap().cart.status,
            CartStatus::Pending
        );
    }

    #[tokio::test]
    async fn test_unknown_and_blank_targets() {
        let (_, lifecycle) = lifecycle(StatusPolicy::Strict).await;
        let id = lifecycle.create(&input(None)).await.unwrap();

        let err = lifecycle.transition(id, "shipped").await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Validation(ValidationError::UnknownStatus(_))
        ));
        let err = lifecycle.transition(id, " ").await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Validation(ValidationError::BlankStatus)
        ));
    }

    #[tokio::test]
    async fn test_updates_on_missing_cart_are_not_found() {
        let (_, lifecycle) = lifecycle(StatusPolicy::Strict).await;
        let missing = CartId::new(999);

        assert!(matches!(
            lifecycle.transition(missing, "confirmed").await,
            Err(ServiceError::NotFound(Missing::Cart))
        ));
        assert!(matches!(
            lifecycle.set_payment_method(missing, "cash").await,
            Err(ServiceError::NotFound(Missing::Cart))
        ));
        assert!(matches!(
            lifecycle.bind_address(missing, AddressId::new(1)).await,
            Err(ServiceError::NotFound(Missing::CartOrAddress))
        ));
    }

    #[tokio::test]
    async fn test_payment_method_accepts_unlisted_label() {
        let (_, lifecycle) = lifecycle(StatusPolicy::Strict).await;
        let id = lifecycle.create(&input(None)).await.unwrap();

        lifecycle.set_payment_method(id, "yape").await.unwrap();
        let cart = lifecycle.detail(id).await.unwrap().cart;
        assert_eq!(
            cart.payment_method,
            Some(PaymentMethod::Other("yape".to_owned()))
        );

        assert!(matches!(
            lifecycle.set_payment_method(id, "").await,
            Err(ServiceError::Validation(ValidationError::BlankPaymentMethod))
        ));
    }

    #[tokio::test]
    async fn test_address_binding_rules() {
        let (_, lifecycle) = lifecycle(StatusPolicy::Strict).await;
        let registered = lifecycle.create(&input(Some(2))).await.unwrap();
        let guest = lifecycle.create(&input(None)).await.unwrap();

        // Address 2 belongs to user 3.
        assert!(lifecycle
            .bind_address(registered, AddressId::new(2))
            .await
            .is_err());
        assert!(lifecycle.bind_address(guest, AddressId::new(1)).await.is_err());
        assert!(lifecycle
            .bind_address(registered, AddressId::new(77))
            .await
            .is_err());

        lifecycle
            .bind_address(registered, AddressId::new(1))
            .await
            .unwrap();
        let cart = lifecycle.detail(registered).await.unwrap().cart;
        assert_eq!(cart.address_id, Some(AddressId::new(1)));
        assert_eq!(cart.delivery.address, "Av. Arequipa 1234, Lince");
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let (_, lifecycle) = lifecycle(StatusPolicy::Strict).await;
        let id = lifecycle.create(&input(None)).await.unwrap();

        lifecycle.delete(id).await.unwrap();
        assert!(matches!(
            lifecycle.delete(id).await,
            Err(ServiceError::NotFound(Missing::Cart))
        ));
        assert!(lifecycle.detail(id).await.is_err());
    }

    #[tokio::test]
    async fn test_listing_by_owner_and_status() {
        let (_, lifecycle) = lifecycle(StatusPolicy::Strict).await;

        assert!(lifecycle.list_by_owner(UserId::new(3)).await.unwrap().is_empty());
        assert!(matches!(
            lifecycle.list_by_owner(UserId::new(404)).await,
            Err(ServiceError::NotFound(Missing::Owner))
        ));

        lifecycle.create(&input(Some(3))).await.unwrap();
        assert_eq!(lifecycle.list_by_owner(UserId::new(3)).await.unwrap().len(), 1);
        assert_eq!(lifecycle.list_by_status("PENDING").await.unwrap().len(), 1);

        assert!(matches!(
            lifecycle.list_by_status("confirmed").await,
            Err(ServiceError::NoResults)
        ));
        assert!(matches!(
            lifecycle.list_by_status("shipped").await,
            Err(ServiceError::NoResults)
        ));
        assert!(matches!(
            lifecycle.list_by_status("").await,
            Err(ServiceError::Validation(ValidationError::BlankStatus))
        ));
    }
}
