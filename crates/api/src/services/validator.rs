//! Cart creation validation.
//!
//! Turns a raw [`CreateCartInput`] into a write-ready [`NewCart`] or the first
//! rule it breaks. Only lookups happen here; nothing is written.

use std::sync::Arc;

use tracing::instrument;

use norkys_core::{CartOwner, DeliveryInfo, Email, GeoPoint, GuestContact, UserId};
use rust_decimal::Decimal;

use super::error::{Missing, ServiceError, ValidationError};
use crate::models::{CreateCartInput, NewCart, NewCartLine};
use crate::store::{CatalogLookup, IdentityLookup};

/// Largest quantity accepted on a single line.
pub const MAX_LINE_QUANTITY: i32 = 10_000;

/// Largest cart total the `cart.total` column can hold (9,999,999,999.99).
pub const MAX_CART_TOTAL: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, 2);

/// Trimmed, non-blank value of an optional field.
fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn owned(value: Option<&str>) -> Option<String> {
    present(value).map(str::to_owned)
}

/// Validates cart creation requests against identity and catalog lookups.
#[derive(Clone)]
pub struct CartValidator {
    identity: Arc<dyn IdentityLookup>,
    catalog: Arc<dyn CatalogLookup>,
}

impl CartValidator {
    /// Create a validator over the given lookups.
    #[must_use]
    pub fn new(identity: Arc<dyn IdentityLookup>, catalog: Arc<dyn CatalogLookup>) -> Self {
        Self { identity, catalog }
    }

    /// Validate a creation request.
    ///
    /// Rules apply in order and the first failure wins: reserved administrator,
    /// owner (registered lookup or complete guest contact), delivery address,
    /// then lines. Unit prices are captured from the catalog on success.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for rule violations,
    /// `ServiceError::NotFound` for an unknown owner or item, and
    /// `ServiceError::Store` if a lookup fails.
    #[instrument(skip(self, input), fields(owner_id = ?input.owner_id, lines = input.lines.len()))]
    pub async fn validate(&self, input: &CreateCartInput) -> Result<NewCart, ServiceError> {
        if let Some(raw) = input.owner_id
            && self.identity.is_reserved_admin(UserId::new(raw))
        {
            return Err(ValidationError::AdminCannotOwnCart.into());
        }

        let owner = match input.owner_id.map(UserId::new).filter(UserId::is_positive) {
            Some(user_id) => self.registered_owner(user_id).await?,
            None => Self::guest_owner(input)?,
        };

        let delivery = Self::delivery(input)?;
        let lines = self.priced_lines(input).await?;

        let cart = NewCart {
            owner,
            delivery,
            lines,
        };
        let total = cart.total();
        if total > MAX_CART_TOTAL {
            return Err(ValidationError::TotalTooLarge(total).into());
        }
        Ok(cart)
    }

    async fn registered_owner(&self, user_id: UserId) -> Result<CartOwner, ServiceError> {
        self.identity
            .resolve_user(user_id)
            .await?
            .ok_or(Missing::Owner)?;
        Ok(CartOwner::Registered { user_id })
    }

    fn guest_owner(input: &CreateCartInput) -> Result<CartOwner, ServiceError> {
        let (Some(name), Some(surname), Some(email), Some(national_id), Some(_phone)) = (
            present(input.name.as_deref()),
            present(input.surname.as_deref()),
            present(input.email.as_deref()),
            present(input.national_id.as_deref()),
            present(input.phone_primary.as_deref()),
        ) else {
            return Err(ValidationError::GuestFieldsIncomplete.into());
        };

        let email = Email::parse(email).map_err(ValidationError::InvalidGuestEmail)?;

        Ok(CartOwner::Guest(GuestContact {
            name: name.to_owned(),
            surname: surname.to_owned(),
            email,
            national_id: national_id.to_owned(),
        }))
    }

    fn delivery(input: &CreateCartInput) -> Result<DeliveryInfo, ServiceError> {
        let (Some(title), Some(address), Some(phone_primary)) = (
            present(input.address_title.as_deref()),
            present(input.address.as_deref()),
            present(input.phone_primary.as_deref()),
        ) else {
            return Err(ValidationError::AddressIncomplete.into());
        };

        Ok(DeliveryInfo {
            title: title.to_owned(),
            address: address.to_owned(),
            reference: owned(input.reference.as_deref()),
            phone_primary: phone_primary.to_owned(),
            phone_secondary: owned(input.phone_secondary.as_deref()),
            location: GeoPoint::from_parts(input.latitude, input.longitude),
        })
    }

    async fn priced_lines(
        &self,
        input: &CreateCartInput,
    ) -> Result<Vec<NewCartLine>, ServiceError> {
        if input.lines.is_empty() {
            return Err(ValidationError::NoLines.into());
        }

        let mut lines = Vec::with_capacity(input.lines.len());
        for line in &input.lines {
            if line.quantity <= 0 {
                return Err(ValidationError::NonPositiveQuantity(line.item_id).into());
            }
            if line.quantity > MAX_LINE_QUANTITY {
                return Err(ValidationError::OutOfRange {
                    field: "quantity",
                    min: 1,
                    max: MAX_LINE_QUANTITY.into(),
                    value: line.quantity.into(),
                }
                .into());
            }
            let item = self
                .catalog
                .resolve_item(line.item_id)
                .await?
                .ok_or(Missing::Item(line.item_id))?;
            lines.push(NewCartLine {
                item_id: item.id,
                quantity: line.quantity,
                unit_price: item.price,
            });
        }
        Ok(lines)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::CartLineInput;
    use crate::store::MemoryStore;
    use norkys_core::ItemId;

    async fn validator() -> CartValidator {
        let store = Arc::new(MemoryStore::new(UserId::new(1)));
        store.seed_demo().await;
        CartValidator::new(store.clone(), store)
    }

    fn guest_input() -> CreateCartInput {
        CreateCartInput {
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

    fn registered_input(owner_id: i32) -> CreateCartInput {
        CreateCartInput {
            owner_id: Some(owner_id),
            name: Some("Ignored".to_owned()),
            email: Some("not even an email".to_owned()),
            ..guest_input()
        }
    }

    fn validation(err: ServiceError) -> ValidationError {
        match err {
            ServiceError::Validation(v) => v,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_admin_is_rejected_even_with_complete_fields() {
        let err = validator()
            .await
            .validate(&registered_input(1))
            .await
            .unwrap_err();
        assert_eq!(validation(err), ValidationError::AdminCannotOwnCart);
    }

    #[tokio::test]
    async fn test_registered_owner_discards_guest_fields() {
        let cart = validator()
            .await
            .validate(&registered_input(2))
            .await
            .unwrap();
        assert_eq!(
            cart.owner,
            CartOwner::Registered {
                user_id: UserId::new(2)
            }
        );
        assert!(cart.owner.guest().is_none());
    }

    #[tokio::test]
    async fn test_unknown_owner_is_not_found() {
        let err = validator()
            .await
            .validate(&registered_input(404))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(Missing::Owner)));
    }

    #[tokio::test]
    async fn test_each_missing_guest_field_is_rejected() {
        let validator = validator().await;
        let blankers: [fn(&mut CreateCartInput); 5] = [
            |i| i.name = None,
            |i| i.surname = Some("  ".to_owned()),
            |i| i.email = None,
            |i| i.national_id = Some(String::new()),
            |i| i.phone_primary = None,
        ];
        for blank in blankers {
            let mut input = guest_input();
            blank(&mut input);
            let err = validator.validate(&input).await.unwrap_err();
            assert_eq!(validation(err), ValidationError::GuestFieldsIncomplete);
        }
    }

    #[tokio::test]
    async fn test_guest_email_shape_is_checked() {
        let input = CreateCartInput {
            email: Some("ana.example.com".to_owned()),
            ..guest_input()
        };
        let err = validator().await.validate(&input).await.unwrap_err();
        assert!(matches!(
            validation(err),
            ValidationError::InvalidGuestEmail(_)
        ));
    }

    #[tokio::test]
    async fn test_registered_owner_still_needs_an_address() {
        let input = CreateCartInput {
            address: None,
            ..registered_input(2)
        };
        let err = validator().await.validate(&input).await.unwrap_err();
        assert_eq!(validation(err), ValidationError::AddressIncomplete);
    }

    #[tokio::test]
    async fn test_lines_are_required_and_positive() {
        let validator = validator().await;

        let empty = CreateCartInput {
            lines: Vec::new(),
            ..guest_input()
        };
        let err = validator.validate(&empty).await.unwrap_err();
        assert_eq!(validation(err), ValidationError::NoLines);

        let zero = CreateCartInput {
            lines: vec![CartLineInput {
                item_id: ItemId::new(7),
                quantity: 0,
            }],
            ..guest_input()
        };
        let err = validator.validate(&zero).await.unwrap_err();
        assert_eq!(
            validation(err),
            ValidationError::NonPositiveQuantity(ItemId::new(7))
        );
    }

    #[tokio::test]
    async fn test_line_quantity_is_capped() {
        let validator = validator().await;
        let huge = CreateCartInput {
            lines: vec![CartLineInput {
                item_id: ItemId::new(7),
                quantity: 2_000_000_000,
            }],
            ..guest_input()
        };
        let err = validator.validate(&huge).await.unwrap_err();
        assert_eq!(
            validation(err),
            ValidationError::OutOfRange {
                field: "quantity",
                min: 1,
                max: 10_000,
                value: 2_000_000_000,
            }
        );

        let at_cap = CreateCartInput {
            lines: vec![CartLineInput {
                item_id: ItemId::new(7),
                quantity: MAX_LINE_QUANTITY,
            }],
            ..guest_input()
        };
        let cart = validator.validate(&at_cap).await.unwrap();
        assert_eq!(cart.total(), Decimal::new(9_000_000, 2));
    }

    #[tokio::test]
    async fn test_total_must_fit_the_stored_column() {
        assert_eq!(MAX_CART_TOTAL, Decimal::new(999_999_999_999, 2));

        let input = CreateCartInput {
            lines: (0..15_000)
                .map(|_| CartLineInput {
                    item_id: ItemId::new(3),
                    quantity: MAX_LINE_QUANTITY,
                })
                .collect(),
            ..guest_input()
        };
        let err = validator().await.validate(&input).await.unwrap_err();
        assert_eq!(
            validation(err),
            ValidationError::TotalTooLarge(Decimal::new(1_048_500_000_000, 2))
        );
    }

    #[tokio::test]
    async fn test_first_missing_item_is_reported() {
        let input = CreateCartInput {
            lines: vec![
                CartLineInput {
                    item_id: ItemId::new(7),
                    quantity: 1,
                },
                CartLineInput {
                    item_id: ItemId::new(90),
                    quantity: 1,
                },
                CartLineInput {
                    item_id: ItemId::new(91),
                    quantity: 1,
                },
            ],
            ..guest_input()
        };
        let err = validator().await.validate(&input).await.unwrap_err();
        assert_eq!(err.to_string(), "item 90 not found");
    }

    #[tokio::test]
    async fn test_guest_cart_captures_catalog_price() {
        let cart = validator().await.validate(&guest_input()).await.unwrap();
        let guest = cart.owner.guest().unwrap();
        assert_eq!(guest.name, "Ana");
        assert_eq!(guest.email.as_str(), "ana@example.com");
        assert_eq!(cart.delivery.title, "Home");
        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.lines[0].unit_price, Decimal::new(900, 2));
        assert_eq!(cart.total(), Decimal::new(1800, 2));
    }
}
