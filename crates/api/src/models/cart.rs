//! Cart aggregate models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use norkys_core::{
    AddressId, CartId, CartLineId, CartOwner, CartStatus, DeliveryInfo, ItemId, PaymentMethod,
};

/// A stored cart header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub id: CartId,
    pub owner: CartOwner,
    pub delivery: DeliveryInfo,
    /// Set once the cart is bound to one of the owner's saved addresses.
    pub address_id: Option<AddressId>,
    pub status: CartStatus,
    pub payment_method: Option<PaymentMethod>,
    /// Sum of line extensions, captured at creation.
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}

/// One catalog item within a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: CartLineId,
    pub cart_id: CartId,
    pub item_id: ItemId,
    /// Catalog name at read time, for display.
    pub item_name: String,
    pub quantity: i32,
    /// Price captured when the cart was created.
    pub unit_price: Decimal,
}

impl CartLine {
    /// `quantity × unit_price`.
    #[must_use]
    pub fn extension(&self) -> Decimal {
        Decimal::from(self.quantity) * self.unit_price
    }
}

/// A cart with its lines.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartDetail {
    pub cart: Cart,
    pub lines: Vec<CartLine>,
}

/// A validated cart ready for atomic persistence.
///
/// Only the creation validator builds these, so every `NewCart` has an owner,
/// a complete delivery snapshot and at least one priced line.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCart {
    pub owner: CartOwner,
    pub delivery: DeliveryInfo,
    pub lines: Vec<NewCartLine>,
}

impl NewCart {
    /// Sum of `quantity × unit_price` over all lines.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines
            .iter()
            .map(|line| Decimal::from(line.quantity) * line.unit_price)
            .sum()
    }
}

/// A priced line inside a [`NewCart`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCartLine {
    pub item_id: ItemId,
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// Payload for `POST /api/carts`.
///
/// Registered customers send `owner_id`; guests leave it out and fill the
/// contact fields instead.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateCartInput {
    pub owner_id: Option<i32>,
    pub name: Option<String>,
    pub surname: Option<String>,
    pub email: Option<String>,
    pub national_id: Option<String>,
    pub address_title: Option<String>,
    pub address: Option<String>,
    pub reference: Option<String>,
    pub phone_primary: Option<String>,
    pub phone_secondary: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default)]
    pub lines: Vec<CartLineInput>,
}

/// A requested line: which item and how many.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CartLineInput {
    pub item_id: ItemId,
    pub quantity: i32,
}

/// Response body for a successful creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartCreated {
    pub cart_id: CartId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use norkys_core::UserId;

    fn delivery() -> DeliveryInfo {
        DeliveryInfo {
            title: "Home".to_owned(),
            address: "Av. Arequipa 1234".to_owned(),
            reference: None,
            phone_primary: "999111222".to_owned(),
            phone_secondary: None,
            location: None,
        }
    }

    #[test]
    fn test_new_cart_total_sums_extensions() {
        let cart = NewCart {
            owner: CartOwner::Registered {
                user_id: UserId::new(2),
            },
            delivery: delivery(),
            lines: vec![
                NewCartLine {
                    item_id: ItemId::new(1),
                    quantity: 2,
                    unit_price: Decimal::new(2490, 2),
                },
                NewCartLine {
                    item_id: ItemId::new(4),
                    quantity: 1,
                    unit_price: Decimal::new(850, 2),
                },
            ],
        };
        assert_eq!(cart.total(), Decimal::new(5830, 2));
    }

    #[test]
    fn test_line_extension() {
        let line = CartLine {
            id: CartLineId::new(1),
            cart_id: CartId::new(1),
            item_id: ItemId::new(3),
            item_name: "1/4 Pollo a la brasa".to_owned(),
            quantity: 3,
            unit_price: Decimal::new(1990, 2),
        };
        assert_eq!(line.extension(), Decimal::new(5970, 2));
    }

    #[test]
    fn test_create_input_defaults_lines() {
        let input: CreateCartInput =
            serde_json::from_str(r#"{"owner_id": 4}"#).unwrap_or_default();
        assert_eq!(input.owner_id, Some(4));
        assert!(input.lines.is_empty());
    }
}
