//! Value types that make up a cart header.

use serde::{Deserialize, Serialize};

use super::{Email, UserId};

/// Who a cart belongs to.
///
/// A cart is owned by exactly one of a registered user or a guest snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CartOwner {
    /// A user account resolved through the identity lookup.
    Registered {
        /// The owning user.
        user_id: UserId,
    },
    /// A one-time purchaser.
    Guest(GuestContact),
}

impl CartOwner {
    /// The owning user, if registered.
    #[must_use]
    pub const fn user_id(&self) -> Option<UserId> {
        match self {
            Self::Registered { user_id } => Some(*user_id),
            Self::Guest(_) => None,
        }
    }

    /// The guest snapshot, if any.
    #[must_use]
    pub const fn guest(&self) -> Option<&GuestContact> {
        match self {
            Self::Registered { .. } => None,
            Self::Guest(contact) => Some(contact),
        }
    }

    /// Whether the cart was placed without an account.
    #[must_use]
    pub const fn is_guest(&self) -> bool {
        matches!(self, Self::Guest(_))
    }
}

/// Contact details captured for a guest at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestContact {
    pub name: String,
    pub surname: String,
    pub email: Email,
    /// National identity document number (DNI).
    pub national_id: String,
}

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Builds a point only when both coordinates are present.
    #[must_use]
    pub const fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => Some(Self {
                latitude,
                longitude,
            }),
            _ => None,
        }
    }
}

/// Where and to whom a cart is delivered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryInfo {
    /// Short label such as "Home" or "Office".
    pub title: String,
    pub address: String,
    pub reference: Option<String>,
    pub phone_primary: String,
    pub phone_secondary: Option<String>,
    pub location: Option<GeoPoint>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn guest() -> CartOwner {
        CartOwner::Guest(GuestContact {
            name: "Rosa".to_owned(),
            surname: "Quispe".to_owned(),
            email: Email::parse("rosa@norkys.pe").unwrap(),
            national_id: "45678912".to_owned(),
        })
    }

    #[test]
    fn test_owner_accessors_are_exclusive() {
        let registered = CartOwner::Registered {
            user_id: UserId::new(7),
        };
        assert_eq!(registered.user_id(), Some(UserId::new(7)));
        assert!(registered.guest().is_none());

        let guest = guest();
        assert!(guest.user_id().is_none());
        assert!(guest.is_guest());
        assert_eq!(guest.guest().map(|g| g.surname.as_str()), Some("Quispe"));
    }

    #[test]
    fn test_owner_serializes_with_kind_tag() {
        let json = serde_json::to_value(CartOwner::Registered {
            user_id: UserId::new(3),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"kind": "registered", "user_id": 3}));

        let json = serde_json::to_value(guest()).unwrap();
        assert_eq!(json["kind"], "guest");
        assert_eq!(json["email"], "rosa@norkys.pe");
    }

    #[test]
    fn test_geo_point_requires_both_coordinates() {
        assert!(GeoPoint::from_parts(Some(-12.04), None).is_none());
        assert!(GeoPoint::from_parts(None, Some(-77.03)).is_none());
        assert_eq!(
            GeoPoint::from_parts(Some(-12.04), Some(-77.03)),
            Some(GeoPoint {
                latitude: -12.04,
                longitude: -77.03
            })
        );
    }
}
