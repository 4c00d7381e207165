//! Identity and address records owned by external collaborators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use norkys_core::{AddressId, DeliveryInfo, GeoPoint, UserId};

/// Just enough of a user account to confirm it exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

/// A saved delivery location belonging to a registered user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    pub user_id: UserId,
    pub title: String,
    pub address: String,
    pub reference: Option<String>,
    pub phone_primary: String,
    pub phone_secondary: Option<String>,
    pub location: Option<GeoPoint>,
}

impl Address {
    /// The snapshot copied into a cart when it binds to this address.
    #[must_use]
    pub fn delivery_info(&self) -> DeliveryInfo {
        DeliveryInfo {
            title: self.title.clone(),
            address: self.address.clone(),
            reference: self.reference.clone(),
            phone_primary: self.phone_primary.clone(),
            phone_secondary: self.phone_secondary.clone(),
            location: self.location,
        }
    }
}
