//! Wishlist models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use norkys_core::{ItemId, UserId, WishlistEntryId};

/// A catalog item saved by a registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistEntry {
    pub id: WishlistEntryId,
    pub user_id: UserId,
    pub item_id: ItemId,
    pub created_at: DateTime<Utc>,
}

/// Payload for `POST /api/wishlist`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct AddWishlistInput {
    pub user_id: UserId,
    pub item_id: ItemId,
}
