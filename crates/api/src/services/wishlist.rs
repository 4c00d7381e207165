//! Wishlist guard: who may save which item.

use std::sync::Arc;

use tracing::{info, instrument};

use norkys_core::{ItemId, UserId, WishlistEntryId};

use super::error::{Missing, ServiceError, ValidationError};
use crate::models::WishlistEntry;
use crate::store::{CatalogLookup, IdentityLookup, WishlistStore};

/// Wishlist operations for registered users.
#[derive(Clone)]
pub struct WishlistService {
    entries: Arc<dyn WishlistStore>,
    identity: Arc<dyn IdentityLookup>,
    catalog: Arc<dyn CatalogLookup>,
}

impl WishlistService {
    /// Create a wishlist service.
    #[must_use]
    pub fn new(
        entries: Arc<dyn WishlistStore>,
        identity: Arc<dyn IdentityLookup>,
        catalog: Arc<dyn CatalogLookup>,
    ) -> Self {
        Self {
            entries,
            identity,
            catalog,
        }
    }

    /// Save an item for a user.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for non-positive ids or the reserved
    /// administrator, `ServiceError::NotFound` for an unknown item or user,
    /// and `ServiceError::Conflict` if the pair is already saved.
    #[instrument(skip(self))]
    pub async fn add(
        &self,
        user_id: UserId,
        item_id: ItemId,
    ) -> Result<WishlistEntry, ServiceError> {
        if !user_id.is_positive() || !item_id.is_positive() {
            return Err(ValidationError::InvalidIds.into());
        }
        if self.identity.is_reserved_admin(user_id) {
            return Err(ValidationError::AdminCannotOwnWishlist.into());
        }
        self.catalog
            .resolve_item(item_id)
            .await?
            .ok_or(Missing::Item(item_id))?;
        self.identity
            .resolve_user(user_id)
            .await?
            .ok_or(Missing::Owner)?;

        let entry = self.entries.add(user_id, item_id).await?.ok_or_else(|| {
            ServiceError::Conflict(format!("item {item_id} is already in the wishlist"))
        })?;
        info!(entry_id = %entry.id, "Wishlist entry added");
        Ok(entry)
    }

    /// A user's saved items, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Store` if the read fails.
    #[instrument(skip(self))]
    pub async fn list(&self, user_id: UserId) -> Result<Vec<WishlistEntry>, ServiceError> {
        Ok(self.entries.list_by_user(user_id).await?)
    }

    /// Remove an entry.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the entry does not exist.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: WishlistEntryId) -> Result<(), ServiceError> {
        if !self.entries.delete(id).await? {
            return Err(Missing::WishlistEntry.into());
        }
        Ok(())
    }
}
