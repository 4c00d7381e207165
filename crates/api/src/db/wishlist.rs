//! Database operations for wishlist entries.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use norkys_core::{ItemId, UserId, WishlistEntryId};

use super::RepositoryError;
use crate::models::WishlistEntry;

#[derive(Debug, sqlx::FromRow)]
struct WishlistRow {
    id: i32,
    user_id: i32,
    item_id: i32,
    created_at: DateTime<Utc>,
}

impl From<WishlistRow> for WishlistEntry {
    fn from(row: WishlistRow) -> Self {
        Self {
            id: WishlistEntryId::new(row.id),
            user_id: UserId::new(row.user_id),
            item_id: ItemId::new(row.item_id),
            created_at: row.created_at,
        }
    }
}

/// Repository for wishlist database operations.
pub struct WishlistRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> WishlistRepository<'a> {
    /// Create a new wishlist repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Save an item for a user.
    ///
    /// Returns `None` if the pair already exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn add(
        &self,
        user_id: UserId,
        item_id: ItemId,
    ) -> Result<Option<WishlistEntry>, RepositoryError> {
        let row = sqlx::query_as::<_, WishlistRow>(
            r"
            INSERT INTO norkys.wishlist_entry (user_id, item_id)
            VALUES ($1, $2)
            ON CONFLICT ON CONSTRAINT wishlist_entry_user_item_key DO NOTHING
            RETURNING id, user_id, item_id, created_at
            ",
        )
        .bind(user_id)
        .bind(item_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(WishlistEntry::from))
    }

    /// List a user's entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<WishlistEntry>, RepositoryError> {
        let rows = sqlx::query_as::<_, WishlistRow>(
            r"
            SELECT id, user_id, item_id, created_at
            FROM norkys.wishlist_entry
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(WishlistEntry::from).collect())
    }

    /// Delete an entry. Returns `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: WishlistEntryId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM norkys.wishlist_entry WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
