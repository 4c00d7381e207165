//! Database operations for user accounts.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use norkys_core::UserId;

use super::RepositoryError;
use crate::models::UserSummary;

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    display_name: String,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for UserSummary {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::new(row.id),
            display_name: row.display_name,
            created_at: row.created_at,
        }
    }
}

/// Repository for user lookups.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: UserId) -> Result<Option<UserSummary>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, display_name, created_at FROM norkys.app_user WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(UserSummary::from))
    }
}
