//! Database operations for saved delivery addresses.

use sqlx::PgPool;

use norkys_core::{AddressId, GeoPoint, UserId};

use super::RepositoryError;
use crate::models::Address;

#[derive(Debug, sqlx::FromRow)]
struct AddressRow {
    id: i32,
    user_id: i32,
    title: String,
    address: String,
    reference: Option<String>,
    phone_primary: String,
    phone_secondary: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

impl From<AddressRow> for Address {
    fn from(row: AddressRow) -> Self {
        Self {
            id: AddressId::new(row.id),
            user_id: UserId::new(row.user_id),
            title: row.title,
            address: row.address,
            reference: row.reference,
            phone_primary: row.phone_primary,
            phone_secondary: row.phone_secondary,
            location: GeoPoint::from_parts(row.latitude, row.longitude),
        }
    }
}

/// Repository for address reads.
pub struct AddressRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddressRepository<'a> {
    /// Create a new address repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an address by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: AddressId) -> Result<Option<Address>, RepositoryError> {
        let row = sqlx::query_as::<_, AddressRow>(
            r"
            SELECT id, user_id, title, address, reference, phone_primary, phone_secondary,
                   latitude, longitude
            FROM norkys.address
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Address::from))
    }

    /// Check whether an address belongs to a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn belongs_to(
        &self,
        id: AddressId,
        user_id: UserId,
    ) -> Result<bool, RepositoryError> {
        let owned: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM norkys.address WHERE id = $1 AND user_id = $2)",
        )
        .bind(id)
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(owned)
    }
}
