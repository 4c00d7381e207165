//! Demo data for local development and database tests.
//!
//! Inserts the same users, menu and addresses the in-memory store starts
//! with. Rows that already exist are left alone, so seeding twice is safe.

use sqlx::{PgPool, Postgres, Transaction};

use super::RepositoryError;
use crate::store::demo;

/// Rows inserted by [`seed_demo`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub users: u64,
    pub items: u64,
    pub addresses: u64,
}

/// Insert the demo data set in one transaction.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if any insert fails.
pub async fn seed_demo(pool: &PgPool) -> Result<SeedReport, RepositoryError> {
    let mut tx = pool.begin().await?;

    let report = SeedReport {
        users: seed_users(&mut tx).await?,
        items: seed_items(&mut tx).await?,
        addresses: seed_addresses(&mut tx).await?,
    };

    for table in ["norkys.app_user", "norkys.catalog_item", "norkys.address"] {
        // Explicit ids bypass the sequences; move them past the seeded rows.
        sqlx::query(&format!(
            "SELECT setval(pg_get_serial_sequence('{table}', 'id'), \
             GREATEST((SELECT MAX(id) FROM {table}), 1))"
        ))
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(report)
}

async fn seed_users(tx: &mut Transaction<'_, Postgres>) -> Result<u64, RepositoryError> {
    let mut inserted = 0;
    for user in &demo::USERS {
        inserted += sqlx::query(
            r"
            INSERT INTO norkys.app_user (id, email, display_name)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO NOTHING
            ",
        )
        .bind(user.id)
        .bind(user.email)
        .bind(user.display_name)
        .execute(&mut **tx)
        .await?
        .rows_affected();
    }
    Ok(inserted)
}

async fn seed_items(tx: &mut Transaction<'_, Postgres>) -> Result<u64, RepositoryError> {
    let mut inserted = 0;
    for item in &demo::ITEMS {
        inserted += sqlx::query(
            r"
            INSERT INTO norkys.catalog_item (id, name, price, cost_basis)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO NOTHING
            ",
        )
        .bind(item.id)
        .bind(item.name)
        .bind(item.price())
        .bind(item.cost_basis())
        .execute(&mut **tx)
        .await?
        .rows_affected();
    }
    Ok(inserted)
}

async fn seed_addresses(tx: &mut Transaction<'_, Postgres>) -> Result<u64, RepositoryError> {
    let mut inserted = 0;
    for address in &demo::ADDRESSES {
        inserted += sqlx::query(
            r"
            INSERT INTO norkys.address (
                id, user_id, title, address, reference,
                phone_primary, phone_secondary, latitude, longitude
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO NOTHING
            ",
        )
        .bind(address.id)
        .bind(address.user_id)
        .bind(address.title)
        .bind(address.address)
        .bind(address.reference)
        .bind(address.phone_primary)
        .bind(address.phone_secondary)
        .bind(address.latitude)
        .bind(address.longitude)
        .execute(&mut **tx)
        .await?
        .rows_affected();
    }
    Ok(inserted)
}
