//! Database operations for carts and cart lines.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use norkys_core::{
    AddressId, CartId, CartLineId, CartOwner, CartStatus, DeliveryInfo, Email, GeoPoint,
    GuestContact, ItemId, PaymentMethod, UserId,
};

use super::RepositoryError;
use crate::models::{Address, Cart, CartLine, NewCart};

const SELECT_CART: &str = r"
    SELECT id, user_id, guest_name, guest_surname, guest_email, guest_national_id,
           address_id, address_title, address, reference, phone_primary, phone_secondary,
           latitude, longitude, status, payment_method, total, created_at
    FROM norkys.cart";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for cart header queries.
#[derive(Debug, sqlx::FromRow)]
struct CartRow {
    id: i32,
    user_id: Option<i32>,
    guest_name: Option<String>,
    guest_surname: Option<String>,
    guest_email: Option<Email>,
    guest_national_id: Option<String>,
    address_id: Option<i32>,
    address_title: String,
    address: String,
    reference: Option<String>,
    phone_primary: String,
    phone_secondary: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    status: String,
    payment_method: Option<String>,
    total: Decimal,
    created_at: DateTime<Utc>,
}

impl TryFrom<CartRow> for Cart {
    type Error = RepositoryError;

    fn try_from(row: CartRow) -> Result<Self, Self::Error> {
        let owner = match (
            row.user_id,
            row.guest_name,
            row.guest_surname,
            row.guest_email,
            row.guest_national_id,
        ) {
            (Some(user_id), None, None, None, None) => CartOwner::Registered {
                user_id: UserId::new(user_id),
            },
            (None, Some(name), Some(surname), Some(email), Some(national_id)) => {
                CartOwner::Guest(GuestContact {
                    name,
                    surname,
                    email,
                    national_id,
                })
            }
            _ => {
                return Err(RepositoryError::DataCorruption(format!(
                    "cart {} has no single owner",
                    row.id
                )));
            }
        };

        let status = row.status.parse::<CartStatus>().map_err(|e| {
            RepositoryError::DataCorruption(format!("cart {}: {e}", row.id))
        })?;

        Ok(Self {
            id: CartId::new(row.id),
            owner,
            delivery: DeliveryInfo {
                title: row.address_title,
                address: row.address,
                reference: row.reference,
                phone_primary: row.phone_primary,
                phone_secondary: row.phone_secondary,
                location: GeoPoint::from_parts(row.latitude, row.longitude),
            },
            address_id: row.address_id.map(AddressId::new),
            status,
            payment_method: row.payment_method.as_deref().and_then(PaymentMethod::parse),
            total: row.total,
            created_at: row.created_at,
        })
    }
}

/// Internal row type for cart line queries.
#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    id: i32,
    cart_id: i32,
    item_id: i32,
    item_name: String,
    quantity: i32,
    unit_price: Decimal,
}

impl From<CartLineRow> for CartLine {
    fn from(row: CartLineRow) -> Self {
        Self {
            id: CartLineId::new(row.id),
            cart_id: CartId::new(row.cart_id),
            item_id: ItemId::new(row.item_id),
            item_name: row.item_name,
            quantity: row.quantity,
            unit_price: row.unit_price,
        }
    }
}

fn collect_carts(rows: Vec<CartRow>) -> Result<Vec<Cart>, RepositoryError> {
    rows.into_iter().map(Cart::try_from).collect()
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a cart header and all of its lines in one transaction.
    ///
    /// If the future is dropped before commit the transaction rolls back, so a
    /// cancelled request never leaves a header without lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a line references an item that
    /// disappeared after validation.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, cart: &NewCart) -> Result<CartId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let user_id = cart.owner.user_id();
        let guest = cart.owner.guest();
        let location = cart.delivery.location;

        let cart_id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO norkys.cart (
                user_id, guest_name, guest_surname, guest_email, guest_national_id,
                address_title, address, reference, phone_primary, phone_secondary,
                latitude, longitude, status, total
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING id
            ",
        )
        .bind(user_id)
        .bind(guest.map(|g| g.name.as_str()))
        .bind(guest.map(|g| g.surname.as_str()))
        .bind(guest.map(|g| &g.email))
        .bind(guest.map(|g| g.national_id.as_str()))
        .bind(&cart.delivery.title)
        .bind(&cart.delivery.address)
        .bind(cart.delivery.reference.as_deref())
        .bind(&cart.delivery.phone_primary)
        .bind(cart.delivery.phone_secondary.as_deref())
        .bind(location.map(|p| p.latitude))
        .bind(location.map(|p| p.longitude))
        .bind(CartStatus::Pending)
        .bind(cart.total())
        .fetch_one(&mut *tx)
        .await?;

        for line in &cart.lines {
            sqlx::query(
                r"
                INSERT INTO norkys.cart_line (cart_id, item_id, quantity, unit_price)
                VALUES ($1, $2, $3, $4)
                ",
            )
            .bind(cart_id)
            .bind(line.item_id)
            .bind(line.quantity)
            .bind(line.unit_price)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_foreign_key_violation()
                {
                    return RepositoryError::Conflict(format!(
                        "catalog item {} no longer exists",
                        line.item_id
                    ));
                }
                RepositoryError::Database(e)
            })?;
        }

        tx.commit().await?;

        Ok(CartId::new(cart_id))
    }

    /// Get a cart header by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored owner is inconsistent.
    pub async fn get(&self, id: CartId) -> Result<Option<Cart>, RepositoryError> {
        let row = sqlx::query_as::<_, CartRow>(&format!("{SELECT_CART} WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.map(Cart::try_from).transpose()
    }

    /// List a user's carts, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_owner(&self, user_id: UserId) -> Result<Vec<Cart>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartRow>(&format!(
            "{SELECT_CART} WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        collect_carts(rows)
    }

    /// List carts currently holding `status`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_status(&self, status: CartStatus) -> Result<Vec<Cart>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartRow>(&format!(
            "{SELECT_CART} WHERE status = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(status)
        .fetch_all(self.pool)
        .await?;

        collect_carts(rows)
    }

    /// Set the status of a cart.
    ///
    /// With `expected` set, the row is only updated while it still holds that
    /// status. Returns `false` when no row matched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update_status(
        &self,
        id: CartId,
        status: CartStatus,
        expected: Option<CartStatus>,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE norkys.cart
            SET status = $2
            WHERE id = $1 AND ($3::text IS NULL OR status = $3)
            ",
        )
        .bind(id)
        .bind(status)
        .bind(expected)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Set the payment method of a cart. Returns `false` if the cart is gone.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update_payment_method(
        &self,
        id: CartId,
        method: &PaymentMethod,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("UPDATE norkys.cart SET payment_method = $2 WHERE id = $1")
            .bind(id)
            .bind(method)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Bind a cart to a saved address and copy its delivery fields.
    ///
    /// The update only applies while the cart is owned by the address owner,
    /// so a guest cart or a foreign address never matches.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn bind_address(
        &self,
        id: CartId,
        address: &Address,
    ) -> Result<bool, RepositoryError> {
        let location = address.location;
        let result = sqlx::query(
            r"
            UPDATE norkys.cart
            SET address_id = $2,
                address_title = $3,
                address = $4,
                reference = $5,
                phone_primary = $6,
                phone_secondary = $7,
                latitude = $8,
                longitude = $9
            WHERE id = $1 AND user_id = $10
            ",
        )
        .bind(id)
        .bind(address.id)
        .bind(&address.title)
        .bind(&address.address)
        .bind(address.reference.as_deref())
        .bind(&address.phone_primary)
        .bind(address.phone_secondary.as_deref())
        .bind(location.map(|p| p.latitude))
        .bind(location.map(|p| p.longitude))
        .bind(address.user_id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a cart; its lines go with it (`ON DELETE CASCADE`).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: CartId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM norkys.cart WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lines of a cart in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lines(&self, id: CartId) -> Result<Vec<CartLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartLineRow>(
            r"
            SELECT l.id, l.cart_id, l.item_id, i.name AS item_name, l.quantity, l.unit_price
            FROM norkys.cart_line l
            JOIN norkys.catalog_item i ON i.id = l.item_id
            WHERE l.cart_id = $1
            ORDER BY l.id
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(CartLine::from).collect())
    }

    /// Round-trip a trivial query to check connectivity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the database is unreachable.
    pub async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(self.pool).await?;
        Ok(())
    }
}
