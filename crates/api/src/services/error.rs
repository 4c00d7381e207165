//! Service-level error taxonomy.
//!
//! Every collaborator failure is classified here before it leaves a service,
//! so handlers only ever see one of five kinds.

use rust_decimal::Decimal;
use thiserror::Error;

use norkys_core::{CartStatus, EmailError, ItemId};

use crate::db::RepositoryError;

/// Input the services refuse to act on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("administrator cannot own a cart")]
    AdminCannotOwnCart,

    #[error("guest fields incomplete: name, surname, email, national id and primary phone are required")]
    GuestFieldsIncomplete,

    #[error("invalid guest email: {0}")]
    InvalidGuestEmail(EmailError),

    #[error("address incomplete: title, address and primary phone are required")]
    AddressIncomplete,

    #[error("a cart needs at least one line")]
    NoLines,

    #[error("quantity for item {0} must be positive")]
    NonPositiveQuantity(ItemId),

    #[error("status is required")]
    BlankStatus,

    #[error("unknown status: {0}")]
    UnknownStatus(String),

    #[error("illegal transition from {from} to {to}")]
    IllegalTransition { from: CartStatus, to: CartStatus },

    #[error("payment method is required")]
    BlankPaymentMethod,

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
        value: i64,
    },

    #[error("cart total {0} exceeds the maximum of 9999999999.99")]
    TotalTooLarge(Decimal),

    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("invalid ids")]
    InvalidIds,

    #[error("administrator cannot own a wishlist")]
    AdminCannotOwnWishlist,
}

/// What a lookup failed to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Missing {
    #[error("cart not found")]
    Cart,

    #[error("owner not found")]
    Owner,

    #[error("item {0} not found")]
    Item(ItemId),

    /// Every address binding failure reports as this one variant.
    #[error("cart or address not found, or address does not belong to the cart owner")]
    CartOrAddress,

    #[error("wishlist entry not found")]
    WishlistEntry,
}

/// Errors returned by the order services.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    NotFound(#[from] Missing),

    /// A listing matched nothing; distinct from an empty success.
    #[error("no results")]
    NoResults,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("store error: {0}")]
    Store(RepositoryError),
}

impl ServiceError {
    /// Machine-readable kind, used as the `error` field of JSON bodies.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::NotFound(_) => "not_found",
            Self::NoResults => "no_results",
            Self::Conflict(_) => "conflict",
            Self::Store(_) => "internal",
        }
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(message) => Self::Conflict(message),
            other => Self::Store(other),
        }
    }
}
