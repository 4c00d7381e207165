//! Business logic for carts, analytics and wishlists.
//!
//! Services depend only on the contracts in [`crate::store`] and return
//! [`ServiceError`], which the HTTP layer maps to status codes.

pub mod analytics;
pub mod error;
pub mod lifecycle;
pub mod validator;
pub mod wishlist;

pub use analytics::SalesAnalytics;
pub use error::{Missing, ServiceError, ValidationError};
pub use lifecycle::CartLifecycle;
pub use validator::CartValidator;
pub use wishlist::WishlistService;
