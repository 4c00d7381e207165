//! Domain models for the order service.
//!
//! Value types shared with other crates (ids, owners, statuses) live in
//! `norkys-core`; the structs here are the shapes the store hands back and
//! the request payloads the routes accept.

pub mod analytics;
pub mod cart;
pub mod catalog;
pub mod user;
pub mod wishlist;

pub use analytics::{
    CartTotalRow, DailySales, KpiSummary, LineSaleRow, PaymentMethodShare, ProductRanking,
};
pub use cart::{
    Cart, CartCreated, CartDetail, CartLine, CartLineInput, CreateCartInput, NewCart, NewCartLine,
};
pub use catalog::CatalogItem;
pub use user::{Address, UserSummary};
pub use wishlist::{AddWishlistInput, WishlistEntry};
