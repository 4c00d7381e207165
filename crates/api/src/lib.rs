//! Norkys order service library.
//!
//! Order intake (cart creation, status lifecycle, payment method, address
//! binding), the operator sales dashboard and customer wishlists, served over
//! JSON by axum.
//!
//! The crate is a library so the integration tests can drive the same router
//! the binary serves, backed by the in-memory store.
//!
//! # Layers
//!
//! - [`routes`] - axum handlers and the middleware stack
//! - [`services`] - validation, lifecycle, analytics and wishlist rules
//! - [`store`] - collaborator contracts with `PostgreSQL` and in-memory backends
//! - [`db`] - `PostgreSQL` repositories and embedded migrations

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;

pub use routes::router;
