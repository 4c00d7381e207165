//! Norkys Core - Shared domain types.
//!
//! This crate provides the types shared by every Norkys component:
//! - `api` - Order intake and dashboard HTTP service
//! - `integration-tests` - HTTP and store tests
//!
//! # Architecture
//!
//! The core crate contains only types and pure rules - no I/O, no database
//! access, no HTTP. The cart status transition table lives here so it can be
//! checked without a store.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, emails, cart owners, delivery snapshots, statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
