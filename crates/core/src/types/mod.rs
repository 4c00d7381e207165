//! Core types for Norkys.
//!
//! This module provides type-safe wrappers for the cart domain.

pub mod cart;
pub mod email;
pub mod id;
pub mod status;

pub use cart::{CartOwner, DeliveryInfo, GeoPoint, GuestContact};
pub use email::{Email, EmailError};
pub use id::*;
pub use status::*;
