//! Core types for Emporium.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod role;

pub use id::*;
pub use price::{CurrencyCode, Price, discount_percent};
pub use role::{InvalidRole, UserRole};
