//! Emporium Core - Shared types library.
//!
//! This crate provides common types used across all Emporium components:
//! - `client` - Cart and wishlist stores with local persistence
//! - `storefront` - Public-facing web server
//! - `cli` - Terminal client for the stores and access rules
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! storage, no HTTP. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, and roles
//! - [`access`] - Route access rules (path categories and guard decisions)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod access;
pub mod types;

pub use access::{AccessPolicy, AuthToken, Decision, PathCategory, PolicyError};
pub use types::*;
