//! Emporium Client - Cart and wishlist stores.
//!
//! Both stores are [`Store`] instances: commands mutate state synchronously,
//! subscribers are notified with the new snapshot, and the persisted part of
//! the state is written to a [`Storage`] backend in the background.
//!
//! # Modules
//!
//! - [`store`] - Generic reactive store engine and persistence
//! - [`cart`] - Cart entries, totals, and drawer visibility
//! - [`wishlist`] - Saved products
//! - [`storage`] - Durable key/value backends
//! - [`catalog`] - Product and variant snapshots handed over by the catalog
//! - [`config`] - Environment configuration

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod storage;
pub mod store;
pub mod wishlist;

pub use cart::{CartEntry, CartState, NewCartEntry};
pub use catalog::{ProductSnapshot, VariantSnapshot};
pub use config::ClientConfig;
pub use error::StorageError;
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use store::{Store, StoreOptions, StoreState, Subscription};
pub use wishlist::WishlistState;

/// The cart store.
pub type CartStore = Store<CartState>;

/// The wishlist store.
pub type WishlistStore = Store<WishlistState>;
