//! Subcommand implementations.
//!
//! Each module works against an open store and prints its result on stdout.
//! Rendering is split from printing so the output format can be tested.

pub mod cart;
pub mod guard;
pub mod wishlist;

use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Client configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] emporium_client::config::ConfigError),

    /// Persisting a store failed.
    #[error("Storage error: {0}")]
    Storage(#[from] emporium_client::StorageError),

    /// A price was negative.
    #[error("Invalid price: {0} (must not be negative)")]
    NegativePrice(rust_decimal::Decimal),

    /// A price was above the accepted maximum.
    #[error("Invalid price: {0} (must not exceed {max})", max = cart::MAX_UNIT_PRICE)]
    PriceTooLarge(rust_decimal::Decimal),
}

/// Result type alias for `CommandError`.
pub type Result<T> = std::result::Result<T, CommandError>;
