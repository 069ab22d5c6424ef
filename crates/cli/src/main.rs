//! Emporium CLI - Cart, wishlist and route guard from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Add two units of a variant to the cart
//! emp cart add --product p1 --variant v1 --title "Linen Shirt" --price 49.00 --quantity 2
//!
//! # Show the cart
//! emp cart show
//!
//! # Save a product to the wishlist
//! emp wishlist add --product p1 --title "Linen Shirt" --price 49.00
//!
//! # Ask the route guard about a path
//! emp guard check /admin/orders --role manager
//! ```
//!
//! State is kept under `EMPORIUM_STORAGE_DIR` (default `.emporium`) unless
//! `--storage-dir` is given, so each invocation sees what the previous one left.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use emporium_client::{CartState, ClientConfig, Storage, Store, StoreState, WishlistState};
use emporium_core::{AccessPolicy, UserRole};
use rust_decimal::Decimal;

mod commands;

use commands::CommandError;

#[derive(Parser)]
#[command(name = "emp")]
#[command(author, version, about = "Emporium cart, wishlist and route guard tools")]
struct Cli {
    /// Directory holding persisted stores (overrides `EMPORIUM_STORAGE_DIR`)
    #[arg(long, global = true)]
    storage_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage the wishlist
    Wishlist {
        #[command(subcommand)]
        action: WishlistAction,
    },
    /// Inspect route guard decisions
    Guard {
        #[command(subcommand)]
        action: GuardAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Add a variant to the cart
    Add {
        /// Product ID
        #[arg(long)]
        product: String,

        /// Variant ID
        #[arg(long)]
        variant: String,

        /// Product title
        #[arg(long)]
        title: String,

        /// Unit price
        #[arg(long)]
        price: Decimal,

        #[arg(long, default_value_t = 1)]
        quantity: u32,

        /// Variant display name
        #[arg(long)]
        variant_name: Option<String>,

        #[arg(long)]
        color: Option<String>,

        #[arg(long)]
        size: Option<String>,

        /// Image URL
        #[arg(long)]
        image: Option<String>,
    },
    /// Remove a variant from the cart
    Remove { variant: String },
    /// Set the quantity of a variant (zero or less removes it)
    Update {
        variant: String,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove every item
    Clear,
    /// Print the cart
    Show,
}

#[derive(Subcommand)]
enum WishlistAction {
    /// Save a product
    Add {
        /// Product ID
        #[arg(long)]
        product: String,

        /// Product title
        #[arg(long)]
        title: String,

        #[arg(long)]
        price: Decimal,

        /// URL handle (defaults to the product ID)
        #[arg(long)]
        handle: Option<String>,
    },
    /// Remove a saved product
    Remove { product: String },
    /// Exit 0 if the product is saved, 1 otherwise
    Contains { product: String },
    /// Remove every saved product
    Clear,
    /// Print the wishlist
    Show,
}

#[derive(Subcommand)]
enum GuardAction {
    /// Show the decision for a path
    Check {
        path: String,

        /// Role of the signed-in visitor (anonymous if omitted)
        #[arg(long)]
        role: Option<UserRole>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr; stdout carries command output
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "emporium_cli=info,emporium_client=info".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("Command failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, CommandError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(dir) = cli.storage_dir {
        config.storage_dir = dir;
    }

    match cli.command {
        Commands::Cart { action } => {
            let cart = open::<CartState>(&config);
            let result = match action {
                CartAction::Add {
                    product,
                    variant,
                    title,
                    price,
                    quantity,
                    variant_name,
                    color,
                    size,
                    image,
                } => commands::cart::add(
                    &cart,
                    commands::cart::AddItem {
                        product,
                        variant,
                        title,
                        price,
                        quantity,
                        variant_name,
                        color,
                        size,
                        image,
                    },
                ),
                CartAction::Remove { variant } => {
                    commands::cart::remove(&cart, &variant);
                    Ok(())
                }
                CartAction::Update { variant, quantity } => {
                    commands::cart::update(&cart, &variant, quantity);
                    Ok(())
                }
                CartAction::Clear => {
                    commands::cart::clear(&cart);
                    Ok(())
                }
                CartAction::Show => {
                    commands::cart::show(&cart);
                    Ok(())
                }
            };
            cart.shutdown().await?;
            result.map(|()| ExitCode::SUCCESS)
        }
        Commands::Wishlist { action } => {
            let wishlist = open::<WishlistState>(&config);
            let result = match action {
                WishlistAction::Add {
                    product,
                    title,
                    price,
                    handle,
                } => commands::wishlist::add(&wishlist, product, title, price, handle)
                    .map(|()| ExitCode::SUCCESS),
                WishlistAction::Remove { product } => {
                    commands::wishlist::remove(&wishlist, &product);
                    Ok(ExitCode::SUCCESS)
                }
                WishlistAction::Contains { product } => {
                    if commands::wishlist::contains(&wishlist, &product) {
                        Ok(ExitCode::SUCCESS)
                    } else {
                        Ok(ExitCode::FAILURE)
                    }
                }
                WishlistAction::Clear => {
                    commands::wishlist::clear(&wishlist);
                    Ok(ExitCode::SUCCESS)
                }
                WishlistAction::Show => {
                    commands::wishlist::show(&wishlist);
                    Ok(ExitCode::SUCCESS)
                }
            };
            wishlist.shutdown().await?;
            result
        }
        Commands::Guard {
            action: GuardAction::Check { path, role },
        } => {
            commands::guard::check(&AccessPolicy::default(), &path, role);
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Open a store persisted under the configured storage directory.
fn open<S: StoreState>(config: &ClientConfig) -> Store<S> {
    let storage: Arc<dyn Storage> = Arc::new(config.file_storage());
    tracing::debug!(dir = %config.storage_dir.display(), key = S::STORAGE_KEY, "opening store");
    Store::open(storage, config.store_options())
}
