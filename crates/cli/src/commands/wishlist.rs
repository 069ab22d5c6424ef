//! Wishlist commands.

use std::fmt::Write as _;

use emporium_client::{ProductSnapshot, WishlistState, WishlistStore};
use emporium_core::{CurrencyCode, Price, ProductId};
use rust_decimal::Decimal;

use super::{CommandError, Result};

/// Save a product.
#[allow(clippy::print_stdout)]
pub fn add(
    wishlist: &WishlistStore,
    product: String,
    title: String,
    price: Decimal,
    handle: Option<String>,
) -> Result<()> {
    if price.is_sign_negative() {
        return Err(CommandError::NegativePrice(price));
    }
    let mut snapshot = ProductSnapshot::new(product, title, price);
    if let Some(handle) = handle {
        snapshot.handle = handle;
    }
    let id = snapshot.id.clone();
    if wishlist.is_in_wishlist(&id) {
        println!("{id} is already saved");
    } else {
        wishlist.add_item(snapshot);
        println!("Saved {id}");
    }
    Ok(())
}

/// Remove a saved product.
#[allow(clippy::print_stdout)]
pub fn remove(wishlist: &WishlistStore, product: &str) {
    let id = ProductId::new(product);
    if wishlist.is_in_wishlist(&id) {
        wishlist.remove_item(&id);
        println!("Removed {id}");
    } else {
        println!("{id} is not saved");
    }
}

/// Report whether a product is saved. Returns the answer for the exit code.
#[allow(clippy::print_stdout)]
pub fn contains(wishlist: &WishlistStore, product: &str) -> bool {
    let saved = wishlist.is_in_wishlist(&ProductId::new(product));
    println!("{}", if saved { "yes" } else { "no" });
    saved
}

/// Remove every saved product.
#[allow(clippy::print_stdout)]
pub fn clear(wishlist: &WishlistStore) {
    wishlist.clear_wishlist();
    println!("Wishlist cleared");
}

/// Print the saved products.
#[allow(clippy::print_stdout)]
pub fn show(wishlist: &WishlistStore) {
    print!("{}", render(&wishlist.snapshot(), CurrencyCode::default()));
}

/// Render the wishlist as text.
#[must_use]
pub fn render(state: &WishlistState, currency: CurrencyCode) -> String {
    if state.is_empty() {
        return "Wishlist is empty\n".to_string();
    }

    let mut out = format!("Wishlist ({} products)\n", state.len());
    for product in state.items() {
        let price = Price::new(product.price, currency).display();
        let _ = match product.discount_percent() {
            Some(off) => writeln!(out, "  {:<12} {:<32} {price:>10} ({off}% off)", product.id.as_str(), product.title),
            None => writeln!(out, "  {:<12} {:<32} {price:>10}", product.id.as_str(), product.title),
        };
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use emporium_client::Store;

    use super::*;

    #[test]
    fn test_add_twice_keeps_one() {
        let wishlist: WishlistStore = Store::in_memory();
        add(&wishlist, "p1".into(), "Tote".into(), Decimal::new(25, 0), None).unwrap();
        add(&wishlist, "p1".into(), "Tote".into(), Decimal::new(25, 0), None).unwrap();
        assert_eq!(wishlist.len(), 1);
        assert!(contains(&wishlist, "p1"));
        assert!(!contains(&wishlist, "p2"));
    }

    #[test]
    fn test_render() {
        let wishlist: WishlistStore = Store::in_memory();
        add(&wishlist, "p1".into(), "Tote".into(), Decimal::new(25, 0), Some("canvas-tote".into()))
            .unwrap();
        let text = render(&wishlist.snapshot(), CurrencyCode::USD);
        assert!(text.starts_with("Wishlist (1 products)\n"));
        assert!(text.contains("Tote"));
        assert!(text.contains("$25.00"));
        assert_eq!(wishlist.items()[0].handle, "canvas-tote");
    }
}
