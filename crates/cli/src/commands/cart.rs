//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! emp cart add --product p1 --variant v1 --title "Linen Shirt" --price 49.00 --quantity 2
//! emp cart update v1 3
//! emp cart remove v1
//! emp cart show
//! ```

use std::fmt::Write as _;

use emporium_client::{CartState, CartStore, NewCartEntry, ProductSnapshot, VariantSnapshot};
use emporium_core::{CurrencyCode, Price, VariantId};
use rust_decimal::Decimal;

use super::{CommandError, Result};

/// Largest unit price accepted on the command line.
///
/// Keeps any cart built from the CLI far below the range where totals
/// would saturate.
pub const MAX_UNIT_PRICE: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Item to add, as given on the command line.
#[derive(Debug, Clone)]
pub struct AddItem {
    pub product: String,
    pub variant: String,
    pub title: String,
    pub price: Decimal,
    pub quantity: u32,
    pub variant_name: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
    pub image: Option<String>,
}

impl AddItem {
    fn into_entry(self) -> Result<NewCartEntry> {
        if self.price.is_sign_negative() {
            return Err(CommandError::NegativePrice(self.price));
        }
        if self.price > MAX_UNIT_PRICE {
            return Err(CommandError::PriceTooLarge(self.price));
        }

        let mut product = ProductSnapshot::new(self.product, self.title, self.price);
        product.image = self.image;

        let mut variant = VariantSnapshot::new(
            self.variant,
            product.id.clone(),
            self.variant_name.unwrap_or_else(|| "Default".to_string()),
            self.price,
        );
        variant.color = self.color;
        variant.size = self.size;
        product.variants.push(variant.clone());

        Ok(NewCartEntry::new(product, variant, self.quantity))
    }
}

/// Add an item to the cart.
#[allow(clippy::print_stdout)]
pub fn add(cart: &CartStore, item: AddItem) -> Result<()> {
    let entry = item.into_entry()?;
    let variant_id = entry.variant_id.clone();
    cart.add_item(entry);
    println!(
        "{} x{} in cart",
        variant_id,
        cart.quantity_of(&variant_id)
    );
    Ok(())
}

/// Remove a variant from the cart.
#[allow(clippy::print_stdout)]
pub fn remove(cart: &CartStore, variant: &str) {
    let variant_id = VariantId::new(variant);
    if cart.contains_variant(&variant_id) {
        cart.remove_item(&variant_id);
        println!("Removed {variant_id}");
    } else {
        println!("{variant_id} is not in the cart");
    }
}

/// Set the quantity of a variant; zero or less removes it.
#[allow(clippy::print_stdout)]
pub fn update(cart: &CartStore, variant: &str, quantity: i64) {
    let variant_id = VariantId::new(variant);
    if !cart.contains_variant(&variant_id) {
        println!("{variant_id} is not in the cart");
        return;
    }
    cart.update_quantity(&variant_id, quantity);
    match cart.quantity_of(&variant_id) {
        0 => println!("Removed {variant_id}"),
        n => println!("{variant_id} x{n} in cart"),
    }
}

/// Remove every item.
#[allow(clippy::print_stdout)]
pub fn clear(cart: &CartStore) {
    cart.clear_cart();
    println!("Cart cleared");
}

/// Print the cart contents.
#[allow(clippy::print_stdout)]
pub fn show(cart: &CartStore) {
    print!("{}", render(&cart.snapshot(), CurrencyCode::default()));
}

/// Render the cart as text.
#[must_use]
pub fn render(state: &CartState, currency: CurrencyCode) -> String {
    if state.is_empty() {
        return "Cart is empty\n".to_string();
    }

    let money = |amount: Decimal| Price::new(amount, currency).display();
    let mut out = format!(
        "Cart ({} items, {} units)\n",
        state.items().len(),
        state.total_items()
    );
    for entry in state.items() {
        let mut label = entry.product.title.clone();
        let options: Vec<&str> = [entry.variant.color.as_deref(), entry.variant.size.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        if !options.is_empty() {
            let _ = write!(label, " ({})", options.join(", "));
        }
        let _ = writeln!(
            out,
            "  {:<12} {:<32} x{:<4} {:>10} {:>10}",
            entry.variant_id.as_str(),
            label,
            entry.quantity,
            money(entry.unit_price),
            money(entry.line_total()),
        );
    }
    let _ = writeln!(out, "Subtotal: {}", money(state.total_price()));
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use emporium_client::Store;

    use super::*;

    fn item(variant: &str, price: Decimal, quantity: u32) -> AddItem {
        AddItem {
            product: format!("p-{variant}"),
            variant: variant.to_string(),
            title: "Linen Shirt".to_string(),
            price,
            quantity,
            variant_name: None,
            color: Some("Blue".to_string()),
            size: None,
            image: None,
        }
    }

    #[test]
    fn test_negative_price_rejected() {
        let cart = Store::in_memory();
        let err = add(&cart, item("v1", Decimal::new(-1, 0), 1)).unwrap_err();
        assert!(matches!(err, CommandError::NegativePrice(_)));
        assert!(cart.items().is_empty());
    }

    #[test]
    fn test_huge_price_rejected() {
        let cart = Store::in_memory();
        let err = add(&cart, item("v1", Decimal::MAX / Decimal::TWO, 3)).unwrap_err();
        assert!(matches!(err, CommandError::PriceTooLarge(_)));
        assert!(cart.items().is_empty());

        add(&cart, item("v1", MAX_UNIT_PRICE, u32::MAX)).unwrap();
        assert!(render(&cart.snapshot(), CurrencyCode::USD).contains("Subtotal: $"));
    }

    #[test]
    fn test_render_lists_entries_and_subtotal() {
        let cart: CartStore = Store::in_memory();
        add(&cart, item("v1", Decimal::new(1000, 2), 3)).unwrap();
        add(&cart, item("v2", Decimal::new(500, 2), 2)).unwrap();

        let text = render(&cart.snapshot(), CurrencyCode::USD);
        assert!(text.starts_with("Cart (2 items, 5 units)\n"));
        assert!(text.contains("Linen Shirt (Blue)"));
        assert!(text.contains("$30.00"));
        assert!(text.ends_with("Subtotal: $40.00\n"));
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render(&CartState::default(), CurrencyCode::USD), "Cart is empty\n");
    }
}
