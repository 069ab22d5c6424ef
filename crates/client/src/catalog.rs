//! Denormalized catalog snapshots.
//!
//! The catalog collaborator hands these over when a shopper adds something
//! to the cart or wishlist. Stores keep them as-is and never re-fetch, so
//! later catalog edits do not reach entries that already exist.

use emporium_core::{ProductId, VariantId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Display data for a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub handle: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Primary image URL.
    #[serde(default)]
    pub image: Option<String>,
    /// Lowest variant price.
    pub price: Decimal,
    #[serde(default)]
    pub compare_at_price: Option<Decimal>,
    #[serde(default)]
    pub variants: Vec<VariantSnapshot>,
    #[serde(default)]
    pub average_rating: Option<Decimal>,
    #[serde(default)]
    pub review_count: u32,
}

impl ProductSnapshot {
    /// Minimal snapshot with the given identity, title and price.
    #[must_use]
    pub fn new(id: impl Into<ProductId>, title: impl Into<String>, price: Decimal) -> Self {
        let id = id.into();
        Self {
            handle: id.as_str().to_owned(),
            id,
            title: title.into(),
            description: None,
            image: None,
            price,
            compare_at_price: None,
            variants: Vec::new(),
            average_rating: None,
            review_count: 0,
        }
    }

    /// Percentage off the compare-at price, if the product is discounted.
    #[must_use]
    pub fn discount_percent(&self) -> Option<i64> {
        self.compare_at_price
            .filter(|original| *original > self.price)
            .map(|original| emporium_core::discount_percent(original, self.price))
    }
}

/// Display data for one purchasable variant of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantSnapshot {
    pub id: VariantId,
    pub product_id: ProductId,
    pub name: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub compare_at_price: Option<Decimal>,
    #[serde(default)]
    pub stock: u32,
}

impl VariantSnapshot {
    /// Minimal snapshot with the given identity, name and price.
    #[must_use]
    pub fn new(
        id: impl Into<VariantId>,
        product_id: impl Into<ProductId>,
        name: impl Into<String>,
        price: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            product_id: product_id.into(),
            name: name.into(),
            sku: None,
            color: None,
            size: None,
            price,
            compare_at_price: None,
            stock: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discount_percent_only_when_discounted() {
        let mut product = ProductSnapshot::new("p1", "Linen Shirt", Decimal::new(75, 0));
        assert_eq!(product.discount_percent(), None);

        product.compare_at_price = Some(Decimal::new(100, 0));
        assert_eq!(product.discount_percent(), Some(25));

        product.compare_at_price = Some(Decimal::new(50, 0));
        assert_eq!(product.discount_percent(), None);
    }
}
