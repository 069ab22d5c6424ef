//! Wishlist state: a set of saved products, in the order they were saved.

use emporium_core::ProductId;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::catalog::ProductSnapshot;
use crate::store::{Outcome, Store, StoreState};

/// Storage key of the persisted wishlist.
pub const WISHLIST_STORAGE_KEY: &str = "wishlist-storage";

/// Saved products. No two items share a product id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistState {
    items: Vec<ProductSnapshot>,
}

impl WishlistState {
    /// Saved products, oldest first.
    #[must_use]
    pub fn items(&self) -> &[ProductSnapshot] {
        &self.items
    }

    /// Number of saved products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is saved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether `product_id` is saved.
    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.items.iter().any(|p| &p.id == product_id)
    }

    pub(crate) fn add(&mut self, product: ProductSnapshot) -> bool {
        if self.contains(&product.id) {
            return false;
        }
        self.items.push(product);
        true
    }

    pub(crate) fn remove(&mut self, product_id: &ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|p| &p.id != product_id);
        self.items.len() != before
    }

    pub(crate) fn clear(&mut self) -> bool {
        if self.items.is_empty() {
            return false;
        }
        self.items.clear();
        true
    }
}

impl StoreState for WishlistState {
    const STORAGE_KEY: &'static str = WISHLIST_STORAGE_KEY;
    type Persisted = Self;

    fn project(&self) -> Self {
        self.clone()
    }

    fn restore(persisted: Self) -> Self {
        let mut state = Self::default();
        for product in persisted.items {
            state.add(product);
        }
        state
    }
}

/// Wishlist commands and queries.
impl Store<WishlistState> {
    /// Save a product.
    ///
    /// Saving one that is already saved changes nothing and does not notify
    /// subscribers.
    #[instrument(level = "debug", skip(self, product), fields(product = %product.id))]
    pub fn add_item(&self, product: ProductSnapshot) {
        self.apply("add_item", |state| {
            if state.add(product) {
                Outcome::Changed
            } else {
                Outcome::Silent
            }
        });
    }

    /// Remove a saved product, if present.
    #[instrument(level = "debug", skip(self, product_id), fields(product = %product_id))]
    pub fn remove_item(&self, product_id: &ProductId) {
        self.apply("remove_item", |state| state.remove(product_id));
    }

    /// Whether `product_id` is saved.
    #[must_use]
    pub fn is_in_wishlist(&self, product_id: &ProductId) -> bool {
        self.snapshot().contains(product_id)
    }

    /// Remove every saved product.
    pub fn clear_wishlist(&self) {
        self.apply("clear_wishlist", WishlistState::clear);
    }

    /// Saved products, oldest first.
    #[must_use]
    pub fn items(&self) -> Vec<ProductSnapshot> {
        self.snapshot().items().to_vec()
    }

    /// Number of saved products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    /// Whether nothing is saved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }
}
