//! Shopping cart state.
//!
//! Entries are keyed by variant: adding a variant that is already in the
//! cart raises its quantity and keeps the price and display data captured
//! the first time it was added. Quantities are always at least 1; setting a
//! quantity of zero or less removes the entry.
//!
//! Only `items` is persisted. Whether the cart drawer is open is UI state and
//! always starts closed.

use chrono::{DateTime, Utc};
use emporium_core::{CartEntryId, CurrencyCode, Price, ProductId, VariantId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::catalog::{ProductSnapshot, VariantSnapshot};
use crate::store::{Store, StoreState};

/// Storage key of the persisted cart.
pub const CART_STORAGE_KEY: &str = "cart-storage";

/// One line of the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    /// Locally generated identifier.
    pub id: CartEntryId,
    /// Informational; entries are looked up by `variant_id`.
    pub product_id: ProductId,
    /// Variant this line is for. Unique within the cart.
    pub variant_id: VariantId,
    /// Always at least 1.
    pub quantity: u32,
    /// Variant price when the entry was first added.
    pub unit_price: Decimal,
    /// Product display data captured when the entry was first added.
    pub product: ProductSnapshot,
    /// Variant display data captured when the entry was first added.
    pub variant: VariantSnapshot,
    /// When the entry was first added.
    pub created_at: DateTime<Utc>,
    /// Last quantity change.
    pub updated_at: DateTime<Utc>,
}

impl CartEntry {
    /// `unit_price × quantity`, saturating instead of overflowing.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price
            .checked_mul(Decimal::from(self.quantity))
            .unwrap_or_else(|| saturated(self.unit_price))
    }
}

/// The bound an overflowing sum of values with the sign of `value` clamps to.
const fn saturated(value: Decimal) -> Decimal {
    if value.is_sign_negative() {
        Decimal::MIN
    } else {
        Decimal::MAX
    }
}

/// Data for adding a variant to the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCartEntry {
    /// Product the variant belongs to.
    pub product_id: ProductId,
    /// Variant to add or merge into.
    pub variant_id: VariantId,
    /// Units to add. Zero adds nothing.
    pub quantity: u32,
    /// Price per unit; ignored when merging into an existing entry.
    pub unit_price: Decimal,
    /// Product display data.
    pub product: ProductSnapshot,
    /// Variant display data.
    pub variant: VariantSnapshot,
}

impl NewCartEntry {
    /// Build an entry from catalog snapshots, pricing it at the variant's current price.
    #[must_use]
    pub fn new(product: ProductSnapshot, variant: VariantSnapshot, quantity: u32) -> Self {
        Self {
            product_id: product.id.clone(),
            variant_id: variant.id.clone(),
            quantity,
            unit_price: variant.price,
            product,
            variant,
        }
    }
}

/// Persisted projection of [`CartState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedCart {
    /// Cart entries in insertion order.
    pub items: Vec<CartEntry>,
}

/// Cart contents plus drawer visibility.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartState {
    items: Vec<CartEntry>,
    is_open: bool,
}

impl CartState {
    /// Entries in the order they were first added.
    #[must_use]
    pub fn items(&self) -> &[CartEntry] {
        &self.items
    }

    /// Whether the cart drawer is open.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.is_open
    }

    /// Whether the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Entry for `variant_id`, if present.
    #[must_use]
    pub fn entry(&self, variant_id: &VariantId) -> Option<&CartEntry> {
        self.items.iter().find(|e| &e.variant_id == variant_id)
    }

    /// Sum of quantities over all entries.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|e| u64::from(e.quantity)).sum()
    }

    /// Sum of `unit_price × quantity` over all entries.
    ///
    /// Saturates at `Decimal::MAX` (or `Decimal::MIN`) instead of overflowing.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.items
            .iter()
            .map(CartEntry::line_total)
            .fold(Decimal::ZERO, |total, line| {
                total.checked_add(line).unwrap_or_else(|| saturated(line))
            })
    }

    pub(crate) fn add_item(&mut self, new: NewCartEntry, now: DateTime<Utc>) -> bool {
        if new.quantity == 0 {
            return false;
        }

        if let Some(existing) = self.items.iter_mut().find(|e| e.variant_id == new.variant_id) {
            existing.quantity = existing.quantity.saturating_add(new.quantity);
            existing.updated_at = now;
            return true;
        }

        self.items.push(CartEntry {
            id: CartEntryId::generate(),
            product_id: new.product_id,
            variant_id: new.variant_id,
            quantity: new.quantity,
            unit_price: new.unit_price,
            product: new.product,
            variant: new.variant,
            created_at: now,
            updated_at: now,
        });
        true
    }

    pub(crate) fn remove_item(&mut self, variant_id: &VariantId) -> bool {
        let before = self.items.len();
        self.items.retain(|e| &e.variant_id != variant_id);
        self.items.len() != before
    }

    pub(crate) fn update_quantity(
        &mut self,
        variant_id: &VariantId,
        quantity: i64,
        now: DateTime<Utc>,
    ) -> bool {
        let Ok(quantity @ 1..) = u32::try_from(quantity.clamp(0, i64::from(u32::MAX))) else {
            return self.remove_item(variant_id);
        };

        match self.items.iter_mut().find(|e| &e.variant_id == variant_id) {
            Some(entry) if entry.quantity != quantity => {
                entry.quantity = quantity;
                entry.updated_at = now;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn clear(&mut self) -> bool {
        if self.items.is_empty() {
            return false;
        }
        self.items.clear();
        true
    }

    pub(crate) fn set_open(&mut self, open: bool) -> bool {
        if self.is_open == open {
            return false;
        }
        self.is_open = open;
        true
    }
}

impl StoreState for CartState {
    const STORAGE_KEY: &'static str = CART_STORAGE_KEY;
    type Persisted = PersistedCart;

    fn project(&self) -> PersistedCart {
        PersistedCart {
            items: self.items.clone(),
        }
    }

    /// Restore persisted items, dropping any that break the cart invariants
    /// (zero quantity, repeated variant).
    fn restore(persisted: PersistedCart) -> Self {
        let mut items: Vec<CartEntry> = Vec::with_capacity(persisted.items.len());
        for entry in persisted.items {
            if entry.quantity > 0 && !items.iter().any(|e| e.variant_id == entry.variant_id) {
                items.push(entry);
            }
        }
        Self {
            items,
            is_open: false,
        }
    }
}

/// Cart commands and derived values.
impl Store<CartState> {
    /// Add a variant, merging into an existing entry for the same variant.
    #[instrument(level = "debug", skip(self, entry), fields(variant = %entry.variant_id, quantity = entry.quantity))]
    pub fn add_item(&self, entry: NewCartEntry) {
        let now = Utc::now();
        self.apply("add_item", |state| state.add_item(entry, now));
    }

    /// Remove the entry for `variant_id`, if any.
    #[instrument(level = "debug", skip(self, variant_id), fields(variant = %variant_id))]
    pub fn remove_item(&self, variant_id: &VariantId) {
        self.apply("remove_item", |state| state.remove_item(variant_id));
    }

    /// Set the quantity for `variant_id`; zero or less removes the entry.
    #[instrument(level = "debug", skip(self, variant_id), fields(variant = %variant_id))]
    pub fn update_quantity(&self, variant_id: &VariantId, quantity: i64) {
        let now = Utc::now();
        self.apply("update_quantity", |state| {
            state.update_quantity(variant_id, quantity, now)
        });
    }

    /// Remove every entry.
    pub fn clear_cart(&self) {
        self.apply("clear_cart", CartState::clear);
    }

    /// Show the cart drawer.
    pub fn open_cart(&self) {
        self.apply("open_cart", |state| state.set_open(true));
    }

    /// Hide the cart drawer.
    pub fn close_cart(&self) {
        self.apply("close_cart", |state| state.set_open(false));
    }

    /// Flip the cart drawer.
    pub fn toggle_cart(&self) {
        self.apply("toggle_cart", |state| {
            let open = !state.is_open();
            state.set_open(open)
        });
    }

    /// Current entries.
    #[must_use]
    pub fn items(&self) -> Vec<CartEntry> {
        self.snapshot().items().to_vec()
    }

    /// Whether the cart drawer is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.snapshot().is_open()
    }

    /// Whether `variant_id` is in the cart.
    #[must_use]
    pub fn contains_variant(&self, variant_id: &VariantId) -> bool {
        self.snapshot().entry(variant_id).is_some()
    }

    /// Quantity of `variant_id` in the cart (0 if absent).
    #[must_use]
    pub fn quantity_of(&self, variant_id: &VariantId) -> u32 {
        self.snapshot().entry(variant_id).map_or(0, |e| e.quantity)
    }

    /// Sum of quantities.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.snapshot().total_items()
    }

    /// Sum of `unit_price × quantity`.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.snapshot().total_price()
    }

    /// Total price for display in `currency`.
    #[must_use]
    pub fn subtotal(&self, currency: CurrencyCode) -> Price {
        Price::new(self.total_price(), currency)
    }
}
