//! Wishlist persistence and independence from the cart blob.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use emporium_client::{
    CartStore, MemoryStorage, ProductSnapshot, Storage, Store, StoreOptions, WishlistStore,
};
use emporium_core::ProductId;
use emporium_integration_tests::cart_entry;
use rust_decimal::Decimal;

fn product(id: &str) -> ProductSnapshot {
    let mut product = ProductSnapshot::new(id, format!("Product {id}"), Decimal::new(4500, 2));
    product.compare_at_price = Some(Decimal::new(6000, 2));
    product.image = Some(format!("https://cdn.example/{id}.jpg"));
    product
}

#[tokio::test]
async fn test_wishlist_round_trips_every_field() {
    let dir = tempfile::tempdir().unwrap();
    let storage: Arc<dyn Storage> = Arc::new(emporium_client::FileStorage::new(dir.path()));

    let wishlist: WishlistStore = Store::open(Arc::clone(&storage), StoreOptions::default());
    wishlist.add_item(product("p1"));
    wishlist.add_item(product("p2"));
    wishlist.add_item(product("p1"));
    wishlist.remove_item(&ProductId::new("p2"));
    let saved = wishlist.items();
    wishlist.shutdown().await.unwrap();

    let restarted: WishlistStore = Store::open(storage, StoreOptions::default());
    assert_eq!(restarted.items(), saved);
    assert!(restarted.is_in_wishlist(&ProductId::new("p1")));
    assert!(!restarted.is_in_wishlist(&ProductId::new("p2")));
}

#[tokio::test]
async fn test_cart_and_wishlist_use_separate_blobs() {
    let storage = MemoryStorage::new();
    let shared: Arc<dyn Storage> = Arc::new(storage.clone());

    let cart: CartStore = Store::open(Arc::clone(&shared), StoreOptions::default());
    let wishlist: WishlistStore = Store::open(Arc::clone(&shared), StoreOptions::default());
    cart.add_item(cart_entry("v1", 100, 1));
    wishlist.add_item(product("p1"));
    cart.shutdown().await.unwrap();
    wishlist.shutdown().await.unwrap();

    assert!(storage.get("cart-storage").is_some());
    assert!(storage.get("wishlist-storage").is_some());

    wishlist.clear_wishlist();
    wishlist.flush().await.unwrap();

    let cart: CartStore = Store::open(Arc::clone(&shared), StoreOptions::default());
    let wishlist: WishlistStore = Store::open(shared, StoreOptions::default());
    assert_eq!(cart.items().len(), 1);
    assert!(wishlist.is_empty());
}
