//! Cart persistence across simulated process restarts.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;
use std::time::Duration;

use emporium_client::{CartStore, FileStorage, Storage, Store, StoreOptions};
use emporium_core::VariantId;
use emporium_integration_tests::cart_entry;
use rust_decimal::Decimal;

fn open(dir: &std::path::Path, debounce: Duration) -> CartStore {
    let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(dir));
    Store::open(storage, StoreOptions { debounce })
}

#[tokio::test]
async fn test_rehydrated_cart_matches_last_write() {
    let dir = tempfile::tempdir().unwrap();

    let cart = open(dir.path(), Duration::from_millis(250));
    cart.add_item(cart_entry("v1", 1000, 3));
    cart.add_item(cart_entry("v2", 500, 2));
    cart.add_item(cart_entry("v1", 1000, 1));
    cart.update_quantity(&VariantId::new("v2"), 5);
    cart.open_cart();
    let before = cart.items();
    cart.shutdown().await.unwrap();
    drop(cart);

    let restarted = open(dir.path(), Duration::from_millis(250));
    assert_eq!(restarted.items(), before);
    assert_eq!(restarted.total_items(), 9);
    assert_eq!(restarted.total_price(), Decimal::new(6500, 2));
    assert!(!restarted.is_open());
}

#[tokio::test(start_paused = true)]
async fn test_debounced_writes_converge_to_final_state() {
    let dir = tempfile::tempdir().unwrap();
    let cart = open(dir.path(), Duration::from_millis(100));

    for n in 1..=20 {
        cart.update_quantity(&VariantId::new("v1"), 0);
        cart.add_item(cart_entry("v1", 250, n));
    }
    // Let the writer wake up and finish its blocking write
    tokio::time::sleep(Duration::from_millis(500)).await;
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    let final_items = cart.items();
    cart.shutdown().await.unwrap();

    let restarted = open(dir.path(), Duration::from_millis(100));
    assert_eq!(restarted.items(), final_items);
    assert_eq!(restarted.quantity_of(&VariantId::new("v1")), 20);
}

#[tokio::test]
async fn test_corrupt_file_starts_empty_and_recovers() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("cart-storage.json"), "{ not json").unwrap();

    let cart = open(dir.path(), Duration::ZERO);
    assert!(cart.items().is_empty());

    cart.add_item(cart_entry("v1", 999, 1));
    cart.flush().await.unwrap();
    drop(cart);

    let restarted = open(dir.path(), Duration::ZERO);
    assert_eq!(restarted.items().len(), 1);
    assert_eq!(restarted.items()[0].unit_price, Decimal::new(999, 2));
}

#[tokio::test]
async fn test_blob_holds_only_items() {
    let dir = tempfile::tempdir().unwrap();
    let cart = open(dir.path(), Duration::ZERO);
    cart.add_item(cart_entry("v1", 100, 1));
    cart.toggle_cart();
    cart.shutdown().await.unwrap();

    let raw = std::fs::read_to_string(dir.path().join("cart-storage.json")).unwrap();
    let blob: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(blob["version"], 1);
    let state = blob["state"].as_object().unwrap();
    assert_eq!(state.keys().collect::<Vec<_>>(), ["items"]);
    assert_eq!(state["items"][0]["variant_id"], "v1");
}
