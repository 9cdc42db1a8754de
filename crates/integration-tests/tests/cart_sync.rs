//! Cart mutations mirrored to the backend, and token-triggered syncs.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::json;
use shopfront_core::{ProductId, Size};
use shopfront_integration_tests::{Behavior, MockBackend, NOT_AUTHORIZED, product};
use shopfront_storefront::ShopState;
use shopfront_storefront::notify::{NotificationLevel, drain};

fn id(s: &str) -> ProductId {
    ProductId::parse(s).unwrap()
}

fn size(s: &str) -> Size {
    Size::parse(s).unwrap()
}

async fn signed_in(backend: &MockBackend, token: &str) -> ShopState {
    let shop = backend.shop();
    shop.set_token(SecretString::from(token.to_string()))
        .unwrap()
        .wait()
        .await;
    shop
}

#[tokio::test]
async fn test_signed_out_add_stays_local() {
    let backend = MockBackend::start(vec![product("p1", 50)]).await;
    let shop = backend.shop();

    let mirror = shop.add_to_cart(&id("p1"), Some("M")).unwrap();

    assert!(mirror.is_none());
    assert_eq!(shop.cart_count(), 1);
    assert!(backend.requests_to("/api/cart/add").is_empty());
}

#[tokio::test]
async fn test_add_is_mirrored_with_token_header() {
    let backend = MockBackend::start(vec![product("p1", 50)]).await;
    let shop = signed_in(&backend, "tok-1").await;

    shop.add_to_cart(&id("p1"), Some("M"))
        .unwrap()
        .unwrap()
        .wait()
        .await;

    let adds = backend.requests_to("/api/cart/add");
    assert_eq!(adds.len(), 1);
    assert_eq!(adds[0].token.as_deref(), Some("tok-1"));
    assert_eq!(adds[0].body, json!({ "itemId": "p1", "size": "M" }));
    assert_eq!(backend.cart("tok-1"), json!({ "p1": { "M": 1 } }));
}

#[tokio::test]
async fn test_update_is_mirrored() {
    let backend = MockBackend::start(vec![product("p1", 50)]).await;
    let shop = signed_in(&backend, "tok-1").await;
    shop.add_to_cart(&id("p1"), Some("L"))
        .unwrap()
        .unwrap()
        .wait()
        .await;

    shop.update_quantity(&id("p1"), &size("L"), 4)
        .unwrap()
        .unwrap()
        .wait()
        .await;

    let updates = backend.requests_to("/api/cart/update");
    assert_eq!(updates.len(), 1);
    assert_eq!(
        updates[0].body,
        json!({ "itemId": "p1", "size": "L", "quantity": 4 })
    );
    assert_eq!(shop.cart_count(), 4);
    assert_eq!(backend.cart("tok-1"), json!({ "p1": { "L": 4 } }));
}

#[tokio::test]
async fn test_missing_line_update_sends_nothing() {
    let backend = MockBackend::start(vec![product("p1", 50)]).await;
    let shop = signed_in(&backend, "tok-1").await;

    assert!(shop.update_quantity(&id("p1"), &size("M"), 2).is_err());

    assert!(backend.requests_to("/api/cart/update").is_empty());
}

#[tokio::test]
async fn test_failed_mirror_keeps_local_change() {
    let backend = MockBackend::start(vec![product("p1", 50)]).await;
    let shop = signed_in(&backend, "tok-1").await;
    let mut notes = shop.notifier().subscribe();
    backend.set_behavior(Behavior::Fail(503));

    shop.add_to_cart(&id("p1"), Some("M"))
        .unwrap()
        .unwrap()
        .wait()
        .await;

    assert_eq!(shop.cart_count(), 1);
    let notes = drain(&mut notes);
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].level, NotificationLevel::Error);
    assert_eq!(notes[0].message, "Request failed with status code 503");
}

#[tokio::test]
async fn test_rejected_mirror_surfaces_backend_message() {
    let backend = MockBackend::start(vec![product("p1", 50)]).await;
    let shop = signed_in(&backend, "tok-1").await;
    let mut notes = shop.notifier().subscribe();
    backend.set_behavior(Behavior::Reject(NOT_AUTHORIZED.to_string()));

    shop.add_to_cart(&id("p1"), Some("M"))
        .unwrap()
        .unwrap()
        .wait()
        .await;

    assert_eq!(shop.cart_count(), 1);
    assert_eq!(drain(&mut notes)[0].message, NOT_AUTHORIZED);
}

#[tokio::test]
async fn test_failed_update_mirror_keeps_local_quantity() {
    let backend = MockBackend::start(vec![product("p1", 50)]).await;
    let shop = signed_in(&backend, "tok-1").await;
    shop.add_to_cart(&id("p1"), Some("M"))
        .unwrap()
        .unwrap()
        .wait()
        .await;
    let mut notes = shop.notifier().subscribe();
    backend.set_behavior(Behavior::Fail(500));

    shop.update_quantity(&id("p1"), &size("M"), 6)
        .unwrap()
        .unwrap()
        .wait()
        .await;

    assert_eq!(shop.cart_count(), 6);
    assert_eq!(backend.cart("tok-1"), json!({ "p1": { "M": 1 } }));
    let notes = drain(&mut notes);
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].level, NotificationLevel::Error);
    assert_eq!(notes[0].message, "Request failed with status code 500");
}

#[tokio::test]
async fn test_rejected_update_mirror_keeps_local_removal() {
    let backend = MockBackend::start(vec![product("p1", 50)]).await;
    let shop = signed_in(&backend, "tok-1").await;
    shop.add_to_cart(&id("p1"), Some("M"))
        .unwrap()
        .unwrap()
        .wait()
        .await;
    let mut notes = shop.notifier().subscribe();
    backend.set_behavior(Behavior::Reject(NOT_AUTHORIZED.to_string()));

    shop.update_quantity(&id("p1"), &size("M"), 0)
        .unwrap()
        .unwrap()
        .wait()
        .await;

    assert!(shop.cart_items().is_empty());
    let notes = drain(&mut notes);
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].message, NOT_AUTHORIZED);
}

#[tokio::test]
async fn test_token_change_replaces_cart_wholesale() {
    let backend = MockBackend::start(vec![product("p1", 50), product("p9", 20)]).await;
    backend.set_cart("tok-1", json!({ "p9": { "L": 3 } }));
    let shop = backend.shop();
    shop.add_to_cart(&id("p1"), Some("M")).unwrap();
    shop.add_to_cart(&id("p1"), Some("S")).unwrap();
    assert_eq!(shop.cart_count(), 2);

    shop.set_token(SecretString::from("tok-1"))
        .unwrap()
        .wait()
        .await;

    let cart = shop.cart_items();
    assert_eq!(shop.cart_count(), 3);
    assert_eq!(cart.quantity(&id("p9"), &size("L")), 3);
    assert_eq!(cart.quantity(&id("p1"), &size("M")), 0);
    let gets = backend.requests_to("/api/cart/get");
    assert_eq!(gets.len(), 1);
    assert_eq!(gets[0].token.as_deref(), Some("tok-1"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_storage_mirror_ends_on_latest_cart() {
    let backend = MockBackend::start(vec![product("p1", 50)]).await;
    backend.set_cart("tok-1", json!({ "p1": { "L": 5 } }));
    let shop = backend.shop();

    let sync = shop.set_token(SecretString::from("tok-1")).unwrap();
    let mut mirrors = Vec::new();
    for _ in 0..20 {
        if let Some(mirror) = shop.add_to_cart(&id("p1"), Some("M")).unwrap() {
            mirrors.push(mirror);
        }
    }
    sync.wait().await;
    for mirror in mirrors {
        mirror.wait().await;
    }

    assert_eq!(shop.storage().cart(), shop.cart_items());
}

#[tokio::test]
async fn test_same_token_does_not_resync() {
    let backend = MockBackend::start(Vec::new()).await;
    let shop = signed_in(&backend, "tok-1").await;

    assert!(shop.set_token(SecretString::from("tok-1")).is_none());
    assert_eq!(backend.requests_to("/api/cart/get").len(), 1);
}

#[tokio::test]
async fn test_sync_drops_zero_quantities() {
    let backend = MockBackend::start(vec![product("p1", 50)]).await;
    backend.set_cart("tok-1", json!({ "p1": { "M": 0, "L": 2 } }));

    let shop = signed_in(&backend, "tok-1").await;
    shop.load_catalog().await.unwrap();

    assert_eq!(shop.cart_count(), 2);
    assert_eq!(shop.cart_items().lines().count(), 1);
    assert_eq!(shop.cart_lines().len(), 1);
}

#[tokio::test]
async fn test_rejected_sync_keeps_local_cart_quietly() {
    let backend = MockBackend::start(vec![product("p1", 50)]).await;
    backend.set_behavior(Behavior::Reject(NOT_AUTHORIZED.to_string()));
    let shop = backend.shop();
    shop.add_to_cart(&id("p1"), Some("M")).unwrap();
    let mut notes = shop.notifier().subscribe();

    shop.set_token(SecretString::from("tok-1"))
        .unwrap()
        .wait()
        .await;

    assert_eq!(shop.cart_count(), 1);
    assert!(drain(&mut notes).is_empty());
}

#[tokio::test]
async fn test_synced_cart_prices_against_catalog() {
    let backend = MockBackend::start(vec![product("p1", 100)]).await;
    backend.set_cart("tok-1", json!({ "p1": { "M": 2 } }));
    let shop = backend.shop();
    shop.load_catalog().await.unwrap();
    shop.set_token(SecretString::from("tok-1"))
        .unwrap()
        .wait()
        .await;

    assert!(shop.apply_promo_code("SAVE10").accepted);

    assert_eq!(shop.cart_amount(), Decimal::from(180));
    let totals = shop.cart_totals();
    assert_eq!(totals.shipping, Decimal::from(10));
    assert_eq!(totals.total, Decimal::from(190));
}
