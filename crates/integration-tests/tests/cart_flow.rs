//! Cart and wishlist stores driven through the context.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use bookbarn_core::{ProductId, UserId};
use bookbarn_integration_tests::{TestStorefront, cart_body, wishlist_body};
use bookbarn_storefront::{StoreOutcome, StoreStatus};
use rust_decimal::Decimal;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_add_then_remove_mirrors_backend() {
    let t = TestStorefront::start().await.unwrap();
    Mock::given(method("POST"))
        .and(path("/users/42/cart"))
        .and(header("authorization", "Bearer t1"))
        .and(body_json(json!({"productId": 7, "quantity": 2})))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart_body(42, &[(7, 2, 9.99)], 19.98)))
        .expect(1)
        .mount(&t.server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/users/42/cart/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart_body(42, &[], 0.0)))
        .expect(1)
        .mount(&t.server)
        .await;

    t.ctx.login("t1", UserId::new(42)).await;
    let session = t.ctx.session().current().unwrap();
    assert_eq!(session.user_id(), UserId::new(42));

    let cart = t.ctx.cart().unwrap();
    assert_eq!(cart.add(ProductId::new(7), 2).await, StoreOutcome::Applied);

    let snapshot = cart.snapshot();
    let data = snapshot.data.unwrap();
    assert_eq!(data.items.len(), 1);
    assert_eq!(data.items[0].product_id, ProductId::new(7));
    assert_eq!(data.items[0].quantity, 2);
    assert_eq!(data.items[0].price, Decimal::new(999, 2));
    assert_eq!(data.total_price, Decimal::new(1998, 2));
    assert_eq!(snapshot.status, StoreStatus::Ready);

    assert_eq!(cart.remove(ProductId::new(7)).await, StoreOutcome::Applied);
    let data = cart.snapshot().data.unwrap();
    assert!(data.items.is_empty());
    assert_eq!(data.total_price, Decimal::ZERO);
}

#[tokio::test]
async fn test_repeated_add_keeps_server_quantity() {
    let t = TestStorefront::start().await.unwrap();
    Mock::given(method("POST"))
        .and(path("/users/42/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart_body(42, &[(7, 1, 9.99)], 9.99)))
        .up_to_n_times(1)
        .mount(&t.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/users/42/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart_body(42, &[(7, 5, 9.99)], 49.95)))
        .mount(&t.server)
        .await;

    t.ctx.login("t1", UserId::new(42)).await;
    let cart = t.ctx.cart().unwrap();
    cart.add(ProductId::new(7), 1).await;
    cart.add(ProductId::new(7), 1).await;

    // The backend said 5; the store does not add 1 + 1 itself.
    assert_eq!(cart.item_count(), 5);
    assert_eq!(cart.total_price(), Decimal::new(4995, 2));
}

#[tokio::test]
async fn test_login_fetches_cart_and_wishlist_once() {
    let t = TestStorefront::start().await.unwrap();
    Mock::given(method("GET"))
        .and(path("/users/42/cart"))
        .and(header("authorization", "Bearer t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart_body(42, &[(7, 2, 9.99)], 19.98)))
        .expect(1)
        .mount(&t.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/42/wishlist"))
        .and(header("authorization", "Bearer t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(wishlist_body(9, &[8])))
        .expect(1)
        .mount(&t.server)
        .await;

    t.ctx.login("t1", UserId::new(42)).await;

    let cart = t.ctx.cart().unwrap();
    assert_eq!(cart.snapshot().status, StoreStatus::Ready);
    assert_eq!(cart.item_count(), 2);
    assert!(cart.contains(ProductId::new(7)));
    let wishlist = t.ctx.wishlist().unwrap();
    assert_eq!(wishlist.snapshot().status, StoreStatus::Ready);
    assert!(wishlist.contains(ProductId::new(8)));
}

#[tokio::test]
async fn test_view_without_session_sends_nothing() {
    let t = TestStorefront::start().await.unwrap();

    assert!(t.ctx.cart().is_none());
    assert!(t.ctx.wishlist().is_none());

    // A handle kept from an earlier session skips once signed out.
    t.ctx.login("t1", UserId::new(42)).await;
    let cart = t.ctx.cart().unwrap();
    t.ctx.logout();
    let sent = t.server.received_requests().await.unwrap().len();

    assert_eq!(cart.view().await, StoreOutcome::Skipped);
    assert_eq!(t.server.received_requests().await.unwrap().len(), sent);
    let snapshot = cart.snapshot();
    assert!(snapshot.data.is_none());
    assert!(snapshot.error.is_none());
    assert_eq!(snapshot.status, StoreStatus::Idle);
}

#[tokio::test]
async fn test_failed_view_keeps_previous_snapshot() {
    let t = TestStorefront::start().await.unwrap();
    Mock::given(method("GET"))
        .and(path("/users/42/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart_body(42, &[(3, 1, 4.5)], 4.5)))
        .up_to_n_times(1)
        .mount(&t.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/42/cart"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&t.server)
        .await;

    t.ctx.login("t1", UserId::new(42)).await;
    let cart = t.ctx.cart().unwrap();
    assert!(cart.contains(ProductId::new(3)));
    assert!(matches!(cart.view().await, StoreOutcome::Failed(_)));

    let snapshot = cart.snapshot();
    assert_eq!(snapshot.status, StoreStatus::Error);
    assert!(snapshot.error.is_some());
    assert!(cart.contains(ProductId::new(3)));
}

#[tokio::test]
async fn test_view_is_idempotent() {
    let t = TestStorefront::start().await.unwrap();
    Mock::given(method("GET"))
        .and(path("/users/42/wishlist"))
        .respond_with(ResponseTemplate::new(200).set_body_json(wishlist_body(9, &[1, 2])))
        .expect(2)
        .mount(&t.server)
        .await;

    t.ctx.login("t1", UserId::new(42)).await;
    let wishlist = t.ctx.wishlist().unwrap();
    let first = wishlist.snapshot();
    assert!(wishlist.view().await.is_applied());

    assert_eq!(wishlist.snapshot(), first);
    assert_eq!(wishlist.len(), 2);
}

#[tokio::test]
async fn test_clear_empties_both_stores() {
    let t = TestStorefront::start().await.unwrap();
    Mock::given(method("GET"))
        .and(path("/users/42/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart_body(42, &[(7, 2, 9.99)], 19.98)))
        .mount(&t.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/42/wishlist"))
        .respond_with(ResponseTemplate::new(200).set_body_json(wishlist_body(9, &[7])))
        .mount(&t.server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/users/42/cart"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&t.server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/users/42/wishlist"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&t.server)
        .await;

    t.ctx.login("t1", UserId::new(42)).await;
    let cart = t.ctx.cart().unwrap();
    let wishlist = t.ctx.wishlist().unwrap();
    assert_eq!(cart.item_count(), 2);
    assert!(wishlist.contains(ProductId::new(7)));

    assert!(cart.clear().await.is_applied());
    assert!(wishlist.clear().await.is_applied());
    assert_eq!(cart.item_count(), 0);
    assert!(wishlist.is_empty());
}

#[tokio::test]
async fn test_slow_response_does_not_overwrite_newer_one() {
    let t = TestStorefront::start().await.unwrap();
    Mock::given(method("POST"))
        .and(path("/users/42/cart"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(cart_body(42, &[(7, 1, 9.99)], 9.99))
                .set_delay(Duration::from_millis(400)),
        )
        .mount(&t.server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/users/42/cart/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart_body(42, &[], 0.0)))
        .mount(&t.server)
        .await;

    t.ctx.login("t1", UserId::new(42)).await;
    let cart = t.ctx.cart().unwrap();
    let (added, removed) = tokio::join!(cart.add(ProductId::new(7), 1), async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        cart.remove(ProductId::new(7)).await
    });

    assert_eq!(removed, StoreOutcome::Applied);
    assert_eq!(added, StoreOutcome::Stale);
    assert!(!cart.contains(ProductId::new(7)));
    assert_eq!(cart.snapshot().status, StoreStatus::Ready);
}

#[tokio::test]
async fn test_wishlist_toggle_round_trip() {
    let t = TestStorefront::start().await.unwrap();
    Mock::given(method("POST"))
        .and(path("/users/42/wishlist"))
        .and(body_json(json!({"productId": 5})))
        .respond_with(ResponseTemplate::new(200).set_body_json(wishlist_body(9, &[5])))
        .expect(1)
        .mount(&t.server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/users/42/wishlist/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(wishlist_body(9, &[])))
        .expect(1)
        .mount(&t.server)
        .await;

    t.ctx.login("t1", UserId::new(42)).await;
    let wishlist = t.ctx.wishlist().unwrap();

    assert!(wishlist.toggle(ProductId::new(5)).await.is_applied());
    assert!(wishlist.contains(ProductId::new(5)));
    assert!(wishlist.toggle(ProductId::new(5)).await.is_applied());
    assert!(!wishlist.contains(ProductId::new(5)));
}
