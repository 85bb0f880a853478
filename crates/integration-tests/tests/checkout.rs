//! Checkout: order placement, payment intent and cart reset.

#![allow(clippy::unwrap_used)]

use bookbarn_core::{AddressId, CurrencyCode, OrderId, UserId};
use bookbarn_integration_tests::{TestStorefront, cart_body};
use bookbarn_storefront::ApiError;
use rust_decimal::Decimal;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_checkout_places_order_and_opens_payment() {
    let t = TestStorefront::start().await.unwrap();
    Mock::given(method("GET"))
        .and(path("/users/42/cart"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(cart_body(42, &[(7, 2, 9.99), (8, 1, 5.0)], 24.98)),
        )
        .mount(&t.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/users/42/orders/checkout"))
        .and(body_json(json!({"shippingAddressId": 3, "billingAddressId": 4})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "orderId": 77, "orderDate": "2025-01-02", "orderStatus": "PENDING", "totalAmmount": 24.98
        })))
        .expect(1)
        .mount(&t.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/payments/create-intent"))
        .and(body_json(json!({"amount": 2498, "currency": "EUR", "orderId": 77})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"clientSecret": "pi_1_secret_x"})))
        .expect(1)
        .mount(&t.server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/users/42/cart"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&t.server)
        .await;

    t.ctx.login("t1", UserId::new(42)).await;
    let receipt = t
        .ctx
        .checkout(AddressId::new(3), Some(AddressId::new(4)))
        .await
        .unwrap();

    assert_eq!(receipt.order_id, OrderId::new(77));
    assert_eq!(receipt.amount, Decimal::new(2498, 2));
    assert_eq!(receipt.currency, CurrencyCode::EUR);
    assert_eq!(receipt.payment.client_secret, "pi_1_secret_x");
    assert_eq!(t.ctx.cart().unwrap().item_count(), 0);
}

#[tokio::test]
async fn test_failed_order_keeps_cart_and_skips_payment() {
    let t = TestStorefront::start().await.unwrap();
    Mock::given(method("GET"))
        .and(path("/users/42/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart_body(42, &[(7, 1, 9.99)], 9.99)))
        .mount(&t.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/users/42/orders/checkout"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({"message": "Out of stock"})))
        .mount(&t.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/payments/create-intent"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&t.server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/users/42/cart"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&t.server)
        .await;

    t.ctx.login("t1", UserId::new(42)).await;
    let err = t.ctx.checkout(AddressId::new(3), None).await.unwrap_err();

    assert_eq!(err.status(), Some(409));
    assert_eq!(err.to_string(), "request failed with status 409: Out of stock");
}

#[tokio::test]
async fn test_checkout_requires_session() {
    let t = TestStorefront::start().await.unwrap();
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&t.server)
        .await;

    let err = t.ctx.checkout(AddressId::new(3), None).await.unwrap_err();
    assert!(matches!(err, ApiError::MissingSession));
}
