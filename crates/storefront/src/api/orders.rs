//! Order history and checkout.

use bookbarn_core::OrderId;
use reqwest::Method;
use tracing::instrument;

use super::ApiClient;
use super::types::{CheckoutRequest, Order, OrderDetail, PlacedOrder};
use crate::error::Result;
use crate::session::AuthSession;

impl ApiClient {
    /// List the signed-in user's orders.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, auth), fields(user_id = %auth.user_id()))]
    pub async fn orders(&self, auth: &AuthSession) -> Result<Vec<Order>> {
        let url = self.user_endpoint(auth, &["orders"])?;
        self.send(self.request(Method::GET, url, Some(auth))).await
    }

    /// Fetch one order with its addresses.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, auth), fields(user_id = %auth.user_id(), order_id = %order_id))]
    pub async fn order(&self, auth: &AuthSession, order_id: OrderId) -> Result<OrderDetail> {
        let id = order_id.to_string();
        let url = self.user_endpoint(auth, &["orders", &id])?;
        self.send(self.request(Method::GET, url, Some(auth))).await
    }

    /// Turn the server cart into an order.
    ///
    /// This does not touch the cart store; use
    /// [`StorefrontContext::checkout`](crate::context::StorefrontContext::checkout)
    /// for the full flow.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, auth), fields(user_id = %auth.user_id()))]
    pub async fn checkout(&self, auth: &AuthSession, request: CheckoutRequest) -> Result<PlacedOrder> {
        let url = self.user_endpoint(auth, &["orders", "checkout"])?;
        self.send(self.request(Method::POST, url, Some(auth)).json(&request))
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bookbarn_core::{AddressId, OrderStatus, UserId};
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn setup(server: &MockServer) -> (ApiClient, AuthSession) {
        let api = ApiClient::with_http_client(reqwest::Client::new(), Url::parse(&server.uri()).unwrap());
        (api, AuthSession::new("t1", UserId::new(42)))
    }

    #[tokio::test]
    async fn test_order_detail() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/42/orders/5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "orderId": 5, "orderDate": "2024-05-01T10:00:00", "orderStatus": "SHIPPED",
                "totalAmmount": 19.98,
                "shippingAddress": {
                    "name": "Casa", "street": "Via Roma 1", "city": "Milano",
                    "province": "MI", "country": "Italia", "postalCode": "20100"
                },
                "items": [{"productId": 7, "productName": "Dune", "quantity": 2, "unitPrice": 9.99}]
            })))
            .mount(&server)
            .await;

        let (api, auth) = setup(&server);
        let detail = api.order(&auth, OrderId::new(5)).await.unwrap();
        assert_eq!(detail.order_status, OrderStatus::Shipped);
        assert!(detail.billing_address.is_none());
        assert_eq!(detail.items[0].effective_price().unwrap().to_string(), "9.99");
    }

    #[tokio::test]
    async fn test_checkout_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users/42/orders/checkout"))
            .and(body_json(json!({"shippingAddressId": 3, "billingAddressId": 3})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"orderId": 77, "orderStatus": "PENDING"})))
            .expect(1)
            .mount(&server)
            .await;

        let (api, auth) = setup(&server);
        let placed = api
            .checkout(
                &auth,
                CheckoutRequest {
                    shipping_address_id: AddressId::new(3),
                    billing_address_id: Some(AddressId::new(3)),
                },
            )
            .await
            .unwrap();
        assert_eq!(placed.order_id, OrderId::new(77));
    }
}
