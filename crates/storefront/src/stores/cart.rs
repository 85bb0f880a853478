//! Cart store.

use std::sync::Arc;

use bookbarn_core::ProductId;
use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use super::state::{StoreOutcome, StoreSnapshot};
use super::{StoreCore, breadcrumb};
use crate::api::{ApiClient, Cart};
use crate::session::SessionStore;

/// Client-side mirror of the server cart.
///
/// Every operation is a single request whose response replaces the snapshot;
/// nothing is computed locally. Without a session every operation returns
/// [`StoreOutcome::Skipped`] and sends nothing. Failures are kept in the
/// snapshot's `error` and never returned as `Err`.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<StoreCore<Cart>>,
}

impl CartStore {
    pub fn new(api: ApiClient, session: SessionStore, cancel: CancellationToken) -> Self {
        Self {
            inner: Arc::new(StoreCore::new("cart", api, session, cancel)),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> StoreSnapshot<Cart> {
        self.inner.cell.snapshot()
    }

    /// Total units in the cart, as last returned by the backend.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.inner.cell.with_data(|cart| cart.map_or(0, Cart::item_count))
    }

    /// Cart total, as last returned by the backend.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.inner
            .cell
            .with_data(|cart| cart.map_or(Decimal::ZERO, |c| c.total_price))
    }

    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.inner
            .cell
            .with_data(|cart| cart.is_some_and(|c| c.item(product_id).is_some()))
    }

    /// Refresh from the server.
    #[instrument(skip(self))]
    pub async fn view(&self) -> StoreOutcome {
        self.inner
            .execute("view cart", |api, auth| async move {
                api.cart(&auth).await.map(Some)
            })
            .await
    }

    /// Add `quantity` units of a product.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add(&self, product_id: ProductId, quantity: u32) -> StoreOutcome {
        breadcrumb("cart", "Add to cart", Some(product_id), Some(quantity));
        self.inner
            .execute("add to cart", move |api, auth| async move {
                api.add_to_cart(&auth, product_id, quantity).await.map(Some)
            })
            .await
    }

    /// Set the quantity of a line.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn update_quantity(&self, product_id: ProductId, quantity: u32) -> StoreOutcome {
        breadcrumb("cart", "Update cart quantity", Some(product_id), Some(quantity));
        self.inner
            .execute("update cart quantity", move |api, auth| async move {
                api.update_cart_item(&auth, product_id, quantity)
                    .await
                    .map(Some)
            })
            .await
    }

    /// Remove a line.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove(&self, product_id: ProductId) -> StoreOutcome {
        breadcrumb("cart", "Remove from cart", Some(product_id), None);
        self.inner
            .execute("remove from cart", move |api, auth| async move {
                api.remove_from_cart(&auth, product_id).await.map(Some)
            })
            .await
    }

    /// Empty the cart. On success the snapshot has no data.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> StoreOutcome {
        breadcrumb("cart", "Clear cart", None, None);
        self.inner
            .execute("clear cart", |api, auth| async move {
                api.clear_cart(&auth).await.map(|()| None)
            })
            .await
    }

    /// Forget the snapshot. Calls in flight are discarded.
    pub fn reset(&self) {
        self.inner.cell.reset();
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("snapshot", &self.snapshot())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::session::MemorySessionStorage;
    use crate::stores::StoreStatus;
    use bookbarn_core::UserId;
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn cart_json(quantity: u32) -> serde_json::Value {
        json!({
            "userId": 42,
            "items": [{"productId": 7, "title": "Dune", "price": 9.99, "quantity": quantity}],
            "totalPrice": format!("{:.2}", 9.99 * f64::from(quantity)).parse::<f64>().unwrap()
        })
    }

    fn store(server: &MockServer, signed_in: bool) -> CartStore {
        let api = ApiClient::with_http_client(reqwest::Client::new(), Url::parse(&server.uri()).unwrap());
        let session = SessionStore::restore(MemorySessionStorage::new());
        if signed_in {
            session.login("t1", UserId::new(42));
        }
        CartStore::new(api, session, CancellationToken::new())
    }

    #[tokio::test]
    async fn test_no_session_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(cart_json(1)))
            .expect(0)
            .mount(&server)
            .await;

        let cart = store(&server, false);
        assert_eq!(cart.view().await, StoreOutcome::Skipped);
        assert_eq!(cart.add(ProductId::new(7), 1).await, StoreOutcome::Skipped);
        assert_eq!(cart.clear().await, StoreOutcome::Skipped);

        let snapshot = cart.snapshot();
        assert_eq!(snapshot.status, StoreStatus::Idle);
        assert!(snapshot.data.is_none());
        assert!(snapshot.error.is_none());
    }

    #[tokio::test]
    async fn test_add_replaces_snapshot_with_server_cart() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users/42/cart"))
            .respond_with(ResponseTemplate::new(200).set_body_json(cart_json(3)))
            .mount(&server)
            .await;

        let cart = store(&server, true);
        assert!(cart.add(ProductId::new(7), 2).await.is_applied());

        // Whatever the backend reports wins, even if it merged quantities.
        assert_eq!(cart.item_count(), 3);
        assert!(cart.contains(ProductId::new(7)));
        assert_eq!(cart.total_price(), Decimal::new(2997, 2));
        assert_eq!(cart.snapshot().status, StoreStatus::Ready);
    }

    #[tokio::test]
    async fn test_update_quantity_replaces_snapshot() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/users/42/cart/7"))
            .and(query_param("quantity", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(cart_json(3)))
            .expect(1)
            .mount(&server)
            .await;

        let cart = store(&server, true);
        assert!(cart.update_quantity(ProductId::new(7), 3).await.is_applied());

        let expected: Cart = serde_json::from_value(cart_json(3)).unwrap();
        let snapshot = cart.snapshot();
        assert_eq!(snapshot.data, Some(expected));
        assert_eq!(snapshot.status, StoreStatus::Ready);
        assert_eq!(cart.item_count(), 3);
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_snapshot() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/42/cart"))
            .respond_with(ResponseTemplate::new(200).set_body_json(cart_json(1)))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/users/42/cart/7"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "boom"})))
            .mount(&server)
            .await;

        let cart = store(&server, true);
        cart.view().await;
        let before = cart.snapshot().data;

        let outcome = cart.remove(ProductId::new(7)).await;
        assert!(matches!(outcome, StoreOutcome::Failed(_)));

        let snapshot = cart.snapshot();
        assert_eq!(snapshot.status, StoreStatus::Error);
        assert_eq!(snapshot.data, before);
        let message = snapshot.error.unwrap();
        assert!(message.starts_with("remove from cart failed"));
        assert!(message.contains("boom"));
    }

    #[tokio::test]
    async fn test_clear_empties_snapshot() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/42/cart"))
            .respond_with(ResponseTemplate::new(200).set_body_json(cart_json(2)))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/users/42/cart"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let cart = store(&server, true);
        cart.view().await;
        assert!(cart.clear().await.is_applied());

        let snapshot = cart.snapshot();
        assert!(snapshot.data.is_none());
        assert_eq!(snapshot.status, StoreStatus::Ready);
        assert_eq!(cart.item_count(), 0);
        assert_eq!(cart.total_price(), Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_slow_older_response_is_discarded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/42/cart"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(cart_json(1))
                    .set_delay(Duration::from_millis(400)),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/users/42/cart"))
            .respond_with(ResponseTemplate::new(200).set_body_json(cart_json(2)))
            .mount(&server)
            .await;

        let cart = store(&server, true);
        let (slow, fast) = tokio::join!(cart.view(), async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            cart.view().await
        });

        assert_eq!(fast, StoreOutcome::Applied);
        assert_eq!(slow, StoreOutcome::Stale);
        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.snapshot().status, StoreStatus::Ready);
    }
}
