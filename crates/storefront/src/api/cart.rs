//! Cart endpoints under `/users/{id}/cart`.
//!
//! Every mutation answers with the whole cart; callers replace their copy
//! with it rather than patching locally.

use bookbarn_core::ProductId;
use reqwest::Method;
use tracing::instrument;

use super::ApiClient;
use super::types::{AddToCartRequest, Cart};
use crate::error::{ApiError, Result};
use crate::session::AuthSession;

impl ApiClient {
    /// Fetch the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, auth), fields(user_id = %auth.user_id()))]
    pub async fn cart(&self, auth: &AuthSession) -> Result<Cart> {
        let url = self.user_endpoint(auth, &["cart"])?;
        self.send(self.request(Method::GET, url, Some(auth))).await
    }

    /// Add `quantity` units of a product. The backend merges repeated adds.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` for a zero quantity, or an error if
    /// the API request fails.
    #[instrument(skip(self, auth), fields(user_id = %auth.user_id(), product_id = %product_id))]
    pub async fn add_to_cart(&self, auth: &AuthSession, product_id: ProductId, quantity: u32) -> Result<Cart> {
        if quantity == 0 {
            return Err(ApiError::InvalidInput("quantity must be at least 1".to_string()));
        }
        let url = self.user_endpoint(auth, &["cart"])?;
        let body = AddToCartRequest {
            product_id,
            quantity,
        };
        self.send(self.request(Method::POST, url, Some(auth)).json(&body))
            .await
    }

    /// Set the quantity of a line.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, auth), fields(user_id = %auth.user_id(), product_id = %product_id))]
    pub async fn update_cart_item(
        &self,
        auth: &AuthSession,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Cart> {
        let id = product_id.to_string();
        let mut url = self.user_endpoint(auth, &["cart", &id])?;
        url.query_pairs_mut()
            .append_pair("quantity", &quantity.to_string());
        self.send(self.request(Method::PATCH, url, Some(auth))).await
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, auth), fields(user_id = %auth.user_id(), product_id = %product_id))]
    pub async fn remove_from_cart(&self, auth: &AuthSession, product_id: ProductId) -> Result<Cart> {
        let id = product_id.to_string();
        let url = self.user_endpoint(auth, &["cart", &id])?;
        self.send(self.request(Method::DELETE, url, Some(auth))).await
    }

    /// Empty the cart. The backend answers without a body.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, auth), fields(user_id = %auth.user_id()))]
    pub async fn clear_cart(&self, auth: &AuthSession) -> Result<()> {
        let url = self.user_endpoint(auth, &["cart"])?;
        self.send_empty(self.request(Method::DELETE, url, Some(auth)))
            .await
    }
}
