//! Wishlist endpoints under `/users/{id}/wishlist`.

use bookbarn_core::ProductId;
use reqwest::Method;
use tracing::instrument;

use super::ApiClient;
use super::types::{AddToWishlistRequest, Wishlist};
use crate::error::Result;
use crate::session::AuthSession;

impl ApiClient {
    /// Fetch the wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, auth), fields(user_id = %auth.user_id()))]
    pub async fn wishlist(&self, auth: &AuthSession) -> Result<Wishlist> {
        let url = self.user_endpoint(auth, &["wishlist"])?;
        self.send(self.request(Method::GET, url, Some(auth))).await
    }

    /// Add a product to the wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, auth), fields(user_id = %auth.user_id(), product_id = %product_id))]
    pub async fn add_to_wishlist(&self, auth: &AuthSession, product_id: ProductId) -> Result<Wishlist> {
        let url = self.user_endpoint(auth, &["wishlist"])?;
        let body = AddToWishlistRequest { product_id };
        self.send(self.request(Method::POST, url, Some(auth)).json(&body))
            .await
    }

    /// Remove a product from the wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, auth), fields(user_id = %auth.user_id(), product_id = %product_id))]
    pub async fn remove_from_wishlist(&self, auth: &AuthSession, product_id: ProductId) -> Result<Wishlist> {
        let id = product_id.to_string();
        let url = self.user_endpoint(auth, &["wishlist", &id])?;
        self.send(self.request(Method::DELETE, url, Some(auth))).await
    }

    /// Empty the wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, auth), fields(user_id = %auth.user_id()))]
    pub async fn clear_wishlist(&self, auth: &AuthSession) -> Result<()> {
        let url = self.user_endpoint(auth, &["wishlist"])?;
        self.send_empty(self.request(Method::DELETE, url, Some(auth)))
            .await
    }
}
