//! End-to-end tests for the Bookbarn storefront client.
//!
//! Each test runs a [`StorefrontContext`] against a `wiremock` backend, with
//! the session persisted to a throwaway directory. No running backend is
//! needed:
//!
//! ```bash
//! cargo test -p bookbarn-integration-tests
//! ```

use std::path::PathBuf;

use bookbarn_storefront::{ClientConfig, StorefrontContext};
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::MockServer;

/// Boxed error for test setup.
pub type SetupError = Box<dyn std::error::Error + Send + Sync>;

/// A mock backend plus a context wired to it.
pub struct TestStorefront {
    pub server: MockServer,
    pub ctx: StorefrontContext,
    dir: TempDir,
}

impl TestStorefront {
    /// Start a mock backend and an anonymous context.
    ///
    /// # Errors
    ///
    /// Returns an error if the temp dir or the client cannot be created.
    pub async fn start() -> Result<Self, SetupError> {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir()?;
        let ctx = open(&server, dir.path().join("session.json")).await?;
        Ok(Self { server, ctx, dir })
    }

    /// Where the session is persisted.
    #[must_use]
    pub fn session_file(&self) -> PathBuf {
        self.dir.path().join("session.json")
    }

    /// A second context over the same backend and session file, as after a
    /// process restart. A restored session fetches its stores here.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub async fn reopen(&self) -> Result<StorefrontContext, SetupError> {
        open(&self.server, self.session_file()).await
    }
}

async fn open(server: &MockServer, session_file: PathBuf) -> Result<StorefrontContext, SetupError> {
    let config = ClientConfig::for_api_url(&server.uri(), session_file)?;
    Ok(StorefrontContext::new(config).await?)
}

/// Cart body as the backend sends it. `items` are `(product_id, quantity, price)`.
#[must_use]
pub fn cart_body(user_id: i64, items: &[(i64, u32, f64)], total: f64) -> Value {
    let items: Vec<Value> = items
        .iter()
        .map(|&(product_id, quantity, price)| {
            json!({
                "productId": product_id,
                "title": format!("Book {product_id}"),
                "price": price,
                "quantity": quantity,
                "imageUrl": null
            })
        })
        .collect();
    json!({ "userId": user_id, "items": items, "totalPrice": total })
}

/// Wishlist body as the backend sends it.
#[must_use]
pub fn wishlist_body(wishlist_id: i64, product_ids: &[i64]) -> Value {
    let items: Vec<Value> = product_ids
        .iter()
        .map(|&product_id| {
            json!({
                "productId": product_id,
                "productName": format!("Book {product_id}"),
                "price": 10.0,
                "imageUrls": []
            })
        })
        .collect();
    json!({ "wishlistId": wishlist_id, "items": items })
}
