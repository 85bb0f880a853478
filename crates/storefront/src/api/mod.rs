//! Bookbarn backend REST client.
//!
//! # Architecture
//!
//! - One [`ApiClient`] per process, cheaply cloneable via `Arc`
//! - The backend is source of truth - NO local sync, direct API calls
//! - Catalog reads are cached in memory via `moka` (5 minute TTL)
//! - Cart, wishlist, profile and order calls are never cached
//!
//! Endpoint groups live in submodules as `impl ApiClient` blocks:
//!
//! - [`auth`] - login, registration, password recovery
//! - [`users`] - profile, phone, avatar, addresses
//! - [`orders`] - order history and checkout
//! - [`cart`] / [`wishlist`] - per-user collections
//! - [`catalog`] - product search and lookup
//! - [`payments`] - payment intents
//! - [`backoffice`] - categories, stock, staff and product administration
//!
//! # Example
//!
//! ```rust,ignore
//! use bookbarn_storefront::api::ApiClient;
//!
//! let client = ApiClient::new(&config)?;
//! let auth = client.login("reader", &password).await?;
//! let cart = client.add_to_cart(&auth, ProductId::new(7), 2).await?;
//! ```

pub mod auth;
pub mod backoffice;
mod cache;
pub mod cart;
pub mod catalog;
pub mod orders;
pub mod payments;
pub mod types;
pub mod users;
pub mod wishlist;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::{Method, RequestBuilder};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ApiError, Result};
use crate::session::AuthSession;

use cache::{CacheKey, CacheValue};

pub use types::*;

/// Body characters included in log lines.
const LOG_BODY_CHARS: usize = 500;

/// Catalog cache capacity.
const CACHE_CAPACITY: u64 = 1000;

/// Catalog cache time-to-live.
const CACHE_TTL: Duration = Duration::from_secs(300);

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the Bookbarn REST backend.
///
/// Authenticated endpoints take an [`AuthSession`] and send it as a bearer
/// token; the session's user id also fills the `/users/{id}` path segment.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<CacheKey, CacheValue>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("bookbarn/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self::with_http_client(client, config.api_url.clone()))
    }

    /// Create a client around an existing `reqwest::Client`.
    #[must_use]
    pub fn with_http_client(client: reqwest::Client, base_url: Url) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url,
                cache,
            }),
        }
    }

    /// The configured backend base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    // =========================================================================
    // Request plumbing
    // =========================================================================

    /// Build an endpoint URL by appending path segments to the base URL.
    ///
    /// Segments are percent-encoded individually, so ids and search terms
    /// cannot escape their position in the path.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// `/users/{id}/...` for the session's user.
    pub(crate) fn user_endpoint(&self, auth: &AuthSession, rest: &[&str]) -> Result<Url> {
        let user_id = auth.user_id().to_string();
        let mut segments = Vec::with_capacity(rest.len() + 2);
        segments.push("users");
        segments.push(user_id.as_str());
        segments.extend_from_slice(rest);
        self.endpoint(&segments)
    }

    /// Start a request, attaching the bearer token when a session is given.
    pub(crate) fn request(
        &self,
        method: Method,
        url: Url,
        auth: Option<&AuthSession>,
    ) -> RequestBuilder {
        let builder = self.inner.client.request(method, url);
        match auth {
            Some(auth) => builder.bearer_auth(auth.token().expose_secret()),
            None => builder,
        }
    }

    /// Send a request and decode a JSON response body.
    pub(crate) async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = self.dispatch(builder).await?;

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %truncate(&body, LOG_BODY_CHARS),
                "Failed to parse backend response"
            );
            ApiError::Parse(e)
        })
    }

    /// Send a request whose response body is irrelevant.
    pub(crate) async fn send_empty(&self, builder: RequestBuilder) -> Result<()> {
        self.dispatch(builder).await.map(drop)
    }

    /// Send a request and map non-success statuses to [`ApiError::Status`].
    async fn dispatch(&self, builder: RequestBuilder) -> Result<reqwest::Response> {
        let response = builder.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if status.is_server_error() {
            tracing::error!(
                status = %status,
                body = %truncate(&body, LOG_BODY_CHARS),
                "Backend returned server error"
            );
        } else {
            tracing::warn!(
                status = %status,
                body = %truncate(&body, LOG_BODY_CHARS),
                "Backend returned non-success status"
            );
        }

        Err(ApiError::from_status(status, &body))
    }

    // =========================================================================
    // Cache Management
    // =========================================================================

    /// Invalidate a cached product.
    pub async fn invalidate_product(&self, id: bookbarn_core::ProductId) {
        self.inner.cache.invalidate(&CacheKey::Product(id)).await;
    }

    /// Invalidate all cached catalog data.
    pub async fn invalidate_catalog(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }

    pub(crate) fn cache(&self) -> &Cache<CacheKey, CacheValue> {
        &self.inner.cache
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

fn truncate(body: &str, max: usize) -> String {
    body.chars().take(max).collect()
}
