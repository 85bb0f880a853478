//! Bookbarn storefront client library.
//!
//! A typed client for the Bookbarn bookstore backend plus the client-side
//! state a shopper needs: the persisted session and the cart and wishlist
//! stores that mirror the server.
//!
//! # Modules
//!
//! - [`api`] - REST client and DTOs
//! - [`session`] - bearer token + user id, persisted across runs
//! - [`stores`] - cart and wishlist snapshots
//! - [`context`] - owner of the session and its stores
//! - [`config`] / [`error`] - configuration and error types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod session;
pub mod stores;

pub use api::ApiClient;
pub use config::ClientConfig;
pub use context::{CheckoutReceipt, StorefrontContext};
pub use error::ApiError;
pub use session::{AuthSession, SessionStore};
pub use stores::{CartStore, StoreOutcome, StoreSnapshot, StoreStatus, WishlistStore};
