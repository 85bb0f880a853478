//! Bookbarn Core - Shared types library.
//!
//! This crate provides common types used across all Bookbarn components:
//! - `storefront` - REST client, session storage and the cart/wishlist stores
//! - `cli` - Command-line front end for shoppers and backoffice staff
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP clients.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, money, emails, and roles

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
