//! Data transfer objects exchanged with the backend.
//!
//! All bodies are camelCase JSON. Prices are decimals; the backend sends them
//! as JSON numbers, which `rust_decimal` accepts directly.

use bookbarn_core::{
    AddressId, CategoryId, CurrencyCode, Email, OrderId, OrderStatus, ProductId, UserId, UserRole,
    WishlistId,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// =============================================================================
// Auth Types
// =============================================================================

/// Credentials for `POST /auth/login`.
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub username: String,
    #[serde(serialize_with = "serialize_secret")]
    pub password: SecretString,
}

/// Response of `POST /auth/login`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user_id: UserId,
}

impl std::fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginResponse")
            .field("token", &"[REDACTED]")
            .field("user_id", &self.user_id)
            .finish()
    }
}

/// Body of `POST /auth/register`.
///
/// The backend expects the birth date as `dd/MM/yyyy`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub surname: String,
    #[serde(serialize_with = "serialize_born_date")]
    pub born_date: NaiveDate,
    pub username: String,
    pub email: Email,
    #[serde(serialize_with = "serialize_secret")]
    pub password: SecretString,
}

/// Body of `POST /auth/forgot-password`.
#[derive(Debug, Serialize)]
pub struct ForgotPasswordRequest {
    pub email: Email,
}

/// Body of `POST /auth/reset-password`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub token: String,
    #[serde(serialize_with = "serialize_secret")]
    pub new_password: SecretString,
}

// =============================================================================
// User Types
// =============================================================================

/// A user's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub surname: String,
    #[serde(default)]
    pub born_date: Option<String>,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub role: Option<UserRole>,
}

impl UserProfile {
    /// The role, defaulting to a regular shopper when the backend omits it.
    #[must_use]
    pub fn role(&self) -> UserRole {
        self.role.clone().unwrap_or_default()
    }
}

/// Body of `PUT /users/{id}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: String,
    pub surname: String,
    pub born_date: String,
    pub username: String,
}

/// Body of `PATCH /users/{id}/phone`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePhoneRequest {
    pub phone_number: String,
}

/// The postal part of an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostalAddress {
    pub name: String,
    pub street: String,
    pub city: String,
    pub province: String,
    pub country: String,
    pub postal_code: String,
}

/// A saved address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    #[serde(flatten)]
    pub postal: PostalAddress,
}

// =============================================================================
// Catalog Types
// =============================================================================

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: Decimal,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub description: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub author: Vec<String>,
    #[serde(default)]
    pub isbn: Option<String>,
}

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_elements: Option<u64>,
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub size: u32,
}

impl<T> Page<T> {
    /// A page holding exactly `items`.
    #[must_use]
    pub fn single(items: Vec<T>) -> Self {
        let len = items.len();
        Self {
            content: items,
            total_pages: 1,
            total_elements: Some(len as u64),
            number: 0,
            size: u32::try_from(len).unwrap_or(u32::MAX),
        }
    }

    /// Whether another page follows this one.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.number + 1 < self.total_pages
    }
}

/// One page of a product search.
pub type ProductPage = Page<Product>;

/// Query for `GET /products/search`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProductSearch {
    pub title: Option<String>,
    pub isbn: Option<String>,
    pub author: Option<String>,
    pub page: u32,
    pub size: u32,
}

impl Default for ProductSearch {
    fn default() -> Self {
        Self {
            title: None,
            isbn: None,
            author: None,
            page: 0,
            size: Self::DEFAULT_PAGE_SIZE,
        }
    }
}

impl ProductSearch {
    /// Page size used by the storefront listings.
    pub const DEFAULT_PAGE_SIZE: u32 = 50;

    /// Search by title.
    #[must_use]
    pub fn by_title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Match `term` against title, ISBN and author at once.
    #[must_use]
    pub fn any_field(term: impl Into<String>) -> Self {
        let term = term.into();
        Self {
            title: Some(term.clone()),
            isbn: Some(term.clone()),
            author: Some(term),
            ..Self::default()
        }
    }

    /// Select a page (zero-based).
    #[must_use]
    pub const fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Select a page size.
    #[must_use]
    pub const fn size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    /// Query string pairs; absent filters are omitted.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(5);
        if let Some(title) = &self.title {
            pairs.push(("title", title.clone()));
        }
        if let Some(isbn) = &self.isbn {
            pairs.push(("isbn", isbn.clone()));
        }
        if let Some(author) = &self.author {
            pairs.push(("author", author.clone()));
        }
        pairs.push(("page", self.page.to_string()));
        pairs.push(("size", self.size.to_string()));
        pairs
    }
}

// =============================================================================
// Cart Types
// =============================================================================

/// One line of the cart. `product_id` is unique within a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    #[serde(alias = "productName")]
    pub title: String,
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default, alias = "imageUrls")]
    pub image_url: Option<String>,
}

impl CartItem {
    /// `price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// The server-side cart of one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub user_id: UserId,
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub total_price: Decimal,
}

impl Cart {
    /// Find the line for a product.
    #[must_use]
    pub fn item(&self, product_id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|i| i.product_id == product_id)
    }

    /// Sum of line quantities, as reported by the backend.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Sum of `price × quantity` over the lines.
    ///
    /// Used for payment intents, which are computed from
    /// the lines rather than from `total_price`.
    #[must_use]
    pub fn lines_total(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }
}

/// Body of `POST /users/{id}/cart`.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

// =============================================================================
// Wishlist Types
// =============================================================================

/// One wishlist entry. `product_id` is unique within a wishlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub price: Decimal,
    #[serde(default)]
    pub image_urls: Option<Vec<String>>,
}

/// The server-side wishlist of one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wishlist {
    pub wishlist_id: WishlistId,
    #[serde(default)]
    pub items: Vec<WishlistItem>,
}

impl Wishlist {
    /// Whether the wishlist holds a product.
    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.items.iter().any(|i| i.product_id == product_id)
    }
}

/// Body of `POST /users/{id}/wishlist`.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToWishlistRequest {
    pub product_id: ProductId,
}

// =============================================================================
// Order Types
// =============================================================================

/// A line of a placed order.
///
/// Detail responses carry `unitPrice`, list responses `price`; either may be
/// missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    #[serde(default)]
    pub unit_price: Option<Decimal>,
    #[serde(default)]
    pub price: Option<Decimal>,
}

impl OrderItem {
    /// Unit price, whichever field the backend filled.
    #[must_use]
    pub fn effective_price(&self) -> Option<Decimal> {
        self.unit_price.or(self.price)
    }
}

/// Summary of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: OrderId,
    pub order_date: String,
    #[serde(rename = "totalAmmount", alias = "totalAmount")]
    pub total_amount: Decimal,
    pub order_status: OrderStatus,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

/// Full order with addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    pub order_id: OrderId,
    pub order_date: String,
    pub order_status: OrderStatus,
    #[serde(rename = "totalAmmount", alias = "totalAmount")]
    pub total_amount: Decimal,
    pub shipping_address: PostalAddress,
    #[serde(default)]
    pub billing_address: Option<PostalAddress>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

/// Body of `POST /users/{id}/orders/checkout`.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub shipping_address_id: AddressId,
    pub billing_address_id: Option<AddressId>,
}

/// Response of the checkout call; only the id is relied upon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrder {
    pub order_id: OrderId,
}

// =============================================================================
// Payment Types
// =============================================================================

/// Body of `POST /payments/create-intent`.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentRequest {
    /// Amount in minor units (cents).
    pub amount: i64,
    pub currency: CurrencyCode,
    pub order_id: OrderId,
}

/// Response of `POST /payments/create-intent`.
///
/// The client secret is handed to the payment provider to confirm the card
/// payment; it is redacted from `Debug` output.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    pub client_secret: String,
}

impl std::fmt::Debug for PaymentIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentIntent")
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

// =============================================================================
// Backoffice Types
// =============================================================================

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub product_category_type: String,
}

/// Body for creating or renaming a category.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRequest {
    pub name: String,
    pub product_category_type: String,
}

/// Stock level of one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub product_id: ProductId,
    #[serde(default)]
    pub title: String,
    pub quantity: i64,
}

/// Body of the stock increase/decrease endpoints.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StockAdjustment {
    pub quantity: u32,
}

/// Body of `POST /products`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub title: String,
    pub isbn: Option<String>,
    pub author: String,
    pub publisher: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub product_type: String,
    pub categories: Vec<String>,
    pub images: Vec<String>,
    pub initial_stock: u32,
}

/// Body of `PUT /products/{id}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub title: String,
    pub isbn: Option<String>,
    pub author: String,
    pub publisher: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub categories: Vec<String>,
    pub images: Vec<String>,
}

/// A user as listed in the backoffice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackofficeUser {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub surname: Option<String>,
    #[serde(default)]
    pub born_date: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    pub role: UserRole,
}

/// A page of backoffice users.
pub type UserPage = Page<BackofficeUser>;

/// Body of `POST /admin/users`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStaffRequest {
    pub name: String,
    pub surname: String,
    pub born_date: String,
    pub username: String,
    pub email: Email,
    #[serde(serialize_with = "serialize_secret")]
    pub password: SecretString,
    pub role: UserRole,
}

/// Body of `PATCH /admin/users/{id}/role`.
#[derive(Debug, Clone, Serialize)]
pub struct AssignRoleRequest {
    pub role: UserRole,
}

// =============================================================================
// Serde helpers
// =============================================================================

fn serialize_secret<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

fn serialize_born_date<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&date.format("%d/%m/%Y"))
}

/// Accept a string, a list of strings, or null.
fn one_or_many<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(s)) if s.is_empty() => Vec::new(),
        Some(OneOrMany::One(s)) => vec![s],
        Some(OneOrMany::Many(v)) => v,
    })
}
