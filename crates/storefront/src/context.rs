//! The storefront context: one client, one session, and the stores that
//! belong to that session.
//!
//! Stores exist only while someone is signed in. Establishing a session
//! (`login`, or restoring a persisted one in `new`) builds a fresh cart and
//! wishlist store bound to a new cancellation token and fetches both.
//! `logout` cancels the token, resets both stores and forgets them. A
//! response that arrives after logout therefore never reaches a store.

use std::sync::{PoisonError, RwLock};

use bookbarn_core::{AddressId, CurrencyCode, OrderId, UserId, to_minor_units};
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::api::{ApiClient, CheckoutRequest, PaymentIntent, PaymentIntentRequest, UserProfile};
use crate::config::ClientConfig;
use crate::error::{ApiError, Result, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::session::{AuthSession, FileSessionStorage, SessionStore};
use crate::stores::{CartStore, StoreOutcome, WishlistStore};

/// Stores of the signed-in user.
struct ActiveSession {
    cart: CartStore,
    wishlist: WishlistStore,
    cancel: CancellationToken,
}

/// Result of a successful checkout.
#[derive(Debug, Clone)]
pub struct CheckoutReceipt {
    pub order_id: OrderId,
    /// Charged amount in major units.
    pub amount: Decimal,
    pub currency: CurrencyCode,
    /// Secret for confirming the payment with the payment provider.
    pub payment: PaymentIntent,
}

/// Owner of the client, the session and the per-session stores.
pub struct StorefrontContext {
    config: ClientConfig,
    api: ApiClient,
    session: SessionStore,
    active: RwLock<Option<ActiveSession>>,
}

impl StorefrontContext {
    /// Build a context from configuration, restoring any persisted session
    /// and fetching its cart and wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub async fn new(config: ClientConfig) -> Result<Self> {
        let api = ApiClient::new(&config)?;
        let session = SessionStore::restore(FileSessionStorage::new(&config.session_file));
        let context = Self::with_parts(config, api, session);
        context.establish().await;
        Ok(context)
    }

    /// Build a context from existing parts.
    ///
    /// A restored session gets its stores but nothing is fetched until
    /// [`establish`](Self::establish) runs.
    #[must_use]
    pub fn with_parts(config: ClientConfig, api: ApiClient, session: SessionStore) -> Self {
        let context = Self {
            config,
            api,
            session,
            active: RwLock::new(None),
        };
        if let Some(auth) = context.session.current() {
            context.activate(auth.user_id());
        }
        context
    }

    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub const fn session(&self) -> &SessionStore {
        &self.session
    }

    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The cart store, while signed in.
    #[must_use]
    pub fn cart(&self) -> Option<CartStore> {
        self.read_active(|active| active.cart.clone())
    }

    /// The wishlist store, while signed in.
    #[must_use]
    pub fn wishlist(&self) -> Option<WishlistStore> {
        self.read_active(|active| active.wishlist.clone())
    }

    /// The current session or [`ApiError::MissingSession`].
    ///
    /// # Errors
    ///
    /// Returns `ApiError::MissingSession` when nobody is signed in.
    pub fn require_session(&self) -> Result<AuthSession> {
        self.session.current().ok_or(ApiError::MissingSession)
    }

    // =========================================================================
    // Login / logout
    // =========================================================================

    /// Start a session from a token the caller already holds and fetch its
    /// cart and wishlist.
    ///
    /// Replaces any previous session and its stores. Fetch failures stay in
    /// the stores.
    pub async fn login(&self, token: impl Into<String>, user_id: UserId) -> AuthSession {
        let auth = self.session.login(token, user_id);
        self.activate(user_id);
        info!(user_id = %user_id, "Signed in");
        self.refresh().await;
        auth
    }

    /// Fetch the stores of the current session, if any.
    pub async fn establish(&self) {
        if let Some(user_id) = self.session.user_id() {
            info!(user_id = %user_id, "Resuming session");
            self.refresh().await;
        }
    }

    /// Sign in with username and password and fetch the user's profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected. If the profile fetch
    /// fails the session is kept and the error is returned.
    #[instrument(skip(self, password))]
    pub async fn login_with_credentials(&self, username: &str, password: &SecretString) -> Result<UserProfile> {
        let auth = self.api.login(username, password).await?;
        let token = auth.token().expose_secret().to_string();
        let auth = self.login(token, auth.user_id()).await;
        self.api.user_profile(&auth, auth.user_id()).await
    }

    /// End the session. In-flight store calls are dropped.
    pub fn logout(&self) {
        let previous = self
            .active
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(active) = previous {
            active.cancel.cancel();
            active.cart.reset();
            active.wishlist.reset();
        }

        let was_signed_in = self.session.is_authenticated();
        self.session.logout();
        clear_sentry_user();
        if was_signed_in {
            add_breadcrumb("auth", "Signed out", None);
            info!("Signed out");
        }
    }

    /// Fetch cart and wishlist concurrently.
    pub async fn refresh(&self) {
        if let (Some(cart), Some(wishlist)) = (self.cart(), self.wishlist()) {
            tokio::join!(cart.view(), wishlist.view());
        }
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Place an order for the current cart and open a payment intent for it.
    ///
    /// The amount is the sum of `price × quantity` over the cart lines, in
    /// minor units of the configured currency. Billing defaults to the
    /// shipping address. On success the cart store is cleared.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::MissingSession` when signed out,
    /// `ApiError::InvalidInput` for an empty cart, or the first failing
    /// backend call's error.
    #[instrument(skip(self), fields(shipping = %shipping))]
    pub async fn checkout(&self, shipping: AddressId, billing: Option<AddressId>) -> Result<CheckoutReceipt> {
        let auth = self.require_session()?;

        let cart = self.api.cart(&auth).await?;
        if cart.items.is_empty() {
            return Err(ApiError::InvalidInput("cart is empty".to_string()));
        }
        let amount = cart.lines_total();
        let minor_units = to_minor_units(amount).map_err(|e| ApiError::InvalidInput(e.to_string()))?;

        add_breadcrumb("checkout", "Placing order", None);
        let placed = self
            .api
            .checkout(
                &auth,
                CheckoutRequest {
                    shipping_address_id: shipping,
                    billing_address_id: Some(billing.unwrap_or(shipping)),
                },
            )
            .await?;

        let currency = self.config.currency;
        let payment = self
            .api
            .create_payment_intent(
                &auth,
                PaymentIntentRequest {
                    amount: minor_units,
                    currency,
                    order_id: placed.order_id,
                },
            )
            .await?;

        if let Some(store) = self.cart()
            && let StoreOutcome::Failed(message) = store.clear().await
        {
            warn!(order_id = %placed.order_id, error = %message, "Order placed but cart not cleared");
        }

        info!(order_id = %placed.order_id, amount = %amount, "Order placed");
        Ok(CheckoutReceipt {
            order_id: placed.order_id,
            amount,
            currency,
            payment,
        })
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Replace the active stores with fresh ones for `user_id`.
    fn activate(&self, user_id: UserId) {
        let cancel = CancellationToken::new();
        let active = ActiveSession {
            cart: CartStore::new(self.api.clone(), self.session.clone(), cancel.clone()),
            wishlist: WishlistStore::new(self.api.clone(), self.session.clone(), cancel.clone()),
            cancel,
        };

        let previous = self
            .active
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(active);
        if let Some(previous) = previous {
            previous.cancel.cancel();
            previous.cart.reset();
            previous.wishlist.reset();
        }

        set_sentry_user(&user_id);
    }

    fn read_active<R>(&self, f: impl FnOnce(&ActiveSession) -> R) -> Option<R> {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(f)
    }
}

impl std::fmt::Debug for StorefrontContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontContext")
            .field("api", &self.api)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
