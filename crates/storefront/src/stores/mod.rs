//! Cart and wishlist stores.
//!
//! A store mirrors one server-side collection of the signed-in user. It holds
//! the last server-confirmed snapshot, a status, and the last error message;
//! see [`state`] for how concurrent calls are ordered.

pub mod cart;
pub mod state;
pub mod wishlist;

use std::future::Future;

use bookbarn_core::ProductId;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::api::ApiClient;
use crate::error::{ApiError, add_breadcrumb};
use crate::session::{AuthSession, SessionStore};
use state::StoreCell;

pub use cart::CartStore;
pub use state::{StoreOutcome, StoreSnapshot, StoreStatus};
pub use wishlist::WishlistStore;

/// Plumbing shared by the concrete stores.
pub(crate) struct StoreCore<T> {
    label: &'static str,
    api: ApiClient,
    session: SessionStore,
    pub(crate) cell: StoreCell<T>,
    cancel: CancellationToken,
}

impl<T: Clone> StoreCore<T> {
    pub(crate) fn new(
        label: &'static str,
        api: ApiClient,
        session: SessionStore,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            label,
            api,
            session,
            cell: StoreCell::new(),
            cancel,
        }
    }

    /// Run one backend call against the current session.
    ///
    /// Without a session nothing is sent and the state is untouched.
    pub(crate) async fn execute<F, Fut>(&self, action: &'static str, call: F) -> StoreOutcome
    where
        F: FnOnce(ApiClient, AuthSession) -> Fut,
        Fut: Future<Output = Result<Option<T>, ApiError>>,
    {
        let store = self.label;
        let Some(auth) = self.session.current() else {
            debug!(store, action, "No session, skipping");
            return StoreOutcome::Skipped;
        };

        let request = call(self.api.clone(), auth);
        let outcome = self
            .cell
            .run(&self.cancel, async move {
                request.await.map_err(|e| format!("{action} failed: {e}"))
            })
            .await;

        match &outcome {
            StoreOutcome::Failed(message) => warn!(store, action, error = %message, "Store call failed"),
            StoreOutcome::Stale => debug!(store, action, "Discarded stale response"),
            StoreOutcome::Cancelled => debug!(store, action, "Call cancelled by logout"),
            StoreOutcome::Applied | StoreOutcome::Skipped => {}
        }
        outcome
    }
}

/// Record a store action for error reports.
fn breadcrumb(category: &str, message: &str, product_id: Option<ProductId>, quantity: Option<u32>) {
    let product_id = product_id.map(|id| id.to_string());
    let quantity = quantity.map(|q| q.to_string());

    let mut data: Vec<(&str, &str)> = Vec::with_capacity(2);
    if let Some(id) = &product_id {
        data.push(("product_id", id.as_str()));
    }
    if let Some(q) = &quantity {
        data.push(("quantity", q.as_str()));
    }

    add_breadcrumb(category, message, (!data.is_empty()).then_some(data.as_slice()));
}
