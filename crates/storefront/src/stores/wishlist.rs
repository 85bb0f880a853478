//! Wishlist store.

use std::sync::Arc;

use bookbarn_core::ProductId;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use super::state::{StoreOutcome, StoreSnapshot};
use super::{StoreCore, breadcrumb};
use crate::api::{ApiClient, Wishlist};
use crate::session::SessionStore;

/// Client-side mirror of the server wishlist. Same contract as
/// [`CartStore`](super::CartStore).
#[derive(Clone)]
pub struct WishlistStore {
    inner: Arc<StoreCore<Wishlist>>,
}

impl WishlistStore {
    pub fn new(api: ApiClient, session: SessionStore, cancel: CancellationToken) -> Self {
        Self {
            inner: Arc::new(StoreCore::new("wishlist", api, session, cancel)),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> StoreSnapshot<Wishlist> {
        self.inner.cell.snapshot()
    }

    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.inner
            .cell
            .with_data(|wishlist| wishlist.is_some_and(|w| w.contains(product_id)))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner
            .cell
            .with_data(|wishlist| wishlist.map_or(0, |w| w.items.len()))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Refresh from the server.
    #[instrument(skip(self))]
    pub async fn view(&self) -> StoreOutcome {
        self.inner
            .execute("view wishlist", |api, auth| async move {
                api.wishlist(&auth).await.map(Some)
            })
            .await
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add(&self, product_id: ProductId) -> StoreOutcome {
        breadcrumb("wishlist", "Add to wishlist", Some(product_id), None);
        self.inner
            .execute("add to wishlist", move |api, auth| async move {
                api.add_to_wishlist(&auth, product_id).await.map(Some)
            })
            .await
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove(&self, product_id: ProductId) -> StoreOutcome {
        breadcrumb("wishlist", "Remove from wishlist", Some(product_id), None);
        self.inner
            .execute("remove from wishlist", move |api, auth| async move {
                api.remove_from_wishlist(&auth, product_id).await.map(Some)
            })
            .await
    }

    /// Empty the wishlist. On success the snapshot has no data.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> StoreOutcome {
        breadcrumb("wishlist", "Clear wishlist", None, None);
        self.inner
            .execute("clear wishlist", |api, auth| async move {
                api.clear_wishlist(&auth).await.map(|()| None)
            })
            .await
    }

    /// Remove the product if the snapshot holds it, otherwise add it.
    ///
    /// Decided on the local snapshot; call [`view`](Self::view) first if it
    /// may be out of date.
    pub async fn toggle(&self, product_id: ProductId) -> StoreOutcome {
        if self.contains(product_id) {
            self.remove(product_id).await
        } else {
            self.add(product_id).await
        }
    }

    /// Forget the snapshot. Calls in flight are discarded.
    pub fn reset(&self) {
        self.inner.cell.reset();
    }
}

impl std::fmt::Debug for WishlistStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WishlistStore")
            .field("snapshot", &self.snapshot())
            .finish_non_exhaustive()
    }
}
