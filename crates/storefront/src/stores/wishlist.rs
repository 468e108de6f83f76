//! Wishlist state: saved-product references for the active identity.
//!
//! Same write-through rules as the cart, without quantities.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, instrument};

use bazaar_core::{ProductId, UserId, WishlistEntryId};

use crate::backend::{BackendError, WishlistRepository};
use crate::error::add_breadcrumb;
use crate::models::{NewWishlistEntry, WishlistEntry};

/// Snapshot of wishlist state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WishlistState {
    pub items: Vec<WishlistEntry>,
    /// `true` while a fetch is in flight.
    pub loading: bool,
}

impl WishlistState {
    /// Whether any entry references `product_id`.
    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.items.iter().any(|entry| entry.product_id == product_id)
    }
}

/// Mirrors `wishlist` rows for one identity.
pub struct WishlistStore {
    repo: Arc<dyn WishlistRepository>,
    state: watch::Sender<WishlistState>,
}

impl WishlistStore {
    #[must_use]
    pub fn new(repo: Arc<dyn WishlistRepository>) -> Self {
        Self {
            repo,
            state: watch::Sender::new(WishlistState::default()),
        }
    }

    #[must_use]
    pub fn state(&self) -> WishlistState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn items(&self) -> Vec<WishlistEntry> {
        self.state.borrow().items.clone()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    /// Whether the product is saved, judged from local state only.
    #[must_use]
    pub fn is_in_wishlist(&self, product_id: ProductId) -> bool {
        self.state.borrow().contains(product_id)
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<WishlistState> {
        self.state.subscribe()
    }

    /// Replace local entries with the identity's remote entries.
    ///
    /// # Errors
    ///
    /// Returns the backend error on failure; local entries are left as they
    /// were and `loading` is cleared either way.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn fetch_wishlist(&self, user_id: UserId) -> Result<(), BackendError> {
        self.state.send_modify(|state| state.loading = true);

        let rows = match self.repo.list_entries(user_id).await {
            Ok(rows) => rows,
            Err(e) => {
                self.state.send_modify(|state| state.loading = false);
                return Err(e);
            }
        };

        let as_of = Utc::now();
        let items: Vec<WishlistEntry> = rows
            .into_iter()
            .map(|row| WishlistEntry::from_row(row, as_of))
            .collect();
        debug!(entries = items.len(), "Wishlist fetched");

        self.state.send_modify(|state| {
            state.items = items;
            state.loading = false;
        });
        Ok(())
    }

    /// Save a product and append the new entry locally.
    ///
    /// # Errors
    ///
    /// Returns the backend error; local state is unchanged on failure.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn add_to_wishlist(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<WishlistEntry, BackendError> {
        let row = self
            .repo
            .insert_entry(&NewWishlistEntry {
                user_id,
                product_id,
            })
            .await?;
        let entry = WishlistEntry::from_row(row, Utc::now());

        add_breadcrumb(
            "wishlist",
            "Added to wishlist",
            Some(&[("product_id", product_id.to_string().as_str())]),
        );
        self.state.send_modify(|state| state.items.push(entry.clone()));
        Ok(entry)
    }

    /// Delete one entry.
    ///
    /// # Errors
    ///
    /// Returns the backend error; local state is unchanged on failure.
    #[instrument(skip(self), fields(entry_id = %entry_id))]
    pub async fn remove_from_wishlist(&self, entry_id: WishlistEntryId) -> Result<(), BackendError> {
        self.repo.delete_entry(entry_id).await?;

        add_breadcrumb("wishlist", "Removed from wishlist", None);
        self.state
            .send_modify(|state| state.items.retain(|entry| entry.id != entry_id));
        Ok(())
    }

    /// Forget local entries without touching the backend.
    pub fn reset(&self) {
        self.state.send_replace(WishlistState::default());
    }
}

impl std::fmt::Debug for WishlistStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WishlistStore")
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}
