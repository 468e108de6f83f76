//! Cart state: the active identity's line items.
//!
//! Every mutation writes through to the backend first and only patches the
//! local list once the remote call succeeds. Patches are applied to the
//! state current at completion time, so concurrent adds all land and
//! concurrent quantity updates to one line are last-writer-wins.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::watch;
use tracing::{debug, instrument};

use bazaar_core::{CartLineId, ProductId, UserId, VariantId};

use crate::backend::{BackendError, CartRepository};
use crate::error::add_breadcrumb;
use crate::models::{CartLine, NewCartLine};

/// Snapshot of cart state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartState {
    pub items: Vec<CartLine>,
    /// `true` while a fetch is in flight.
    pub loading: bool,
}

impl CartState {
    /// Sum of `effective price × quantity` over all lines.
    ///
    /// Lines without a product snapshot contribute nothing.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.iter().map(CartLine::line_total).sum()
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|line| u64::from(line.quantity)).sum()
    }
}

/// Mirrors `cart_items` rows for one identity.
pub struct CartStore {
    repo: Arc<dyn CartRepository>,
    state: watch::Sender<CartState>,
}

impl CartStore {
    #[must_use]
    pub fn new(repo: Arc<dyn CartRepository>) -> Self {
        Self {
            repo,
            state: watch::Sender::new(CartState::default()),
        }
    }

    // =========================================================================
    // Readers
    // =========================================================================

    #[must_use]
    pub fn state(&self) -> CartState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn items(&self) -> Vec<CartLine> {
        self.state.borrow().items.clone()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    /// Cart total at current snapshot prices.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.state.borrow().total()
    }

    /// Number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.state.borrow().item_count()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartState> {
        self.state.subscribe()
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Replace local lines with the identity's remote lines.
    ///
    /// # Errors
    ///
    /// Returns the backend error on failure; local lines are left as they
    /// were and `loading` is cleared either way.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn fetch_cart(&self, user_id: UserId) -> Result<(), BackendError> {
        self.state.send_modify(|state| state.loading = true);

        let rows = match self.repo.list_lines(user_id).await {
            Ok(rows) => rows,
            Err(e) => {
                self.state.send_modify(|state| state.loading = false);
                return Err(e);
            }
        };

        let as_of = Utc::now();
        let items: Vec<CartLine> = rows
            .into_iter()
            .map(|row| CartLine::from_row(row, as_of))
            .collect();
        debug!(lines = items.len(), "Cart fetched");

        self.state.send_modify(|state| {
            state.items = items;
            state.loading = false;
        });
        Ok(())
    }

    /// Insert a new line and append it locally.
    ///
    /// Always creates a new line, even if one for the same product and
    /// variant exists.
    ///
    /// # Errors
    ///
    /// Returns the backend error; local state is unchanged on failure.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn add_to_cart(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
        variant_id: Option<VariantId>,
    ) -> Result<CartLine, BackendError> {
        let row = self
            .repo
            .insert_line(&NewCartLine {
                user_id,
                product_id,
                quantity,
                variant_id,
            })
            .await?;
        let line = CartLine::from_row(row, Utc::now());

        add_breadcrumb(
            "cart",
            "Added to cart",
            Some(&[("product_id", product_id.to_string().as_str())]),
        );
        self.state.send_modify(|state| state.items.push(line.clone()));
        Ok(line)
    }

    /// Set one line's quantity.
    ///
    /// No lower bound is enforced; the backend's constraints apply.
    ///
    /// # Errors
    ///
    /// Returns the backend error; local state is unchanged on failure.
    #[instrument(skip(self), fields(line_id = %line_id))]
    pub async fn update_quantity(&self, line_id: CartLineId, quantity: u32) -> Result<(), BackendError> {
        self.repo.update_line_quantity(line_id, quantity).await?;

        self.state.send_modify(|state| {
            if let Some(line) = state.items.iter_mut().find(|line| line.id == line_id) {
                line.quantity = quantity;
            }
        });
        Ok(())
    }

    /// Delete one line.
    ///
    /// # Errors
    ///
    /// Returns the backend error; local state is unchanged on failure.
    #[instrument(skip(self), fields(line_id = %line_id))]
    pub async fn remove_item(&self, line_id: CartLineId) -> Result<(), BackendError> {
        self.repo.delete_line(line_id).await?;

        add_breadcrumb("cart", "Removed from cart", None);
        self.state
            .send_modify(|state| state.items.retain(|line| line.id != line_id));
        Ok(())
    }

    /// Delete every line belonging to the identity.
    ///
    /// # Errors
    ///
    /// Returns the backend error; local state is unchanged on failure.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn clear_cart(&self, user_id: UserId) -> Result<(), BackendError> {
        self.repo.delete_lines_for(user_id).await?;

        add_breadcrumb("cart", "Cleared cart", None);
        self.state.send_modify(|state| state.items.clear());
        Ok(())
    }

    /// Forget local lines without touching the backend.
    pub fn reset(&self) {
        self.state.send_replace(CartState::default());
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}
