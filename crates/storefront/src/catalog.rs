//! Product browsing.
//!
//! Listings are always read fresh from the backend; nothing is cached here.

use std::sync::Arc;

use tracing::instrument;

use bazaar_core::{ProductId, UserId};

use crate::backend::{BackendError, ProductRepository};
use crate::models::{Product, ProductFilter};

/// Read-only access to the `products` table.
#[derive(Clone)]
pub struct Catalog {
    repo: Arc<dyn ProductRepository>,
}

impl Catalog {
    #[must_use]
    pub fn new(repo: Arc<dyn ProductRepository>) -> Self {
        Self { repo }
    }

    /// Products matching `filter`, in its sort order.
    ///
    /// # Errors
    ///
    /// Returns the backend error.
    #[instrument(skip(self))]
    pub async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, BackendError> {
        self.repo.list_products(filter).await
    }

    /// A seller's listings, newest first.
    ///
    /// # Errors
    ///
    /// Returns the backend error.
    #[instrument(skip(self), fields(seller_id = %seller_id))]
    pub async fn products_by_seller(&self, seller_id: UserId) -> Result<Vec<Product>, BackendError> {
        self.repo.products_by_seller(seller_id).await
    }

    /// A single listing, if it exists.
    ///
    /// # Errors
    ///
    /// Returns the backend error.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Option<Product>, BackendError> {
        self.repo.get_product(id).await
    }
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog").finish_non_exhaustive()
    }
}
