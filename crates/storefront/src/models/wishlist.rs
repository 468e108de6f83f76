//! Wishlist types (`wishlist` table joined to `products`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bazaar_core::{ProductId, UserId, WishlistEntryId};

use super::product::{Product, Snapshot};

/// A `wishlist` row with its joined `product`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WishlistRow {
    pub id: WishlistEntryId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub product: Option<Product>,
}

/// A saved product held in local state.
#[derive(Debug, Clone, PartialEq)]
pub struct WishlistEntry {
    pub id: WishlistEntryId,
    pub user_id: UserId,
    pub product_id: ProductId,
    /// When the product was saved.
    pub created_at: DateTime<Utc>,
    pub product: Option<Snapshot<Product>>,
}

impl WishlistEntry {
    /// Build a local entry from a remote row received at `as_of`.
    #[must_use]
    pub fn from_row(row: WishlistRow, as_of: DateTime<Utc>) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            product_id: row.product_id,
            created_at: row.created_at,
            product: row.product.map(|product| Snapshot::new(product, as_of)),
        }
    }
}

/// Insert payload for a new wishlist entry.
#[derive(Debug, Clone, Serialize)]
pub struct NewWishlistEntry {
    pub user_id: UserId,
    pub product_id: ProductId,
}
