//! Cart line types (`cart_items` table joined to `products`).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bazaar_core::{CartLineId, ProductId, UserId, VariantId};

use super::product::{Product, Snapshot};

/// A `cart_items` row with its joined `product`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLineRow {
    pub id: CartLineId,
    pub user_id: UserId,
    pub product_id: ProductId,
    #[serde(default)]
    pub variant_id: Option<VariantId>,
    pub quantity: u32,
    /// Joined product; absent when the product row was deleted or hidden.
    #[serde(default)]
    pub product: Option<Product>,
}

/// A cart line held in local state.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub id: CartLineId,
    /// Owning identity.
    pub user_id: UserId,
    pub product_id: ProductId,
    pub variant_id: Option<VariantId>,
    pub quantity: u32,
    /// Product as of the fetch that produced this line.
    pub product: Option<Snapshot<Product>>,
}

impl CartLine {
    /// Build a local line from a remote row received at `as_of`.
    #[must_use]
    pub fn from_row(row: CartLineRow, as_of: DateTime<Utc>) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            product_id: row.product_id,
            variant_id: row.variant_id,
            quantity: row.quantity,
            product: row.product.map(|product| Snapshot::new(product, as_of)),
        }
    }

    /// Unit price from the snapshot; zero when no snapshot is attached.
    #[must_use]
    pub fn unit_price(&self) -> Decimal {
        self.product
            .as_ref()
            .map_or(Decimal::ZERO, |snapshot| snapshot.value().effective_price())
    }

    /// Unit price multiplied by quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price() * Decimal::from(self.quantity)
    }
}

/// Insert payload for a new cart line.
#[derive(Debug, Clone, Serialize)]
pub struct NewCartLine {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<VariantId>,
}
