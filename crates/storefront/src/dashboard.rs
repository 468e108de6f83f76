//! Seller and admin dashboard figures.
//!
//! Figures are computed client-side from rows read fresh on every load.
//! Role checks live on [`Storefront`](crate::state::Storefront); the loaders
//! here assume the caller already passed them.

use rust_decimal::Decimal;
use tracing::instrument;

use bazaar_core::{Role, UserId};

use crate::backend::{BackendError, IdentityRepository, OrderRepository, ProductRepository};
use crate::models::{Order, OrderTotals, Product};

/// How many recent orders the seller dashboard shows.
pub const RECENT_ORDER_LIMIT: usize = 10;

/// Seller dashboard figures.
///
/// Order figures cover only the [`RECENT_ORDER_LIMIT`] most recent orders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SellerStats {
    pub total_products: usize,
    pub total_orders: usize,
    /// Σ (total − commission) over the recent orders.
    pub total_revenue: Decimal,
    /// Recent orders still waiting on the seller.
    pub pending_orders: usize,
    /// Newest first.
    pub recent_orders: Vec<Order>,
}

impl SellerStats {
    /// Load a seller's listings and recent orders and derive the figures.
    ///
    /// # Errors
    ///
    /// Returns the backend error from either read.
    #[instrument(skip(repo), fields(seller_id = %seller_id))]
    pub async fn load<R>(repo: &R, seller_id: UserId) -> Result<Self, BackendError>
    where
        R: ProductRepository + OrderRepository + ?Sized,
    {
        let listings = repo.products_by_seller(seller_id).await?;
        let recent = repo
            .recent_orders_for_seller(seller_id, RECENT_ORDER_LIMIT)
            .await?;
        Ok(Self::from_rows(&listings, recent))
    }

    #[must_use]
    pub fn from_rows(products: &[Product], recent_orders: Vec<Order>) -> Self {
        Self {
            total_products: products.len(),
            total_orders: recent_orders.len(),
            total_revenue: recent_orders.iter().map(Order::seller_earnings).sum(),
            pending_orders: recent_orders
                .iter()
                .filter(|order| order.status.awaits_seller())
                .count(),
            recent_orders,
        }
    }
}

/// Marketplace-wide figures for the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminStats {
    pub total_users: usize,
    pub total_sellers: usize,
    pub total_products: usize,
    pub total_orders: usize,
    /// Σ order totals.
    pub total_revenue: Decimal,
    /// Σ commission amounts.
    pub commission_earned: Decimal,
}

impl AdminStats {
    /// Read roles, product count and order totals and derive the figures.
    ///
    /// # Errors
    ///
    /// Returns the backend error from any read.
    #[instrument(skip_all)]
    pub async fn load<R>(repo: &R) -> Result<Self, BackendError>
    where
        R: IdentityRepository + ProductRepository + OrderRepository + ?Sized,
    {
        let roles = repo.list_roles().await?;
        let total_products = repo.count_products().await?;
        let totals = repo.list_order_totals().await?;
        Ok(Self::from_rows(&roles, total_products, &totals))
    }

    #[must_use]
    pub fn from_rows(roles: &[Role], total_products: usize, orders: &[OrderTotals]) -> Self {
        Self {
            total_users: roles.len(),
            total_sellers: roles.iter().filter(|role| **role == Role::Seller).count(),
            total_products,
            total_orders: orders.len(),
            total_revenue: orders.iter().map(|o| o.total_amount).sum(),
            commission_earned: orders.iter().map(|o| o.commission_amount).sum(),
        }
    }
}
