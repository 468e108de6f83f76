//! Dashboard commands.

use tracing::info;

use super::{CliError, Session};

/// Print the signed-in seller's figures and recent orders.
///
/// # Errors
///
/// Returns an error if the identity is not a seller or a request fails.
pub async fn seller(session: &Session) -> Result<(), CliError> {
    let stats = session.storefront.seller_stats().await?;

    info!("Products:       {}", stats.total_products);
    info!("Recent orders:  {}", stats.total_orders);
    info!("Pending:        {}", stats.pending_orders);
    info!("Revenue:        {}", stats.total_revenue);

    for order in &stats.recent_orders {
        info!(
            "{}  {}  {}  {}",
            order.created_at.format("%Y-%m-%d"),
            order.id,
            order.status,
            order.seller_earnings()
        );
    }
    Ok(())
}

/// Print marketplace-wide figures.
///
/// # Errors
///
/// Returns an error if the identity is not an admin or a request fails.
pub async fn admin(session: &Session) -> Result<(), CliError> {
    let stats = session.storefront.admin_stats().await?;

    info!("Users:       {}", stats.total_users);
    info!("Sellers:     {}", stats.total_sellers);
    info!("Products:    {}", stats.total_products);
    info!("Orders:      {}", stats.total_orders);
    info!("Revenue:     {}", stats.total_revenue);
    info!("Commission:  {}", stats.commission_earned);
    Ok(())
}
