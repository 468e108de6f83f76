//! Cart commands for the signed-in identity.

use tracing::info;

use bazaar_core::{CartLineId, ProductId, VariantId};

use super::{CliError, Session};

/// Fetch and print the cart with its total.
///
/// # Errors
///
/// Returns an error if the backend request fails.
pub async fn show(session: &Session) -> Result<(), CliError> {
    let cart = session.storefront.cart();
    cart.fetch_cart(session.identity.id).await?;

    let state = cart.state();
    if state.items.is_empty() {
        info!("Cart is empty");
        return Ok(());
    }

    for line in &state.items {
        let title = line
            .product
            .as_ref()
            .map_or("(unavailable)", |snapshot| snapshot.value().title.as_str());
        info!(
            "{}  {} x{}  {}",
            line.id,
            title,
            line.quantity,
            line.line_total()
        );
    }
    info!("{} item(s), total {}", state.item_count(), state.total());
    Ok(())
}

/// Add a line to the cart.
///
/// # Errors
///
/// Returns an error if the backend request fails.
pub async fn add(
    session: &Session,
    product_id: ProductId,
    quantity: u32,
    variant_id: Option<VariantId>,
) -> Result<(), CliError> {
    let line = session
        .storefront
        .cart()
        .add_to_cart(session.identity.id, product_id, quantity, variant_id)
        .await?;
    info!(line_id = %line.id, "Added to cart");
    Ok(())
}

/// Set the quantity of a line.
///
/// # Errors
///
/// Returns an error if the backend request fails.
pub async fn update(session: &Session, line_id: CartLineId, quantity: u32) -> Result<(), CliError> {
    session
        .storefront
        .cart()
        .update_quantity(line_id, quantity)
        .await?;
    info!(%line_id, quantity, "Quantity updated");
    Ok(())
}

/// Remove a line from the cart.
///
/// # Errors
///
/// Returns an error if the backend request fails.
pub async fn remove(session: &Session, line_id: CartLineId) -> Result<(), CliError> {
    session.storefront.cart().remove_item(line_id).await?;
    info!(%line_id, "Removed from cart");
    Ok(())
}

/// Remove every line from the cart.
///
/// # Errors
///
/// Returns an error if the backend request fails.
pub async fn clear(session: &Session) -> Result<(), CliError> {
    session
        .storefront
        .cart()
        .clear_cart(session.identity.id)
        .await?;
    info!("Cart cleared");
    Ok(())
}
