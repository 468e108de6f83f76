//! Wishlist commands for the signed-in identity.

use tracing::info;

use bazaar_core::{ProductId, WishlistEntryId};

use super::{CliError, Session};

/// Fetch and print saved products.
///
/// # Errors
///
/// Returns an error if the backend request fails.
pub async fn show(session: &Session) -> Result<(), CliError> {
    let wishlist = session.storefront.wishlist();
    wishlist.fetch_wishlist(session.identity.id).await?;

    let items = wishlist.items();
    if items.is_empty() {
        info!("Wishlist is empty");
    }
    for entry in &items {
        match &entry.product {
            Some(snapshot) => info!(
                "{}  {}  {}",
                entry.id,
                snapshot.value().title,
                snapshot.value().effective_price()
            ),
            None => info!("{}  product {} (unavailable)", entry.id, entry.product_id),
        }
    }
    Ok(())
}

/// Save a product.
///
/// # Errors
///
/// Returns an error if the backend request fails.
pub async fn add(session: &Session, product_id: ProductId) -> Result<(), CliError> {
    let entry = session
        .storefront
        .wishlist()
        .add_to_wishlist(session.identity.id, product_id)
        .await?;
    info!(entry_id = %entry.id, "Saved to wishlist");
    Ok(())
}

/// Remove a saved product.
///
/// # Errors
///
/// Returns an error if the backend request fails.
pub async fn remove(session: &Session, entry_id: WishlistEntryId) -> Result<(), CliError> {
    session
        .storefront
        .wishlist()
        .remove_from_wishlist(entry_id)
        .await?;
    info!(%entry_id, "Removed from wishlist");
    Ok(())
}
