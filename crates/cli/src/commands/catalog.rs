//! Catalog browsing commands.

use tracing::info;

use bazaar_core::ProductId;
use bazaar_storefront::models::{Product, ProductFilter};
use bazaar_storefront::{BackendConfig, Storefront};

use super::CliError;

/// List products matching `filter`.
///
/// # Errors
///
/// Returns an error if the backend request fails.
pub async fn list(config: &BackendConfig, filter: &ProductFilter) -> Result<(), CliError> {
    let storefront = Storefront::connect(config)?;
    let products = storefront.catalog().list_products(filter).await?;

    info!("{} product(s)", products.len());
    for product in &products {
        info!("{}", summary(product));
    }
    Ok(())
}

/// Show one product in detail.
///
/// # Errors
///
/// Returns `CliError::NotFound` if the product does not exist.
pub async fn show(config: &BackendConfig, id: ProductId) -> Result<(), CliError> {
    let storefront = Storefront::connect(config)?;
    let product = storefront
        .catalog()
        .get_product(id)
        .await?
        .ok_or_else(|| CliError::NotFound(format!("product {id}")))?;

    info!("{}", summary(&product));
    info!("  category: {}", product.category);
    if let Some(brand) = &product.brand {
        info!("  brand: {brand}");
    }
    info!("  sku: {}", product.sku);
    info!(
        "  rating: {:.1} ({} reviews)",
        product.rating, product.review_count
    );
    if !product.description.is_empty() {
        info!("  {}", product.description);
    }
    Ok(())
}

/// One-line listing: id, title, price (with discount badge) and stock.
pub fn summary(product: &Product) -> String {
    let price = match product.discount_percent() {
        Some(percent) => format!(
            "{} (was {}, -{percent}%)",
            product.effective_price(),
            product.price
        ),
        None => product.effective_price().to_string(),
    };
    let stock = if product.in_stock() {
        format!("{} in stock", product.stock)
    } else {
        "out of stock".to_string()
    };
    format!("{}  {}  {price}  [{stock}]", product.id, product.title)
}
