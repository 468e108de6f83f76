//! Product projection (`products` table) and the as-of snapshot wrapper.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bazaar_core::pricing::calculate_discount;
use bazaar_core::{ProductId, UserId, VariantId};

/// A product listing as returned by the hosted store.
///
/// Read-only from the storefront's point of view; sellers edit listings
/// elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    /// Seller who owns the listing.
    pub seller_id: UserId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// List price.
    pub price: Decimal,
    /// Sale price, when the listing is discounted.
    #[serde(default)]
    pub discount_price: Option<Decimal>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub subcategory: Option<String>,
    /// Units in stock.
    pub stock: i32,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub brand: Option<String>,
    /// Average review rating.
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub review_count: i64,
    /// Embedded `product_variants` rows; empty unless the read selected them.
    #[serde(default)]
    pub variants: Vec<ProductVariant>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A color/size option of a listing (`product_variants` table).
///
/// Cart lines may reference one through `variant_id`. The adjustment is
/// informational; cart totals use the product's effective price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductVariant {
    pub id: VariantId,
    pub product_id: ProductId,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    pub stock: i32,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub price_adjustment: Option<Decimal>,
}

impl Product {
    /// Price a shopper pays: the sale price if present, else the list price.
    #[must_use]
    pub fn effective_price(&self) -> Decimal {
        self.discount_price.unwrap_or(self.price)
    }

    /// Percentage badge for discounted listings.
    ///
    /// `None` when the listing has no sale price or a zero list price.
    #[must_use]
    pub fn discount_percent(&self) -> Option<i64> {
        self.discount_price
            .and_then(|discount| calculate_discount(self.price, discount))
    }

    /// Whether at least one unit is available.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// The embedded variant with `id`, if it was loaded.
    #[must_use]
    pub fn variant(&self, id: VariantId) -> Option<&ProductVariant> {
        self.variants.iter().find(|variant| variant.id == id)
    }
}

/// A denormalized copy of a row embedded in another row, stamped with the
/// instant the client received it.
///
/// A snapshot reflects its source as of [`Snapshot::as_of`] and is never
/// refreshed in place; re-fetch the owning container to see newer data.
/// Prices and stock read through a snapshot may therefore be stale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot<T> {
    value: T,
    as_of: DateTime<Utc>,
}

impl<T> Snapshot<T> {
    /// Wrap `value` as observed at `as_of`.
    #[must_use]
    pub const fn new(value: T, as_of: DateTime<Utc>) -> Self {
        Self { value, as_of }
    }

    /// The captured value.
    #[must_use]
    pub const fn value(&self) -> &T {
        &self.value
    }

    /// When the value was captured.
    #[must_use]
    pub const fn as_of(&self) -> DateTime<Utc> {
        self.as_of
    }

    /// How long ago the value was captured, relative to `now`.
    #[must_use]
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.as_of
    }

    /// Unwrap the captured value.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.value
    }
}

/// Sort order for product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    /// Most recently listed first.
    #[default]
    Newest,
    /// Cheapest list price first.
    PriceLow,
    /// Most expensive list price first.
    PriceHigh,
    /// Highest rated first.
    Rating,
}

impl std::str::FromStr for ProductSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" => Ok(Self::Newest),
            "price_low" => Ok(Self::PriceLow),
            "price_high" => Ok(Self::PriceHigh),
            "rating" => Ok(Self::Rating),
            _ => Err(format!("invalid sort: {s}")),
        }
    }
}

/// Catalog browsing filter.
///
/// Price bounds are inclusive and apply to the list price.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub sort: ProductSort,
}

impl ProductFilter {
    /// Whether `product` passes the category and price constraints.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        self.category
            .as_deref()
            .is_none_or(|category| product.category == category)
            && self.min_price.is_none_or(|min| product.price >= min)
            && self.max_price.is_none_or(|max| product.price <= max)
    }

    /// Sort `products` in place according to [`ProductFilter::sort`].
    pub fn sort(&self, products: &mut [Product]) {
        match self.sort {
            ProductSort::Newest => products.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            ProductSort::PriceLow => products.sort_by(|a, b| a.price.cmp(&b.price)),
            ProductSort::PriceHigh => products.sort_by(|a, b| b.price.cmp(&a.price)),
            ProductSort::Rating => products.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn product(price: i64, discount: Option<i64>) -> Product {
        let now = Utc::now();
        Product {
            id: ProductId::random(),
            seller_id: UserId::random(),
            title: "Lamp".to_string(),
            description: String::new(),
            price: Decimal::from(price),
            discount_price: discount.map(Decimal::from),
            images: Vec::new(),
            category: "Home & Living".to_string(),
            subcategory: None,
            stock: 3,
            sku: "SKU-TEST".to_string(),
            brand: None,
            rating: 4.5,
            review_count: 12,
            variants: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_effective_price_prefers_discount() {
        assert_eq!(product(100, Some(80)).effective_price(), Decimal::from(80));
        assert_eq!(product(100, None).effective_price(), Decimal::from(100));
    }

    #[test]
    fn test_discount_percent() {
        assert_eq!(product(100, Some(75)).discount_percent(), Some(25));
        assert_eq!(product(100, None).discount_percent(), None);
        assert_eq!(product(0, Some(0)).discount_percent(), None);
    }

    #[test]
    fn test_deserialize_numeric_columns() {
        let json = r#"{
            "id": "7d0c5f8e-1111-4a52-8f43-55b1f1f0a001",
            "seller_id": "7d0c5f8e-2222-4a52-8f43-55b1f1f0a001",
            "title": "Desk",
            "price": 149.99,
            "discount_price": null,
            "stock": 0,
            "rating": 4,
            "created_at": "2025-03-01T10:00:00+00:00",
            "updated_at": "2025-03-01T10:00:00+00:00"
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.price, Decimal::new(14999, 2));
        assert!(!product.in_stock());
        assert!(product.images.is_empty());
    }

    #[test]
    fn test_deserialize_embedded_variants() {
        let json = r#"{
            "id": "7d0c5f8e-1111-4a52-8f43-55b1f1f0a001",
            "seller_id": "7d0c5f8e-2222-4a52-8f43-55b1f1f0a001",
            "title": "Tee",
            "price": 20,
            "stock": 5,
            "variants": [{
                "id": "7d0c5f8e-3333-4a52-8f43-55b1f1f0a001",
                "product_id": "7d0c5f8e-1111-4a52-8f43-55b1f1f0a001",
                "color": "Red",
                "size": "M",
                "stock": 2,
                "sku": "SKU-TEE-RM",
                "price_adjustment": 1.5
            }],
            "created_at": "2025-03-01T10:00:00+00:00",
            "updated_at": "2025-03-01T10:00:00+00:00"
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        let id: VariantId = "7d0c5f8e-3333-4a52-8f43-55b1f1f0a001".parse().unwrap();
        let variant = product.variant(id).unwrap();
        assert_eq!(variant.size.as_deref(), Some("M"));
        assert_eq!(variant.price_adjustment, Some(Decimal::new(15, 1)));
        assert!(product.variant(VariantId::random()).is_none());
        // Adjustments do not change what the cart charges.
        assert_eq!(product.effective_price(), Decimal::from(20));
    }

    #[test]
    fn test_snapshot_age() {
        let as_of = Utc::now();
        let snapshot = Snapshot::new(product(10, None), as_of);
        let later = as_of + chrono::Duration::seconds(90);
        assert_eq!(snapshot.age(later).num_seconds(), 90);
        assert_eq!(snapshot.as_of(), as_of);
        assert_eq!(snapshot.value().title, "Lamp");
    }

    #[test]
    fn test_filter_matches_bounds_inclusively() {
        let filter = ProductFilter {
            category: Some("Home & Living".to_string()),
            min_price: Some(Decimal::from(50)),
            max_price: Some(Decimal::from(100)),
            sort: ProductSort::Newest,
        };
        assert!(filter.matches(&product(50, None)));
        assert!(filter.matches(&product(100, None)));
        assert!(!filter.matches(&product(101, None)));

        let mut other = product(75, None);
        other.category = "Books".to_string();
        assert!(!filter.matches(&other));
    }

    #[test]
    fn test_filter_sorts() {
        let mut products = vec![product(30, None), product(10, None), product(20, None)];

        ProductFilter {
            sort: ProductSort::PriceLow,
            ..ProductFilter::default()
        }
        .sort(&mut products);
        assert_eq!(products[0].price, Decimal::from(10));

        ProductFilter {
            sort: ProductSort::PriceHigh,
            ..ProductFilter::default()
        }
        .sort(&mut products);
        assert_eq!(products[0].price, Decimal::from(30));
    }

    #[test]
    fn test_sort_parse() {
        assert_eq!("price_low".parse::<ProductSort>(), Ok(ProductSort::PriceLow));
        assert!("cheapest".parse::<ProductSort>().is_err());
    }
}
