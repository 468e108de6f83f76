//! Integration tests for pricing arithmetic as seen through listings.

use rust_decimal::Decimal;

use bazaar_core::UserId;
use bazaar_core::pricing::{
    SKU_PREFIX, calculate_commission, calculate_discount, calculate_seller_earnings,
};
use bazaar_integration_tests::product;

#[test]
fn test_commission_and_earnings_split_the_total() {
    let total = Decimal::from(100);
    assert_eq!(calculate_commission(total), Decimal::from(10));
    assert_eq!(calculate_seller_earnings(total), Decimal::from(90));
    assert_eq!(
        calculate_commission(total) + calculate_seller_earnings(total),
        total
    );
}

#[test]
fn test_discount_percentages() {
    assert_eq!(
        calculate_discount(Decimal::from(100), Decimal::from(75)),
        Some(25)
    );
    assert_eq!(
        calculate_discount(Decimal::from(100), Decimal::from(100)),
        Some(0)
    );
    assert_eq!(calculate_discount(Decimal::ZERO, Decimal::ZERO), None);
}

#[test]
fn test_listing_badge_matches_arithmetic() {
    let listing = product(UserId::random(), 80, Some(60));
    assert_eq!(listing.discount_percent(), Some(25));
    assert_eq!(listing.effective_price(), Decimal::from(60));
}

#[test]
fn test_seeded_skus_use_prefix() {
    let listing = product(UserId::random(), 10, None);
    assert!(listing.sku.starts_with(&format!("{SKU_PREFIX}-")));
    assert_eq!(listing.sku, listing.sku.to_uppercase());
}
