//! Offline pricing helpers.

use rust_decimal::Decimal;
use tracing::{info, warn};

use bazaar_core::pricing::{
    COMMISSION_RATE, calculate_commission, calculate_discount, calculate_seller_earnings,
    generate_sku,
};

pub fn commission(amount: Decimal) {
    info!(
        "Commission at {}%: {}",
        (COMMISSION_RATE * Decimal::ONE_HUNDRED).normalize(),
        calculate_commission(amount)
    );
}

pub fn earnings(amount: Decimal) {
    info!("Seller earnings: {}", calculate_seller_earnings(amount));
}

pub fn discount(price: Decimal, discount_price: Decimal) {
    match calculate_discount(price, discount_price) {
        Some(percent) => info!("Discount: {percent}%"),
        None => warn!("No discount percentage for a zero list price"),
    }
}

pub fn sku() {
    info!("{}", generate_sku());
}
