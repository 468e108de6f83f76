//! Marketplace pricing arithmetic.
//!
//! Pure functions with no I/O: the platform commission, seller payouts,
//! discount badges, and SKU generation for new listings.

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Platform commission taken from every order total (10%).
pub const COMMISSION_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

/// Prefix shared by every generated SKU.
pub const SKU_PREFIX: &str = "SKU";

const SKU_SUFFIX_LEN: usize = 5;
const BASE36_UPPER: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Platform commission owed on `amount`.
///
/// ```
/// use bazaar_core::pricing::calculate_commission;
/// use rust_decimal::Decimal;
///
/// assert_eq!(calculate_commission(Decimal::from(100)), Decimal::from(10));
/// ```
#[must_use]
pub fn calculate_commission(amount: Decimal) -> Decimal {
    amount * COMMISSION_RATE
}

/// What the seller keeps from an order total after commission.
#[must_use]
pub fn calculate_seller_earnings(order_total: Decimal) -> Decimal {
    order_total - calculate_commission(order_total)
}

/// Whole-number percentage saved by buying at `discount_price`.
///
/// Rounds half up. Returns `None` when `price` is zero, since no
/// percentage exists, and when the result does not fit a `Decimal`.
#[must_use]
pub fn calculate_discount(price: Decimal, discount_price: Decimal) -> Option<i64> {
    let ratio = price.checked_sub(discount_price)?.checked_div(price)?;
    let percent = ratio.checked_mul(Decimal::ONE_HUNDRED)?;
    percent.checked_add(Decimal::new(5, 1))?.floor().to_i64()
}

/// Generate a SKU for a new listing.
///
/// Format: `SKU-<base36 millis>-<5 random base36 chars>`, uppercase.
/// Collisions are possible and not checked.
#[must_use]
pub fn generate_sku() -> String {
    generate_sku_at(Utc::now(), &mut rand::rng())
}

/// Generate a SKU from an explicit clock reading and random source.
#[must_use]
pub fn generate_sku_at<R: Rng + ?Sized>(now: DateTime<Utc>, rng: &mut R) -> String {
    let millis = u64::try_from(now.timestamp_millis()).unwrap_or_default();
    let suffix: String = (0..SKU_SUFFIX_LEN)
        .map(|_| char::from(BASE36_UPPER[rng.random_range(0..BASE36_UPPER.len())]))
        .collect();
    format!("{SKU_PREFIX}-{}-{suffix}", to_base36(millis))
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        // value % 36 is always < 36
        #[allow(clippy::cast_possible_truncation)]
        let digit = (value % 36) as usize;
        digits.push(char::from(BASE36_UPPER[digit]));
        value /= 36;
    }
    digits.iter().rev().collect()
}
