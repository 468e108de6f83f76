//! Integration tests for Bazaar.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bazaar-integration-tests
//! ```
//!
//! Every test runs against [`MemoryBackend`]; no network or hosted project
//! is needed.
//!
//! # Test Categories
//!
//! - `auth_flow` - Session bootstrap, sign-in, sign-up, sign-out
//! - `cart_flow` - Cart mutations, totals, failure handling
//! - `wishlist_flow` - Wishlist membership
//! - `dashboards` - Role gating and dashboard figures
//! - `pricing` - Commission, discount and SKU arithmetic

use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use secrecy::SecretString;

use bazaar_core::pricing::calculate_commission;
use bazaar_core::{Email, OrderId, OrderStatus, PaymentStatus, ProductId, Role, UserId};
use bazaar_storefront::models::{Identity, Order, Product};
use bazaar_storefront::{MemoryBackend, Storefront};

/// Password given to every seeded account.
pub const PASSWORD: &str = "correct-horse";

/// A storefront wired to a fresh in-memory backend.
pub struct TestMarket {
    pub backend: MemoryBackend,
    pub storefront: Storefront,
}

impl Default for TestMarket {
    fn default() -> Self {
        Self::new()
    }
}

impl TestMarket {
    #[must_use]
    pub fn new() -> Self {
        let backend = MemoryBackend::new();
        let storefront = Storefront::new(Arc::new(backend.clone()));
        Self {
            backend,
            storefront,
        }
    }

    /// Seed an account with identity row; password is [`PASSWORD`].
    ///
    /// # Panics
    ///
    /// Panics if `email` is malformed.
    pub fn user(&self, email: &str, role: Role) -> Identity {
        let email = Email::parse(email).expect("test email must be valid");
        self.backend.seed_user(&email, PASSWORD, "Test User", role)
    }

    /// Seed an account and sign it in.
    ///
    /// # Panics
    ///
    /// Panics if sign-in fails.
    pub async fn signed_in(&self, email: &str, role: Role) -> Identity {
        self.user(email, role);
        self.storefront
            .auth()
            .sign_in(email, &password())
            .await
            .expect("seeded user must be able to sign in")
    }

    /// Seed a listing priced at `price`, optionally discounted.
    pub fn product(&self, seller_id: UserId, price: i64, discount: Option<i64>) -> Product {
        let product = product(seller_id, price, discount);
        self.backend.insert_product(product.clone());
        product
    }

    /// Seed an order placed `age_hours` ago with the standard commission.
    pub fn order(&self, seller_id: UserId, total: i64, status: OrderStatus, age_hours: i64) -> Order {
        let total = Decimal::from(total);
        let order = Order {
            id: OrderId::random(),
            customer_id: UserId::random(),
            seller_id,
            status,
            total_amount: total,
            commission_amount: calculate_commission(total),
            payment_method: None,
            payment_status: PaymentStatus::Pending,
            created_at: Utc::now() - Duration::hours(age_hours),
        };
        self.backend.insert_order(order.clone());
        order
    }
}

/// [`PASSWORD`] as a secret.
#[must_use]
pub fn password() -> SecretString {
    SecretString::from(PASSWORD)
}

/// A listing that is not stored anywhere.
#[must_use]
pub fn product(seller_id: UserId, price: i64, discount: Option<i64>) -> Product {
    let now = Utc::now();
    Product {
        id: ProductId::random(),
        seller_id,
        title: format!("Item at {price}"),
        description: String::new(),
        price: Decimal::from(price),
        discount_price: discount.map(Decimal::from),
        images: Vec::new(),
        category: "Electronics".to_string(),
        subcategory: None,
        stock: 10,
        sku: bazaar_core::pricing::generate_sku(),
        brand: None,
        rating: 0.0,
        review_count: 0,
        variants: Vec::new(),
        created_at: now,
        updated_at: now,
    }
}
