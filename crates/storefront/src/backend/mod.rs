//! Data-access seams between the stores and the hosted marketplace backend.
//!
//! # Architecture
//!
//! - The hosted service is source of truth - NO local persistence
//! - Every store receives its repository as an `Arc<dyn Trait>` at construction
//! - [`RestBackend`] talks to the hosted service over HTTP
//! - [`MemoryBackend`] keeps tables in process for tests and demos
//!
//! # Tables
//!
//! - `users` - identity rows keyed by the auth-service user ID
//! - `products` - listings (read-only here)
//! - `cart_items` - joined to `products`
//! - `wishlist` - joined to `products`
//! - `orders` - read by the dashboards

pub mod memory;
pub mod query;
pub mod rest;

pub use memory::MemoryBackend;
pub use query::{Direction, TableQuery};
pub use rest::RestBackend;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use thiserror::Error;

use bazaar_core::{CartLineId, Email, ProductId, Role, UserId, WishlistEntryId};

use crate::models::{
    CartLineRow, Identity, NewCartLine, NewIdentity, NewWishlistEntry, Order, OrderTotals,
    Product, ProductFilter, WishlistRow,
};
use crate::stores::auth::AuthError;

/// Logical table names.
pub mod tables {
    pub const USERS: &str = "users";
    pub const PRODUCTS: &str = "products";
    pub const CART_ITEMS: &str = "cart_items";
    pub const WISHLIST: &str = "wishlist";
    pub const ORDERS: &str = "orders";
}

/// Select clause embedding the referenced product under `product`.
pub const WITH_PRODUCT: &str = "*,product:products(*)";

/// Errors that can occur when talking to the hosted backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Missing or rejected credentials.
    #[error("Unauthorized")]
    Unauthorized,

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Failed to build a request URL.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// The credential owner reported by the auth service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: UserId,
    pub email: Option<String>,
}

/// An authenticated session held by an [`AuthGateway`].
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// Bearer token for table requests.
    pub access_token: SecretString,
    pub refresh_token: Option<SecretString>,
    /// Absolute expiry, when the auth service reported one.
    pub expires_at: Option<DateTime<Utc>>,
    pub user: AuthUser,
}

impl AuthSession {
    /// Whether the access token has expired at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

/// Credential exchange with the hosted auth service.
///
/// Implementations hold the current session; table requests made through
/// the same backend are authorized with it.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Exchange email and password for a session.
    async fn sign_in_with_password(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<AuthSession, AuthError>;

    /// Register a new credential.
    async fn sign_up(&self, email: &Email, password: &SecretString)
    -> Result<AuthUser, AuthError>;

    /// The session currently held, if any and not expired.
    async fn current_session(&self) -> Result<Option<AuthSession>, BackendError>;

    /// Invalidate the remote session and forget it locally.
    async fn sign_out(&self) -> Result<(), BackendError>;
}

/// `users` table access.
#[async_trait]
pub trait IdentityRepository: Send + Sync {
    async fn get_identity(&self, id: UserId) -> Result<Option<Identity>, BackendError>;
    async fn insert_identity(&self, identity: &NewIdentity) -> Result<Identity, BackendError>;
    /// The role column of every identity row.
    async fn list_roles(&self) -> Result<Vec<Role>, BackendError>;
}

/// `cart_items` table access.
#[async_trait]
pub trait CartRepository: Send + Sync {
    async fn list_lines(&self, user_id: UserId) -> Result<Vec<CartLineRow>, BackendError>;
    async fn insert_line(&self, line: &NewCartLine) -> Result<CartLineRow, BackendError>;
    async fn update_line_quantity(
        &self,
        line_id: CartLineId,
        quantity: u32,
    ) -> Result<(), BackendError>;
    async fn delete_line(&self, line_id: CartLineId) -> Result<(), BackendError>;
    async fn delete_lines_for(&self, user_id: UserId) -> Result<(), BackendError>;
}

/// `wishlist` table access.
#[async_trait]
pub trait WishlistRepository: Send + Sync {
    async fn list_entries(&self, user_id: UserId) -> Result<Vec<WishlistRow>, BackendError>;
    async fn insert_entry(&self, entry: &NewWishlistEntry) -> Result<WishlistRow, BackendError>;
    async fn delete_entry(&self, entry_id: WishlistEntryId) -> Result<(), BackendError>;
}

/// `products` table access.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, BackendError>;
    async fn products_by_seller(&self, seller_id: UserId) -> Result<Vec<Product>, BackendError>;
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, BackendError>;
    async fn count_products(&self) -> Result<usize, BackendError>;
}

/// `orders` table access.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// A seller's most recent orders, newest first.
    async fn recent_orders_for_seller(
        &self,
        seller_id: UserId,
        limit: usize,
    ) -> Result<Vec<Order>, BackendError>;
    /// The money columns of every order.
    async fn list_order_totals(&self) -> Result<Vec<OrderTotals>, BackendError>;
}

/// Everything the storefront needs from a backend.
pub trait Backend:
    AuthGateway
    + IdentityRepository
    + CartRepository
    + WishlistRepository
    + ProductRepository
    + OrderRepository
{
}

impl<T> Backend for T where
    T: AuthGateway
        + IdentityRepository
        + CartRepository
        + WishlistRepository
        + ProductRepository
        + OrderRepository
{
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_display() {
        let err = BackendError::Api {
            status: 409,
            message: "duplicate key".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 409 - duplicate key");
        assert_eq!(
            BackendError::RateLimited(30).to_string(),
            "Rate limited, retry after 30 seconds"
        );
    }

    #[test]
    fn test_session_expiry() {
        let now = Utc::now();
        let mut session = AuthSession {
            access_token: SecretString::from("token"),
            refresh_token: None,
            expires_at: None,
            user: AuthUser {
                id: UserId::random(),
                email: None,
            },
        };
        assert!(!session.is_expired(now));

        session.expires_at = Some(now - chrono::Duration::seconds(1));
        assert!(session.is_expired(now));

        session.expires_at = Some(now + chrono::Duration::hours(1));
        assert!(!session.is_expired(now));
    }
}
