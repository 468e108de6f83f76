//! Storefront context shared across the application.

use std::sync::Arc;

use tracing::instrument;

use bazaar_core::Area;

use crate::backend::{Backend, BackendError, RestBackend};
use crate::catalog::Catalog;
use crate::config::BackendConfig;
use crate::dashboard::{AdminStats, SellerStats};
use crate::error::{Result, StoreError};
use crate::models::Identity;
use crate::stores::{AuthStore, CartStore, WishlistStore};

/// Every store wired to one backend.
///
/// This struct is cheaply cloneable via `Arc`; clones share state.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    backend: Arc<dyn Backend>,
    auth: AuthStore,
    cart: CartStore,
    wishlist: WishlistStore,
    catalog: Catalog,
}

impl Storefront {
    /// Wire all stores to `backend`.
    #[must_use]
    pub fn new<B: Backend + 'static>(backend: Arc<B>) -> Self {
        Self {
            inner: Arc::new(StorefrontInner {
                auth: AuthStore::new(backend.clone(), backend.clone()),
                cart: CartStore::new(backend.clone()),
                wishlist: WishlistStore::new(backend.clone()),
                catalog: Catalog::new(backend.clone()),
                backend,
            }),
        }
    }

    /// Wire all stores to the hosted backend described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn connect(config: &BackendConfig) -> std::result::Result<Self, BackendError> {
        Ok(Self::new(Arc::new(RestBackend::new(config)?)))
    }

    #[must_use]
    pub fn auth(&self) -> &AuthStore {
        &self.inner.auth
    }

    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    #[must_use]
    pub fn wishlist(&self) -> &WishlistStore {
        &self.inner.wishlist
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// The signed-in identity, if its role may open `area`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotSignedIn` without an identity and
    /// `StoreError::Forbidden` when the role lacks access.
    pub fn require(&self, area: Area) -> Result<Identity> {
        let identity = self.inner.auth.identity().ok_or(StoreError::NotSignedIn)?;
        if !identity.can_access(area) {
            return Err(StoreError::Forbidden(area));
        }
        Ok(identity)
    }

    /// Load the signed-in seller's dashboard.
    ///
    /// # Errors
    ///
    /// Returns an access error for non-sellers, or the backend error.
    #[instrument(skip(self))]
    pub async fn seller_stats(&self) -> Result<SellerStats> {
        let seller = self.require(Area::SellerDashboard)?;
        Ok(SellerStats::load(self.inner.backend.as_ref(), seller.id).await?)
    }

    /// Load the marketplace-wide admin dashboard.
    ///
    /// # Errors
    ///
    /// Returns an access error for non-admins, or the backend error.
    #[instrument(skip(self))]
    pub async fn admin_stats(&self) -> Result<AdminStats> {
        self.require(Area::AdminDashboard)?;
        Ok(AdminStats::load(self.inner.backend.as_ref()).await?)
    }

    /// Sign out and forget the signed-in identity's cart and wishlist.
    pub async fn sign_out(&self) {
        self.inner.auth.sign_out().await;
        self.inner.cart.reset();
        self.inner.wishlist.reset();
    }
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("auth", &self.inner.auth)
            .field("cart", &self.inner.cart)
            .field("wishlist", &self.inner.wishlist)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use bazaar_core::{Email, Role};

    use super::*;
    use crate::backend::MemoryBackend;

    async fn signed_in(role: Role) -> Storefront {
        let backend = MemoryBackend::new();
        let email = Email::parse("user@example.com").unwrap();
        backend.seed_user(&email, "hunter22", "User", role);
        let storefront = Storefront::new(Arc::new(backend));
        storefront
            .auth()
            .sign_in("user@example.com", &SecretString::from("hunter22"))
            .await
            .unwrap();
        storefront
    }

    #[tokio::test]
    async fn test_require_without_identity() {
        let storefront = Storefront::new(Arc::new(MemoryBackend::new()));
        assert!(matches!(
            storefront.require(Area::Cart),
            Err(StoreError::NotSignedIn)
        ));
    }

    #[tokio::test]
    async fn test_customer_cannot_open_seller_dashboard() {
        let storefront = signed_in(Role::Customer).await;
        assert!(storefront.require(Area::Cart).is_ok());
        assert!(matches!(
            storefront.seller_stats().await,
            Err(StoreError::Forbidden(Area::SellerDashboard))
        ));
    }

    #[tokio::test]
    async fn test_admin_stats_for_admin() {
        let storefront = signed_in(Role::Admin).await;
        let stats = storefront.admin_stats().await.unwrap();
        assert_eq!(stats.total_users, 1);
        assert_eq!(stats.total_sellers, 0);
    }

    #[tokio::test]
    async fn test_sign_out_resets_stores() {
        let storefront = signed_in(Role::Seller).await;
        storefront.sign_out().await;
        assert!(storefront.auth().identity().is_none());
        assert!(storefront.cart().items().is_empty());
        assert!(storefront.wishlist().items().is_empty());
    }
}
