//! In-process backend for tests and offline demos.
//!
//! Mimics the hosted service closely enough for the stores: rows are kept
//! per table, embedded products are joined at read time, inserts stamp
//! server-side columns, and a foreign-key miss surfaces as a `409` the way
//! the table API reports it. [`MemoryBackend::set_offline`] makes every
//! call fail with a `503`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use uuid::Uuid;

use bazaar_core::{CartLineId, Email, ProductId, Role, UserId, WishlistEntryId};

use super::{
    AuthGateway, AuthSession, AuthUser, BackendError, CartRepository, IdentityRepository,
    OrderRepository, ProductRepository, WishlistRepository,
};
use crate::models::{
    CartLineRow, Identity, NewCartLine, NewIdentity, NewWishlistEntry, Order, OrderTotals,
    Product, ProductFilter, WishlistRow,
};
use crate::stores::auth::{AuthError, MIN_PASSWORD_LENGTH};

/// Lifetime of sessions issued by the simulated auth service.
const SESSION_TTL_MINUTES: i64 = 60;

struct Account {
    id: UserId,
    password: SecretString,
}

#[derive(Default)]
struct Tables {
    offline: bool,
    accounts: HashMap<String, Account>,
    session: Option<AuthSession>,
    users: Vec<Identity>,
    products: Vec<Product>,
    cart_items: Vec<CartLineRow>,
    wishlist: Vec<WishlistRow>,
    orders: Vec<Order>,
}

impl Tables {
    fn check_online(&self) -> Result<(), BackendError> {
        if self.offline {
            return Err(BackendError::Api {
                status: 503,
                message: "backend offline".to_string(),
            });
        }
        Ok(())
    }

    fn product(&self, id: ProductId) -> Option<Product> {
        self.products.iter().find(|p| p.id == id).cloned()
    }

    fn require_product(&self, id: ProductId) -> Result<Product, BackendError> {
        self.product(id).ok_or_else(|| BackendError::Api {
            status: 409,
            message: format!("insert violates foreign key constraint: product {id} does not exist"),
        })
    }

    fn issue_session(&mut self, id: UserId, email: &Email) -> AuthSession {
        let session = AuthSession {
            access_token: SecretString::from(format!("mem-{}", Uuid::new_v4())),
            refresh_token: None,
            expires_at: Some(Utc::now() + Duration::minutes(SESSION_TTL_MINUTES)),
            user: AuthUser {
                id,
                email: Some(email.to_string()),
            },
        };
        self.session = Some(session.clone());
        session
    }
}

/// Backend that keeps every table in process memory.
///
/// Cloning shares the tables.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    tables: Arc<Mutex<Tables>>,
}

impl std::fmt::Debug for MemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryBackend").finish_non_exhaustive()
    }
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every subsequent call fail (or succeed again).
    pub fn set_offline(&self, offline: bool) {
        self.tables().offline = offline;
    }

    // =========================================================================
    // Seeding
    // =========================================================================

    /// Register a credential without creating an identity row.
    pub fn register_account(&self, email: &Email, password: &str) -> UserId {
        let id = UserId::random();
        self.tables().accounts.insert(
            email.as_str().to_lowercase(),
            Account {
                id,
                password: SecretString::from(password),
            },
        );
        id
    }

    /// Register a credential and its identity row in one go.
    pub fn seed_user(&self, email: &Email, password: &str, full_name: &str, role: Role) -> Identity {
        let id = self.register_account(email, password);
        let now = Utc::now();
        let identity = Identity {
            id,
            email: email.clone(),
            role,
            full_name: full_name.to_string(),
            phone: None,
            avatar_url: None,
            created_at: now,
            updated_at: now,
        };
        self.tables().users.push(identity.clone());
        identity
    }

    pub fn insert_product(&self, product: Product) {
        self.tables().products.push(product);
    }

    /// Edit a stored product in place. Returns `false` if it does not exist.
    pub fn update_product(&self, id: ProductId, edit: impl FnOnce(&mut Product)) -> bool {
        let mut tables = self.tables();
        tables
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .map(edit)
            .is_some()
    }

    pub fn insert_order(&self, order: Order) {
        self.tables().orders.push(order);
    }

    /// Number of stored cart rows for `user_id`, bypassing the stores.
    #[must_use]
    pub fn cart_row_count(&self, user_id: UserId) -> usize {
        self.tables()
            .cart_items
            .iter()
            .filter(|row| row.user_id == user_id)
            .count()
    }
}

#[async_trait]
impl AuthGateway for MemoryBackend {
    async fn sign_in_with_password(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<AuthSession, AuthError> {
        let mut tables = self.tables();
        tables.check_online()?;

        let id = tables
            .accounts
            .get(&email.as_str().to_lowercase())
            .filter(|account| account.password.expose_secret() == password.expose_secret())
            .map(|account| account.id)
            .ok_or(AuthError::InvalidCredentials)?;

        Ok(tables.issue_session(id, email))
    }

    async fn sign_up(&self, email: &Email, password: &SecretString) -> Result<AuthUser, AuthError> {
        let mut tables = self.tables();
        tables.check_online()?;

        let key = email.as_str().to_lowercase();
        if tables.accounts.contains_key(&key) {
            return Err(AuthError::UserAlreadyExists);
        }
        if password.expose_secret().chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::WeakPassword(format!(
                "Password should be at least {MIN_PASSWORD_LENGTH} characters."
            )));
        }

        let id = UserId::random();
        tables.accounts.insert(
            key,
            Account {
                id,
                password: password.clone(),
            },
        );
        Ok(tables.issue_session(id, email).user)
    }

    async fn current_session(&self) -> Result<Option<AuthSession>, BackendError> {
        let mut tables = self.tables();
        tables.check_online()?;

        if tables
            .session
            .as_ref()
            .is_some_and(|session| session.is_expired(Utc::now()))
        {
            tables.session = None;
        }
        Ok(tables.session.clone())
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        let mut tables = self.tables();
        let had_session = tables.session.take().is_some();
        if had_session {
            tables.check_online()?;
        }
        Ok(())
    }
}

#[async_trait]
impl IdentityRepository for MemoryBackend {
    async fn get_identity(&self, id: UserId) -> Result<Option<Identity>, BackendError> {
        let tables = self.tables();
        tables.check_online()?;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert_identity(&self, identity: &NewIdentity) -> Result<Identity, BackendError> {
        let mut tables = self.tables();
        tables.check_online()?;

        if tables.users.iter().any(|u| u.id == identity.id) {
            return Err(BackendError::Api {
                status: 409,
                message: format!("duplicate key value violates unique constraint: users {}", identity.id),
            });
        }

        let now = Utc::now();
        let row = Identity {
            id: identity.id,
            email: identity.email.clone(),
            role: identity.role,
            full_name: identity.full_name.clone(),
            phone: None,
            avatar_url: None,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(row.clone());
        Ok(row)
    }

    async fn list_roles(&self) -> Result<Vec<Role>, BackendError> {
        let tables = self.tables();
        tables.check_online()?;
        Ok(tables.users.iter().map(|u| u.role).collect())
    }
}

#[async_trait]
impl CartRepository for MemoryBackend {
    async fn list_lines(&self, user_id: UserId) -> Result<Vec<CartLineRow>, BackendError> {
        let tables = self.tables();
        tables.check_online()?;
        Ok(tables
            .cart_items
            .iter()
            .filter(|row| row.user_id == user_id)
            .map(|row| CartLineRow {
                product: tables.product(row.product_id),
                ..row.clone()
            })
            .collect())
    }

    async fn insert_line(&self, line: &NewCartLine) -> Result<CartLineRow, BackendError> {
        let mut tables = self.tables();
        tables.check_online()?;
        let product = tables.require_product(line.product_id)?;

        let row = CartLineRow {
            id: CartLineId::random(),
            user_id: line.user_id,
            product_id: line.product_id,
            variant_id: line.variant_id,
            quantity: line.quantity,
            product: None,
        };
        tables.cart_items.push(row.clone());
        Ok(CartLineRow {
            product: Some(product),
            ..row
        })
    }

    async fn update_line_quantity(
        &self,
        line_id: CartLineId,
        quantity: u32,
    ) -> Result<(), BackendError> {
        let mut tables = self.tables();
        tables.check_online()?;
        if let Some(row) = tables.cart_items.iter_mut().find(|row| row.id == line_id) {
            row.quantity = quantity;
        }
        Ok(())
    }

    async fn delete_line(&self, line_id: CartLineId) -> Result<(), BackendError> {
        let mut tables = self.tables();
        tables.check_online()?;
        tables.cart_items.retain(|row| row.id != line_id);
        Ok(())
    }

    async fn delete_lines_for(&self, user_id: UserId) -> Result<(), BackendError> {
        let mut tables = self.tables();
        tables.check_online()?;
        tables.cart_items.retain(|row| row.user_id != user_id);
        Ok(())
    }
}

#[async_trait]
impl WishlistRepository for MemoryBackend {
    async fn list_entries(&self, user_id: UserId) -> Result<Vec<WishlistRow>, BackendError> {
        let tables = self.tables();
        tables.check_online()?;
        Ok(tables
            .wishlist
            .iter()
            .filter(|row| row.user_id == user_id)
            .map(|row| WishlistRow {
                product: tables.product(row.product_id),
                ..row.clone()
            })
            .collect())
    }

    async fn insert_entry(&self, entry: &NewWishlistEntry) -> Result<WishlistRow, BackendError> {
        let mut tables = self.tables();
        tables.check_online()?;
        let product = tables.require_product(entry.product_id)?;

        let row = WishlistRow {
            id: WishlistEntryId::random(),
            user_id: entry.user_id,
            product_id: entry.product_id,
            created_at: Utc::now(),
            product: None,
        };
        tables.wishlist.push(row.clone());
        Ok(WishlistRow {
            product: Some(product),
            ..row
        })
    }

    async fn delete_entry(&self, entry_id: WishlistEntryId) -> Result<(), BackendError> {
        let mut tables = self.tables();
        tables.check_online()?;
        tables.wishlist.retain(|row| row.id != entry_id);
        Ok(())
    }
}

#[async_trait]
impl ProductRepository for MemoryBackend {
    async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, BackendError> {
        let tables = self.tables();
        tables.check_online()?;
        let mut products: Vec<Product> = tables
            .products
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        filter.sort(&mut products);
        Ok(products)
    }

    async fn products_by_seller(&self, seller_id: UserId) -> Result<Vec<Product>, BackendError> {
        let tables = self.tables();
        tables.check_online()?;
        let mut products: Vec<Product> = tables
            .products
            .iter()
            .filter(|p| p.seller_id == seller_id)
            .cloned()
            .collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(products)
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, BackendError> {
        let tables = self.tables();
        tables.check_online()?;
        Ok(tables.product(id))
    }

    async fn count_products(&self) -> Result<usize, BackendError> {
        let tables = self.tables();
        tables.check_online()?;
        Ok(tables.products.len())
    }
}

#[async_trait]
impl OrderRepository for MemoryBackend {
    async fn recent_orders_for_seller(
        &self,
        seller_id: UserId,
        limit: usize,
    ) -> Result<Vec<Order>, BackendError> {
        let tables = self.tables();
        tables.check_online()?;
        let mut orders: Vec<Order> = tables
            .orders
            .iter()
            .filter(|o| o.seller_id == seller_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders.truncate(limit);
        Ok(orders)
    }

    async fn list_order_totals(&self) -> Result<Vec<OrderTotals>, BackendError> {
        let tables = self.tables();
        tables.check_online()?;
        Ok(tables.orders.iter().map(OrderTotals::from).collect())
    }
}
