//! Authentication state: the signed-in identity and its role.
//!
//! # Flow
//!
//! 1. [`AuthStore::check_auth`] on startup adopts whatever session the
//!    backend already holds (loading starts `true` and is cleared here)
//! 2. [`AuthStore::sign_in`] / [`AuthStore::sign_up`] exchange credentials
//!    and load (or create) the `users` row keyed by the credential ID
//! 3. [`AuthStore::sign_out`] always forgets the identity locally, even if
//!    the remote call fails
//!
//! Cart and wishlist state are not touched here; see
//! [`Storefront::sign_out`](crate::state::Storefront::sign_out).

mod error;

pub use error::AuthError;

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::watch;
use tracing::{debug, instrument, warn};

use bazaar_core::{Email, Role};

use crate::backend::{AuthGateway, BackendError, IdentityRepository};
use crate::error::{add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::models::{Identity, NewIdentity};

/// Minimum password length accepted at sign-up.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Snapshot of authentication state.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    /// The signed-in identity, if any.
    pub identity: Option<Identity>,
    /// `true` until the first session check completes.
    pub loading: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            identity: None,
            loading: true,
        }
    }
}

/// Holds the current identity and drives sign-in/sign-up/sign-out.
pub struct AuthStore {
    gateway: Arc<dyn AuthGateway>,
    identities: Arc<dyn IdentityRepository>,
    state: watch::Sender<AuthState>,
}

impl AuthStore {
    /// Create a store in the initial loading state.
    #[must_use]
    pub fn new(gateway: Arc<dyn AuthGateway>, identities: Arc<dyn IdentityRepository>) -> Self {
        Self {
            gateway,
            identities,
            state: watch::Sender::new(AuthState::default()),
        }
    }

    // =========================================================================
    // Readers
    // =========================================================================

    /// Current state.
    #[must_use]
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        self.state.borrow().identity.clone()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    /// Role of the signed-in identity.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.state.borrow().identity.as_ref().map(|identity| identity.role)
    }

    /// Receive a notification on every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Adopt an existing backend session, if any.
    ///
    /// Never fails: lookup errors are logged and treated as signed out.
    #[instrument(skip(self))]
    pub async fn check_auth(&self) {
        let identity = match self.session_identity().await {
            Ok(identity) => identity,
            Err(e) => {
                warn!(error = %e, "Session check failed, continuing signed out");
                None
            }
        };

        if let Some(identity) = &identity {
            set_sentry_user(&identity.id, Some(identity.email.as_str()));
        }
        debug!(signed_in = identity.is_some(), "Session check complete");
        self.set_identity(identity);
    }

    async fn session_identity(&self) -> Result<Option<Identity>, BackendError> {
        let Some(session) = self.gateway.current_session().await? else {
            return Ok(None);
        };
        self.identities.get_identity(session.user.id).await
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    /// Returns `AuthError::IdentityNotFound` if the credential has no `users` row.
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &SecretString) -> Result<Identity, AuthError> {
        let email = Email::parse(email)?;

        let session = self.gateway.sign_in_with_password(&email, password).await?;

        let identity = self
            .identities
            .get_identity(session.user.id)
            .await?
            .ok_or(AuthError::IdentityNotFound)?;

        set_sentry_user(&identity.id, Some(identity.email.as_str()));
        add_breadcrumb("auth", "Signed in", Some(&[("role", identity.role.to_string().as_str())]));

        self.set_identity(Some(identity.clone()));
        Ok(identity)
    }

    /// Register a new seller or customer.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::RoleNotSelfService` for `admin`, before any remote call.
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    #[instrument(skip(self, password, full_name))]
    pub async fn sign_up(
        &self,
        email: &str,
        password: &SecretString,
        full_name: &str,
        role: Role,
    ) -> Result<Identity, AuthError> {
        if !role.is_self_service() {
            return Err(AuthError::RoleNotSelfService(role));
        }

        let email = Email::parse(email)?;
        validate_password(password.expose_secret())?;

        let user = self.gateway.sign_up(&email, password).await?;

        // The credential now exists; a failure here leaves it without a row.
        let identity = self
            .identities
            .insert_identity(&NewIdentity {
                id: user.id,
                email,
                full_name: full_name.to_string(),
                role,
            })
            .await?;

        set_sentry_user(&identity.id, Some(identity.email.as_str()));
        add_breadcrumb("auth", "Signed up", Some(&[("role", role.to_string().as_str())]));

        self.set_identity(Some(identity.clone()));
        Ok(identity)
    }

    /// Sign out.
    ///
    /// The local identity is cleared whether or not the backend accepted
    /// the logout; a remote failure is only logged.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) {
        if let Err(e) = self.gateway.sign_out().await {
            warn!(error = %e, "Remote sign-out failed");
        }

        clear_sentry_user();
        add_breadcrumb("auth", "Signed out", None);
        self.set_identity(None);
    }

    /// Replace the identity directly and clear the loading flag.
    pub fn set_identity(&self, identity: Option<Identity>) {
        self.state.send_replace(AuthState {
            identity,
            loading: false,
        });
    }
}

impl std::fmt::Debug for AuthStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthStore")
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;

    fn store(backend: &MemoryBackend) -> AuthStore {
        let backend = Arc::new(backend.clone());
        AuthStore::new(backend.clone(), backend)
    }

    fn password(raw: &str) -> SecretString {
        SecretString::from(raw)
    }

    #[tokio::test]
    async fn test_initial_state_is_loading() {
        let store = store(&MemoryBackend::new());
        assert!(store.is_loading());
        assert!(store.identity().is_none());
    }

    #[tokio::test]
    async fn test_check_auth_without_session() {
        let store = store(&MemoryBackend::new());
        store.check_auth().await;
        assert_eq!(
            store.state(),
            AuthState {
                identity: None,
                loading: false
            }
        );
    }

    #[tokio::test]
    async fn test_check_auth_absorbs_backend_failure() {
        let backend = MemoryBackend::new();
        backend.set_offline(true);
        let store = store(&backend);

        store.check_auth().await;
        assert!(!store.is_loading());
        assert!(store.identity().is_none());
    }

    #[tokio::test]
    async fn test_sign_in_loads_identity() {
        let backend = MemoryBackend::new();
        let email = Email::parse("ada@example.com").unwrap();
        let seeded = backend.seed_user(&email, "hunter22", "Ada", Role::Seller);
        let store = store(&backend);

        let identity = store.sign_in("ada@example.com", &password("hunter22")).await.unwrap();
        assert_eq!(identity.id, seeded.id);
        assert_eq!(store.role(), Some(Role::Seller));
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_sign_in_without_identity_row() {
        let backend = MemoryBackend::new();
        backend.register_account(&Email::parse("ghost@example.com").unwrap(), "hunter22");
        let store = store(&backend);

        let err = store
            .sign_in("ghost@example.com", &password("hunter22"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::IdentityNotFound));
        assert!(store.identity().is_none());
    }

    #[tokio::test]
    async fn test_check_auth_with_session_but_no_identity_row() {
        let backend = MemoryBackend::new();
        let email = Email::parse("ghost@example.com").unwrap();
        backend.register_account(&email, "hunter22");
        backend
            .sign_in_with_password(&email, &password("hunter22"))
            .await
            .unwrap();
        let store = store(&backend);

        store.check_auth().await;
        assert_eq!(
            store.state(),
            AuthState {
                identity: None,
                loading: false
            }
        );
    }

    #[tokio::test]
    async fn test_sign_in_rejects_malformed_email() {
        let store = store(&MemoryBackend::new());
        let err = store.sign_in("not-an-email", &password("hunter22")).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidEmail(_)));
    }

    #[tokio::test]
    async fn test_sign_up_creates_identity() {
        let backend = MemoryBackend::new();
        let store = store(&backend);

        let identity = store
            .sign_up("bob@example.com", &password("s3cret!"), "Bob", Role::Customer)
            .await
            .unwrap();
        assert_eq!(identity.full_name, "Bob");
        assert_eq!(store.identity(), Some(identity.clone()));

        // The new row is reachable through the session check as well.
        let fresh = AuthStore::new(Arc::new(backend.clone()), Arc::new(backend));
        fresh.check_auth().await;
        assert_eq!(fresh.identity().map(|i| i.id), Some(identity.id));
    }

    #[tokio::test]
    async fn test_sign_up_rejects_admin_before_remote_call() {
        let backend = MemoryBackend::new();
        backend.set_offline(true);
        let store = store(&backend);

        let err = store
            .sign_up("root@example.com", &password("s3cret!"), "Root", Role::Admin)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::RoleNotSelfService(Role::Admin)));
    }

    #[tokio::test]
    async fn test_sign_up_rejects_short_password() {
        let store = store(&MemoryBackend::new());
        let err = store
            .sign_up("bob@example.com", &password("abc"), "Bob", Role::Customer)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::WeakPassword(_)));
    }

    #[tokio::test]
    async fn test_sign_out_clears_identity_even_when_remote_fails() {
        let backend = MemoryBackend::new();
        let email = Email::parse("ada@example.com").unwrap();
        backend.seed_user(&email, "hunter22", "Ada", Role::Customer);
        let store = store(&backend);
        store.sign_in("ada@example.com", &password("hunter22")).await.unwrap();

        backend.set_offline(true);
        store.sign_out().await;
        assert!(store.identity().is_none());
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_subscribers_see_sign_in() {
        let backend = MemoryBackend::new();
        let email = Email::parse("ada@example.com").unwrap();
        backend.seed_user(&email, "hunter22", "Ada", Role::Customer);
        let store = store(&backend);
        let mut rx = store.subscribe();

        store.sign_in("ada@example.com", &password("hunter22")).await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().identity.is_some());
    }
}
