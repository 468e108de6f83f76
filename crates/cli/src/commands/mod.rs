//! Subcommand implementations.
//!
//! # Environment Variables
//!
//! - `BAZAAR_BACKEND_URL`, `BAZAAR_ANON_KEY` - Backend connection (see
//!   [`BackendConfig`])
//! - `BAZAAR_EMAIL` - Default for `--email`
//! - `BAZAAR_PASSWORD` - Password for commands that sign in

pub mod cart;
pub mod catalog;
pub mod dashboard;
pub mod pricing;
pub mod wishlist;

use secrecy::SecretString;
use thiserror::Error;

use bazaar_storefront::models::Identity;
use bazaar_storefront::{AuthError, BackendConfig, BackendError, ConfigError, StoreError, Storefront};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Storefront operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Referenced row does not exist.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<BackendError> for CliError {
    fn from(err: BackendError) -> Self {
        Self::Store(err.into())
    }
}

impl From<AuthError> for CliError {
    fn from(err: AuthError) -> Self {
        Self::Store(err.into())
    }
}

impl CliError {
    /// Capture storefront failures to Sentry.
    pub fn report(&self) {
        if let Self::Store(err) = self {
            err.report();
        }
    }
}

/// A storefront with a signed-in identity.
pub struct Session {
    pub storefront: Storefront,
    pub identity: Identity,
}

impl Session {
    /// Connect and sign in as `email` with the password from `BAZAAR_PASSWORD`.
    ///
    /// # Errors
    ///
    /// Returns an error if the password is unset, the client cannot be
    /// built, or sign-in fails.
    pub async fn sign_in(config: &BackendConfig, email: &str) -> Result<Self, CliError> {
        let password = std::env::var("BAZAAR_PASSWORD")
            .map(SecretString::from)
            .map_err(|_| CliError::MissingEnvVar("BAZAAR_PASSWORD"))?;

        let storefront = Storefront::connect(config)?;
        tracing::debug!(email, "Signing in");
        let identity = storefront.auth().sign_in(email, &password).await?;

        Ok(Self {
            storefront,
            identity,
        })
    }
}
