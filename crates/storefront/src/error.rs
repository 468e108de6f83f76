//! Unified error handling with Sentry integration.
//!
//! Provides a unified `StoreError` type for operations that span stores,
//! the catalog and the dashboards, plus helpers that attach user context and
//! breadcrumbs to Sentry reports.

use thiserror::Error;

use bazaar_core::Area;

use crate::backend::BackendError;
use crate::stores::auth::AuthError;

/// Storefront-level error type.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend request failed.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// No identity is signed in.
    #[error("Not signed in")]
    NotSignedIn,

    /// The signed-in role may not open this area.
    #[error("Forbidden: {0:?}")]
    Forbidden(Area),
}

impl StoreError {
    /// Log the error and, for backend failures, capture it to Sentry.
    pub fn report(&self) {
        if matches!(self, Self::Backend(_) | Self::Auth(AuthError::Backend(_))) {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Storefront error"
            );
        } else {
            tracing::warn!(error = %self, "Storefront error");
        }
    }
}

/// Result type alias for `StoreError`.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on sign-out to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = StoreError::Forbidden(Area::AdminDashboard);
        assert_eq!(err.to_string(), "Forbidden: AdminDashboard");
    }

    #[test]
    fn test_store_error_from_backend() {
        let err: StoreError = BackendError::Unauthorized.into();
        assert!(matches!(err, StoreError::Backend(BackendError::Unauthorized)));
        assert_eq!(err.to_string(), "Backend error: Unauthorized");
    }

    #[test]
    fn test_sentry_helpers_without_client() {
        // No client bound: all of these are no-ops and must not panic.
        set_sentry_user(&"user-1", Some("a@b.co"));
        add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "p-1")]));
        clear_sentry_user();
    }
}
