//! Identity domain types (`users` table).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bazaar_core::{Area, Email, Role, UserId};

/// An authenticated marketplace user.
///
/// The row ID is the ID issued by the auth service for the credential, so an
/// auth session's user ID can be used to look the identity up directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    /// Auth-service-issued user ID.
    pub id: UserId,
    /// Sign-in email.
    pub email: Email,
    /// Marketplace role.
    pub role: Role,
    /// Display name.
    pub full_name: String,
    /// Contact phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Profile picture URL.
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// When the row was created.
    pub created_at: DateTime<Utc>,
    /// When the row was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Identity {
    /// Whether this identity's role may open `area`.
    #[must_use]
    pub const fn can_access(&self, area: Area) -> bool {
        self.role.can_access(area)
    }
}

/// Insert payload for a freshly registered identity.
#[derive(Debug, Clone, Serialize)]
pub struct NewIdentity {
    pub id: UserId,
    pub email: Email,
    pub full_name: String,
    pub role: Role,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_row_without_optional_columns() {
        let json = r#"{
            "id": "0b6f8f0e-3a49-4a52-8f43-55b1f1f0a001",
            "email": "ada@example.com",
            "role": "seller",
            "full_name": "Ada Lovelace",
            "created_at": "2025-03-01T10:00:00+00:00",
            "updated_at": "2025-03-01T10:00:00+00:00"
        }"#;

        let identity: Identity = serde_json::from_str(json).unwrap();
        assert_eq!(identity.role, Role::Seller);
        assert_eq!(identity.phone, None);
        assert!(identity.can_access(Area::SellerDashboard));
        assert!(!identity.can_access(Area::Cart));
    }

    #[test]
    fn test_new_identity_payload_uses_column_names() {
        let payload = NewIdentity {
            id: UserId::random(),
            email: Email::parse("bob@example.com").unwrap(),
            full_name: "Bob".to_string(),
            role: Role::Customer,
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["email"], "bob@example.com");
        assert_eq!(value["full_name"], "Bob");
        assert_eq!(value["role"], "customer");
    }
}
