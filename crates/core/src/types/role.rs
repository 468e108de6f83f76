//! Marketplace roles and the areas each role may open.

use serde::{Deserialize, Serialize};

/// Error returned when a role string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid role: {0}")]
pub struct RoleParseError(pub String);

/// Role stored on every identity row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Platform operator with access to marketplace-wide statistics.
    Admin,
    /// Vendor listing products and fulfilling orders.
    Seller,
    /// Shopper with a cart, wishlist, and order history.
    #[default]
    Customer,
}

impl Role {
    /// Whether a new account may pick this role at sign-up.
    ///
    /// Admins are provisioned out of band.
    #[must_use]
    pub const fn is_self_service(self) -> bool {
        matches!(self, Self::Seller | Self::Customer)
    }

    /// Whether this role may open the given area.
    #[must_use]
    pub const fn can_access(self, area: Area) -> bool {
        matches!(
            (self, area),
            (
                Self::Customer,
                Area::Cart | Area::Wishlist | Area::Orders
            ) | (
                Self::Seller,
                Area::SellerDashboard | Area::SellerProducts | Area::SellerOrders
            ) | (Self::Admin, Area::AdminDashboard)
        )
    }

    /// Areas reachable by this role, in navigation order.
    #[must_use]
    pub fn areas(self) -> Vec<Area> {
        Area::ALL
            .iter()
            .copied()
            .filter(|area| self.can_access(*area))
            .collect()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Seller => write!(f, "seller"),
            Self::Customer => write!(f, "customer"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "seller" => Ok(Self::Seller),
            "customer" => Ok(Self::Customer),
            _ => Err(RoleParseError(s.to_owned())),
        }
    }
}

/// A role-gated section of the storefront.
///
/// Public areas (home, catalog, sign-in) are not listed; every identity and
/// anonymous visitors can reach them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Area {
    Cart,
    Wishlist,
    Orders,
    SellerDashboard,
    SellerProducts,
    SellerOrders,
    AdminDashboard,
}

impl Area {
    /// Every gated area.
    pub const ALL: [Self; 7] = [
        Self::Cart,
        Self::Wishlist,
        Self::Orders,
        Self::SellerDashboard,
        Self::SellerProducts,
        Self::SellerOrders,
        Self::AdminDashboard,
    ];
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_roundtrip_strings() {
        for role in [Role::Admin, Role::Seller, Role::Customer] {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }
        assert_eq!(
            "superuser".parse::<Role>(),
            Err(RoleParseError("superuser".to_string()))
        );
    }

    #[test]
    fn test_role_serde_matches_row_values() {
        assert_eq!(serde_json::to_string(&Role::Seller).unwrap(), "\"seller\"");
        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);
    }

    #[test]
    fn test_self_service_roles() {
        assert!(Role::Customer.is_self_service());
        assert!(Role::Seller.is_self_service());
        assert!(!Role::Admin.is_self_service());
    }

    #[test]
    fn test_area_gating() {
        assert!(Role::Customer.can_access(Area::Cart));
        assert!(!Role::Customer.can_access(Area::SellerDashboard));
        assert!(Role::Seller.can_access(Area::SellerOrders));
        assert!(!Role::Seller.can_access(Area::Wishlist));
        assert!(Role::Admin.can_access(Area::AdminDashboard));
        assert!(!Role::Admin.can_access(Area::Cart));
    }

    #[test]
    fn test_areas_partition_between_roles() {
        let total: usize = [Role::Admin, Role::Seller, Role::Customer]
            .iter()
            .map(|role| role.areas().len())
            .sum();
        assert_eq!(total, Area::ALL.len());
        assert_eq!(
            Role::Customer.areas(),
            vec![Area::Cart, Area::Wishlist, Area::Orders]
        );
    }
}
