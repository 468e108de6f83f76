//! Status vocabularies stored on order rows.

use serde::{Deserialize, Serialize};

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Packed,
    Shipped,
    OutForDelivery,
    Delivered,
    Cancelled,
    Returned,
}

impl OrderStatus {
    /// Whether the seller still has to act on the order.
    ///
    /// Counted as "pending" on the seller dashboard.
    #[must_use]
    pub const fn awaits_seller(self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Packed => "packed",
            Self::Shipped => "shipped",
            Self::OutForDelivery => "out_for_delivery",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Returned => "returned",
        };
        f.write_str(s)
    }
}

/// Payment settlement status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Failed,
    Refunded,
}

/// Payment method chosen at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    Upi,
    Wallet,
    /// Cash on delivery.
    Cod,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_awaits_seller() {
        assert!(OrderStatus::Pending.awaits_seller());
        assert!(OrderStatus::Confirmed.awaits_seller());
        assert!(!OrderStatus::Packed.awaits_seller());
        assert!(!OrderStatus::Delivered.awaits_seller());
    }

    #[test]
    fn test_order_status_wire_names() {
        let status: OrderStatus = serde_json::from_str("\"out_for_delivery\"").unwrap();
        assert_eq!(status, OrderStatus::OutForDelivery);
        assert_eq!(status.to_string(), "out_for_delivery");
    }

    #[test]
    fn test_payment_vocabularies() {
        let method: PaymentMethod = serde_json::from_str("\"cod\"").unwrap();
        assert_eq!(method, PaymentMethod::Cod);
        let status: PaymentStatus = serde_json::from_str("\"refunded\"").unwrap();
        assert_eq!(status, PaymentStatus::Refunded);
    }
}
