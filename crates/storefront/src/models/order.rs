//! Order rows (`orders` table), read by the dashboards.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bazaar_core::{OrderId, OrderStatus, PaymentMethod, PaymentStatus, UserId};

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: UserId,
    pub seller_id: UserId,
    pub status: OrderStatus,
    /// Amount charged to the customer.
    pub total_amount: Decimal,
    /// Platform commission recorded at checkout.
    pub commission_amount: Decimal,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// What the seller keeps from this order.
    #[must_use]
    pub fn seller_earnings(&self) -> Decimal {
        self.total_amount - self.commission_amount
    }
}

/// The money columns of an order, as selected for marketplace-wide totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub total_amount: Decimal,
    pub commission_amount: Decimal,
}

impl From<&Order> for OrderTotals {
    fn from(order: &Order) -> Self {
        Self {
            total_amount: order.total_amount,
            commission_amount: order.commission_amount,
        }
    }
}
