//! Order types.

use crate::cart::LineItem;
use crate::checkout::Address;
use crate::error::CommerceError;
use crate::ids::{OrderId, ProductId, UserId};
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Order status.
///
/// Orders move forward along pending, confirmed, processing, shipped,
/// delivered. Cancellation is possible until the order ships.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Order placed, awaiting the seller.
    #[default]
    Pending,
    /// Seller accepted the order.
    Confirmed,
    /// Order being packed.
    Processing,
    /// Handed to the courier.
    Shipped,
    /// Received by the customer.
    Delivered,
    /// Order cancelled.
    Cancelled,
}

impl OrderStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    /// Check if order is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Check if order can be cancelled.
    pub fn can_cancel(&self) -> bool {
        matches!(
            self,
            OrderStatus::Pending | OrderStatus::Confirmed | OrderStatus::Processing
        )
    }

    /// The next status in the forward lifecycle.
    pub fn next(&self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Pending => Some(OrderStatus::Confirmed),
            OrderStatus::Confirmed => Some(OrderStatus::Processing),
            OrderStatus::Processing => Some(OrderStatus::Shipped),
            OrderStatus::Shipped => Some(OrderStatus::Delivered),
            OrderStatus::Delivered | OrderStatus::Cancelled => None,
        }
    }

    /// Check whether a seller may move an order from `self` to `to`.
    pub fn can_transition_to(&self, to: OrderStatus) -> bool {
        if to == OrderStatus::Cancelled {
            return self.can_cancel();
        }
        self.next() == Some(to)
    }

    /// Return `to` if the transition is allowed.
    pub fn transition(&self, to: OrderStatus) -> Result<OrderStatus, CommerceError> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(CommerceError::InvalidOrderTransition {
                from: self.as_str().to_string(),
                to: to.as_str().to_string(),
            })
        }
    }
}

impl FromStr for OrderStatus {
    type Err = CommerceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "confirmed" | "paid" => Ok(OrderStatus::Confirmed),
            "processing" => Ok(OrderStatus::Processing),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" | "completed" => Ok(OrderStatus::Delivered),
            "cancelled" | "canceled" => Ok(OrderStatus::Cancelled),
            other => Err(CommerceError::Validation(format!(
                "unknown order status: {}",
                other
            ))),
        }
    }
}

/// A placed order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    /// Unique order identifier.
    pub id: OrderId,
    /// Human-readable order number.
    pub order_number: String,
    /// Customer who placed the order.
    pub customer_id: Option<UserId>,
    /// Items in the order.
    pub lines: Vec<OrderLine>,
    /// Subtotal before discounts.
    pub subtotal: Money,
    /// Voucher discount.
    pub discount: Money,
    /// Tax amount.
    pub tax: Money,
    /// Shipping cost.
    pub shipping: Money,
    /// Grand total charged.
    pub total: Money,
    /// Voucher code used, if any.
    pub voucher_code: Option<String>,
    /// Delivery address.
    pub shipping_address: Option<Address>,
    /// Order status.
    pub status: OrderStatus,
    /// Unix timestamp of creation.
    pub created_at: Option<i64>,
}

impl Order {
    /// Order currency.
    pub fn currency(&self) -> Currency {
        self.total.currency
    }

    /// Get total item count.
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Move the order to a new status if the transition is allowed.
    pub fn transition(&mut self, to: OrderStatus) -> Result<(), CommerceError> {
        self.status = self.status.transition(to)?;
        Ok(())
    }
}

/// A line in a placed order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderLine {
    /// Product ID.
    pub product_id: ProductId,
    /// Product name at time of order.
    pub name: String,
    /// Unit price at time of order.
    pub unit_price: Money,
    /// Quantity ordered.
    pub quantity: i64,
    /// Total price for this line.
    pub total: Money,
}

impl From<&LineItem> for OrderLine {
    fn from(item: &LineItem) -> Self {
        Self {
            product_id: item.product_id.clone(),
            name: item.name.clone(),
            unit_price: item.unit_price,
            quantity: item.quantity,
            total: item.total,
        }
    }
}

/// Dashboard figures computed from an order list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderSummary {
    /// Number of orders.
    pub total_orders: usize,
    /// Order count per status.
    pub by_status: HashMap<OrderStatus, usize>,
    /// Revenue from delivered orders.
    pub revenue: Money,
    /// Orders awaiting the seller.
    pub pending: usize,
}

impl OrderSummary {
    /// Summarize orders. Orders in other currencies are an error.
    pub fn from_orders(orders: &[Order], currency: Currency) -> Result<Self, CommerceError> {
        let mut by_status = HashMap::new();
        for order in orders {
            *by_status.entry(order.status).or_insert(0) += 1;
        }

        let revenue = Money::try_sum(
            orders
                .iter()
                .filter(|o| o.status == OrderStatus::Delivered)
                .map(|o| &o.total),
            currency,
        )?;

        Ok(Self {
            total_orders: orders.len(),
            pending: by_status.get(&OrderStatus::Pending).copied().unwrap_or(0),
            by_status,
            revenue,
        })
    }

    /// Number of orders with `status`.
    pub fn count(&self, status: OrderStatus) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }
}
