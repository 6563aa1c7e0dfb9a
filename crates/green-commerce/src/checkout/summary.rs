//! Checkout summary: what the customer confirms before placing an order.

use crate::cart::{Cart, CartTotals, PricingPolicy};
use crate::checkout::{Address, OrderLine};
use crate::error::CommerceError;
use serde::{Deserialize, Serialize};

/// Snapshot of a cart ready to be posted as an order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckoutSummary {
    /// Lines being purchased.
    pub lines: Vec<OrderLine>,
    /// Totals under the storefront's pricing policy.
    pub totals: CartTotals,
    /// Applied voucher code.
    pub voucher_code: Option<String>,
    /// Delivery address.
    pub shipping_address: Address,
    /// Note for the seller.
    pub note: Option<String>,
}

impl CheckoutSummary {
    /// Build a summary from the current cart.
    ///
    /// Fails on an empty cart or an incomplete address.
    pub fn from_cart(cart: &Cart, policy: &PricingPolicy, address: Address) -> Result<Self, CommerceError> {
        if cart.is_empty() {
            return Err(CommerceError::CheckoutIncomplete("cart is empty".into()));
        }
        address.validate()?;

        Ok(Self {
            lines: cart.items.iter().map(OrderLine::from).collect(),
            totals: cart.totals(policy)?,
            voucher_code: cart.voucher_code().map(str::to_string),
            shipping_address: address,
            note: None,
        })
    }

    /// Attach a note for the seller. Blank notes are dropped.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        let note = note.into();
        let trimmed = note.trim();
        self.note = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    /// Get total item count.
    pub fn item_count(&self) -> i64 {
        self.totals.item_count
    }
}
