//! Commerce error types.

use crate::money::Money;
use thiserror::Error;

/// Errors that can occur in storefront commerce operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommerceError {
    /// Product not found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Item not in cart.
    #[error("Item not in cart: {0}")]
    ItemNotInCart(String),

    /// Invalid quantity.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Quantity exceeds maximum allowed.
    #[error("Quantity {0} exceeds maximum allowed ({1})")]
    QuantityExceedsLimit(i64, i64),

    /// Not enough stock to satisfy the requested quantity.
    #[error("Insufficient stock for {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: String,
        requested: i64,
        available: i64,
    },

    /// Currency mismatch.
    #[error("Currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch { expected: String, got: String },

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,

    /// No voucher matches the code.
    #[error("Invalid voucher code: {0}")]
    InvalidVoucherCode(String),

    /// Cart subtotal is below the voucher's minimum purchase amount.
    #[error("Voucher {code} requires a minimum purchase of {minimum}, cart subtotal is {subtotal}")]
    BelowMinimumPurchase {
        code: String,
        minimum: Money,
        subtotal: Money,
    },

    /// Voucher is not active.
    #[error("Voucher is not active: {0}")]
    VoucherInactive(String),

    /// Voucher validity window has not started.
    #[error("Voucher is not valid yet: {0}")]
    VoucherNotYetValid(String),

    /// Voucher validity window has ended.
    #[error("Voucher expired: {0}")]
    VoucherExpired(String),

    /// Voucher usage limit reached.
    #[error("Voucher usage limit reached: {0}")]
    VoucherExhausted(String),

    /// Invalid order status transition.
    #[error("Invalid order transition from {from} to {to}")]
    InvalidOrderTransition { from: String, to: String },

    /// Checkout incomplete.
    #[error("Checkout incomplete: {0}")]
    CheckoutIncomplete(String),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(String),
}

impl CommerceError {
    /// Check if this error came from voucher validation.
    pub fn is_voucher_error(&self) -> bool {
        matches!(
            self,
            CommerceError::InvalidVoucherCode(_)
                | CommerceError::BelowMinimumPurchase { .. }
                | CommerceError::VoucherInactive(_)
                | CommerceError::VoucherNotYetValid(_)
                | CommerceError::VoucherExpired(_)
                | CommerceError::VoucherExhausted(_)
        )
    }
}
