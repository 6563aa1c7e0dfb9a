//! Cart pricing calculations.

use crate::cart::LineItem;
use crate::error::CommerceError;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Tax, shipping and discount rules for a storefront.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PricingPolicy {
    /// Currency every amount is in.
    pub currency: Currency,
    /// Tax rate applied to the discounted subtotal, in percent.
    pub tax_percent: f64,
    /// Flat shipping fee.
    pub shipping_fee: Money,
    /// Discounted subtotal at or above which shipping is free.
    pub free_shipping_threshold: Money,
    /// Cap discounts at the subtotal.
    pub clamp_discount: bool,
}

impl PricingPolicy {
    /// Standard tax rate.
    pub const STANDARD_TAX_PERCENT: f64 = 10.0;
    /// Tax rate of the reduced-tax storefront variant.
    pub const REDUCED_TAX_PERCENT: f64 = 5.0;

    /// Default policy for a currency: 10% tax, flat fee waived above a threshold.
    pub fn for_currency(currency: Currency) -> Self {
        let (fee, threshold) = match currency {
            Currency::IDR => (15_000, 500_000),
            // $4.99 fee, free from $50.00, and the same figures elsewhere.
            _ => (499, 5_000),
        };
        Self {
            currency,
            tax_percent: Self::STANDARD_TAX_PERCENT,
            shipping_fee: Money::new(fee, currency),
            free_shipping_threshold: Money::new(threshold, currency),
            clamp_discount: false,
        }
    }

    /// The 5% tax variant.
    pub fn reduced_tax(currency: Currency) -> Self {
        Self::for_currency(currency).with_tax_percent(Self::REDUCED_TAX_PERCENT)
    }

    /// Set the tax rate.
    pub fn with_tax_percent(mut self, tax_percent: f64) -> Self {
        self.tax_percent = tax_percent;
        self
    }

    /// Set the shipping fee and free shipping threshold.
    pub fn with_shipping(mut self, fee: Money, free_threshold: Money) -> Self {
        self.shipping_fee = fee;
        self.free_shipping_threshold = free_threshold;
        self
    }

    /// Cap discounts at the subtotal.
    pub fn with_clamped_discount(mut self, clamp: bool) -> Self {
        self.clamp_discount = clamp;
        self
    }

    /// Check the policy is self-consistent.
    pub fn validate(&self) -> Result<(), CommerceError> {
        if !(0.0..=100.0).contains(&self.tax_percent) {
            return Err(CommerceError::Validation(format!(
                "tax rate must be between 0 and 100 percent, got {}",
                self.tax_percent
            )));
        }
        let zero = Money::zero(self.currency);
        zero.ensure_same_currency(&self.shipping_fee)?;
        zero.ensure_same_currency(&self.free_shipping_threshold)?;
        if self.shipping_fee.is_negative() || self.free_shipping_threshold.is_negative() {
            return Err(CommerceError::Validation(
                "shipping fee and threshold cannot be negative".into(),
            ));
        }
        Ok(())
    }
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self::for_currency(Currency::default())
    }
}

/// Totals for a cart. Always derived from line items and the discount,
/// never stored on their own.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CartTotals {
    /// Sum of line totals.
    pub subtotal: Money,
    /// Voucher discount.
    pub discount: Money,
    /// Tax on the discounted subtotal (floored at zero).
    pub tax: Money,
    /// Shipping fee, zero when waived.
    pub shipping: Money,
    /// subtotal - discount + tax + shipping.
    pub total: Money,
    /// Total quantity across lines.
    pub item_count: i64,
}

impl CartTotals {
    /// Totals of an empty cart.
    pub fn zero(currency: Currency) -> Self {
        let zero = Money::zero(currency);
        Self {
            subtotal: zero,
            discount: zero,
            tax: zero,
            shipping: zero,
            total: zero,
            item_count: 0,
        }
    }

    /// Check if any discount applies.
    pub fn has_discount(&self) -> bool {
        self.discount.is_positive()
    }

    /// Subtotal after discount, before tax and shipping.
    pub fn discounted_subtotal(&self) -> Result<Money, CommerceError> {
        self.subtotal.checked_sub(&self.discount)
    }

    /// How much more the customer must spend for free shipping.
    pub fn remaining_for_free_shipping(&self, policy: &PricingPolicy) -> Result<Money, CommerceError> {
        let gap = policy
            .free_shipping_threshold
            .checked_sub(&self.discounted_subtotal()?)?;
        Ok(gap.non_negative())
    }
}

/// Compute cart totals from line items and an optional discount.
///
/// Tax is charged on `subtotal - discount` floored at zero. Shipping is
/// waived once `subtotal - discount` reaches the policy threshold, and an
/// empty cart owes none.
pub fn calculate_totals(
    items: &[LineItem],
    discount: Option<Money>,
    policy: &PricingPolicy,
) -> Result<CartTotals, CommerceError> {
    let currency = policy.currency;
    let zero = Money::zero(currency);

    let subtotal = Money::try_sum(items.iter().map(|i| &i.total), currency)?;
    let item_count = items
        .iter()
        .try_fold(0_i64, |acc, i| acc.checked_add(i.quantity))
        .ok_or(CommerceError::Overflow)?;

    let mut discount = discount.unwrap_or(zero);
    zero.ensure_same_currency(&discount)?;
    if discount.is_negative() {
        return Err(CommerceError::Validation("discount cannot be negative".into()));
    }
    if policy.clamp_discount {
        discount = discount.min(&subtotal.non_negative())?;
    }

    let discounted = subtotal.checked_sub(&discount)?;
    let tax = discounted.non_negative().percentage(policy.tax_percent)?;

    let shipping = if items.is_empty()
        || discounted.amount_minor >= policy.free_shipping_threshold.amount_minor
    {
        zero
    } else {
        policy.shipping_fee
    };

    let total = discounted.checked_add(&tax)?.checked_add(&shipping)?;

    Ok(CartTotals {
        subtotal,
        discount,
        tax,
        shipping,
        total,
        item_count,
    })
}
