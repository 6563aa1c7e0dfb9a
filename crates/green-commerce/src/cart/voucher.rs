//! Voucher (discount code) types.

use crate::error::CommerceError;
use crate::ids::VoucherId;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Longest code a seller may create.
pub const MAX_VOUCHER_CODE_LEN: usize = 32;

/// Value of the voucher.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum VoucherValue {
    /// Percentage off the subtotal (0.0 - 100.0).
    Percentage(f64),
    /// Fixed amount off.
    Fixed(Money),
}

impl VoucherValue {
    /// Wire name of the discount type.
    pub fn discount_type(&self) -> &'static str {
        match self {
            VoucherValue::Percentage(_) => "percentage",
            VoucherValue::Fixed(_) => "fixed",
        }
    }

    /// Calculate the discount amount for a given subtotal.
    ///
    /// Fixed amounts are returned as-is, even when they exceed the
    /// subtotal. Clamping is a pricing policy decision.
    pub fn calculate(&self, subtotal: &Money) -> Result<Money, CommerceError> {
        match self {
            VoucherValue::Percentage(percent) => subtotal.percentage(*percent),
            VoucherValue::Fixed(amount) => {
                subtotal.ensure_same_currency(amount)?;
                Ok(*amount)
            }
        }
    }
}

/// Server-side status of a voucher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VoucherStatus {
    #[default]
    Active,
    Inactive,
    Expired,
}

impl VoucherStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoucherStatus::Active => "active",
            VoucherStatus::Inactive => "inactive",
            VoucherStatus::Expired => "expired",
        }
    }
}

impl FromStr for VoucherStatus {
    type Err = CommerceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" | "enabled" => Ok(VoucherStatus::Active),
            "inactive" | "disabled" => Ok(VoucherStatus::Inactive),
            "expired" => Ok(VoucherStatus::Expired),
            other => Err(CommerceError::Validation(format!(
                "unknown voucher status: {}",
                other
            ))),
        }
    }
}

/// A voucher definition, authored server-side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Voucher {
    /// Server id (absent for vouchers not yet created).
    pub id: Option<VoucherId>,
    /// Voucher code, stored normalized (trimmed, uppercase).
    pub code: String,
    /// Description for display.
    pub description: Option<String>,
    /// Discount type and value.
    pub value: VoucherValue,
    /// Minimum cart subtotal required.
    pub min_purchase: Option<Money>,
    /// Start of the validity window (Unix timestamp).
    pub starts_at: Option<i64>,
    /// End of the validity window (Unix timestamp, inclusive).
    pub ends_at: Option<i64>,
    /// Server-side status.
    pub status: VoucherStatus,
    /// Maximum number of uses (None = unlimited).
    pub usage_limit: Option<i64>,
    /// Current usage count.
    pub usage_count: i64,
}

impl Voucher {
    fn with_value(code: &str, value: VoucherValue) -> Self {
        Self {
            id: None,
            code: Self::normalize_code(code),
            description: None,
            value,
            min_purchase: None,
            starts_at: None,
            ends_at: None,
            status: VoucherStatus::Active,
            usage_limit: None,
            usage_count: 0,
        }
    }

    /// Create a percentage voucher.
    pub fn percentage(code: &str, percent: f64) -> Self {
        Self::with_value(code, VoucherValue::Percentage(percent))
    }

    /// Create a fixed amount voucher.
    pub fn fixed(code: &str, amount: Money) -> Self {
        Self::with_value(code, VoucherValue::Fixed(amount))
    }

    /// Add a minimum purchase condition.
    pub fn with_minimum_purchase(mut self, amount: Money) -> Self {
        self.min_purchase = Some(amount);
        self
    }

    /// Set the validity window.
    pub fn with_window(mut self, starts_at: Option<i64>, ends_at: Option<i64>) -> Self {
        self.starts_at = starts_at;
        self.ends_at = ends_at;
        self
    }

    /// Add a usage limit.
    pub fn with_usage_limit(mut self, limit: i64) -> Self {
        self.usage_limit = Some(limit);
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Canonical form of a code as typed by a customer.
    pub fn normalize_code(code: &str) -> String {
        code.trim().to_uppercase()
    }

    /// Check whether a typed code refers to this voucher.
    pub fn matches_code(&self, code: &str) -> bool {
        Self::normalize_code(&self.code) == Self::normalize_code(code)
    }

    /// Check if discount has been exhausted.
    pub fn is_exhausted(&self) -> bool {
        self.usage_limit
            .map(|limit| self.usage_count >= limit)
            .unwrap_or(false)
    }

    /// Check status, validity window, usage and minimum purchase.
    pub fn check_eligibility(&self, subtotal: &Money, now: i64) -> Result<(), CommerceError> {
        match self.status {
            VoucherStatus::Active => {}
            VoucherStatus::Inactive => return Err(CommerceError::VoucherInactive(self.code.clone())),
            VoucherStatus::Expired => return Err(CommerceError::VoucherExpired(self.code.clone())),
        }

        if let Some(starts) = self.starts_at {
            if now < starts {
                return Err(CommerceError::VoucherNotYetValid(self.code.clone()));
            }
        }

        if let Some(ends) = self.ends_at {
            if now > ends {
                return Err(CommerceError::VoucherExpired(self.code.clone()));
            }
        }

        if self.is_exhausted() {
            return Err(CommerceError::VoucherExhausted(self.code.clone()));
        }

        self.check_minimum(subtotal)
    }

    /// Check only the minimum purchase condition.
    pub fn check_minimum(&self, subtotal: &Money) -> Result<(), CommerceError> {
        if let Some(minimum) = &self.min_purchase {
            subtotal.ensure_same_currency(minimum)?;
            if subtotal.amount_minor < minimum.amount_minor {
                return Err(CommerceError::BelowMinimumPurchase {
                    code: self.code.clone(),
                    minimum: *minimum,
                    subtotal: *subtotal,
                });
            }
        }
        Ok(())
    }

    /// Discount this voucher gives on `subtotal`, ignoring eligibility.
    pub fn discount_for(&self, subtotal: &Money) -> Result<Money, CommerceError> {
        self.value.calculate(subtotal)
    }

    /// Validate eligibility and compute the discount.
    pub fn apply(&self, subtotal: &Money, now: i64) -> Result<AppliedVoucher, CommerceError> {
        self.check_eligibility(subtotal, now)?;
        Ok(AppliedVoucher {
            voucher: self.clone(),
            amount: self.discount_for(subtotal)?,
        })
    }

    /// Check a seller-authored voucher before it is sent to the API.
    pub fn validate(&self) -> Result<(), CommerceError> {
        let code = Self::normalize_code(&self.code);
        if code.is_empty() {
            return Err(CommerceError::Validation("voucher code is required".into()));
        }
        if code.len() > MAX_VOUCHER_CODE_LEN {
            return Err(CommerceError::Validation(format!(
                "voucher code is longer than {} characters",
                MAX_VOUCHER_CODE_LEN
            )));
        }
        if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(CommerceError::Validation(
                "voucher code must be letters and digits only".into(),
            ));
        }

        match self.value {
            VoucherValue::Percentage(percent) => {
                if !(percent > 0.0 && percent <= 100.0) {
                    return Err(CommerceError::Validation(format!(
                        "percentage must be in (0, 100], got {}",
                        percent
                    )));
                }
            }
            VoucherValue::Fixed(amount) => {
                if !amount.is_positive() {
                    return Err(CommerceError::Validation(
                        "fixed discount must be positive".into(),
                    ));
                }
                if let Some(minimum) = &self.min_purchase {
                    amount.ensure_same_currency(minimum)?;
                }
            }
        }

        if let Some(minimum) = &self.min_purchase {
            if minimum.is_negative() {
                return Err(CommerceError::Validation(
                    "minimum purchase cannot be negative".into(),
                ));
            }
        }

        if let (Some(starts), Some(ends)) = (self.starts_at, self.ends_at) {
            if starts >= ends {
                return Err(CommerceError::Validation(
                    "voucher window must start before it ends".into(),
                ));
            }
        }

        if matches!(self.usage_limit, Some(limit) if limit <= 0) {
            return Err(CommerceError::Validation("usage limit must be positive".into()));
        }

        Ok(())
    }
}

/// A voucher that has been applied to a cart, with its current amount.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppliedVoucher {
    /// The voucher definition.
    pub voucher: Voucher,
    /// Amount discounted at the current subtotal.
    pub amount: Money,
}

impl AppliedVoucher {
    /// The voucher code used.
    pub fn code(&self) -> &str {
        &self.voucher.code
    }
}

/// An in-memory set of vouchers.
///
/// Used for demo storefronts and tests in place of the remote lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoucherBook {
    vouchers: Vec<Voucher>,
}

impl VoucherBook {
    /// Create a book from a list of vouchers.
    pub fn new(vouchers: Vec<Voucher>) -> Self {
        Self { vouchers }
    }

    /// The demo vouchers shipped with the storefront.
    ///
    /// Values are whole units of `currency`, as the demo data has them.
    pub fn demo(currency: Currency) -> Result<Self, CommerceError> {
        Ok(Self::new(vec![
            Voucher::fixed("GREEN10", Money::from_major(5, currency)?)
                .with_description("Green week discount"),
            Voucher::percentage("FRESH20", 20.0)
                .with_minimum_purchase(Money::from_major(100_000, currency)?)
                .with_description("20% off fresh produce orders"),
            Voucher::percentage("WELCOME5", 5.0).with_description("Welcome discount"),
        ]))
    }

    /// Add or replace a voucher with the same code.
    pub fn insert(&mut self, voucher: Voucher) {
        self.vouchers.retain(|v| !v.matches_code(&voucher.code));
        self.vouchers.push(voucher);
    }

    /// Look up a voucher by code.
    pub fn find(&self, code: &str) -> Option<&Voucher> {
        self.vouchers.iter().find(|v| v.matches_code(code))
    }

    /// Look up, validate and apply a voucher.
    pub fn apply(&self, code: &str, subtotal: &Money, now: i64) -> Result<AppliedVoucher, CommerceError> {
        self.find(code)
            .ok_or_else(|| CommerceError::InvalidVoucherCode(Voucher::normalize_code(code)))?
            .apply(subtotal, now)
    }

    /// Number of vouchers.
    pub fn len(&self) -> usize {
        self.vouchers.len()
    }

    /// Check if the book is empty.
    pub fn is_empty(&self) -> bool {
        self.vouchers.is_empty()
    }

    /// Iterate over the vouchers.
    pub fn iter(&self) -> impl Iterator<Item = &Voucher> {
        self.vouchers.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_750_000_000;

    fn idr(amount: i64) -> Money {
        Money::new(amount, Currency::IDR)
    }

    #[test]
    fn test_percentage_voucher() {
        let voucher = Voucher::percentage("save10", 10.0);
        assert_eq!(voucher.code, "SAVE10");
        let applied = voucher.apply(&idr(72_000), NOW).unwrap();
        assert_eq!(applied.amount, idr(7_200));
    }

    #[test]
    fn test_fixed_voucher_is_not_clamped() {
        let voucher = Voucher::fixed("BIG", idr(100_000));
        let applied = voucher.apply(&idr(50_000), NOW).unwrap();
        assert_eq!(applied.amount, idr(100_000));
    }

    #[test]
    fn test_demo_green10() {
        let book = VoucherBook::demo(Currency::IDR).unwrap();
        let applied = book.apply("GREEN10", &idr(72_000), NOW).unwrap();
        assert_eq!(applied.amount, idr(5));
        assert_eq!(applied.code(), "GREEN10");
    }

    #[test]
    fn test_code_lookup_is_case_insensitive() {
        let book = VoucherBook::demo(Currency::IDR).unwrap();
        assert!(book.find("  green10 ").is_some());
        assert_eq!(
            book.apply("NOPE", &idr(1), NOW),
            Err(CommerceError::InvalidVoucherCode("NOPE".into()))
        );
    }

    #[test]
    fn test_below_minimum_purchase() {
        let book = VoucherBook::demo(Currency::IDR).unwrap();
        let err = book.apply("FRESH20", &idr(72_000), NOW).unwrap_err();
        assert!(matches!(err, CommerceError::BelowMinimumPurchase { .. }));

        let applied = book.apply("FRESH20", &idr(100_000), NOW).unwrap();
        assert_eq!(applied.amount, idr(20_000));
    }

    #[test]
    fn test_status_and_window() {
        let mut voucher = Voucher::percentage("WINDOW", 10.0).with_window(Some(NOW - 10), Some(NOW + 10));
        assert!(voucher.apply(&idr(1_000), NOW).is_ok());
        assert!(voucher.apply(&idr(1_000), NOW + 10).is_ok());
        assert_eq!(
            voucher.apply(&idr(1_000), NOW + 11),
            Err(CommerceError::VoucherExpired("WINDOW".into()))
        );
        assert_eq!(
            voucher.apply(&idr(1_000), NOW - 11),
            Err(CommerceError::VoucherNotYetValid("WINDOW".into()))
        );

        voucher.status = VoucherStatus::Inactive;
        assert_eq!(
            voucher.apply(&idr(1_000), NOW),
            Err(CommerceError::VoucherInactive("WINDOW".into()))
        );
    }

    #[test]
    fn test_usage_limit() {
        let mut voucher = Voucher::percentage("LIMITED", 10.0).with_usage_limit(2);
        voucher.usage_count = 1;
        assert!(voucher.apply(&idr(1_000), NOW).is_ok());
        voucher.usage_count = 2;
        assert!(matches!(
            voucher.apply(&idr(1_000), NOW),
            Err(CommerceError::VoucherExhausted(_))
        ));
    }

    #[test]
    fn test_fixed_currency_mismatch() {
        let voucher = Voucher::fixed("USD5", Money::new(500, Currency::USD));
        assert!(matches!(
            voucher.apply(&idr(10_000), NOW),
            Err(CommerceError::CurrencyMismatch { .. })
        ));
    }

    #[test]
    fn test_validate_for_creation() {
        assert!(Voucher::percentage("HARVEST15", 15.0).validate().is_ok());
        assert!(Voucher::percentage("", 15.0).validate().is_err());
        assert!(Voucher::percentage("HAS SPACE", 15.0).validate().is_err());
        assert!(Voucher::percentage("ZERO", 0.0).validate().is_err());
        assert!(Voucher::percentage("OVER", 100.5).validate().is_err());
        assert!(Voucher::fixed("NEG", idr(-1)).validate().is_err());
        assert!(Voucher::percentage("BACKWARDS", 5.0)
            .with_window(Some(NOW), Some(NOW - 1))
            .validate()
            .is_err());
    }

    #[test]
    fn test_value_serialization() {
        let json = serde_json::to_value(VoucherValue::Percentage(10.0)).unwrap();
        assert_eq!(json, serde_json::json!({"type": "percentage", "value": 10.0}));
    }
}
