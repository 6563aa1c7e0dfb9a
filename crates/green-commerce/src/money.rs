//! Money type for representing monetary values.
//!
//! Amounts are integers in the currency's minor unit (cents for USD, whole
//! rupiah for IDR). Percentages are applied with integer arithmetic and a
//! single half-away-from-zero rounding step, so totals never drift the way
//! float-and-truncate display code does.

use crate::error::CommerceError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    /// Indonesian rupiah, the marketplace's home currency.
    #[default]
    IDR,
    USD,
    EUR,
    SGD,
    MYR,
}

impl Currency {
    /// Get the currency code (e.g., "IDR").
    pub fn code(&self) -> &'static str {
        match self {
            Currency::IDR => "IDR",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::SGD => "SGD",
            Currency::MYR => "MYR",
        }
    }

    /// Get the currency symbol (e.g., "Rp").
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::IDR => "Rp",
            Currency::USD => "$",
            Currency::EUR => "\u{20ac}",
            Currency::SGD => "S$",
            Currency::MYR => "RM",
        }
    }

    /// Get the number of decimal places for this currency.
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::IDR => 0,
            _ => 2,
        }
    }

    /// Number of minor units in one major unit.
    pub fn minor_per_major(&self) -> i64 {
        10_i64.pow(self.decimal_places())
    }

    /// Parse a currency code string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().as_str() {
            "IDR" => Some(Currency::IDR),
            "USD" => Some(Currency::USD),
            "EUR" => Some(Currency::EUR),
            "SGD" => Some(Currency::SGD),
            "MYR" => Some(Currency::MYR),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A monetary value with currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Money {
    /// Amount in the currency's minor unit.
    pub amount_minor: i64,
    /// The currency.
    pub currency: Currency,
}

impl Money {
    /// Create a new Money value from minor units.
    pub fn new(amount_minor: i64, currency: Currency) -> Self {
        Self {
            amount_minor,
            currency,
        }
    }

    /// Create a zero amount in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    /// Create a Money value from whole major units.
    pub fn from_major(major: i64, currency: Currency) -> Result<Self, CommerceError> {
        major
            .checked_mul(currency.minor_per_major())
            .map(|amount| Self::new(amount, currency))
            .ok_or(CommerceError::Overflow)
    }

    /// Create a Money value from a decimal amount in major units.
    ///
    /// Only for values that arrive as floats on the wire; the result is
    /// rounded to the nearest minor unit.
    ///
    /// ```
    /// use green_commerce::money::{Money, Currency};
    /// let price = Money::from_decimal(4.99, Currency::USD).unwrap();
    /// assert_eq!(price.amount_minor, 499);
    /// ```
    pub fn from_decimal(amount: f64, currency: Currency) -> Result<Self, CommerceError> {
        if !amount.is_finite() {
            return Err(CommerceError::Validation(format!(
                "amount is not a finite number: {}",
                amount
            )));
        }
        let scaled = (amount * currency.minor_per_major() as f64).round();
        if scaled < i64::MIN as f64 || scaled > i64::MAX as f64 {
            return Err(CommerceError::Overflow);
        }
        Ok(Self::new(scaled as i64, currency))
    }

    /// Parse a decimal string in major units (e.g. "4.99" or "72000").
    ///
    /// Extra fractional digits are rounded half away from zero.
    pub fn parse_decimal(input: &str, currency: Currency) -> Result<Self, CommerceError> {
        let invalid = || CommerceError::Validation(format!("invalid amount: {:?}", input));

        let trimmed = input.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));

        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let places = currency.decimal_places() as usize;
        let major: i64 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| CommerceError::Overflow)?
        };

        let mut minor: i64 = 0;
        for i in 0..places {
            let digit = frac_part.as_bytes().get(i).map(|b| (b - b'0') as i64).unwrap_or(0);
            minor = minor * 10 + digit;
        }
        let round_up = frac_part
            .as_bytes()
            .get(places)
            .map(|b| *b >= b'5')
            .unwrap_or(false);

        let mut amount = major
            .checked_mul(currency.minor_per_major())
            .and_then(|a| a.checked_add(minor))
            .ok_or(CommerceError::Overflow)?;
        if round_up {
            amount = amount.checked_add(1).ok_or(CommerceError::Overflow)?;
        }
        if negative {
            amount = -amount;
        }
        Ok(Self::new(amount, currency))
    }

    /// Check if this is zero.
    pub fn is_zero(&self) -> bool {
        self.amount_minor == 0
    }

    /// Check if this is positive.
    pub fn is_positive(&self) -> bool {
        self.amount_minor > 0
    }

    /// Check if this is negative.
    pub fn is_negative(&self) -> bool {
        self.amount_minor < 0
    }

    /// Floor the amount at zero.
    pub fn non_negative(&self) -> Self {
        Self::new(self.amount_minor.max(0), self.currency)
    }

    /// Convert to a decimal value. Display and statistics only.
    pub fn to_decimal(&self) -> f64 {
        self.amount_minor as f64 / self.currency.minor_per_major() as f64
    }

    /// Format as a display string (e.g., "Rp72,000" or "$4.99").
    pub fn display(&self) -> String {
        format!(
            "{}{}{}",
            if self.is_negative() { "-" } else { "" },
            self.currency.symbol(),
            self.format_abs()
        )
    }

    /// Format as a display string without symbol (e.g., "4.99").
    pub fn display_amount(&self) -> String {
        format!(
            "{}{}",
            if self.is_negative() { "-" } else { "" },
            self.format_abs()
        )
    }

    fn format_abs(&self) -> String {
        let per_major = self.currency.minor_per_major().unsigned_abs();
        let abs = self.amount_minor.unsigned_abs();
        let major = group_thousands(abs / per_major);
        let places = self.currency.decimal_places() as usize;
        if places == 0 {
            major
        } else {
            format!("{}.{:0places$}", major, abs % per_major)
        }
    }

    /// Fail unless `other` is in the same currency.
    pub fn ensure_same_currency(&self, other: &Money) -> Result<(), CommerceError> {
        if self.currency == other.currency {
            Ok(())
        } else {
            Err(CommerceError::CurrencyMismatch {
                expected: self.currency.code().to_string(),
                got: other.currency.code().to_string(),
            })
        }
    }

    /// Add another Money value.
    pub fn checked_add(&self, other: &Money) -> Result<Money, CommerceError> {
        self.ensure_same_currency(other)?;
        self.amount_minor
            .checked_add(other.amount_minor)
            .map(|amount| Money::new(amount, self.currency))
            .ok_or(CommerceError::Overflow)
    }

    /// Subtract another Money value.
    pub fn checked_sub(&self, other: &Money) -> Result<Money, CommerceError> {
        self.ensure_same_currency(other)?;
        self.amount_minor
            .checked_sub(other.amount_minor)
            .map(|amount| Money::new(amount, self.currency))
            .ok_or(CommerceError::Overflow)
    }

    /// Multiply by a quantity.
    pub fn checked_mul(&self, factor: i64) -> Result<Money, CommerceError> {
        self.amount_minor
            .checked_mul(factor)
            .map(|amount| Money::new(amount, self.currency))
            .ok_or(CommerceError::Overflow)
    }

    /// Calculate a percentage of this amount, rounded to the minor unit.
    ///
    /// The percentage is resolved to basis points first, so `12.5` is exact.
    pub fn percentage(&self, percent: f64) -> Result<Money, CommerceError> {
        if !percent.is_finite() {
            return Err(CommerceError::Validation(format!(
                "percentage is not a finite number: {}",
                percent
            )));
        }
        let basis_points = (percent * 100.0).round();
        if basis_points.abs() > i64::MAX as f64 {
            return Err(CommerceError::Overflow);
        }
        let product = i128::from(self.amount_minor) * basis_points as i128;
        let rounded = div_round_half_away(product, 10_000);
        i64::try_from(rounded)
            .map(|amount| Money::new(amount, self.currency))
            .map_err(|_| CommerceError::Overflow)
    }

    /// The smaller of two amounts in the same currency.
    pub fn min(&self, other: &Money) -> Result<Money, CommerceError> {
        self.ensure_same_currency(other)?;
        Ok(if other.amount_minor < self.amount_minor {
            *other
        } else {
            *self
        })
    }

    /// Sum an iterator of Money values.
    pub fn try_sum<'a>(
        mut iter: impl Iterator<Item = &'a Money>,
        currency: Currency,
    ) -> Result<Money, CommerceError> {
        iter.try_fold(Money::zero(currency), |acc, m| acc.checked_add(m))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

fn div_round_half_away(numerator: i128, denominator: i128) -> i128 {
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    if remainder.abs() * 2 >= denominator.abs() {
        quotient + numerator.signum() * denominator.signum()
    } else {
        quotient
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_from_minor() {
        let m = Money::new(499, Currency::USD);
        assert_eq!(m.amount_minor, 499);
        assert_eq!(m.currency, Currency::USD);
    }

    #[test]
    fn test_money_from_major() {
        assert_eq!(Money::from_major(50, Currency::USD).unwrap().amount_minor, 5000);
        assert_eq!(Money::from_major(72_000, Currency::IDR).unwrap().amount_minor, 72_000);
        assert_eq!(
            Money::from_major(i64::MAX, Currency::USD),
            Err(CommerceError::Overflow)
        );
    }

    #[test]
    fn test_money_from_decimal() {
        assert_eq!(Money::from_decimal(49.99, Currency::USD).unwrap().amount_minor, 4999);
        assert_eq!(Money::from_decimal(0.1 + 0.2, Currency::USD).unwrap().amount_minor, 30);
        assert_eq!(Money::from_decimal(15000.0, Currency::IDR).unwrap().amount_minor, 15000);
        assert!(Money::from_decimal(f64::NAN, Currency::USD).is_err());
    }

    #[test]
    fn test_money_parse_decimal() {
        assert_eq!(Money::parse_decimal("4.99", Currency::USD).unwrap().amount_minor, 499);
        assert_eq!(Money::parse_decimal("4.9", Currency::USD).unwrap().amount_minor, 490);
        assert_eq!(Money::parse_decimal("4", Currency::USD).unwrap().amount_minor, 400);
        assert_eq!(Money::parse_decimal(".5", Currency::USD).unwrap().amount_minor, 50);
        assert_eq!(Money::parse_decimal("4.995", Currency::USD).unwrap().amount_minor, 500);
        assert_eq!(Money::parse_decimal("72000", Currency::IDR).unwrap().amount_minor, 72_000);
        assert_eq!(Money::parse_decimal("72000.6", Currency::IDR).unwrap().amount_minor, 72_001);
        assert_eq!(Money::parse_decimal("-1.25", Currency::USD).unwrap().amount_minor, -125);
        assert!(Money::parse_decimal("", Currency::USD).is_err());
        assert!(Money::parse_decimal("abc", Currency::USD).is_err());
        assert!(Money::parse_decimal("1.2.3", Currency::USD).is_err());
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::new(4999, Currency::USD).display(), "$49.99");
        assert_eq!(Money::new(123_456_789, Currency::USD).display(), "$1,234,567.89");
        assert_eq!(Money::new(72_000, Currency::IDR).display(), "Rp72,000");
        assert_eq!(Money::new(-5, Currency::USD).display(), "-$0.05");
        assert_eq!(Money::new(499, Currency::USD).display_amount(), "4.99");
    }

    #[test]
    fn test_money_addition() {
        let a = Money::new(1000, Currency::USD);
        let b = Money::new(500, Currency::USD);
        assert_eq!(a.checked_add(&b).unwrap().amount_minor, 1500);
    }

    #[test]
    fn test_money_subtraction() {
        let a = Money::new(1000, Currency::USD);
        let b = Money::new(1300, Currency::USD);
        assert_eq!(a.checked_sub(&b).unwrap().amount_minor, -300);
    }

    #[test]
    fn test_money_overflow() {
        let big = Money::new(i64::MAX, Currency::USD);
        assert_eq!(big.checked_add(&Money::new(1, Currency::USD)), Err(CommerceError::Overflow));
        assert_eq!(big.checked_mul(2), Err(CommerceError::Overflow));
    }

    #[test]
    fn test_money_currency_mismatch() {
        let idr = Money::new(1000, Currency::IDR);
        let usd = Money::new(1000, Currency::USD);
        assert!(matches!(
            idr.checked_add(&usd),
            Err(CommerceError::CurrencyMismatch { .. })
        ));
    }

    #[test]
    fn test_money_percentage() {
        let m = Money::new(10_000, Currency::USD);
        assert_eq!(m.percentage(10.0).unwrap().amount_minor, 1000);
        assert_eq!(m.percentage(12.5).unwrap().amount_minor, 1250);

        // 4.95 * 10% = 0.495 -> rounds half away from zero to 0.50
        assert_eq!(Money::new(495, Currency::USD).percentage(10.0).unwrap().amount_minor, 50);
        assert_eq!(Money::new(-495, Currency::USD).percentage(10.0).unwrap().amount_minor, -50);
        assert_eq!(Money::new(494, Currency::USD).percentage(10.0).unwrap().amount_minor, 49);
    }

    #[test]
    fn test_money_min_and_floor() {
        let a = Money::new(300, Currency::USD);
        let b = Money::new(200, Currency::USD);
        assert_eq!(a.min(&b).unwrap(), b);
        assert_eq!(Money::new(-5, Currency::USD).non_negative().amount_minor, 0);
    }

    #[test]
    fn test_try_sum() {
        let amounts = [Money::new(100, Currency::IDR), Money::new(250, Currency::IDR)];
        assert_eq!(
            Money::try_sum(amounts.iter(), Currency::IDR).unwrap().amount_minor,
            350
        );
        let mixed = [Money::new(100, Currency::IDR), Money::new(250, Currency::USD)];
        assert!(Money::try_sum(mixed.iter(), Currency::IDR).is_err());
    }

    #[test]
    fn test_currency_from_code() {
        assert_eq!(Currency::from_code("IDR"), Some(Currency::IDR));
        assert_eq!(Currency::from_code(" usd "), Some(Currency::USD));
        assert_eq!(Currency::from_code("INVALID"), None);
    }
}
