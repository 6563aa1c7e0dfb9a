//! Shipping address.

use crate::error::CommerceError;
use serde::{Deserialize, Serialize};

/// A delivery address.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Address {
    /// Recipient name.
    pub recipient: String,
    /// Contact phone number.
    pub phone: String,
    /// Street address.
    pub line1: String,
    /// Apartment, building, landmark.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    /// City or regency.
    pub city: String,
    /// Province.
    #[serde(default)]
    pub province: String,
    /// Postal code.
    pub postal_code: String,
    /// ISO country code (e.g., "ID").
    pub country_code: String,
}

impl Address {
    /// Create a new address in Indonesia.
    pub fn new(
        recipient: impl Into<String>,
        phone: impl Into<String>,
        line1: impl Into<String>,
        city: impl Into<String>,
        province: impl Into<String>,
        postal_code: impl Into<String>,
    ) -> Self {
        Self {
            recipient: recipient.into(),
            phone: phone.into(),
            line1: line1.into(),
            line2: None,
            city: city.into(),
            province: province.into(),
            postal_code: postal_code.into(),
            country_code: "ID".to_string(),
        }
    }

    /// Set the second address line.
    pub fn with_line2(mut self, line2: impl Into<String>) -> Self {
        self.line2 = Some(line2.into());
        self
    }

    /// Format as single line.
    pub fn one_line(&self) -> String {
        let mut parts = vec![self.line1.as_str()];
        if let Some(line2) = self.line2.as_deref() {
            parts.push(line2);
        }
        parts.push(&self.city);
        if !self.province.is_empty() {
            parts.push(&self.province);
        }
        parts.push(&self.postal_code);
        parts.push(&self.country_code);
        parts.join(", ")
    }

    /// Names of required fields that are blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("recipient", &self.recipient),
            ("phone", &self.phone),
            ("line1", &self.line1),
            ("city", &self.city),
            ("postal_code", &self.postal_code),
            ("country_code", &self.country_code),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    /// Check if address is complete.
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Validate before checkout.
    pub fn validate(&self) -> Result<(), CommerceError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(CommerceError::CheckoutIncomplete(format!(
                "address is missing: {}",
                missing.join(", ")
            )));
        }
        if !self
            .phone
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' '))
        {
            return Err(CommerceError::Validation(format!(
                "invalid phone number: {}",
                self.phone
            )));
        }
        Ok(())
    }
}
