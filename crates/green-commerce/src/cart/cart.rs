//! Cart and line item types.

use crate::cart::{calculate_totals, AppliedVoucher, CartTotals, PricingPolicy};
use crate::catalog::Product;
use crate::error::CommerceError;
use crate::ids::{LineItemId, ProductId};
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Maximum quantity allowed per line item.
pub const MAX_QUANTITY_PER_ITEM: i64 = 999;

/// A shopping cart.
///
/// The cart owns its line items and at most one applied voucher. Every
/// mutation keeps `line.total == unit_price * quantity` and recomputes the
/// voucher amount against the new subtotal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cart {
    /// Items in the cart, one line per product.
    pub items: Vec<LineItem>,
    /// Applied voucher.
    pub voucher: Option<AppliedVoucher>,
    /// Cart currency.
    pub currency: Currency,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl Cart {
    /// Create an empty cart.
    pub fn new(currency: Currency) -> Self {
        Self {
            items: Vec::new(),
            voucher: None,
            currency,
            updated_at: crate::current_timestamp(),
        }
    }

    /// Add a catalog product, checking availability and stock.
    pub fn add_product(&mut self, product: &Product, quantity: i64) -> Result<LineItemId, CommerceError> {
        if product.status != crate::catalog::ProductStatus::Active {
            return Err(CommerceError::ProductNotFound(product.id.to_string()));
        }

        let already = self.get_item(&product.id).map(|i| i.quantity).unwrap_or(0);
        let requested = already
            .checked_add(quantity.max(0))
            .ok_or(CommerceError::Overflow)?;
        if requested > product.stock {
            return Err(CommerceError::InsufficientStock {
                product_id: product.id.to_string(),
                requested,
                available: product.stock,
            });
        }

        let id = self.add_item(product.id.clone(), product.name.clone(), product.price, quantity)?;
        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product.id) {
            item.max_quantity = Some(product.stock);
            item.image = product.cover_image().map(str::to_string);
            item.unit = product.unit.clone();
        }
        Ok(id)
    }

    /// Add an item to the cart.
    ///
    /// Returns an error if:
    /// - Quantity is not positive
    /// - Adding would exceed MAX_QUANTITY_PER_ITEM
    /// - The price is in another currency
    /// - Arithmetic overflow would occur
    pub fn add_item(
        &mut self,
        product_id: ProductId,
        name: impl Into<String>,
        unit_price: Money,
        quantity: i64,
    ) -> Result<LineItemId, CommerceError> {
        if quantity <= 0 {
            return Err(CommerceError::InvalidQuantity(quantity));
        }
        Money::zero(self.currency).ensure_same_currency(&unit_price)?;

        if let Some(existing) = self.items.iter_mut().find(|i| i.product_id == product_id) {
            let new_quantity = existing
                .quantity
                .checked_add(quantity)
                .ok_or(CommerceError::Overflow)?;

            if new_quantity > MAX_QUANTITY_PER_ITEM {
                return Err(CommerceError::QuantityExceedsLimit(
                    new_quantity,
                    MAX_QUANTITY_PER_ITEM,
                ));
            }

            existing.quantity = new_quantity;
            existing.update_total()?;
            let id = existing.id.clone();
            self.touch()?;
            return Ok(id);
        }

        if quantity > MAX_QUANTITY_PER_ITEM {
            return Err(CommerceError::QuantityExceedsLimit(
                quantity,
                MAX_QUANTITY_PER_ITEM,
            ));
        }

        let item = LineItem::new(product_id, name, unit_price, quantity)?;
        let id = item.id.clone();
        self.items.push(item);
        self.touch()?;
        Ok(id)
    }

    /// Set a line's quantity.
    ///
    /// A quantity of zero or less removes the line. Returns whether a line
    /// for the product existed.
    pub fn set_quantity(&mut self, product_id: &ProductId, quantity: i64) -> Result<bool, CommerceError> {
        if quantity <= 0 {
            return Ok(self.remove_item(product_id));
        }

        if quantity > MAX_QUANTITY_PER_ITEM {
            return Err(CommerceError::QuantityExceedsLimit(
                quantity,
                MAX_QUANTITY_PER_ITEM,
            ));
        }

        let Some(item) = self.items.iter_mut().find(|i| &i.product_id == product_id) else {
            return Ok(false);
        };
        if let Some(available) = item.max_quantity {
            if quantity > available {
                return Err(CommerceError::InsufficientStock {
                    product_id: product_id.to_string(),
                    requested: quantity,
                    available,
                });
            }
        }
        item.quantity = quantity;
        item.update_total()?;
        self.touch()?;
        Ok(true)
    }

    /// Remove a product's line from the cart.
    pub fn remove_item(&mut self, product_id: &ProductId) -> bool {
        let len_before = self.items.len();
        self.items.retain(|i| &i.product_id != product_id);
        let removed = self.items.len() < len_before;
        if removed {
            // Removing lines only lowers the subtotal, which cannot overflow.
            if let Err(err) = self.touch() {
                tracing::warn!(error = %err, "dropping voucher after failed recalculation");
                self.voucher = None;
            }
        }
        removed
    }

    /// Clear all items and the voucher.
    pub fn clear(&mut self) {
        self.items.clear();
        self.voucher = None;
        self.updated_at = crate::current_timestamp();
    }

    /// Apply a voucher, replacing any voucher already applied.
    ///
    /// The amount is recomputed against the current subtotal.
    pub fn apply_voucher(&mut self, applied: AppliedVoucher) -> Result<(), CommerceError> {
        if self.is_empty() {
            return Err(CommerceError::Validation(
                "cannot apply a voucher to an empty cart".into(),
            ));
        }
        let subtotal = self.subtotal()?;
        applied.voucher.check_minimum(&subtotal)?;
        let amount = applied.voucher.discount_for(&subtotal)?;

        if let Some(previous) = &self.voucher {
            if previous.code() != applied.code() {
                tracing::info!(
                    previous = previous.code(),
                    replacement = applied.code(),
                    "replacing applied voucher"
                );
            }
        }

        self.voucher = Some(AppliedVoucher {
            voucher: applied.voucher,
            amount,
        });
        self.updated_at = crate::current_timestamp();
        Ok(())
    }

    /// Remove the applied voucher.
    pub fn remove_voucher(&mut self) -> Option<AppliedVoucher> {
        let removed = self.voucher.take();
        if removed.is_some() {
            self.updated_at = crate::current_timestamp();
        }
        removed
    }

    /// Code of the applied voucher.
    pub fn voucher_code(&self) -> Option<&str> {
        self.voucher.as_ref().map(AppliedVoucher::code)
    }

    /// Sum of line totals.
    pub fn subtotal(&self) -> Result<Money, CommerceError> {
        Money::try_sum(self.items.iter().map(|i| &i.total), self.currency)
    }

    /// Current discount amount.
    pub fn discount(&self) -> Money {
        self.voucher
            .as_ref()
            .map(|v| v.amount)
            .unwrap_or_else(|| Money::zero(self.currency))
    }

    /// Calculate cart totals under a pricing policy.
    pub fn totals(&self, policy: &PricingPolicy) -> Result<CartTotals, CommerceError> {
        Money::zero(self.currency).ensure_same_currency(&Money::zero(policy.currency))?;
        calculate_totals(&self.items, self.voucher.as_ref().map(|v| v.amount), policy)
    }

    /// Get total item count (sum of quantities).
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Get number of unique items.
    pub fn unique_item_count(&self) -> usize {
        self.items.len()
    }

    /// Check if cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get a line by product ID.
    pub fn get_item(&self, product_id: &ProductId) -> Option<&LineItem> {
        self.items.iter().find(|i| &i.product_id == product_id)
    }

    /// Record a line change: bump the timestamp and re-price the voucher.
    ///
    /// The voucher is dropped when the cart empties or falls below its
    /// minimum purchase.
    fn touch(&mut self) -> Result<(), CommerceError> {
        self.updated_at = crate::current_timestamp();

        let Some(applied) = &self.voucher else {
            return Ok(());
        };
        if self.items.is_empty() {
            tracing::info!(code = applied.code(), "cart emptied, removing voucher");
            self.voucher = None;
            return Ok(());
        }

        let subtotal = self.subtotal()?;
        if applied.voucher.check_minimum(&subtotal).is_err() {
            tracing::info!(
                code = applied.code(),
                subtotal = %subtotal,
                "cart fell below voucher minimum, removing voucher"
            );
            self.voucher = None;
            return Ok(());
        }

        let amount = applied.voucher.discount_for(&subtotal)?;
        if let Some(applied) = self.voucher.as_mut() {
            applied.amount = amount;
        }
        Ok(())
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::new(Currency::default())
    }
}

/// A line item in the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    /// Unique line item identifier.
    pub id: LineItemId,
    /// Product being purchased.
    pub product_id: ProductId,
    /// Product name (denormalized for display).
    pub name: String,
    /// Unit price.
    pub unit_price: Money,
    /// Quantity.
    pub quantity: i64,
    /// Line total (unit_price * quantity).
    pub total: Money,
    /// Cover image URL.
    pub image: Option<String>,
    /// Selling unit label.
    pub unit: Option<String>,
    /// Stock known when the product was added.
    pub max_quantity: Option<i64>,
}

impl LineItem {
    /// Create a new line item.
    pub fn new(
        product_id: ProductId,
        name: impl Into<String>,
        unit_price: Money,
        quantity: i64,
    ) -> Result<Self, CommerceError> {
        if unit_price.is_negative() {
            return Err(CommerceError::Validation("unit price cannot be negative".into()));
        }
        let total = unit_price.checked_mul(quantity)?;
        Ok(Self {
            id: LineItemId::generate(),
            product_id,
            name: name.into(),
            unit_price,
            quantity,
            total,
            image: None,
            unit: None,
            max_quantity: None,
        })
    }

    /// Update the total based on quantity.
    pub fn update_total(&mut self) -> Result<(), CommerceError> {
        self.total = self.unit_price.checked_mul(self.quantity)?;
        Ok(())
    }
}
