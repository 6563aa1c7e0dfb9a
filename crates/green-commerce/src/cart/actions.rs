//! Cart mutations as values.

use crate::cart::{AppliedVoucher, Cart, CartTotals, PricingPolicy};
use crate::catalog::Product;
use crate::error::CommerceError;
use crate::ids::ProductId;

/// A single cart mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum CartAction {
    /// Add a product, or increase its quantity if already present.
    AddItem { product: Product, quantity: i64 },
    /// Set a line's quantity; zero or below removes the line.
    SetQuantity { product_id: ProductId, quantity: i64 },
    /// Remove a product's line.
    RemoveItem(ProductId),
    /// Empty the cart.
    Clear,
    /// Apply a validated voucher, replacing any current one.
    ApplyVoucher(AppliedVoucher),
    /// Drop the applied voucher.
    RemoveVoucher,
}

impl CartAction {
    /// Add `quantity` of `product`.
    pub fn add(product: Product, quantity: i64) -> Self {
        CartAction::AddItem { product, quantity }
    }

    /// Set the quantity of a product already in the cart.
    pub fn set_quantity(product_id: impl Into<ProductId>, quantity: i64) -> Self {
        CartAction::SetQuantity {
            product_id: product_id.into(),
            quantity,
        }
    }

    /// Remove a product from the cart.
    pub fn remove(product_id: impl Into<ProductId>) -> Self {
        CartAction::RemoveItem(product_id.into())
    }

    fn name(&self) -> &'static str {
        match self {
            CartAction::AddItem { .. } => "add_item",
            CartAction::SetQuantity { .. } => "set_quantity",
            CartAction::RemoveItem(_) => "remove_item",
            CartAction::Clear => "clear",
            CartAction::ApplyVoucher(_) => "apply_voucher",
            CartAction::RemoveVoucher => "remove_voucher",
        }
    }
}

impl Cart {
    /// Apply one mutation and return the recomputed totals.
    ///
    /// A failed action leaves the cart unchanged.
    pub fn dispatch(&mut self, action: CartAction, policy: &PricingPolicy) -> Result<CartTotals, CommerceError> {
        let name = action.name();
        let snapshot = self.clone();

        let result = self.run(action).and_then(|()| self.totals(policy));
        match result {
            Ok(totals) => {
                tracing::debug!(action = name, total = %totals.total, "cart updated");
                Ok(totals)
            }
            Err(err) => {
                tracing::debug!(action = name, error = %err, "cart action rejected");
                *self = snapshot;
                Err(err)
            }
        }
    }

    fn run(&mut self, action: CartAction) -> Result<(), CommerceError> {
        match action {
            CartAction::AddItem { product, quantity } => {
                self.add_product(&product, quantity)?;
            }
            CartAction::SetQuantity { product_id, quantity } => {
                if !self.set_quantity(&product_id, quantity)? {
                    return Err(CommerceError::ItemNotInCart(product_id.to_string()));
                }
            }
            CartAction::RemoveItem(product_id) => {
                if !self.remove_item(&product_id) {
                    return Err(CommerceError::ItemNotInCart(product_id.to_string()));
                }
            }
            CartAction::Clear => self.clear(),
            CartAction::ApplyVoucher(applied) => self.apply_voucher(applied)?,
            CartAction::RemoveVoucher => {
                self.remove_voucher();
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::VoucherBook;
    use crate::money::{Currency, Money};

    const NOW: i64 = 1_750_000_000;

    fn idr(amount: i64) -> Money {
        Money::new(amount, Currency::IDR)
    }

    fn tomatoes() -> Product {
        Product::new("Cherry Tomatoes", idr(24_000))
            .with_id("tomatoes")
            .with_stock(50)
    }

    #[test]
    fn test_dispatch_recomputes_totals() {
        let policy = PricingPolicy::for_currency(Currency::IDR);
        let mut cart = Cart::new(Currency::IDR);

        let totals = cart.dispatch(CartAction::add(tomatoes(), 3), &policy).unwrap();
        assert_eq!(totals.subtotal, idr(72_000));
        assert_eq!(totals.total, idr(94_200));

        let totals = cart
            .dispatch(CartAction::set_quantity("tomatoes", 1), &policy)
            .unwrap();
        assert_eq!(totals.subtotal, idr(24_000));
    }

    #[test]
    fn test_green10_example() {
        let policy = PricingPolicy::for_currency(Currency::IDR);
        let book = VoucherBook::demo(Currency::IDR).unwrap();
        let mut cart = Cart::new(Currency::IDR);
        cart.dispatch(CartAction::add(tomatoes(), 3), &policy).unwrap();

        let applied = book.apply("GREEN10", &cart.subtotal().unwrap(), NOW).unwrap();
        let totals = cart.dispatch(CartAction::ApplyVoucher(applied), &policy).unwrap();
        assert_eq!(totals.discount, idr(5));
        assert_eq!(totals.total, idr(94_195));

        let totals = cart.dispatch(CartAction::RemoveVoucher, &policy).unwrap();
        assert_eq!(totals.discount, idr(0));
        assert_eq!(totals.total, idr(94_200));
    }

    #[test]
    fn test_failed_action_leaves_cart_unchanged() {
        let policy = PricingPolicy::for_currency(Currency::IDR);
        let mut cart = Cart::new(Currency::IDR);
        cart.dispatch(CartAction::add(tomatoes(), 3), &policy).unwrap();
        let before = cart.clone();

        assert!(cart.dispatch(CartAction::add(tomatoes(), 100), &policy).is_err());
        assert_eq!(cart, before);

        let err = cart
            .dispatch(CartAction::remove("missing"), &policy)
            .unwrap_err();
        assert_eq!(err, CommerceError::ItemNotInCart("missing".into()));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_clear() {
        let policy = PricingPolicy::for_currency(Currency::IDR);
        let mut cart = Cart::new(Currency::IDR);
        cart.dispatch(CartAction::add(tomatoes(), 2), &policy).unwrap();

        let totals = cart.dispatch(CartAction::Clear, &policy).unwrap();
        assert_eq!(totals, CartTotals::zero(Currency::IDR));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_policy_currency_must_match_cart() {
        let policy = PricingPolicy::for_currency(Currency::USD);
        let mut cart = Cart::new(Currency::IDR);
        assert!(matches!(
            cart.dispatch(CartAction::add(tomatoes(), 1), &policy),
            Err(CommerceError::CurrencyMismatch { .. })
        ));
        assert!(cart.is_empty());
    }
}
