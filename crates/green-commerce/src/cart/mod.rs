//! Shopping cart module.
//!
//! Contains the cart and its line items, the totals calculator, vouchers,
//! and the action type every cart mutation goes through.

mod actions;
mod cart;
mod pricing;
mod voucher;

pub use actions::CartAction;
pub use cart::{Cart, LineItem, MAX_QUANTITY_PER_ITEM};
pub use pricing::{calculate_totals, CartTotals, PricingPolicy};
pub use voucher::{AppliedVoucher, Voucher, VoucherBook, VoucherStatus, VoucherValue, MAX_VOUCHER_CODE_LEN};
