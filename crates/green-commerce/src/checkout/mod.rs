//! Checkout module.
//!
//! Contains delivery addresses, the checkout summary and placed orders.

mod address;
mod order;
mod summary;

pub use address::Address;
pub use order::{Order, OrderLine, OrderStatus, OrderSummary};
pub use summary::CheckoutSummary;
