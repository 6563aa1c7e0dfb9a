//! Grocery marketplace domain types and logic for GlobalGreen.
//!
//! This crate holds everything the storefront computes locally:
//!
//! - **Catalog**: Products, categories, reviews
//! - **Search**: Filtering, sorting and pagination of a fetched product list
//! - **Cart**: Line items, vouchers and the totals calculator
//! - **Checkout**: Addresses, checkout summaries, orders
//!
//! # Example
//!
//! ```
//! use green_commerce::prelude::*;
//!
//! let tomatoes = Product::new("Cherry Tomatoes", Money::new(24_000, Currency::IDR)).with_stock(50);
//! let policy = PricingPolicy::for_currency(Currency::IDR);
//!
//! let mut cart = Cart::new(Currency::IDR);
//! let totals = cart
//!     .dispatch(CartAction::add(tomatoes, 3), &policy)
//!     .expect("valid cart mutation");
//!
//! assert_eq!(totals.subtotal.amount_minor, 72_000);
//! ```

pub mod error;
pub mod ids;
pub mod money;

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod search;

pub use error::CommerceError;
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    // Catalog
    pub use crate::catalog::{Category, Product, ProductDraft, ProductStatus, RatingSummary, Review};

    // Cart
    pub use crate::cart::{
        calculate_totals, AppliedVoucher, Cart, CartAction, CartTotals, LineItem, PricingPolicy,
        Voucher, VoucherBook, VoucherStatus, VoucherValue,
    };

    // Checkout
    pub use crate::checkout::{Address, CheckoutSummary, Order, OrderLine, OrderStatus, OrderSummary};

    // Search
    pub use crate::search::{Filter, Pagination, SearchQuery, SearchResults, SortOption};
}

/// Get current Unix timestamp.
pub(crate) fn current_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}
