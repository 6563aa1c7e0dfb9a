//! Storefront and seller dashboard core for GlobalGreen.
//!
//! Ties the domain crates to the marketplace API:
//!
//! - **Context**: [`StorefrontContext`], the cart, session and API client of
//!   one user, passed explicitly to whatever drives the UI
//! - **API**: [`StorefrontApi`], one typed method per endpoint
//! - **Adapters**: [`dto`], the wire shapes and their conversion into
//!   domain types
//! - **Vouchers**: the [`VoucherSource`] seam, remote or in-memory
//! - **Token storage**: the [`TokenStore`] seam, memory or file
//! - **Config**: [`StorefrontConfig`] from TOML or JSON plus environment
//!
//! # Example
//!
//! ```rust,ignore
//! use green_storefront::{StorefrontConfig, StorefrontContext};
//! use green_commerce::search::SearchQuery;
//!
//! let config = StorefrontConfig::load_with_env("storefront.toml")?;
//! let mut ctx = StorefrontContext::from_config(config)?;
//! ctx.restore_session()?;
//!
//! let page = ctx.browse(&SearchQuery::new().with_text("kale")).await?;
//! ctx.add_to_cart(page.items[0].clone(), 2)?;
//! let totals = ctx.apply_voucher("GREEN10").await?;
//! ```

pub mod api;
pub mod config;
pub mod context;
pub mod dto;
pub mod error;
pub mod token_store;
pub mod vouchers;

pub use api::StorefrontApi;
pub use config::StorefrontConfig;
pub use context::StorefrontContext;
pub use error::StorefrontError;
pub use token_store::{FileTokenStore, MemoryTokenStore, StoredSession, TokenStore};
pub use vouchers::{apply_voucher, RemoteVouchers, VoucherSource};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        StorefrontApi, StorefrontConfig, StorefrontContext, StorefrontError, TokenStore, VoucherSource,
    };
    pub use green_auth::{Registration, Role, User};
    pub use green_commerce::prelude::*;
}
