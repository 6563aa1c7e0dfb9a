//! Product catalog module.
//!
//! Contains types for products, categories and reviews.

mod category;
mod product;
mod review;

pub use category::Category;
pub use product::{slugify, Product, ProductDraft, ProductStatus};
pub use review::{RatingSummary, Review, MAX_REVIEW_COMMENT_CHARS};
