//! Product types.
//!
//! `Product` is the one normalized product shape used everywhere in the
//! storefront. Wire shapes are mapped into it at the API boundary.

use crate::error::CommerceError;
use crate::ids::{CategoryId, ProductId, UserId};
use crate::money::Money;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Product status in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    /// Product is in draft mode, not visible to customers.
    Draft,
    /// Product is active and visible.
    #[default]
    Active,
    /// Product is archived, not visible but data preserved.
    Archived,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Draft => "draft",
            ProductStatus::Active => "active",
            ProductStatus::Archived => "archived",
        }
    }
}

impl FromStr for ProductStatus {
    type Err = CommerceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Ok(ProductStatus::Draft),
            "active" | "published" => Ok(ProductStatus::Active),
            "archived" | "inactive" => Ok(ProductStatus::Archived),
            other => Err(CommerceError::Validation(format!(
                "unknown product status: {}",
                other
            ))),
        }
    }
}

/// A product in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// URL-friendly slug.
    pub slug: String,
    /// Full description.
    pub description: Option<String>,
    /// Current selling price.
    pub price: Money,
    /// Original price, shown struck through when higher than `price`.
    pub compare_at_price: Option<Money>,
    /// Category this product is listed under.
    pub category_id: Option<CategoryId>,
    /// Seller that owns the listing.
    pub seller_id: Option<UserId>,
    /// Units in stock.
    pub stock: i64,
    /// Selling unit label (e.g., "kg", "bunch").
    pub unit: Option<String>,
    /// Image URLs, first one is the cover.
    pub images: Vec<String>,
    /// Tags for filtering/search.
    pub tags: Vec<String>,
    /// Average review rating (0.0 when unrated).
    pub rating: f64,
    /// Number of reviews.
    pub review_count: i64,
    /// Visibility status.
    pub status: ProductStatus,
    /// Unix timestamp of creation, when the API reports one.
    pub created_at: Option<i64>,
}

impl Product {
    /// Create a new active product with a generated id.
    pub fn new(name: impl Into<String>, price: Money) -> Self {
        let name = name.into();
        Self {
            id: ProductId::generate(),
            slug: slugify(&name),
            name,
            description: None,
            price,
            compare_at_price: None,
            category_id: None,
            seller_id: None,
            stock: 0,
            unit: None,
            images: Vec::new(),
            tags: Vec::new(),
            rating: 0.0,
            review_count: 0,
            status: ProductStatus::Active,
            created_at: None,
        }
    }

    /// Set the id.
    pub fn with_id(mut self, id: impl Into<ProductId>) -> Self {
        self.id = id.into();
        self
    }

    /// Set units in stock.
    pub fn with_stock(mut self, stock: i64) -> Self {
        self.stock = stock;
        self
    }

    /// Set the category.
    pub fn with_category(mut self, category_id: impl Into<CategoryId>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    /// Check if the product can be added to a cart.
    pub fn is_available(&self) -> bool {
        self.status == ProductStatus::Active && self.in_stock()
    }

    /// Check if any units are in stock.
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Check if the product is marked down from its compare-at price.
    pub fn is_on_sale(&self) -> bool {
        self.compare_at_price
            .map(|compare| {
                compare.currency == self.price.currency
                    && compare.amount_minor > self.price.amount_minor
            })
            .unwrap_or(false)
    }

    /// Markdown percentage relative to the compare-at price, rounded down.
    pub fn sale_percentage(&self) -> Option<i64> {
        if !self.is_on_sale() {
            return None;
        }
        let compare = self.compare_at_price?.amount_minor;
        Some((compare - self.price.amount_minor) * 100 / compare)
    }

    /// Cover image URL.
    pub fn cover_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Case-insensitive match against name, description and tags.
    pub fn matches_text(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&needle)
            || self
                .description
                .as_deref()
                .map(|d| d.to_lowercase().contains(&needle))
                .unwrap_or(false)
            || self.tags.iter().any(|t| t.to_lowercase().contains(&needle))
    }

    /// Add a tag to this product.
    pub fn add_tag(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
    }
}

/// Seller-side input for creating or updating a product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub description: Option<String>,
    pub price: Money,
    pub compare_at_price: Option<Money>,
    pub category_id: Option<CategoryId>,
    pub stock: i64,
    pub unit: Option<String>,
    pub images: Vec<String>,
    pub tags: Vec<String>,
    pub status: ProductStatus,
}

impl ProductDraft {
    /// Create a draft with the required fields.
    pub fn new(name: impl Into<String>, price: Money, stock: i64) -> Self {
        Self {
            name: name.into(),
            description: None,
            price,
            compare_at_price: None,
            category_id: None,
            stock,
            unit: None,
            images: Vec::new(),
            tags: Vec::new(),
            status: ProductStatus::Active,
        }
    }

    /// Check the draft before it is sent to the API.
    pub fn validate(&self) -> Result<(), CommerceError> {
        if self.name.trim().is_empty() {
            return Err(CommerceError::Validation("product name is required".into()));
        }
        if !self.price.is_positive() {
            return Err(CommerceError::Validation("price must be positive".into()));
        }
        if self.stock < 0 {
            return Err(CommerceError::Validation("stock cannot be negative".into()));
        }
        if let Some(compare) = &self.compare_at_price {
            self.price.ensure_same_currency(compare)?;
        }
        Ok(())
    }

    /// Slug derived from the name.
    pub fn slug(&self) -> String {
        slugify(&self.name)
    }
}

impl From<&Product> for ProductDraft {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            compare_at_price: product.compare_at_price,
            category_id: product.category_id.clone(),
            stock: product.stock,
            unit: product.unit.clone(),
            images: product.images.clone(),
            tags: product.tags.clone(),
            status: product.status,
        }
    }
}

/// Lowercase, ASCII-alphanumeric words joined by single dashes.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
