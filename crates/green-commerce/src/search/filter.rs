//! Catalog filter types.

use crate::catalog::{Product, ProductStatus};
use crate::ids::CategoryId;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// A catalog filter, evaluated against each product in turn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Filter {
    /// Filter by single category.
    Category(CategoryId),
    /// Filter by price range, both ends inclusive.
    PriceRange {
        min: Option<Money>,
        max: Option<Money>,
    },
    /// Only show in-stock items.
    InStock,
    /// Filter by tag (case-insensitive).
    Tag(String),
    /// Filter by minimum rating.
    MinRating(f64),
    /// Filter by product status.
    Status(ProductStatus),
    /// Free-text search in name, description and tags.
    Text(String),
}

impl Filter {
    /// Create a category filter.
    pub fn category(id: impl Into<CategoryId>) -> Self {
        Filter::Category(id.into())
    }

    /// Create a price range filter.
    pub fn price_range(min: Option<Money>, max: Option<Money>) -> Self {
        Filter::PriceRange { min, max }
    }

    /// Create an in-stock filter.
    pub fn in_stock() -> Self {
        Filter::InStock
    }

    /// Create a tag filter.
    pub fn tag(tag: impl Into<String>) -> Self {
        Filter::Tag(tag.into())
    }

    /// Create a text search filter.
    pub fn text(query: impl Into<String>) -> Self {
        Filter::Text(query.into())
    }

    /// Check whether a product passes this filter.
    ///
    /// Price bounds in a different currency than the product never match.
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            Filter::Category(id) => product.category_id.as_ref() == Some(id),
            Filter::PriceRange { min, max } => {
                let above_min = min
                    .map(|m| {
                        m.currency == product.price.currency
                            && product.price.amount_minor >= m.amount_minor
                    })
                    .unwrap_or(true);
                let below_max = max
                    .map(|m| {
                        m.currency == product.price.currency
                            && product.price.amount_minor <= m.amount_minor
                    })
                    .unwrap_or(true);
                above_min && below_max
            }
            Filter::InStock => product.in_stock(),
            Filter::Tag(tag) => product.tags.iter().any(|t| t.eq_ignore_ascii_case(tag)),
            Filter::MinRating(min) => product.rating >= *min,
            Filter::Status(status) => product.status == *status,
            Filter::Text(query) => product.matches_text(query),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;

    fn product(price: i64) -> Product {
        Product::new("Red Onions", Money::new(price, Currency::IDR)).with_category("bumbu")
    }

    #[test]
    fn test_price_range_inclusive() {
        let filter = Filter::price_range(
            Some(Money::new(10_000, Currency::IDR)),
            Some(Money::new(20_000, Currency::IDR)),
        );
        assert!(filter.matches(&product(10_000)));
        assert!(filter.matches(&product(20_000)));
        assert!(!filter.matches(&product(9_999)));
        assert!(!filter.matches(&product(20_001)));
    }

    #[test]
    fn test_price_range_other_currency_never_matches() {
        let filter = Filter::price_range(Some(Money::new(1, Currency::USD)), None);
        assert!(!filter.matches(&product(10_000)));
    }

    #[test]
    fn test_category_and_stock() {
        let p = product(5_000);
        assert!(Filter::category("bumbu").matches(&p));
        assert!(!Filter::category("fruit").matches(&p));
        assert!(!Filter::in_stock().matches(&p));
        assert!(Filter::in_stock().matches(&p.with_stock(1)));
    }

    #[test]
    fn test_tag_and_rating() {
        let mut p = product(5_000);
        p.add_tag("Organic");
        p.rating = 4.2;
        assert!(Filter::tag("organic").matches(&p));
        assert!(Filter::MinRating(4.0).matches(&p));
        assert!(!Filter::MinRating(4.5).matches(&p));
    }
}
