//! Catalog query builder.

use crate::catalog::{Product, ProductStatus};
use crate::search::{Filter, Pagination, SearchResults};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Default page size on catalog pages.
pub const DEFAULT_PER_PAGE: i64 = 12;

/// Largest page size a caller may request.
pub const MAX_PER_PAGE: i64 = 100;

/// Sort options for catalog listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SortOption {
    /// Keep the order the API returned.
    #[default]
    Featured,
    /// Sort by price, low to high.
    PriceAsc,
    /// Sort by price, high to low.
    PriceDesc,
    /// Sort by name A-Z.
    NameAsc,
    /// Sort by name Z-A.
    NameDesc,
    /// Sort by newest first.
    Newest,
    /// Sort by highest rated.
    Rating,
}

impl SortOption {
    pub fn display_name(&self) -> &'static str {
        match self {
            SortOption::Featured => "Featured",
            SortOption::PriceAsc => "Price: Low to High",
            SortOption::PriceDesc => "Price: High to Low",
            SortOption::NameAsc => "Name: A-Z",
            SortOption::NameDesc => "Name: Z-A",
            SortOption::Newest => "Newest",
            SortOption::Rating => "Highest Rated",
        }
    }

    /// Ordering between two products. `Featured` treats all as equal so a
    /// stable sort keeps input order.
    pub fn compare(&self, a: &Product, b: &Product) -> Ordering {
        match self {
            SortOption::Featured => Ordering::Equal,
            SortOption::PriceAsc => a.price.amount_minor.cmp(&b.price.amount_minor),
            SortOption::PriceDesc => b.price.amount_minor.cmp(&a.price.amount_minor),
            SortOption::NameAsc => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortOption::NameDesc => b.name.to_lowercase().cmp(&a.name.to_lowercase()),
            // Products without a timestamp sort last.
            SortOption::Newest => b.created_at.unwrap_or(i64::MIN).cmp(&a.created_at.unwrap_or(i64::MIN)),
            SortOption::Rating => b
                .rating
                .total_cmp(&a.rating)
                .then_with(|| b.review_count.cmp(&a.review_count)),
        }
    }
}

/// A catalog query: filters, sort and page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchQuery {
    /// Filters to apply (all must match).
    pub filters: Vec<Filter>,
    /// Sort option.
    pub sort: SortOption,
    /// Current page (1-indexed).
    pub page: i64,
    /// Items per page.
    pub per_page: i64,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchQuery {
    /// Create a query over active products, first page, default page size.
    pub fn new() -> Self {
        Self {
            filters: vec![Filter::Status(ProductStatus::Active)],
            sort: SortOption::Featured,
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }

    /// Create a query with no implicit status filter (seller dashboard).
    pub fn all_statuses() -> Self {
        Self {
            filters: Vec::new(),
            ..Self::new()
        }
    }

    /// Add a free-text filter. Blank text is ignored.
    pub fn with_text(mut self, q: impl Into<String>) -> Self {
        let q = q.into();
        if !q.trim().is_empty() {
            self.filters.push(Filter::Text(q));
        }
        self
    }

    /// Add a filter.
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Set sort option.
    pub fn with_sort(mut self, sort: SortOption) -> Self {
        self.sort = sort;
        self
    }

    /// Set pagination. Page is at least 1, page size is clamped to 1..=100.
    pub fn with_pagination(mut self, page: i64, per_page: i64) -> Self {
        self.page = page.max(1);
        self.per_page = per_page.clamp(1, MAX_PER_PAGE);
        self
    }

    /// Category filter in this query, if any.
    pub fn category(&self) -> Option<&crate::ids::CategoryId> {
        self.filters.iter().find_map(|f| match f {
            Filter::Category(id) => Some(id),
            _ => None,
        })
    }

    /// Check whether a product passes every filter.
    pub fn matches(&self, product: &Product) -> bool {
        self.filters.iter().all(|f| f.matches(product))
    }

    /// Filter, sort and paginate a product list.
    pub fn apply(&self, products: &[Product]) -> SearchResults<Product> {
        let mut matched: Vec<&Product> = products.iter().filter(|p| self.matches(p)).collect();
        matched.sort_by(|a, b| self.sort.compare(a, b));

        let page = self.page.max(1);
        let per_page = self.per_page.clamp(1, MAX_PER_PAGE);
        let pagination = Pagination::new(page, per_page, matched.len() as i64);

        let items = matched
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(per_page as usize)
            .cloned()
            .collect();

        SearchResults::new(items, pagination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::{Currency, Money};

    fn catalog() -> Vec<Product> {
        let mut items = vec![
            Product::new("Bananas", Money::new(15_000, Currency::IDR)).with_stock(40),
            Product::new("avocado", Money::new(30_000, Currency::IDR)).with_stock(0),
            Product::new("Carrots", Money::new(9_000, Currency::IDR)).with_stock(25),
            Product::new("Durian", Money::new(120_000, Currency::IDR)).with_stock(2),
        ];
        for (i, p) in items.iter_mut().enumerate() {
            p.created_at = Some(1_700_000_000 + i as i64);
            p.rating = i as f64;
        }
        items[3].status = ProductStatus::Draft;
        items
    }

    fn names(results: &SearchResults<Product>) -> Vec<&str> {
        results.items.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_default_query_hides_non_active() {
        let results = SearchQuery::new().apply(&catalog());
        assert_eq!(names(&results), vec!["Bananas", "avocado", "Carrots"]);
        assert_eq!(results.pagination.total, 3);
    }

    #[test]
    fn test_sorting() {
        let results = SearchQuery::new().with_sort(SortOption::PriceAsc).apply(&catalog());
        assert_eq!(names(&results), vec!["Carrots", "Bananas", "avocado"]);

        let results = SearchQuery::new().with_sort(SortOption::NameAsc).apply(&catalog());
        assert_eq!(names(&results), vec!["avocado", "Bananas", "Carrots"]);

        let results = SearchQuery::new().with_sort(SortOption::Newest).apply(&catalog());
        assert_eq!(names(&results), vec!["Carrots", "avocado", "Bananas"]);

        let results = SearchQuery::all_statuses().with_sort(SortOption::Rating).apply(&catalog());
        assert_eq!(names(&results)[0], "Durian");
    }

    #[test]
    fn test_filters_combine() {
        let results = SearchQuery::new()
            .with_filter(Filter::in_stock())
            .with_text("a")
            .apply(&catalog());
        assert_eq!(names(&results), vec!["Bananas", "Carrots"]);
    }

    #[test]
    fn test_pagination() {
        let query = SearchQuery::all_statuses().with_pagination(2, 3);
        let results = query.apply(&catalog());
        assert_eq!(names(&results), vec!["Durian"]);
        assert_eq!(results.pagination.total_pages, 2);
        assert!(results.pagination.has_prev);
        assert!(!results.pagination.has_next);
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let results = SearchQuery::new().with_pagination(9, 2).apply(&catalog());
        assert!(results.is_empty());
        assert_eq!(results.pagination.total, 3);
        assert_eq!(results.pagination.total_pages, 2);
    }

    #[test]
    fn test_pagination_clamped() {
        let query = SearchQuery::new().with_pagination(-3, 1000);
        assert_eq!(query.page, 1);
        assert_eq!(query.per_page, MAX_PER_PAGE);
    }
}
