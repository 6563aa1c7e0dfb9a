//! Catalog search module.
//!
//! Filters, sorting and pagination over a product list fetched from the
//! API. The lists are small, so everything is a linear scan.

mod filter;
mod query;
mod results;

pub use filter::Filter;
pub use query::{SearchQuery, SortOption, DEFAULT_PER_PAGE, MAX_PER_PAGE};
pub use results::{Pagination, SearchResults};
