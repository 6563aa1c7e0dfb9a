//! Category types for product organization.

use crate::ids::CategoryId;
use serde::{Deserialize, Serialize};

/// A product category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    /// Unique category identifier.
    pub id: CategoryId,
    /// Category name.
    pub name: String,
    /// URL-friendly slug.
    pub slug: String,
    /// Parent category ID (None for root categories).
    pub parent_id: Option<CategoryId>,
    /// Number of products in this category, when the API reports it.
    pub product_count: Option<i64>,
}

impl Category {
    /// Create a root category.
    pub fn new(id: impl Into<CategoryId>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: id.into(),
            slug: super::slugify(&name),
            name,
            parent_id: None,
            product_count: None,
        }
    }

    /// Check if this is a root category.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Direct children of `parent` within `categories`, in input order.
    pub fn children_of<'a>(categories: &'a [Category], parent: &CategoryId) -> Vec<&'a Category> {
        categories
            .iter()
            .filter(|c| c.parent_id.as_ref() == Some(parent))
            .collect()
    }

    /// Find a category by id or slug.
    pub fn find<'a>(categories: &'a [Category], key: &str) -> Option<&'a Category> {
        categories
            .iter()
            .find(|c| c.id.as_str() == key || c.slug == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_children_and_lookup() {
        let produce = Category::new("c1", "Fresh Produce");
        let mut fruit = Category::new("c2", "Fruit");
        fruit.parent_id = Some(produce.id.clone());
        let dairy = Category::new("c3", "Dairy & Eggs");

        let all = vec![produce.clone(), fruit, dairy];
        let children = Category::children_of(&all, &produce.id);
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].name, "Fruit");

        assert!(produce.is_root());
        assert_eq!(Category::find(&all, "dairy-eggs").map(|c| c.id.as_str()), Some("c3"));
        assert_eq!(Category::find(&all, "c2").map(|c| c.name.as_str()), Some("Fruit"));
        assert!(Category::find(&all, "bakery").is_none());
    }
}
