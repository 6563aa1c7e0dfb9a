use green_commerce::catalog::Category;

use super::StorefrontApi;
use crate::dto::{parse_list, CategoryDto};
use crate::StorefrontError;

impl StorefrontApi {
    /// `GET /categories`.
    pub async fn categories(&self) -> Result<Vec<Category>, StorefrontError> {
        let body = self.call(self.client.get("/categories")).await?;
        Ok(parse_list::<CategoryDto>(body, "categories")?
            .into_iter()
            .map(Category::from)
            .collect())
    }
}
