use green_auth::BearerToken;
use green_commerce::catalog::{Product, ProductDraft};
use green_commerce::ids::{CategoryId, ProductId, UserId};

use super::{segment, StorefrontApi};
use crate::dto::{parse_list, parse_one, ProductDto, ProductPayload};
use crate::StorefrontError;

impl StorefrontApi {
    /// `GET /products`, optionally narrowed to one category.
    pub async fn products(&self, category: Option<&CategoryId>) -> Result<Vec<Product>, StorefrontError> {
        let mut request = self.client.get("/products");
        if let Some(category) = category {
            request = request.query("category", category.as_str());
        }
        self.read_products(self.call(request).await?)
    }

    /// `GET /products?seller=:id`, the products a seller owns.
    pub async fn seller_products(
        &self,
        seller: &UserId,
        token: &BearerToken,
    ) -> Result<Vec<Product>, StorefrontError> {
        let request = self.client.get("/products").query("seller", seller.as_str());
        self.read_products(self.call_authed(request, token).await?)
    }

    /// `GET /products/:id`.
    pub async fn product(&self, id: &ProductId) -> Result<Product, StorefrontError> {
        let request = self.client.get(format!("/products/{}", segment(id)?));
        parse_one::<ProductDto>(self.call(request).await?, "product")?.into_product(self.currency)
    }

    /// `POST /products`.
    pub async fn create_product(
        &self,
        draft: &ProductDraft,
        token: &BearerToken,
    ) -> Result<Product, StorefrontError> {
        let request = self.client.post("/products").json(&ProductPayload::from(draft))?;
        parse_one::<ProductDto>(self.call_authed(request, token).await?, "product")?
            .into_product(self.currency)
    }

    /// `PUT /products/:id`.
    pub async fn update_product(
        &self,
        id: &ProductId,
        draft: &ProductDraft,
        token: &BearerToken,
    ) -> Result<Product, StorefrontError> {
        let request = self
            .client
            .put(format!("/products/{}", segment(id)?))
            .json(&ProductPayload::from(draft))?;
        parse_one::<ProductDto>(self.call_authed(request, token).await?, "product")?
            .into_product(self.currency)
    }

    /// `DELETE /products/:id`.
    pub async fn delete_product(&self, id: &ProductId, token: &BearerToken) -> Result<(), StorefrontError> {
        let request = self.client.delete(format!("/products/{}", segment(id)?));
        self.call_authed(request, token).await?;
        Ok(())
    }

    fn read_products(&self, body: serde_json::Value) -> Result<Vec<Product>, StorefrontError> {
        parse_list::<ProductDto>(body, "products")?
            .into_iter()
            .map(|dto| dto.into_product(self.currency))
            .collect()
    }
}
