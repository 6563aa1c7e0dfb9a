use green_auth::BearerToken;
use green_commerce::catalog::Review;
use green_commerce::ids::ProductId;

use super::StorefrontApi;
use crate::dto::{parse_list, parse_one, ReviewDto, ReviewPayload};
use crate::StorefrontError;

impl StorefrontApi {
    /// `GET /reviews?product=:id`.
    pub async fn reviews(&self, product: &ProductId) -> Result<Vec<Review>, StorefrontError> {
        let request = self.client.get("/reviews").query("product", product.as_str());
        parse_list::<ReviewDto>(self.call(request).await?, "reviews")?
            .into_iter()
            .map(Review::try_from)
            .collect()
    }

    /// `POST /reviews`.
    pub async fn submit_review(
        &self,
        review: &ReviewPayload,
        token: &BearerToken,
    ) -> Result<Review, StorefrontError> {
        let request = self.client.post("/reviews").json(review)?;
        Review::try_from(parse_one::<ReviewDto>(self.call_authed(request, token).await?, "review")?)
    }
}
