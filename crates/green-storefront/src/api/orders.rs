use green_auth::BearerToken;
use green_commerce::checkout::{CheckoutSummary, Order, OrderStatus};
use green_commerce::ids::OrderId;

use super::{segment, StorefrontApi};
use crate::dto::{parse_list, parse_one, OrderDto, OrderPayload, StatusPayload};
use crate::StorefrontError;

impl StorefrontApi {
    /// `GET /orders`. The server scopes the list to the caller's role.
    pub async fn orders(&self, token: &BearerToken) -> Result<Vec<Order>, StorefrontError> {
        let body = self.call_authed(self.client.get("/orders"), token).await?;
        parse_list::<OrderDto>(body, "orders")?
            .into_iter()
            .map(|dto| dto.into_order(self.currency))
            .collect()
    }

    /// `GET /orders/:id`.
    pub async fn order(&self, id: &OrderId, token: &BearerToken) -> Result<Order, StorefrontError> {
        let request = self.client.get(format!("/orders/{}", segment(id)?));
        parse_one::<OrderDto>(self.call_authed(request, token).await?, "order")?.into_order(self.currency)
    }

    /// `POST /orders`.
    pub async fn place_order(
        &self,
        summary: &CheckoutSummary,
        token: &BearerToken,
    ) -> Result<Order, StorefrontError> {
        let request = self.client.post("/orders").json(&OrderPayload::from(summary))?;
        parse_one::<OrderDto>(self.call_authed(request, token).await?, "order")?.into_order(self.currency)
    }

    /// `PATCH /orders/:id/status`.
    pub async fn update_order_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
        token: &BearerToken,
    ) -> Result<Order, StorefrontError> {
        let request = self
            .client
            .patch(format!("/orders/{}/status", segment(id)?))
            .json(&StatusPayload {
                status: status.as_str(),
            })?;
        parse_one::<OrderDto>(self.call_authed(request, token).await?, "order")?.into_order(self.currency)
    }
}
