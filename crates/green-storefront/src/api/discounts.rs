use green_auth::BearerToken;
use green_commerce::cart::Voucher;
use green_commerce::ids::VoucherId;

use super::{segment, StorefrontApi};
use crate::dto::{parse_list, parse_one, VoucherDto, VoucherPayload};
use crate::StorefrontError;

impl StorefrontApi {
    /// `GET /discounts?code=:code`. `None` when the server does not know the code.
    pub async fn find_voucher(&self, code: &str) -> Result<Option<Voucher>, StorefrontError> {
        let code = Voucher::normalize_code(code);
        let request = self.client.get("/discounts").query("code", code.as_str());
        let body = match self.call(request).await {
            Ok(body) => body,
            Err(StorefrontError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };

        // Some deployments filter by code, others return the full list.
        let vouchers = match parse_list::<VoucherDto>(body.clone(), "discounts") {
            Ok(list) => list,
            Err(_) => vec![parse_one::<VoucherDto>(body, "discount")?],
        };
        for dto in vouchers {
            if Voucher::normalize_code(&dto.code) == code {
                return dto.into_voucher(self.currency).map(Some);
            }
        }
        Ok(None)
    }

    /// `GET /discounts`, every voucher the seller can see.
    pub async fn vouchers(&self, token: &BearerToken) -> Result<Vec<Voucher>, StorefrontError> {
        let body = self.call_authed(self.client.get("/discounts"), token).await?;
        parse_list::<VoucherDto>(body, "discounts")?
            .into_iter()
            .map(|dto| dto.into_voucher(self.currency))
            .collect()
    }

    /// `POST /discounts`.
    pub async fn create_voucher(&self, voucher: &Voucher, token: &BearerToken) -> Result<Voucher, StorefrontError> {
        let request = self.client.post("/discounts").json(&VoucherPayload::from(voucher))?;
        parse_one::<VoucherDto>(self.call_authed(request, token).await?, "discount")?.into_voucher(self.currency)
    }

    /// `DELETE /discounts/:id`.
    pub async fn delete_voucher(&self, id: &VoucherId, token: &BearerToken) -> Result<(), StorefrontError> {
        let request = self.client.delete(format!("/discounts/{}", segment(id)?));
        self.call_authed(request, token).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::api;
    use super::*;
    use green_commerce::cart::VoucherValue;
    use green_data::Method;
    use serde_json::json;

    #[tokio::test]
    async fn test_find_voucher_in_full_list() {
        let (mock, api) = api();
        mock.on(
            Method::GET,
            "/discounts",
            200,
            json!({"data": [
                {"_id": "d1", "code": "WELCOME5", "discountType": "percentage", "discountValue": 5},
                {"_id": "d2", "code": "GREEN10", "discountType": "fixed", "discountValue": 5}
            ]}),
        );

        let voucher = api.find_voucher(" green10 ").await.unwrap().unwrap();
        assert_eq!(voucher.id, Some(VoucherId::new("d2")));
        assert!(matches!(voucher.value, VoucherValue::Fixed(_)));
        assert_eq!(mock.last_request().unwrap().query_param("code"), Some("GREEN10"));

        assert_eq!(api.find_voucher("NOPE").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_find_voucher_single_object_and_404() {
        let (mock, api) = api();
        mock.on(
            Method::GET,
            "/discounts",
            200,
            json!({"discount": {"code": "FRESH20", "type": "percent", "value": 20}}),
        )
        .on(Method::GET, "/discounts", 404, json!({"message": "Discount not found"}));

        assert!(api.find_voucher("fresh20").await.unwrap().is_some());
        assert_eq!(api.find_voucher("fresh20").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_create_voucher_posts_payload() {
        let (mock, api) = api();
        mock.on(
            Method::POST,
            "/discounts",
            201,
            json!({"discount": {"_id": "d9", "code": "HARVEST", "discountType": "percentage", "discountValue": 15}}),
        );

        let created = api
            .create_voucher(&Voucher::percentage("harvest", 15.0), &BearerToken::new("tok"))
            .await
            .unwrap();
        assert_eq!(created.id, Some(VoucherId::new("d9")));

        let body = mock.last_request().unwrap().body_json().unwrap();
        assert_eq!(body["code"], "HARVEST");
        assert_eq!(body["discountType"], "percentage");
        assert_eq!(body["discountValue"], 15.0);
    }
}
