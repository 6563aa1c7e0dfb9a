//! Voucher lookup and application.

use async_trait::async_trait;
use green_commerce::cart::{AppliedVoucher, Voucher, VoucherBook};
use green_commerce::money::Money;
use green_commerce::CommerceError;

use crate::api::StorefrontApi;
use crate::StorefrontError;

/// Where vouchers are looked up by code.
#[async_trait]
pub trait VoucherSource: Send + Sync {
    /// Find the voucher for a code. `None` means the code is unknown.
    async fn find(&self, code: &str) -> Result<Option<Voucher>, StorefrontError>;
}

/// Vouchers served by `GET /discounts`.
#[derive(Debug, Clone)]
pub struct RemoteVouchers {
    api: StorefrontApi,
}

impl RemoteVouchers {
    pub fn new(api: StorefrontApi) -> Self {
        Self { api }
    }
}

#[async_trait]
impl VoucherSource for RemoteVouchers {
    async fn find(&self, code: &str) -> Result<Option<Voucher>, StorefrontError> {
        self.api.find_voucher(code).await
    }
}

#[async_trait]
impl VoucherSource for VoucherBook {
    async fn find(&self, code: &str) -> Result<Option<Voucher>, StorefrontError> {
        Ok(VoucherBook::find(self, code).cloned())
    }
}

/// Look up `code` and apply it to `subtotal` at time `now`.
pub async fn apply_voucher(
    source: &dyn VoucherSource,
    code: &str,
    subtotal: &Money,
    now: i64,
) -> Result<AppliedVoucher, StorefrontError> {
    let code = Voucher::normalize_code(code);
    if code.is_empty() {
        return Err(CommerceError::InvalidVoucherCode(code).into());
    }

    let Some(voucher) = source.find(&code).await? else {
        tracing::info!(%code, "unknown voucher code");
        return Err(CommerceError::InvalidVoucherCode(code).into());
    };

    match voucher.apply(subtotal, now) {
        Ok(applied) => {
            tracing::info!(%code, discount = %applied.amount, "voucher applied");
            Ok(applied)
        }
        Err(e) => {
            tracing::info!(%code, error = %e, "voucher rejected");
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use green_commerce::money::Currency;

    fn idr(amount: i64) -> Money {
        Money::new(amount, Currency::IDR)
    }

    #[tokio::test]
    async fn test_green10_on_demo_book() {
        let book = VoucherBook::demo(Currency::IDR).unwrap();
        let applied = apply_voucher(&book, " green10 ", &idr(72_000), 0).await.unwrap();
        assert_eq!(applied.code(), "GREEN10");
        assert_eq!(applied.amount, idr(5));
    }

    #[tokio::test]
    async fn test_unknown_and_blank_codes() {
        let book = VoucherBook::demo(Currency::IDR).unwrap();
        for code in ["NOPE", "   "] {
            let err = apply_voucher(&book, code, &idr(72_000), 0).await.unwrap_err();
            assert!(matches!(
                err,
                StorefrontError::Commerce(CommerceError::InvalidVoucherCode(_))
            ));
            assert_eq!(err.user_message(), "Invalid voucher code.");
        }
    }

    #[tokio::test]
    async fn test_minimum_purchase() {
        let book = VoucherBook::demo(Currency::IDR).unwrap();
        let err = apply_voucher(&book, "FRESH20", &idr(72_000), 0).await.unwrap_err();
        assert!(matches!(
            err,
            StorefrontError::Commerce(CommerceError::BelowMinimumPurchase { .. })
        ));

        let applied = apply_voucher(&book, "fresh20", &idr(150_000), 0).await.unwrap();
        assert_eq!(applied.amount, idr(30_000));
    }

    #[tokio::test]
    async fn test_expired_window() {
        let book = VoucherBook::new(vec![
            Voucher::percentage("SUMMER", 10.0).with_window(Some(100), Some(200))
        ]);
        let early = apply_voucher(&book, "SUMMER", &idr(10_000), 50).await.unwrap_err();
        let late = apply_voucher(&book, "SUMMER", &idr(10_000), 201).await.unwrap_err();
        assert!(matches!(early, StorefrontError::Commerce(CommerceError::VoucherNotYetValid(_))));
        assert!(matches!(late, StorefrontError::Commerce(CommerceError::VoucherExpired(_))));
        assert!(apply_voucher(&book, "SUMMER", &idr(10_000), 200).await.is_ok());
    }

    #[tokio::test]
    async fn test_remote_source() {
        let (mock, api) = crate::api::tests::api();
        mock.on(
            green_data::Method::GET,
            "/discounts",
            200,
            serde_json::json!([{"code": "GREEN10", "discountType": "fixed", "discountValue": 5}]),
        );

        let remote = RemoteVouchers::new(api);
        let applied = apply_voucher(&remote, "green10", &idr(72_000), 0).await.unwrap();
        assert_eq!(applied.amount, idr(5));
    }
}
