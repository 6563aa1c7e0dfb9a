//! Typed client for the GlobalGreen marketplace API.
//!
//! One method per endpoint. Each resource lives in its own file and adds
//! an `impl StorefrontApi` block. Methods take the bearer token explicitly;
//! session bookkeeping is the caller's business (see
//! [`StorefrontContext`](crate::StorefrontContext)).

mod auth;
mod categories;
mod discounts;
mod orders;
mod products;
mod reviews;

use green_auth::BearerToken;
use green_commerce::money::Currency;
use green_data::{ClientRequestBuilder, FetchClient};
use serde_json::Value;

use crate::StorefrontError;

/// Marketplace API client.
///
/// Cheap to clone; clones share the underlying transport.
#[derive(Debug, Clone)]
pub struct StorefrontApi {
    client: FetchClient,
    currency: Currency,
}

impl StorefrontApi {
    /// Wrap a fetch client. Wire amounts are read in `currency`.
    pub fn new(client: FetchClient, currency: Currency) -> Self {
        Self { client, currency }
    }

    /// The underlying fetch client.
    pub fn client(&self) -> &FetchClient {
        &self.client
    }

    /// Currency used for wire amounts.
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Send a request and return its JSON body, or the error its status maps to.
    async fn call(&self, request: ClientRequestBuilder) -> Result<Value, StorefrontError> {
        Ok(request.send_json::<Value>().await?)
    }

    /// Like [`call`](Self::call) with a bearer token attached.
    async fn call_authed(
        &self,
        request: ClientRequestBuilder,
        token: &BearerToken,
    ) -> Result<Value, StorefrontError> {
        self.call(request.bearer_auth(token.as_str())).await
    }
}

/// An id reduced to characters that cannot change the request path.
///
/// Ids that reduce to nothing, or to dots only, would address a parent
/// path and are rejected.
pub(crate) fn segment(id: impl AsRef<str>) -> Result<String, StorefrontError> {
    let segment: String = id
        .as_ref()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect();
    if segment.chars().all(|c| c == '.') {
        return Err(StorefrontError::Validation(format!("invalid id: {:?}", id.as_ref())));
    }
    Ok(segment)
}
