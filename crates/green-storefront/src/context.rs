//! The storefront context.
//!
//! One `StorefrontContext` holds everything a single shopper or seller
//! session needs: config, API client, pricing policy, cart, session guard,
//! voucher source and token store. Handlers receive it explicitly; all
//! mutations go through `&mut self`.

use std::sync::Arc;

use anyhow::Context as _;
use green_auth::{AuthError, BearerToken, Credentials, Registration, SessionGuard, User};
use green_commerce::cart::{Cart, CartAction, CartTotals, PricingPolicy, Voucher};
use green_commerce::catalog::{Category, Product, ProductDraft, Review};
use green_commerce::checkout::{Address, CheckoutSummary, Order, OrderStatus, OrderSummary};
use green_commerce::ids::{OrderId, ProductId, UserId, VoucherId};
use green_commerce::search::{SearchQuery, SearchResults};
use green_data::{FetchClient, ReqwestTransport, Transport};

use crate::api::StorefrontApi;
use crate::config::StorefrontConfig;
use crate::dto::ReviewPayload;
use crate::token_store::{FileTokenStore, MemoryTokenStore, StoredSession, TokenStore};
use crate::vouchers::{self, RemoteVouchers, VoucherSource};
use crate::StorefrontError;

type Result<T> = std::result::Result<T, StorefrontError>;

/// State and operations for one storefront user.
pub struct StorefrontContext {
    config: StorefrontConfig,
    api: StorefrontApi,
    policy: PricingPolicy,
    cart: Cart,
    guard: SessionGuard,
    vouchers: Box<dyn VoucherSource>,
    tokens: Box<dyn TokenStore>,
    fixed_now: Option<i64>,
}

impl std::fmt::Debug for StorefrontContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontContext")
            .field("api", &self.api)
            .field("policy", &self.policy)
            .field("cart", &self.cart)
            .field("guard", &self.guard)
            .finish_non_exhaustive()
    }
}

impl StorefrontContext {
    /// Build a context with the native HTTP transport.
    ///
    /// The token store is a file when `session.token_path` is set, memory otherwise.
    pub fn from_config(config: StorefrontConfig) -> anyhow::Result<Self> {
        let transport = ReqwestTransport::new(config.timeout()).context("Failed to build HTTP client")?;
        let tokens: Box<dyn TokenStore> = match &config.session.token_path {
            Some(path) => Box::new(FileTokenStore::new(path)),
            None => Box::new(MemoryTokenStore::new()),
        };
        Self::with_transport(config, Arc::new(transport), tokens)
    }

    /// Build a context over any transport and token store.
    pub fn with_transport(
        config: StorefrontConfig,
        transport: Arc<dyn Transport>,
        tokens: Box<dyn TokenStore>,
    ) -> anyhow::Result<Self> {
        config.validate()?;
        let policy = config.pricing_policy()?;
        let client = FetchClient::new(transport, config.api.base_url.trim());
        let api = StorefrontApi::new(client, policy.currency);

        Ok(Self {
            guard: SessionGuard::new().with_leeway(config.session.leeway_secs),
            cart: Cart::new(policy.currency),
            vouchers: Box::new(RemoteVouchers::new(api.clone())),
            api,
            policy,
            config,
            tokens,
            fixed_now: None,
        })
    }

    /// Look vouchers up somewhere other than the API.
    pub fn with_voucher_source(mut self, source: impl VoucherSource + 'static) -> Self {
        self.vouchers = Box::new(source);
        self
    }

    /// Freeze the clock used for token expiry and voucher windows.
    pub fn at_time(mut self, now: i64) -> Self {
        self.fixed_now = Some(now);
        self
    }

    pub fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    pub fn api(&self) -> &StorefrontApi {
        &self.api
    }

    pub fn policy(&self) -> &PricingPolicy {
        &self.policy
    }

    fn now(&self) -> i64 {
        self.fixed_now.unwrap_or_else(|| chrono::Utc::now().timestamp())
    }

    // -----------------------------------------------------------------------
    // Session
    // -----------------------------------------------------------------------

    /// Resume the stored session, if it is still valid.
    ///
    /// Expired or malformed tokens are discarded along with the stored copy,
    /// and so is a stored session that cannot be read back.
    pub fn restore_session(&mut self) -> Result<Option<&User>> {
        let stored = match self.tokens.load() {
            Ok(Some(stored)) => stored,
            Ok(None) => return Ok(None),
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable stored session");
                self.tokens.clear()?;
                return Ok(None);
            }
        };

        let now = self.now();
        if let Err(e) = self.guard.sign_in_at(stored.user, stored.token, now) {
            tracing::info!(error = %e, "discarding stored session");
            self.tokens.clear()?;
            return Ok(None);
        }
        Ok(self.guard.user())
    }

    /// `POST /auth/login` and start a session.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<&User> {
        let credentials = Credentials::new(email, password);
        credentials.validate()?;

        let (user, token) = self
            .api
            .login(&credentials)
            .await
            .map_err(|e| match e {
                StorefrontError::Unauthorized | StorefrontError::Validation(_) => {
                    StorefrontError::Auth(AuthError::InvalidCredentials)
                }
                other => other,
            })?;
        self.start_session(user, token)
    }

    /// `POST /auth/register` and start a session.
    pub async fn register(&mut self, registration: &Registration) -> Result<&User> {
        registration.validate()?;
        let (user, token) = self.api.register(registration).await?;
        self.start_session(user, token)
    }

    /// `GET /auth/me`, replacing the cached profile.
    pub async fn refresh_profile(&mut self) -> Result<&User> {
        let token = self.bearer()?;
        let result = self.api.me(&token).await;
        let user = self.observe(result)?;

        self.guard.refresh_user(user.clone())?;
        self.tokens.save(&StoredSession { token, user })?;
        self.guard.user().ok_or(StorefrontError::Auth(AuthError::NotAuthenticated))
    }

    /// End the session locally. The server is not told.
    pub fn logout(&mut self) -> Result<()> {
        self.guard.sign_out();
        self.tokens.clear()
    }

    /// The signed-in user, if any.
    pub fn current_user(&self) -> Option<&User> {
        self.guard.user()
    }

    /// Check for a session whose token has not expired.
    pub fn is_authenticated(&self) -> bool {
        self.guard.is_authenticated_at(self.now())
    }

    fn start_session(&mut self, user: User, token: BearerToken) -> Result<&User> {
        let now = self.now();
        if let Err(e) = self.guard.sign_in_at(user.clone(), token.clone(), now) {
            self.forget_stored_token();
            return Err(e.into());
        }
        self.tokens.save(&StoredSession { token, user })?;
        tracing::info!(user = ?self.guard.user().map(|u| &u.id), "signed in");
        self.guard.user().ok_or(StorefrontError::Auth(AuthError::NotAuthenticated))
    }

    /// Token for the next request. An expired session is dropped from storage too.
    fn bearer(&mut self) -> Result<BearerToken> {
        let now = self.now();
        match self.guard.authorize_at(now) {
            Ok(token) => Ok(token),
            Err(e) => {
                if e == AuthError::TokenExpired {
                    self.forget_stored_token();
                }
                Err(e.into())
            }
        }
    }

    /// Drop the session when the server answered 401, whatever the call.
    fn observe<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(StorefrontError::Unauthorized) = &result {
            self.guard.observe_status(401);
            self.forget_stored_token();
        }
        result
    }

    fn forget_stored_token(&mut self) {
        if let Err(e) = self.tokens.clear() {
            tracing::warn!(error = %e, "failed to clear stored token");
        }
    }

    fn require_store_manager(&self) -> Result<UserId> {
        Ok(self.guard.require_store_manager()?.id.clone())
    }

    // -----------------------------------------------------------------------
    // Catalog
    // -----------------------------------------------------------------------

    /// Fetch products and filter, sort and paginate them locally.
    pub async fn browse(&mut self, query: &SearchQuery) -> Result<SearchResults<Product>> {
        let result = self.api.products(query.category()).await;
        let products = self.observe(result)?;
        Ok(query.apply(&products))
    }

    /// `GET /products/:id`.
    pub async fn product(&mut self, id: &ProductId) -> Result<Product> {
        let result = self.api.product(id).await;
        self.observe(result)
    }

    /// `GET /categories`.
    pub async fn categories(&mut self) -> Result<Vec<Category>> {
        let result = self.api.categories().await;
        self.observe(result)
    }

    /// `GET /reviews?product=:id`.
    pub async fn reviews(&mut self, product_id: &ProductId) -> Result<Vec<Review>> {
        let result = self.api.reviews(product_id).await;
        self.observe(result)
    }

    /// Validate and `POST /reviews`.
    pub async fn submit_review(&mut self, product_id: &ProductId, rating: u8, comment: &str) -> Result<Review> {
        let comment = Review::validate_input(rating, comment)?;
        let token = self.bearer()?;
        let payload = ReviewPayload {
            product: product_id.to_string(),
            rating,
            comment,
        };
        let result = self.api.submit_review(&payload, &token).await;
        self.observe(result)
    }

    // -----------------------------------------------------------------------
    // Cart
    // -----------------------------------------------------------------------

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Totals of the current cart.
    pub fn totals(&self) -> Result<CartTotals> {
        Ok(self.cart.totals(&self.policy)?)
    }

    /// Apply a cart action and return the new totals.
    pub fn dispatch(&mut self, action: CartAction) -> Result<CartTotals> {
        Ok(self.cart.dispatch(action, &self.policy)?)
    }

    pub fn add_to_cart(&mut self, product: Product, quantity: i64) -> Result<CartTotals> {
        self.dispatch(CartAction::add(product, quantity))
    }

    pub fn set_quantity(&mut self, product_id: &ProductId, quantity: i64) -> Result<CartTotals> {
        self.dispatch(CartAction::set_quantity(product_id.clone(), quantity))
    }

    pub fn remove_from_cart(&mut self, product_id: &ProductId) -> Result<CartTotals> {
        self.dispatch(CartAction::remove(product_id.clone()))
    }

    pub fn clear_cart(&mut self) -> Result<CartTotals> {
        self.dispatch(CartAction::Clear)
    }

    /// Look up a voucher and apply it, replacing any applied voucher.
    pub async fn apply_voucher(&mut self, code: &str) -> Result<CartTotals> {
        if self.cart.is_empty() {
            return Err(StorefrontError::Validation(
                "add items to your cart before using a voucher".into(),
            ));
        }
        let subtotal = self.cart.subtotal()?;
        let now = self.now();
        let result = vouchers::apply_voucher(&*self.vouchers, code, &subtotal, now).await;
        let applied = self.observe(result)?;
        self.dispatch(CartAction::ApplyVoucher(applied))
    }

    pub fn remove_voucher(&mut self) -> Result<CartTotals> {
        self.dispatch(CartAction::RemoveVoucher)
    }

    // -----------------------------------------------------------------------
    // Checkout
    // -----------------------------------------------------------------------

    /// Summary of what would be ordered. Requires a session.
    pub fn checkout_summary(&mut self, address: Address) -> Result<CheckoutSummary> {
        self.bearer()?;
        Ok(CheckoutSummary::from_cart(&self.cart, &self.policy, address)?)
    }

    /// `POST /orders`. The cart is cleared once the server accepts the order.
    pub async fn place_order(&mut self, address: Address, note: Option<&str>) -> Result<Order> {
        let mut summary = self.checkout_summary(address)?;
        if let Some(note) = note {
            summary = summary.with_note(note);
        }
        let token = self.bearer()?;

        let result = self.api.place_order(&summary, &token).await;
        let order = self.observe(result)?;
        self.cart.clear();
        tracing::info!(order = %order.id, total = %order.total, "order placed");
        Ok(order)
    }

    /// `GET /orders` for the signed-in customer.
    pub async fn my_orders(&mut self) -> Result<Vec<Order>> {
        let token = self.bearer()?;
        let result = self.api.orders(&token).await;
        self.observe(result)
    }

    /// `GET /orders/:id`.
    pub async fn order(&mut self, id: &OrderId) -> Result<Order> {
        let token = self.bearer()?;
        let result = self.api.order(id, &token).await;
        self.observe(result)
    }

    // -----------------------------------------------------------------------
    // Seller dashboard
    // -----------------------------------------------------------------------

    /// Products owned by the signed-in seller, every status included.
    pub async fn seller_products(&mut self) -> Result<Vec<Product>> {
        let seller = self.require_store_manager()?;
        let token = self.bearer()?;
        let result = self.api.seller_products(&seller, &token).await;
        self.observe(result)
    }

    pub async fn create_product(&mut self, draft: &ProductDraft) -> Result<Product> {
        self.require_store_manager()?;
        draft.validate()?;
        let token = self.bearer()?;
        let result = self.api.create_product(draft, &token).await;
        self.observe(result)
    }

    pub async fn update_product(&mut self, id: &ProductId, draft: &ProductDraft) -> Result<Product> {
        self.require_store_manager()?;
        draft.validate()?;
        let token = self.bearer()?;
        let result = self.api.update_product(id, draft, &token).await;
        self.observe(result)
    }

    pub async fn delete_product(&mut self, id: &ProductId) -> Result<()> {
        self.require_store_manager()?;
        let token = self.bearer()?;
        let result = self.api.delete_product(id, &token).await;
        self.observe(result)
    }

    /// Orders visible to the seller.
    pub async fn seller_orders(&mut self) -> Result<Vec<Order>> {
        self.require_store_manager()?;
        let token = self.bearer()?;
        let result = self.api.orders(&token).await;
        self.observe(result)
    }

    /// Move an order to `to`. Transitions the order rules forbid never reach the server.
    pub async fn update_order_status(&mut self, order: &Order, to: OrderStatus) -> Result<Order> {
        self.require_store_manager()?;
        order.status.transition(to)?;
        let token = self.bearer()?;

        let result = self.api.update_order_status(&order.id, to, &token).await;
        let updated = self.observe(result)?;
        tracing::info!(order = %order.id, from = order.status.as_str(), to = to.as_str(), "order status updated");
        Ok(updated)
    }

    pub async fn list_vouchers(&mut self) -> Result<Vec<Voucher>> {
        self.require_store_manager()?;
        let token = self.bearer()?;
        let result = self.api.vouchers(&token).await;
        self.observe(result)
    }

    pub async fn create_voucher(&mut self, voucher: &Voucher) -> Result<Voucher> {
        self.require_store_manager()?;
        voucher.validate()?;
        let token = self.bearer()?;
        let result = self.api.create_voucher(voucher, &token).await;
        self.observe(result)
    }

    pub async fn delete_voucher(&mut self, id: &VoucherId) -> Result<()> {
        self.require_store_manager()?;
        let token = self.bearer()?;
        let result = self.api.delete_voucher(id, &token).await;
        self.observe(result)
    }

    /// Order counts and revenue, computed from `GET /orders`.
    pub async fn dashboard_summary(&mut self) -> Result<OrderSummary> {
        let orders = self.seller_orders().await?;
        Ok(OrderSummary::from_orders(&orders, self.policy.currency)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use green_auth::Role;
    use green_commerce::cart::VoucherBook;
    use green_commerce::money::{Currency, Money};
    use green_data::{Method, MockTransport};
    use serde_json::json;

    const NOW: i64 = 1_750_000_000;

    fn token(exp: i64) -> BearerToken {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(json!({"sub": "u1", "exp": exp}).to_string());
        BearerToken::new(format!("{}.{}.sig", header, payload))
    }

    fn user(role: Role) -> User {
        User::new("u1", "ani@green.id", "Ani", role)
    }

    fn context_with(tokens: MemoryTokenStore) -> (Arc<MockTransport>, StorefrontContext) {
        let mock = Arc::new(MockTransport::new());
        let mut config = StorefrontConfig::default();
        config.api.base_url = "https://api.globalgreen.test".into();
        let ctx = StorefrontContext::with_transport(config, mock.clone(), Box::new(tokens))
            .unwrap()
            .with_voucher_source(VoucherBook::demo(Currency::IDR).unwrap())
            .at_time(NOW);
        (mock, ctx)
    }

    fn signed_in(role: Role) -> (Arc<MockTransport>, StorefrontContext) {
        let store = MemoryTokenStore::with_session(StoredSession {
            token: token(NOW + 3_600),
            user: user(role),
        });
        let (mock, mut ctx) = context_with(store);
        ctx.restore_session().unwrap();
        (mock, ctx)
    }

    fn product(id: &str, price: i64) -> Product {
        Product::new(id, Money::new(price, Currency::IDR))
            .with_id(id)
            .with_stock(100)
    }

    fn address() -> Address {
        Address::new("Ani", "081234567890", "Jl. Mawar 3", "Bogor", "Jawa Barat", "16111")
    }

    fn order_json(id: &str, status: &str) -> serde_json::Value {
        json!({"_id": id, "items": [], "totalPrice": 50000, "status": status})
    }

    #[tokio::test]
    async fn test_login_stores_session() {
        let (mock, mut ctx) = context_with(MemoryTokenStore::new());
        mock.on(
            Method::POST,
            "/auth/login",
            200,
            json!({"token": token(NOW + 60).as_str(), "user": {"_id": "u1", "email": "ani@green.id"}}),
        );

        let user = ctx.login("ani@green.id", "secret123").await.unwrap();
        assert_eq!(user.email, "ani@green.id");
        assert!(ctx.is_authenticated());
        assert!(ctx.tokens.load().unwrap().is_some());
    }

    #[tokio::test]
    async fn test_login_with_expired_token_drops_previous_session() {
        let (mock, mut ctx) = signed_in(Role::Customer);
        mock.on(
            Method::POST,
            "/auth/login",
            200,
            json!({"token": token(NOW - 1).as_str(), "user": {"_id": "u2", "email": "budi@green.id"}}),
        );

        let err = ctx.login("budi@green.id", "secret123").await.unwrap_err();
        assert_eq!(err, StorefrontError::Auth(AuthError::TokenExpired));
        assert!(ctx.current_user().is_none());
        assert_eq!(ctx.tokens.load().unwrap(), None);
    }

    #[tokio::test]
    async fn test_login_failure_message() {
        let (mock, mut ctx) = context_with(MemoryTokenStore::new());
        mock.on(Method::POST, "/auth/login", 401, json!({"message": "Invalid credentials"}));

        let err = ctx.login("ani@green.id", "wrong").await.unwrap_err();
        assert_eq!(err.user_message(), "Login failed. Please try again.");
        assert!(!ctx.is_authenticated());

        let blank = ctx.login("  ", "secret").await.unwrap_err();
        assert_eq!(blank, StorefrontError::Auth(AuthError::MissingField("email")));
        assert_eq!(mock.request_count(), 1);
    }

    #[tokio::test]
    async fn test_register_validates_locally() {
        let (mock, mut ctx) = context_with(MemoryTokenStore::new());
        let err = ctx
            .register(&Registration::new("Ani", "ani@green.id", "short"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorefrontError::Auth(AuthError::WeakPassword(_))));
        assert_eq!(mock.request_count(), 0);
    }

    #[test]
    fn test_restore_discards_expired_token() {
        let store = MemoryTokenStore::with_session(StoredSession {
            token: token(NOW),
            user: user(Role::Customer),
        });
        let (_, mut ctx) = context_with(store);

        assert_eq!(ctx.restore_session().unwrap(), None);
        assert!(!ctx.is_authenticated());
        assert_eq!(ctx.tokens.load().unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_session_sends_nothing() {
        let (mock, mut ctx) = signed_in(Role::Customer);
        ctx = ctx.at_time(NOW + 3_600);

        let err = ctx.my_orders().await.unwrap_err();
        assert_eq!(err, StorefrontError::Auth(AuthError::TokenExpired));
        assert!(err.is_session_lost());
        assert_eq!(mock.request_count(), 0);
        assert_eq!(ctx.tokens.load().unwrap(), None);
    }

    #[tokio::test]
    async fn test_401_clears_session() {
        let (mock, mut ctx) = signed_in(Role::Customer);
        mock.on(Method::GET, "/orders", 401, json!({"message": "jwt expired"}));

        let err = ctx.my_orders().await.unwrap_err();
        assert_eq!(err, StorefrontError::Unauthorized);
        assert!(ctx.current_user().is_none());
        assert_eq!(ctx.tokens.load().unwrap(), None);
    }

    #[tokio::test]
    async fn test_401_on_public_catalog_call_clears_session() {
        let (mock, mut ctx) = signed_in(Role::Customer);
        mock.on(Method::GET, "/products", 401, json!({"message": "jwt expired"}));

        let err = ctx.browse(&SearchQuery::new()).await.unwrap_err();
        assert_eq!(err, StorefrontError::Unauthorized);
        assert!(ctx.current_user().is_none());
        assert_eq!(ctx.tokens.load().unwrap(), None);
    }

    #[tokio::test]
    async fn test_401_on_categories_clears_session() {
        let (mock, mut ctx) = signed_in(Role::Customer);
        mock.on(Method::GET, "/categories", 401, json!({"message": "jwt expired"}));

        assert_eq!(ctx.categories().await.unwrap_err(), StorefrontError::Unauthorized);
        assert!(!ctx.is_authenticated());
    }

    #[tokio::test]
    async fn test_401_on_voucher_lookup_clears_session() {
        let (mock, mut ctx) = signed_in(Role::Customer);
        let api = ctx.api().clone();
        ctx = ctx.with_voucher_source(RemoteVouchers::new(api));
        mock.on(Method::GET, "/discounts", 401, json!({"message": "jwt expired"}));
        ctx.add_to_cart(product("kale", 24_000), 3).unwrap();

        let err = ctx.apply_voucher("GREEN10").await.unwrap_err();
        assert_eq!(err, StorefrontError::Unauthorized);
        assert!(ctx.current_user().is_none());
        assert_eq!(ctx.tokens.load().unwrap(), None);
        assert_eq!(ctx.cart().voucher_code(), None);
    }

    #[test]
    fn test_corrupt_stored_session_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        let mut config = StorefrontConfig::default();
        config.api.base_url = "https://api.globalgreen.test".into();
        let mock = Arc::new(MockTransport::new());
        let mut ctx =
            StorefrontContext::with_transport(config, mock, Box::new(FileTokenStore::new(&path)))
                .unwrap();

        assert_eq!(ctx.restore_session().unwrap(), None);
        assert!(!path.exists());
        assert_eq!(ctx.restore_session().unwrap(), None);
    }

    #[tokio::test]
    async fn test_403_keeps_session() {
        let (mock, mut ctx) = signed_in(Role::Seller);
        mock.on(Method::GET, "/discounts", 403, json!({"message": "Not your store"}));

        let err = ctx.list_vouchers().await.unwrap_err();
        assert_eq!(err, StorefrontError::Forbidden("Not your store".into()));
        assert!(ctx.is_authenticated());
    }

    #[tokio::test]
    async fn test_refresh_profile() {
        let (mock, mut ctx) = signed_in(Role::Customer);
        mock.on(
            Method::GET,
            "/auth/me",
            200,
            json!({"user": {"_id": "u1", "email": "ani@green.id", "name": "Ani Rahma"}}),
        );

        assert_eq!(ctx.refresh_profile().await.unwrap().name, "Ani Rahma");
        assert_eq!(ctx.tokens.load().unwrap().unwrap().user.name, "Ani Rahma");
    }

    #[test]
    fn test_logout_is_local() {
        let (mock, mut ctx) = signed_in(Role::Customer);
        ctx.logout().unwrap();
        assert!(ctx.current_user().is_none());
        assert_eq!(ctx.tokens.load().unwrap(), None);
        assert_eq!(mock.request_count(), 0);
    }

    #[tokio::test]
    async fn test_green10_cart() {
        let (_, mut ctx) = context_with(MemoryTokenStore::new());
        ctx.add_to_cart(product("kale", 24_000), 3).unwrap();

        let totals = ctx.apply_voucher("green10").await.unwrap();
        assert_eq!(totals.subtotal, Money::new(72_000, Currency::IDR));
        assert_eq!(totals.discount, Money::new(5, Currency::IDR));
        assert_eq!(ctx.cart().voucher_code(), Some("GREEN10"));

        let err = ctx.apply_voucher("NOPE").await.unwrap_err();
        assert_eq!(err.user_message(), "Invalid voucher code.");
        assert_eq!(ctx.cart().voucher_code(), Some("GREEN10"));

        let totals = ctx.remove_voucher().unwrap();
        assert!(totals.discount.is_zero());
    }

    #[tokio::test]
    async fn test_voucher_needs_items() {
        let (_, mut ctx) = context_with(MemoryTokenStore::new());
        let err = ctx.apply_voucher("GREEN10").await.unwrap_err();
        assert!(matches!(err, StorefrontError::Validation(_)));
    }

    #[tokio::test]
    async fn test_browse_page_past_end() {
        let (mock, mut ctx) = context_with(MemoryTokenStore::new());
        mock.on(
            Method::GET,
            "/products",
            200,
            json!([
                {"_id": "a", "name": "Apples", "price": 10000, "stock": 5},
                {"_id": "b", "name": "Bananas", "price": 8000, "stock": 5},
                {"_id": "c", "name": "Carrots", "price": 6000, "stock": 5}
            ]),
        );

        let results = ctx
            .browse(&SearchQuery::new().with_pagination(5, 2))
            .await
            .unwrap();
        assert!(results.is_empty());
        assert_eq!(results.pagination.total, 3);
        assert_eq!(results.pagination.total_pages, 2);
    }

    #[tokio::test]
    async fn test_checkout_requires_session() {
        let (mock, mut ctx) = context_with(MemoryTokenStore::new());
        ctx.add_to_cart(product("kale", 24_000), 1).unwrap();

        let err = ctx.place_order(address(), None).await.unwrap_err();
        assert_eq!(err, StorefrontError::Auth(AuthError::NotAuthenticated));
        assert_eq!(mock.request_count(), 0);
        assert_eq!(ctx.cart().item_count(), 1);
    }

    #[tokio::test]
    async fn test_place_order_clears_cart() {
        let (mock, mut ctx) = signed_in(Role::Customer);
        mock.on(Method::POST, "/orders", 201, json!({"order": order_json("o1", "pending")}));
        ctx.add_to_cart(product("kale", 24_000), 3).unwrap();
        ctx.apply_voucher("GREEN10").await.unwrap();

        let order = ctx.place_order(address(), Some("  leave at gate ")).await.unwrap();
        assert_eq!(order.id, OrderId::new("o1"));
        assert!(ctx.cart().is_empty());

        let body = mock.last_request().unwrap().body_json().unwrap();
        assert_eq!(body["voucherCode"], "GREEN10");
        assert_eq!(body["note"], "leave at gate");
        assert_eq!(body["items"][0]["quantity"], 3);
    }

    #[tokio::test]
    async fn test_failed_order_keeps_cart() {
        let (mock, mut ctx) = signed_in(Role::Customer);
        mock.on(Method::POST, "/orders", 422, json!({"message": "out of stock"}));
        ctx.add_to_cart(product("kale", 24_000), 3).unwrap();

        let err = ctx.place_order(address(), None).await.unwrap_err();
        assert_eq!(err, StorefrontError::Validation("out of stock".into()));
        assert_eq!(ctx.cart().item_count(), 3);
    }

    #[tokio::test]
    async fn test_seller_operations_need_role() {
        let (mock, mut ctx) = signed_in(Role::Customer);
        let draft = ProductDraft::new("Kale", Money::new(12_000, Currency::IDR), 5);

        let err = ctx.create_product(&draft).await.unwrap_err();
        assert!(matches!(err, StorefrontError::Forbidden(_)));
        assert!(ctx.list_vouchers().await.is_err());
        assert_eq!(mock.request_count(), 0);
        assert!(ctx.is_authenticated());
    }

    #[tokio::test]
    async fn test_invalid_draft_not_sent() {
        let (mock, mut ctx) = signed_in(Role::Seller);
        let draft = ProductDraft::new("Kale", Money::zero(Currency::IDR), 5);

        let err = ctx.create_product(&draft).await.unwrap_err();
        assert!(matches!(err, StorefrontError::Commerce(_)));
        assert_eq!(mock.request_count(), 0);
    }

    #[tokio::test]
    async fn test_seller_products_query() {
        let (mock, mut ctx) = signed_in(Role::Seller);
        mock.on(
            Method::GET,
            "/products",
            200,
            json!([{"_id": "p1", "name": "Kale", "price": 12000, "status": "draft"}]),
        );

        let products = ctx.seller_products().await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(mock.last_request().unwrap().query_param("seller"), Some("u1"));
    }

    #[tokio::test]
    async fn test_invalid_transition_sends_nothing() {
        let (mock, mut ctx) = signed_in(Role::Seller);
        let order = serde_json::from_value::<crate::dto::OrderDto>(order_json("o1", "delivered"))
            .unwrap()
            .into_order(Currency::IDR)
            .unwrap();

        let err = ctx.update_order_status(&order, OrderStatus::Pending).await.unwrap_err();
        assert!(matches!(
            err,
            StorefrontError::Commerce(green_commerce::CommerceError::InvalidOrderTransition { .. })
        ));
        assert_eq!(mock.request_count(), 0);
    }

    #[tokio::test]
    async fn test_valid_transition() {
        let (mock, mut ctx) = signed_in(Role::Admin);
        mock.on(Method::PATCH, "/orders/o1/status", 200, order_json("o1", "confirmed"));
        let order = serde_json::from_value::<crate::dto::OrderDto>(order_json("o1", "pending"))
            .unwrap()
            .into_order(Currency::IDR)
            .unwrap();

        let updated = ctx.update_order_status(&order, OrderStatus::Confirmed).await.unwrap();
        assert_eq!(updated.status, OrderStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_create_voucher_validates() {
        let (mock, mut ctx) = signed_in(Role::Seller);
        let err = ctx
            .create_voucher(&Voucher::percentage("BAD CODE", 10.0))
            .await
            .unwrap_err();
        assert!(matches!(err, StorefrontError::Commerce(_)));

        let err = ctx.create_voucher(&Voucher::percentage("TOOMUCH", 150.0)).await.unwrap_err();
        assert!(matches!(err, StorefrontError::Commerce(_)));
        assert_eq!(mock.request_count(), 0);
    }

    #[tokio::test]
    async fn test_dashboard_summary() {
        let (mock, mut ctx) = signed_in(Role::Seller);
        mock.on(
            Method::GET,
            "/orders",
            200,
            json!({"data": [
                order_json("o1", "pending"),
                order_json("o2", "delivered"),
                order_json("o3", "delivered"),
                order_json("o4", "cancelled")
            ]}),
        );

        let summary = ctx.dashboard_summary().await.unwrap();
        assert_eq!(summary.total_orders, 4);
        assert_eq!(summary.pending, 1);
        assert_eq!(summary.count(OrderStatus::Delivered), 2);
        assert_eq!(summary.revenue, Money::new(100_000, Currency::IDR));
    }

    #[tokio::test]
    async fn test_submit_review_validates() {
        let (mock, mut ctx) = signed_in(Role::Customer);
        let err = ctx.submit_review(&ProductId::new("p1"), 6, "great").await.unwrap_err();
        assert!(matches!(err, StorefrontError::Commerce(_)));
        assert_eq!(mock.request_count(), 0);
    }

    #[test]
    fn test_from_config_with_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = StorefrontConfig::default();
        config.session.token_path = Some(dir.path().join("session.json"));

        let mut ctx = StorefrontContext::from_config(config).unwrap();
        assert_eq!(ctx.restore_session().unwrap(), None);
        assert_eq!(ctx.policy().currency, Currency::IDR);
    }
}
