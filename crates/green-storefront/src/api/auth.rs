use green_auth::{BearerToken, Credentials, Registration, User};

use super::StorefrontApi;
use crate::dto::{parse_one, AuthResponse};
use crate::StorefrontError;

impl StorefrontApi {
    /// `POST /auth/login`.
    pub async fn login(&self, credentials: &Credentials) -> Result<(User, BearerToken), StorefrontError> {
        let request = self.client.post("/auth/login").json(credentials)?;
        let auth: AuthResponse = parse_one(self.call(request).await?, "auth")?;
        Ok((auth.user, BearerToken::new(auth.token)))
    }

    /// `POST /auth/register`.
    pub async fn register(&self, registration: &Registration) -> Result<(User, BearerToken), StorefrontError> {
        let request = self.client.post("/auth/register").json(registration)?;
        let auth: AuthResponse = parse_one(self.call(request).await?, "auth")?;
        Ok((auth.user, BearerToken::new(auth.token)))
    }

    /// `GET /auth/me`.
    pub async fn me(&self, token: &BearerToken) -> Result<User, StorefrontError> {
        let body = self.call_authed(self.client.get("/auth/me"), token).await?;
        parse_one(body, "user")
    }
}
