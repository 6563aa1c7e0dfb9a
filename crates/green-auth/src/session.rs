//! Authenticated session.

use crate::token::BearerToken;
use crate::user::User;
use crate::AuthError;
use serde::{Deserialize, Serialize};

/// A signed-in user and the token that proves it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    /// The user.
    pub user: User,
    /// Bearer token attached to requests.
    pub token: BearerToken,
    /// Unix timestamp when the token expires.
    pub expires_at: i64,
}

impl AuthSession {
    /// Create a session, reading the expiry from the token.
    pub fn new(user: User, token: BearerToken) -> Result<Self, AuthError> {
        let claims = token.claims()?;
        Ok(Self {
            user,
            token,
            expires_at: claims.expires_at,
        })
    }

    /// Check if session is expired at `now`.
    pub fn is_expired_at(&self, now: i64, leeway_secs: i64) -> bool {
        now >= self.expires_at.saturating_add(leeway_secs)
    }

    /// Get time until expiration in seconds.
    pub fn time_to_expiry(&self, now: i64) -> i64 {
        (self.expires_at - now).max(0)
    }

    /// Replace the user profile, keeping the token.
    pub fn refresh_user(&mut self, user: User) {
        self.user = user;
    }
}
