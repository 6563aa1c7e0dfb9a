//! Session guard.
//!
//! Holds the current session and decides, before each authenticated
//! request, whether its token may still be sent. Expired or malformed
//! tokens clear the session. A 401 from the server clears it too; a 403
//! leaves it in place.

use crate::session::AuthSession;
use crate::token::BearerToken;
use crate::user::{Role, User};
use crate::AuthError;

/// Gatekeeper for the bearer token.
#[derive(Debug, Clone, Default)]
pub struct SessionGuard {
    session: Option<AuthSession>,
    leeway_secs: i64,
}

impl SessionGuard {
    /// Create a guard with no session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept tokens up to `leeway_secs` past their expiry.
    pub fn with_leeway(mut self, leeway_secs: i64) -> Self {
        self.leeway_secs = leeway_secs.max(0);
        self
    }

    /// Clock skew tolerance in seconds.
    pub fn leeway_secs(&self) -> i64 {
        self.leeway_secs
    }

    /// Start a session from a login response.
    ///
    /// Tokens that are malformed or already expired are refused.
    pub fn sign_in(&mut self, user: User, token: BearerToken) -> Result<&AuthSession, AuthError> {
        self.sign_in_at(user, token, crate::current_timestamp())
    }

    /// Start a session, judging expiry against `now`.
    pub fn sign_in_at(&mut self, user: User, token: BearerToken, now: i64) -> Result<&AuthSession, AuthError> {
        // A refused sign-in never leaves the previous identity active.
        self.sign_out();
        let session = AuthSession::new(user, token)?;
        if session.is_expired_at(now, self.leeway_secs) {
            tracing::info!(user = %session.user.id, "refusing already expired token");
            return Err(AuthError::TokenExpired);
        }
        tracing::debug!(user = %session.user.id, expires_at = session.expires_at, "session started");
        Ok(&*self.session.insert(session))
    }

    /// End the session.
    pub fn sign_out(&mut self) -> Option<AuthSession> {
        let session = self.session.take();
        if let Some(s) = &session {
            tracing::debug!(user = %s.user.id, "session ended");
        }
        session
    }

    /// Current session, without checking expiry.
    pub fn session(&self) -> Option<&AuthSession> {
        self.session.as_ref()
    }

    /// Current user, without checking expiry.
    pub fn user(&self) -> Option<&User> {
        self.session.as_ref().map(|s| &s.user)
    }

    /// Replace the stored user profile.
    pub fn refresh_user(&mut self, user: User) -> Result<(), AuthError> {
        let session = self.session.as_mut().ok_or(AuthError::NotAuthenticated)?;
        session.refresh_user(user);
        Ok(())
    }

    /// Check if a non-expired session exists at `now`.
    pub fn is_authenticated_at(&self, now: i64) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| !s.is_expired_at(now, self.leeway_secs))
    }

    /// Token to attach to the next request.
    pub fn authorize(&mut self) -> Result<BearerToken, AuthError> {
        self.authorize_at(crate::current_timestamp())
    }

    /// Token to attach to a request sent at `now`.
    ///
    /// An expired session is cleared and reported as `TokenExpired`.
    pub fn authorize_at(&mut self, now: i64) -> Result<BearerToken, AuthError> {
        let session = self.session.as_ref().ok_or(AuthError::NotAuthenticated)?;
        if session.is_expired_at(now, self.leeway_secs) {
            tracing::info!(
                user = %session.user.id,
                expires_at = session.expires_at,
                "token expired, clearing session"
            );
            self.session = None;
            return Err(AuthError::TokenExpired);
        }
        Ok(session.token.clone())
    }

    /// Require that the current user has one of `roles`.
    ///
    /// Does not touch the session on failure.
    pub fn require_role(&self, roles: &[Role]) -> Result<&User, AuthError> {
        let user = self.user().ok_or(AuthError::NotAuthenticated)?;
        if roles.contains(&user.role) {
            Ok(user)
        } else {
            let required = roles
                .iter()
                .map(Role::as_str)
                .collect::<Vec<_>>()
                .join(" or ");
            Err(AuthError::InsufficientPermissions(required))
        }
    }

    /// Require a seller or admin.
    pub fn require_store_manager(&self) -> Result<&User, AuthError> {
        self.require_role(&[Role::Seller, Role::Admin])
    }

    /// React to an HTTP status from an authenticated call.
    ///
    /// 401 clears the session and yields `Unauthorized`; 403 yields
    /// `Forbidden` and keeps the session. Other statuses are ignored.
    pub fn observe_status(&mut self, status: u16) -> Option<AuthError> {
        match status {
            401 => {
                if let Some(session) = self.session.take() {
                    tracing::info!(user = %session.user.id, "server rejected token, clearing session");
                }
                Some(AuthError::Unauthorized)
            }
            403 => Some(AuthError::Forbidden),
            _ => None,
        }
    }
}
