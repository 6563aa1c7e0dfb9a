//! Authentication for the GlobalGreen storefront.
//!
//! The server issues bearer tokens; this crate only reads them. It provides
//! the user and role types, decoding of the token's expiry claim, the
//! authenticated session, and the guard that decides whether a token may
//! still be attached to outbound requests.

mod error;
mod guard;
mod session;
mod token;
mod user;

pub use error::AuthError;
pub use guard::SessionGuard;
pub use session::AuthSession;
pub use token::{BearerToken, TokenClaims};
pub use user::{Credentials, Registration, Role, User, MIN_PASSWORD_LEN};

/// Get current Unix timestamp.
pub(crate) fn current_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}
