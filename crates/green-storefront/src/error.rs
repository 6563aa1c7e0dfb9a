//! Storefront error types.

use green_auth::AuthError;
use green_commerce::CommerceError;
use green_data::FetchError;
use thiserror::Error;

/// Errors surfaced by storefront operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StorefrontError {
    /// The server rejected the input (400/422), or it failed a local check.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The server rejected the token (401). The session has been cleared.
    #[error("unauthorized")]
    Unauthorized,

    /// The user may not do this (403, or a local role check).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Resource conflicts with existing state (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Any other non-2xx response.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// No response was received.
    #[error("network error: {0}")]
    Network(String),

    /// The response could not be understood.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Session token storage failed.
    #[error("token storage: {0}")]
    Storage(String),

    /// Cart, voucher, pricing or checkout rule.
    #[error(transparent)]
    Commerce(#[from] CommerceError),

    /// Local session problem (no session, expired or malformed token).
    #[error(transparent)]
    Auth(AuthError),
}

impl StorefrontError {
    /// Map an HTTP status and server message to an error kind.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            400 | 422 => StorefrontError::Validation(message),
            401 => StorefrontError::Unauthorized,
            403 => StorefrontError::Forbidden(message),
            404 => StorefrontError::NotFound(message),
            409 => StorefrontError::Conflict(message),
            _ => StorefrontError::Http { status, message },
        }
    }

    /// Check if the user has to log in (again).
    pub fn is_session_lost(&self) -> bool {
        match self {
            StorefrontError::Unauthorized => true,
            StorefrontError::Auth(e) => e.is_auth_failure(),
            _ => false,
        }
    }

    /// The message shown to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            StorefrontError::Validation(_) => "Please check the details you entered and try again.",
            StorefrontError::Unauthorized => "Your session has expired. Please log in again.",
            StorefrontError::Forbidden(_) => "You do not have permission to do that.",
            StorefrontError::NotFound(_) => "We couldn't find what you were looking for.",
            StorefrontError::Conflict(_) => "That already exists.",
            StorefrontError::Http { .. } | StorefrontError::InvalidResponse(_) => {
                "Something went wrong. Please try again later."
            }
            StorefrontError::Timeout | StorefrontError::Network(_) => {
                "Could not reach the server. Check your connection and try again."
            }
            StorefrontError::Storage(_) => "Could not save your session on this device.",
            StorefrontError::Auth(e) => match e {
                AuthError::InvalidCredentials => "Login failed. Please try again.",
                AuthError::WeakPassword(_) => "Password must be at least 8 characters.",
                AuthError::InvalidEmail(_) => "Please enter a valid email address.",
                AuthError::MissingField(_) => "Please fill in all required fields.",
                AuthError::NotAuthenticated => "Please log in to continue.",
                _ => "Your session has expired. Please log in again.",
            },
            StorefrontError::Commerce(e) => match e {
                CommerceError::InvalidVoucherCode(_) => "Invalid voucher code.",
                CommerceError::BelowMinimumPurchase { .. } => {
                    "Your order does not meet the minimum purchase for this voucher."
                }
                CommerceError::VoucherExpired(_) => "This voucher has expired.",
                CommerceError::VoucherNotYetValid(_) => "This voucher is not active yet.",
                CommerceError::VoucherInactive(_) | CommerceError::VoucherExhausted(_) => {
                    "This voucher is no longer available."
                }
                CommerceError::InsufficientStock { .. } => "Not enough stock for this product.",
                CommerceError::QuantityExceedsLimit(..) | CommerceError::InvalidQuantity(_) => {
                    "Please choose a valid quantity."
                }
                CommerceError::CheckoutIncomplete(_) => {
                    "Please complete your cart and shipping details before checkout."
                }
                CommerceError::InvalidOrderTransition { .. } => {
                    "This order cannot be moved to that status."
                }
                CommerceError::Validation(_) => "Please check the details you entered and try again.",
                _ => "Something went wrong. Please try again later.",
            },
        }
    }
}

impl From<FetchError> for StorefrontError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::Http { status, message } => StorefrontError::from_status(status, message),
            FetchError::Timeout => StorefrontError::Timeout,
            FetchError::Transport(msg) | FetchError::InvalidUrl(msg) => StorefrontError::Network(msg),
            FetchError::Parse(msg) | FetchError::Json(msg) => StorefrontError::InvalidResponse(msg),
        }
    }
}

impl From<AuthError> for StorefrontError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Unauthorized => StorefrontError::Unauthorized,
            AuthError::Forbidden => StorefrontError::Forbidden("forbidden".into()),
            AuthError::InsufficientPermissions(required) => {
                StorefrontError::Forbidden(format!("{} role required", required))
            }
            other => StorefrontError::Auth(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            StorefrontError::from_status(422, "bad"),
            StorefrontError::Validation("bad".into())
        );
        assert_eq!(StorefrontError::from_status(401, "x"), StorefrontError::Unauthorized);
        assert_eq!(
            StorefrontError::from_status(403, "sellers only"),
            StorefrontError::Forbidden("sellers only".into())
        );
        assert!(matches!(StorefrontError::from_status(404, ""), StorefrontError::NotFound(_)));
        assert!(matches!(StorefrontError::from_status(409, ""), StorefrontError::Conflict(_)));
        assert_eq!(
            StorefrontError::from_status(500, "boom"),
            StorefrontError::Http {
                status: 500,
                message: "boom".into()
            }
        );
    }

    #[test]
    fn test_transport_errors_are_not_http() {
        assert_eq!(StorefrontError::from(FetchError::Timeout), StorefrontError::Timeout);
        assert!(matches!(
            StorefrontError::from(FetchError::Transport("reset".into())),
            StorefrontError::Network(_)
        ));
    }

    #[test]
    fn test_user_messages() {
        let invalid = StorefrontError::from(CommerceError::InvalidVoucherCode("NOPE".into()));
        assert_eq!(invalid.user_message(), "Invalid voucher code.");

        let login = StorefrontError::from(AuthError::InvalidCredentials);
        assert_eq!(login.user_message(), "Login failed. Please try again.");

        assert_eq!(
            StorefrontError::Unauthorized.user_message(),
            "Your session has expired. Please log in again."
        );
    }

    #[test]
    fn test_session_lost() {
        assert!(StorefrontError::Unauthorized.is_session_lost());
        assert!(StorefrontError::from(AuthError::TokenExpired).is_session_lost());
        assert!(!StorefrontError::Forbidden("no".into()).is_session_lost());
        assert!(!StorefrontError::from(AuthError::InsufficientPermissions("seller".into())).is_session_lost());
    }
}
