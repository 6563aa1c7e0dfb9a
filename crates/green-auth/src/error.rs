//! Authentication errors.

use thiserror::Error;

/// Authentication error type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuthError {
    /// Invalid credentials provided.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No session is active.
    #[error("not authenticated")]
    NotAuthenticated,

    /// Token could not be decoded or lacks a usable expiry claim.
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// Token expired.
    #[error("token expired")]
    TokenExpired,

    /// The server rejected the credentials (HTTP 401).
    #[error("unauthorized")]
    Unauthorized,

    /// The server refused the request for this user (HTTP 403).
    #[error("forbidden")]
    Forbidden,

    /// The user's role does not allow the operation.
    #[error("insufficient permissions: {0} role required")]
    InsufficientPermissions(String),

    /// Password too weak.
    #[error("password too weak: {0}")]
    WeakPassword(String),

    /// Email address is not usable.
    #[error("invalid email: {0}")]
    InvalidEmail(String),

    /// A required field is blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Unknown role name.
    #[error("unknown role: {0}")]
    UnknownRole(String),
}

impl AuthError {
    /// Check if the session is gone and the user must log in again.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidCredentials
                | AuthError::NotAuthenticated
                | AuthError::MalformedToken(_)
                | AuthError::TokenExpired
                | AuthError::Unauthorized
        )
    }

    /// Check if this is a permission error.
    pub fn is_permission_error(&self) -> bool {
        matches!(
            self,
            AuthError::Forbidden | AuthError::InsufficientPermissions(_)
        )
    }

    /// Check if the input was rejected before reaching the server.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            AuthError::WeakPassword(_) | AuthError::InvalidEmail(_) | AuthError::MissingField(_)
        )
    }
}
