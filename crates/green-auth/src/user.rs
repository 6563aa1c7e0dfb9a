//! User types.

use crate::AuthError;
use green_commerce::ids::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Shortest password accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 8;

/// User role for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Shopper.
    #[default]
    #[serde(alias = "user", alias = "buyer")]
    Customer,
    /// Store owner with a seller dashboard.
    Seller,
    /// Marketplace administrator.
    Admin,
}

impl Role {
    /// Get role as string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Seller => "seller",
            Role::Admin => "admin",
        }
    }

    /// Check if this role may use the seller dashboard.
    pub fn can_manage_store(&self) -> bool {
        matches!(self, Role::Seller | Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "customer" | "user" | "buyer" => Ok(Role::Customer),
            "seller" => Ok(Role::Seller),
            "admin" => Ok(Role::Admin),
            other => Err(AuthError::UnknownRole(other.to_string())),
        }
    }
}

/// A signed-in user as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// User ID.
    #[serde(alias = "_id")]
    pub id: UserId,
    /// Email address.
    pub email: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Role.
    #[serde(default)]
    pub role: Role,
    /// Avatar URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl User {
    /// Create a new user.
    pub fn new(id: impl Into<UserId>, email: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            name: name.into(),
            role,
            avatar: None,
        }
    }

    /// Get display name, falling back to the email.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.email
        } else {
            &self.name
        }
    }

    /// Check if user has a specific role.
    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }

    /// Check if this user may use the seller dashboard.
    pub fn can_manage_store(&self) -> bool {
        self.role.can_manage_store()
    }
}

/// Login form.
#[derive(Clone, Serialize, PartialEq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    /// Create credentials, trimming the email.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into().trim().to_string(),
            password: password.into(),
        }
    }

    /// Reject blank fields before a request is made.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.email.is_empty() {
            return Err(AuthError::MissingField("email"));
        }
        if self.password.is_empty() {
            return Err(AuthError::MissingField("password"));
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Registration form.
#[derive(Clone, Serialize, PartialEq)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl Registration {
    /// Create a customer registration.
    pub fn new(name: impl Into<String>, email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: name.into().trim().to_string(),
            email: email.into().trim().to_string(),
            password: password.into(),
            role: Role::Customer,
        }
    }

    /// Register as a different role.
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Check the form before a request is made.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.name.is_empty() {
            return Err(AuthError::MissingField("name"));
        }
        if self.email.is_empty() {
            return Err(AuthError::MissingField("email"));
        }
        validate_email(&self.email)?;
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword(format!(
                "must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("role", &self.role)
            .finish()
    }
}

fn validate_email(email: &str) -> Result<(), AuthError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(AuthError::InvalidEmail(email.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!("Seller".parse::<Role>().unwrap(), Role::Seller);
        assert_eq!("user".parse::<Role>().unwrap(), Role::Customer);
        assert!("owner".parse::<Role>().is_err());
        assert!(Role::Admin.can_manage_store());
        assert!(!Role::Customer.can_manage_store());
    }

    #[test]
    fn test_user_from_api_json() {
        let user: User = serde_json::from_value(serde_json::json!({
            "_id": "64f1c2",
            "email": "ani@example.com",
            "name": "",
            "role": "seller"
        }))
        .unwrap();
        assert_eq!(user.id.as_str(), "64f1c2");
        assert_eq!(user.display_name(), "ani@example.com");
        assert!(user.can_manage_store());
    }

    #[test]
    fn test_credentials_validation() {
        assert!(Credentials::new(" ani@example.com ", "secret").validate().is_ok());
        assert_eq!(
            Credentials::new("", "secret").validate(),
            Err(AuthError::MissingField("email"))
        );
        assert_eq!(
            Credentials::new("ani@example.com", "").validate(),
            Err(AuthError::MissingField("password"))
        );
    }

    #[test]
    fn test_password_not_in_debug() {
        let creds = Credentials::new("ani@example.com", "hunter2hunter2");
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("hunter2"));

        let reg = Registration::new("Ani", "ani@example.com", "hunter2hunter2");
        assert!(!format!("{:?}", reg).contains("hunter2"));
    }

    #[test]
    fn test_registration_validation() {
        assert!(Registration::new("Ani", "ani@example.com", "longenough").validate().is_ok());
        assert!(matches!(
            Registration::new("Ani", "ani@example.com", "short").validate(),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(matches!(
            Registration::new("Ani", "ani.example.com", "longenough").validate(),
            Err(AuthError::InvalidEmail(_))
        ));
        assert!(matches!(
            Registration::new("Ani", "ani@", "longenough").validate(),
            Err(AuthError::InvalidEmail(_))
        ));
        assert_eq!(
            Registration::new(" ", "ani@example.com", "longenough").validate(),
            Err(AuthError::MissingField("name"))
        );
    }
}
