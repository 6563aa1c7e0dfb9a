//! Bearer tokens and their claims.
//!
//! Tokens are JWTs in compact form. The signature is the server's concern;
//! the client only reads the payload to learn when the token expires.

use crate::AuthError;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A bearer credential issued by the API.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BearerToken(String);

impl BearerToken {
    /// Wrap a raw token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into().trim().to_string())
    }

    /// Get the token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for the `Authorization` header.
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.0)
    }

    /// Decode the payload claims.
    pub fn claims(&self) -> Result<TokenClaims, AuthError> {
        TokenClaims::decode(&self.0)
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken([REDACTED])")
    }
}

/// Claims read from a token payload.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenClaims {
    /// Expiry, seconds since the Unix epoch.
    pub expires_at: i64,
    /// Issue time, if present.
    pub issued_at: Option<i64>,
    /// Subject (user id), if present.
    pub subject: Option<String>,
    /// Role claim, if present.
    pub role: Option<String>,
}

impl TokenClaims {
    /// Decode the middle segment of a compact JWT.
    ///
    /// Wrong segment count, bad base64, bad JSON and a missing or
    /// non-numeric `exp` are all rejected.
    pub fn decode(token: &str) -> Result<Self, AuthError> {
        let segments: Vec<&str> = token.split('.').collect();
        if segments.len() != 3 {
            return Err(AuthError::MalformedToken(format!(
                "expected 3 segments, found {}",
                segments.len()
            )));
        }

        let payload = segments[1].trim_end_matches('=');
        if payload.is_empty() {
            return Err(AuthError::MalformedToken("empty payload".into()));
        }
        let bytes = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|e| AuthError::MalformedToken(format!("payload is not base64url: {}", e)))?;
        let json: serde_json::Value = serde_json::from_slice(&bytes)
            .map_err(|e| AuthError::MalformedToken(format!("payload is not JSON: {}", e)))?;

        let expires_at = json
            .get("exp")
            .ok_or_else(|| AuthError::MalformedToken("missing exp claim".into()))
            .and_then(|exp| {
                numeric_claim(exp)
                    .ok_or_else(|| AuthError::MalformedToken("exp claim is not a number".into()))
            })?;

        Ok(Self {
            expires_at,
            issued_at: json.get("iat").and_then(numeric_claim),
            subject: string_claim(&json, "sub").or_else(|| string_claim(&json, "id")),
            role: string_claim(&json, "role"),
        })
    }

    /// Check expiry. A token expiring this very second is already expired.
    pub fn is_expired_at(&self, now: i64, leeway_secs: i64) -> bool {
        now >= self.expires_at.saturating_add(leeway_secs)
    }
}

fn numeric_claim(value: &serde_json::Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f.floor() as i64))
}

fn string_claim(json: &serde_json::Value, key: &str) -> Option<String> {
    json.get(key).and_then(|v| v.as_str()).map(str::to_string)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build an unsigned token around a JSON payload.
    pub(crate) fn token_with(payload: serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.to_string());
        format!("{}.{}.signature", header, body)
    }

    #[test]
    fn test_decode_claims() {
        let token = token_with(serde_json::json!({
            "sub": "u1",
            "role": "seller",
            "iat": 1_700_000_000,
            "exp": 1_700_003_600
        }));
        let claims = TokenClaims::decode(&token).unwrap();
        assert_eq!(claims.expires_at, 1_700_003_600);
        assert_eq!(claims.issued_at, Some(1_700_000_000));
        assert_eq!(claims.subject.as_deref(), Some("u1"));
        assert_eq!(claims.role.as_deref(), Some("seller"));
    }

    #[test]
    fn test_padded_payload_accepted() {
        let header = URL_SAFE_NO_PAD.encode(b"{}");
        let body = base64::engine::general_purpose::URL_SAFE.encode(br#"{"exp":12}"#);
        assert!(body.ends_with('='));
        let claims = TokenClaims::decode(&format!("{}.{}.sig", header, body)).unwrap();
        assert_eq!(claims.expires_at, 12);
    }

    #[test]
    fn test_missing_or_bad_exp() {
        let missing = token_with(serde_json::json!({"sub": "u1"}));
        assert!(matches!(TokenClaims::decode(&missing), Err(AuthError::MalformedToken(_))));

        let text = token_with(serde_json::json!({"exp": "tomorrow"}));
        assert!(matches!(TokenClaims::decode(&text), Err(AuthError::MalformedToken(_))));

        let float = token_with(serde_json::json!({"exp": 99.7}));
        assert_eq!(TokenClaims::decode(&float).unwrap().expires_at, 99);
    }

    #[test]
    fn test_malformed_tokens() {
        for token in ["", "abc", "a.b", "a.b.c.d", "a.!!!.c", "a..c"] {
            assert!(
                matches!(TokenClaims::decode(token), Err(AuthError::MalformedToken(_))),
                "{:?} should be malformed",
                token
            );
        }
        let not_json = format!("h.{}.s", URL_SAFE_NO_PAD.encode(b"not json"));
        assert!(TokenClaims::decode(&not_json).is_err());
    }

    #[test]
    fn test_expiry_boundary() {
        let claims = TokenClaims {
            expires_at: 1_000,
            issued_at: None,
            subject: None,
            role: None,
        };
        assert!(!claims.is_expired_at(999, 0));
        assert!(claims.is_expired_at(1_000, 0));
        assert!(!claims.is_expired_at(1_000, 5));
        assert!(claims.is_expired_at(1_005, 5));
    }

    #[test]
    fn test_token_debug_is_redacted() {
        let token = BearerToken::new("very.secret.value");
        assert_eq!(format!("{:?}", token), "BearerToken([REDACTED])");
        assert_eq!(token.header_value(), "Bearer very.secret.value");
    }
}
