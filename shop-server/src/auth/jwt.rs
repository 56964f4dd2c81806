//! Bearer token validation
//!
//! HS256 tokens. The caller identity is `sub`, falling back to `iss`.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role allowed to change order status
pub const STAFF_ROLE: &str = "staff";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub exp: i64,
    #[serde(default)]
    pub iat: i64,
}

impl Claims {
    /// Non-blank caller id
    pub fn user_id(&self) -> Option<&str> {
        self.sub
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| self.iss.as_deref().filter(|s| !s.trim().is_empty()))
    }
}

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token expired")]
    ExpiredToken,

    #[error("token generation failed: {0}")]
    GenerationFailed(String),
}

/// Authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub user_id: String,
    pub role: Option<String>,
}

impl CurrentUser {
    pub fn is_staff(&self) -> bool {
        self.role.as_deref() == Some(STAFF_ROLE)
    }
}

impl TryFrom<Claims> for CurrentUser {
    type Error = JwtError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let user_id = claims
            .user_id()
            .ok_or_else(|| JwtError::InvalidToken("token names no user".into()))?
            .to_string();
        Ok(Self {
            user_id,
            role: claims.role,
        })
    }
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService").finish_non_exhaustive()
    }
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Issue a token for `user_id`, valid for `ttl`
    pub fn generate_token(
        &self,
        user_id: &str,
        role: Option<&str>,
        ttl: Duration,
    ) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            sub: Some(user_id.to_string()),
            iss: None,
            role: role.map(str::to_string),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                _ => JwtError::InvalidToken(e.to_string()),
            })
    }

    /// Strip the `Bearer ` prefix from an Authorization header value
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-at-least-32-bytes-long!!";

    #[test]
    fn test_round_trip() {
        let jwt = JwtService::new(SECRET);
        let token = jwt
            .generate_token("u1", Some(STAFF_ROLE), Duration::hours(1))
            .unwrap();
        let user = CurrentUser::try_from(jwt.validate_token(&token).unwrap()).unwrap();
        assert_eq!(user.user_id, "u1");
        assert!(user.is_staff());
    }

    #[test]
    fn test_expired_token() {
        let jwt = JwtService::new(SECRET);
        let token = jwt.generate_token("u1", None, Duration::hours(-1)).unwrap();
        assert!(matches!(
            jwt.validate_token(&token),
            Err(JwtError::ExpiredToken)
        ));
    }

    #[test]
    fn test_wrong_secret() {
        let token = JwtService::new(SECRET)
            .generate_token("u1", None, Duration::hours(1))
            .unwrap();
        let other = JwtService::new("another-secret-at-least-32-bytes!!");
        assert!(matches!(
            other.validate_token(&token),
            Err(JwtError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_issuer_fallback() {
        let claims = Claims {
            sub: Some("  ".into()),
            iss: Some("legacy-user".into()),
            role: None,
            exp: 0,
            iat: 0,
        };
        assert_eq!(claims.user_id(), Some("legacy-user"));

        let anonymous = Claims {
            sub: None,
            iss: None,
            ..claims
        };
        assert!(CurrentUser::try_from(anonymous).is_err());
    }

    #[test]
    fn test_extract_from_header() {
        assert_eq!(JwtService::extract_from_header("Bearer abc"), Some("abc"));
        assert_eq!(JwtService::extract_from_header("Bearer "), None);
        assert_eq!(JwtService::extract_from_header("Basic abc"), None);
    }
}
