//! Session Token Service
//!
//! Issues and validates the HS256 JWT pair: a short-lived access token and
//! a longer-lived refresh token, both carrying the user id in `sub`. The
//! refresh token's SHA-256 hash is persisted on the user document so a
//! session can be invalidated server-side (logout).

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::{HomesteadError, Result};

/// Which of the two session tokens a JWT claims to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    fn as_str(self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

/// JWT claims for both token kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user id).
    pub sub: String,
    /// Issuer.
    pub iss: String,
    /// Expiration (Unix timestamp).
    pub exp: i64,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// JWT ID.
    pub jti: String,
    /// Token kind: "access" or "refresh".
    pub kind: String,
}

/// Token service configuration.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// HMAC signing secret.
    pub secret: String,
    pub issuer: String,
    pub access_token_expiry_secs: i64,
    pub refresh_token_expiry_secs: i64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            issuer: "homestead".to_string(),
            access_token_expiry_secs: 3600,         // 1 hour
            refresh_token_expiry_secs: 86400 * 30,  // 30 days
        }
    }
}

pub struct TokenService {
    config: TokenConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenService {
    pub fn new(config: TokenConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    pub fn issue_access_token(&self, user_id: &str) -> Result<String> {
        self.issue(user_id, TokenKind::Access, self.config.access_token_expiry_secs)
    }

    pub fn issue_refresh_token(&self, user_id: &str) -> Result<String> {
        self.issue(user_id, TokenKind::Refresh, self.config.refresh_token_expiry_secs)
    }

    fn issue(&self, user_id: &str, kind: TokenKind, expiry_secs: i64) -> Result<String> {
        let now = Utc::now();
        let claims = TokenClaims {
            sub: user_id.to_string(),
            iss: self.config.issuer.clone(),
            exp: (now + Duration::seconds(expiry_secs)).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
            kind: kind.as_str().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| HomesteadError::internal(format!("Failed to encode JWT: {}", e)))
    }

    /// Validate signature, expiry, issuer, and token kind.
    pub fn validate(&self, token: &str, kind: TokenKind) -> Result<TokenClaims> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.config.issuer]);

        let claims = decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => HomesteadError::TokenExpired,
                _ => HomesteadError::InvalidToken {
                    message: e.to_string(),
                },
            })?;

        if claims.kind != kind.as_str() {
            return Err(HomesteadError::InvalidToken {
                message: format!("Expected {} token", kind.as_str()),
            });
        }

        Ok(claims)
    }
}

/// Hash a refresh token for server-side storage (SHA-256, base64url).
pub fn hash_refresh_token(raw_token: &str) -> String {
    use base64::Engine;
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    hasher.update(raw_token.as_bytes());
    let hash = hasher.finalize();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(hash)
}

/// Extract a bearer token from an `Authorization` header value.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> TokenService {
        TokenService::new(TokenConfig {
            secret: "test-secret".to_string(),
            ..TokenConfig::default()
        })
    }

    #[test]
    fn test_issue_and_validate_access_token() {
        let service = test_service();

        let token = service.issue_access_token("user-1").unwrap();
        let claims = service.validate(&token, TokenKind::Access).unwrap();

        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.kind, "access");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_refresh_token_rejected_as_access() {
        let service = test_service();

        let token = service.issue_refresh_token("user-1").unwrap();
        assert!(service.validate(&token, TokenKind::Refresh).is_ok());
        assert!(matches!(
            service.validate(&token, TokenKind::Access),
            Err(HomesteadError::InvalidToken { .. })
        ));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let service = test_service();

        let mut token = service.issue_access_token("user-1").unwrap();
        token.push('x');
        assert!(service.validate(&token, TokenKind::Access).is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let service = test_service();
        let other = TokenService::new(TokenConfig {
            secret: "another-secret".to_string(),
            ..TokenConfig::default()
        });

        let token = service.issue_access_token("user-1").unwrap();
        assert!(other.validate(&token, TokenKind::Access).is_err());
    }

    #[test]
    fn test_refresh_hash_is_deterministic() {
        let h1 = hash_refresh_token("some-token");
        let h2 = hash_refresh_token("some-token");
        let h3 = hash_refresh_token("other-token");

        assert_eq!(h1, h2);
        assert_ne!(h1, h3);
        assert_ne!(h1, "some-token");
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc123"), Some("abc123"));
        assert_eq!(extract_bearer_token("Basic abc123"), None);
        assert_eq!(extract_bearer_token("abc123"), None);
    }
}
