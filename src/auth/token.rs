//! Bearer token issuance and verification.
//!
//! Stateless HS256 tokens carrying the non-secret account attributes. The
//! signing secret is process-wide and read-only after startup; expiry is the
//! only invalidation path besides the client clearing its cookie.

use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;

use crate::auth::account::{Account, AccountRole};
use crate::config::AuthConfig;
use crate::domain::AccountId;
use crate::errors::{MotorlotError, Result};

/// Claim set carried by an issued token. Never contains the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountClaims {
    /// Subject: the account id
    pub sub: AccountId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: AccountRole,
    /// Issued at (seconds since epoch)
    pub iat: u64,
    /// Expiration (seconds since epoch)
    pub exp: u64,
}

/// Verification failures. Callers treat all three as "not authenticated";
/// the split exists for diagnostics and metrics labels.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("token malformed")]
    Malformed,
    #[error("token rejected")]
    Unknown,
}

impl TokenError {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenError::Expired => "expired",
            TokenError::Malformed => "malformed",
            TokenError::Unknown => "unknown",
        }
    }
}

/// Token service holding the signing material for the process lifetime.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    /// Create a new token service with the given secret and lifetime.
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::default();
        // Expiry is the sole invalidation mechanism; no leeway.
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.jwt_secret.as_bytes(), config.token_ttl())
    }

    /// Issue a token for the given account using the configured lifetime.
    pub fn issue(&self, account: &Account) -> Result<String> {
        self.issue_with_ttl(account, self.ttl)
    }

    /// Issue a token with an explicit lifetime.
    pub fn issue_with_ttl(&self, account: &Account, ttl: Duration) -> Result<String> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| MotorlotError::internal(format!("System clock error: {}", e)))?
            .as_secs();

        let claims = AccountClaims {
            sub: account.id.clone(),
            first_name: account.first_name.clone(),
            last_name: account.last_name.clone(),
            email: account.email.clone(),
            role: account.role,
            iat: now,
            exp: now + ttl.as_secs(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| MotorlotError::internal(format!("Token signing failed: {}", e)))
    }

    /// Verify a token and return its claims.
    pub fn verify(&self, token: &str) -> std::result::Result<AccountClaims, TokenError> {
        match decode::<AccountClaims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Ok(data.claims),
            Err(err) => Err(match err.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidToken
                | ErrorKind::InvalidSignature
                | ErrorKind::Base64(_)
                | ErrorKind::Json(_)
                | ErrorKind::Utf8(_) => TokenError::Malformed,
                _ => TokenError::Unknown,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_account(role: AccountRole) -> Account {
        Account {
            id: AccountId::new(),
            first_name: "Jo".into(),
            last_name: "Doe".into(),
            email: "jo@example.com".into(),
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn service() -> TokenService {
        TokenService::new(b"unit-test-secret-at-least-32-bytes!!", Duration::from_secs(3600))
    }

    #[test]
    fn issue_then_verify_round_trips_claims() {
        let service = service();
        let account = test_account(AccountRole::Employee);

        let token = service.issue(&account).unwrap();
        let claims = service.verify(&token).unwrap();

        assert_eq!(claims.sub, account.id);
        assert_eq!(claims.email, account.email);
        assert_eq!(claims.role, AccountRole::Employee);
        assert_eq!(claims.first_name, "Jo");
        assert_eq!(claims.exp, claims.iat + 3600);
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let service = service();
        let account = test_account(AccountRole::Client);

        let token = service.issue_with_ttl(&account, Duration::from_secs(0)).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(1100));
        assert_eq!(service.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn garbage_token_is_malformed() {
        let service = service();
        assert_eq!(service.verify("not-a-jwt"), Err(TokenError::Malformed));
        assert_eq!(service.verify(""), Err(TokenError::Malformed));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let issuer =
            TokenService::new(b"another-secret-also-32-bytes-long!!!", Duration::from_secs(3600));
        let account = test_account(AccountRole::Client);
        let token = issuer.issue(&account).unwrap();

        assert_eq!(service().verify(&token), Err(TokenError::Malformed));
    }

    #[test]
    fn claims_never_contain_password_material() {
        let service = service();
        let account = test_account(AccountRole::Client);
        let token = service.issue(&account).unwrap();
        let claims = service.verify(&token).unwrap();

        let json = serde_json::to_value(&claims).unwrap();
        let object = json.as_object().unwrap();
        assert!(object.keys().all(|k| !k.to_lowercase().contains("password")));
    }
}
