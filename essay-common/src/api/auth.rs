//! Bearer token issuance and validation
//!
//! Tokens are JWTs signed with a shared secret (HMAC family). The subject
//! claim carries the caller identity; `exp` carries the expiry as Unix
//! seconds.
//!
//! # Pure Functions
//!
//! This module has no HTTP framework dependencies. The grader wraps these
//! functions in an axum extractor.

use crate::config::AuthSettings;
use crate::{Error, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

// ========================================
// Error Types
// ========================================

/// Authentication error types
///
/// Every variant maps to 401 at the HTTP boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No Authorization header
    #[error("Missing bearer token")]
    MissingToken,

    /// Authorization header present but not `Bearer <token>`
    #[error("Malformed authorization header")]
    MalformedHeader,

    /// Token signature valid but `exp` has passed
    #[error("Token expired")]
    Expired,

    /// Signature, encoding or claim validation failed
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Token carries no subject claim
    #[error("Token has no subject")]
    MissingSubject,

    /// Login rejected
    #[error("Incorrect username or password")]
    BadCredentials,
}

// ========================================
// Claims
// ========================================

/// JWT payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Caller identity
    #[serde(default)]
    pub sub: String,
    /// Expiry (Unix seconds)
    pub exp: i64,
}

// ========================================
// Token Service
// ========================================

/// Issues and validates access tokens
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
    expires_in: Duration,
    users: Arc<BTreeMap<String, String>>,
}

impl TokenService {
    /// Create a token service with no credential table (any username accepted)
    pub fn new(secret: &str, algorithm: Algorithm, expires_in: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            algorithm,
            expires_in,
            users: Arc::new(BTreeMap::new()),
        }
    }

    /// Build from resolved configuration
    pub fn from_settings(settings: &AuthSettings) -> Result<Self> {
        let algorithm = Algorithm::from_str(&settings.algorithm)
            .map_err(|e| Error::Config(format!("Invalid token algorithm: {}", e)))?;

        let expires_in = Duration::try_minutes(settings.token_expire_minutes).ok_or_else(|| {
            Error::Config(format!(
                "Token lifetime out of range: {} minutes",
                settings.token_expire_minutes
            ))
        })?;

        Ok(Self::new(&settings.secret_key, algorithm, expires_in).with_users(settings.users.clone()))
    }

    /// Restrict logins to the given username -> SHA-256 hex password table
    pub fn with_users(mut self, users: BTreeMap<String, String>) -> Self {
        self.users = Arc::new(users);
        self
    }

    /// Whether logins are checked against a credential table
    pub fn has_credential_table(&self) -> bool {
        !self.users.is_empty()
    }

    /// Default lifetime of issued tokens
    pub fn expires_in(&self) -> Duration {
        self.expires_in
    }

    /// Issue a token for `subject` with the configured lifetime
    pub fn create_access_token(&self, subject: &str) -> Result<String> {
        self.create_access_token_with_expiry(subject, self.expires_in)
    }

    /// Issue a token for `subject` expiring `expires_in` from now
    pub fn create_access_token_with_expiry(&self, subject: &str, expires_in: Duration) -> Result<String> {
        let expire = Utc::now().checked_add_signed(expires_in).ok_or_else(|| {
            Error::Config(format!("Token expiry overflows: {}", expires_in))
        })?;
        tracing::debug!(subject = %subject, "Creating access token");

        let claims = Claims {
            sub: subject.to_string(),
            exp: expire.timestamp(),
        };
        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding)?;

        tracing::info!(subject = %subject, expires_at = %expire, "Access token created");
        Ok(token)
    }

    /// Validate a token and return its subject
    pub fn validate_token(&self, token: &str) -> std::result::Result<String, AuthError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })?;

        if data.claims.sub.trim().is_empty() {
            return Err(AuthError::MissingSubject);
        }

        Ok(data.claims.sub)
    }

    /// Check login credentials
    ///
    /// Without a credential table every non-empty username is accepted.
    pub fn verify_credentials(&self, username: &str, password: &str) -> std::result::Result<(), AuthError> {
        if username.trim().is_empty() {
            return Err(AuthError::BadCredentials);
        }

        if self.users.is_empty() {
            return Ok(());
        }

        match self.users.get(username) {
            Some(stored) if stored.trim().eq_ignore_ascii_case(&hash_password(password)) => Ok(()),
            _ => Err(AuthError::BadCredentials),
        }
    }
}

/// SHA-256 of the password as 64 lowercase hex characters
///
/// # Examples
///
/// ```
/// use essay_common::api::auth::hash_password;
///
/// let hash = hash_password("secret");
/// assert_eq!(hash.len(), 64);
/// ```
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Extract the token from an `Authorization: Bearer <token>` header value
///
/// # Examples
///
/// ```
/// use essay_common::api::auth::extract_bearer;
///
/// assert_eq!(extract_bearer(Some("Bearer abc.def")).unwrap(), "abc.def");
/// assert!(extract_bearer(None).is_err());
/// ```
pub fn extract_bearer(header_value: Option<&str>) -> std::result::Result<&str, AuthError> {
    let value = header_value.ok_or(AuthError::MissingToken)?;
    let (scheme, token) = value
        .trim()
        .split_once(' ')
        .ok_or(AuthError::MalformedHeader)?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::MalformedHeader);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}

// ========================================
// Tests
// ========================================

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("test-secret", Algorithm::HS256, Duration::minutes(30))
    }

    #[test]
    fn test_issued_token_validates_to_subject() {
        let svc = service();
        let token = svc.create_access_token("maria").unwrap();
        assert_eq!(svc.validate_token(&token).unwrap(), "maria");
    }

    #[test]
    fn test_expired_token_rejected() {
        let svc = service();
        let token = svc
            .create_access_token_with_expiry("maria", Duration::minutes(-5))
            .unwrap();
        assert_eq!(svc.validate_token(&token), Err(AuthError::Expired));
    }

    #[test]
    fn test_token_signed_with_other_secret_rejected() {
        let other = TokenService::new("other-secret", Algorithm::HS256, Duration::minutes(30));
        let token = other.create_access_token("maria").unwrap();
        assert!(matches!(
            service().validate_token(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_unrepresentable_expiry_is_error() {
        let err = service()
            .create_access_token_with_expiry("maria", Duration::weeks(52_000_000))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_from_settings_rejects_out_of_range_lifetime() {
        let settings = AuthSettings {
            secret_key: "test-secret".to_string(),
            algorithm: "HS256".to_string(),
            token_expire_minutes: i64::MAX,
            users: BTreeMap::new(),
        };
        assert!(matches!(
            TokenService::from_settings(&settings),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(matches!(
            service().validate_token("not-a-jwt"),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_token_without_subject_rejected() {
        let svc = service();
        let claims = serde_json::json!({ "exp": (Utc::now() + Duration::minutes(5)).timestamp() });
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert_eq!(svc.validate_token(&token), Err(AuthError::MissingSubject));
    }

    #[test]
    fn test_extract_bearer_variants() {
        assert_eq!(extract_bearer(Some("Bearer tok")).unwrap(), "tok");
        assert_eq!(extract_bearer(Some("bearer tok")).unwrap(), "tok");
        assert_eq!(extract_bearer(None), Err(AuthError::MissingToken));
        assert_eq!(extract_bearer(Some("Basic abc")), Err(AuthError::MalformedHeader));
        assert_eq!(extract_bearer(Some("Bearer")), Err(AuthError::MalformedHeader));
        assert_eq!(extract_bearer(Some("Bearer   ")), Err(AuthError::MalformedHeader));
    }

    #[test]
    fn test_open_login_accepts_any_username() {
        let svc = service();
        assert!(svc.verify_credentials("anyone", "anything").is_ok());
        assert_eq!(
            svc.verify_credentials("  ", "anything"),
            Err(AuthError::BadCredentials)
        );
    }

    #[test]
    fn test_credential_table_checks_password_hash() {
        let mut users = BTreeMap::new();
        users.insert("prof".to_string(), hash_password("correct horse"));
        let svc = service().with_users(users);

        assert!(svc.has_credential_table());
        assert!(svc.verify_credentials("prof", "correct horse").is_ok());
        assert_eq!(
            svc.verify_credentials("prof", "wrong"),
            Err(AuthError::BadCredentials)
        );
        assert_eq!(
            svc.verify_credentials("stranger", "correct horse"),
            Err(AuthError::BadCredentials)
        );
    }

    #[test]
    fn test_hash_password_is_stable_hex() {
        let hash = hash_password("abc");
        assert_eq!(
            hash,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
