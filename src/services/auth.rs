//! Authentication: token issuance/verification, identity resolution and
//! password hashing
//!
//! Tokens are HS256 JWTs that bind nothing but the user id and an expiry
//! 30 days after issuance. There is no refresh or revocation.

use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};

/// Token validity window
pub const TOKEN_LIFETIME_DAYS: i64 = 30;

/// Shortest password accepted by [`PasswordHasher::hash`]
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// bcrypt cost used when the configuration does not override it
pub const DEFAULT_BCRYPT_COST: u32 = 10;

// ============================================================================
// Identity
// ============================================================================

/// The authenticated caller, valid for one request or subscription handshake
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
}

impl Identity {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

/// Claims carried by an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TokenClaims {
    #[serde(rename = "userId")]
    user_id: String,
    exp: i64,
}

// ============================================================================
// Configuration
// ============================================================================

/// Auth configuration, loaded once at startup
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// JWT signing secret
    pub jwt_secret: String,
    /// bcrypt cost factor
    pub bcrypt_cost: u32,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            bcrypt_cost: DEFAULT_BCRYPT_COST,
        }
    }
}

// ============================================================================
// Token codec
// ============================================================================

/// Signs and verifies access tokens with the process-wide secret
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(secret: &str) -> Self {
        // Trim any whitespace/newlines picked up from env files
        let secret = secret.trim();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Issue a token for `user_id` valid for [`TOKEN_LIFETIME_DAYS`]
    pub fn issue(&self, user_id: &str) -> ApiResult<String> {
        self.issue_with_expiry(user_id, Utc::now() + Duration::days(TOKEN_LIFETIME_DAYS))
    }

    fn issue_with_expiry(&self, user_id: &str, expires_at: chrono::DateTime<Utc>) -> ApiResult<String> {
        let claims = TokenClaims {
            user_id: user_id.to_string(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("Failed to create token: {}", e)))
    }

    /// Verify signature and expiry, returning the bound identity
    pub fn verify(&self, token: &str) -> ApiResult<Identity> {
        let data = decode::<TokenClaims>(token, &self.decoding, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "Token verification failed");
            ApiError::AuthenticationFailed(format!("Invalid token: {}", e))
        })?;

        Ok(Identity::new(data.claims.user_id))
    }
}

// ============================================================================
// Identity resolution
// ============================================================================

/// Resolves the caller's identity from an `authorization` credential
#[derive(Clone)]
pub struct IdentityResolver {
    codec: TokenCodec,
}

impl IdentityResolver {
    pub fn new(codec: TokenCodec) -> Self {
        Self { codec }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Resolve the caller.
    ///
    /// A missing credential yields `Ok(None)` unless `required`, in which case
    /// it is [`ApiError::AuthenticationRequired`]. A credential that fails
    /// verification is always [`ApiError::AuthenticationFailed`].
    pub fn resolve(&self, authorization: Option<&str>, required: bool) -> ApiResult<Option<Identity>> {
        match extract_bearer(authorization) {
            Some(token) => self.codec.verify(token).map(Some),
            None if required => Err(ApiError::AuthenticationRequired),
            None => Ok(None),
        }
    }

    /// Resolve a caller that must be authenticated
    pub fn require(&self, authorization: Option<&str>) -> ApiResult<Identity> {
        self.resolve(authorization, true)?
            .ok_or(ApiError::AuthenticationRequired)
    }
}

/// Extract the token from a `Bearer <token>` header value.
///
/// Blank values count as absent; a value without the scheme is taken as the
/// token itself and left for verification to reject.
pub fn extract_bearer(authorization: Option<&str>) -> Option<&str> {
    let value = authorization?.trim();
    if value.is_empty() {
        return None;
    }
    Some(value.strip_prefix("Bearer ").unwrap_or(value).trim())
}

// ============================================================================
// Passwords
// ============================================================================

/// Opaque hash/verify capability for user passwords
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hash a password, rejecting ones shorter than [`MIN_PASSWORD_LENGTH`]
    pub fn hash(&self, password: &str) -> ApiResult<String> {
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ApiError::validation(format!(
                "Password must be at least {} characters or longer.",
                MIN_PASSWORD_LENGTH
            )));
        }

        hash(password, self.cost)
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("Failed to hash password: {}", e)))
    }

    /// Check a password against a stored hash; malformed hashes never match
    pub fn verify(&self, password: &str, hashed: &str) -> bool {
        verify(password, hashed).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Stored password hash could not be verified");
            false
        })
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_BCRYPT_COST)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn resolver() -> IdentityResolver {
        IdentityResolver::new(TokenCodec::new("test-secret"))
    }

    #[test]
    fn valid_token_resolves_identity() {
        let resolver = resolver();
        let token = resolver.codec().issue("user-1").unwrap();
        let header = format!("Bearer {token}");

        let identity = resolver.resolve(Some(&header), false).unwrap();
        assert_eq!(identity, Some(Identity::new("user-1")));

        let identity = resolver.require(Some(&header)).unwrap();
        assert_eq!(identity.user_id, "user-1");
    }

    #[test]
    fn missing_header_depends_on_mode() {
        let resolver = resolver();

        assert_matches!(resolver.resolve(None, false), Ok(None));
        assert_matches!(resolver.resolve(Some("   "), false), Ok(None));
        assert_matches!(
            resolver.resolve(None, true),
            Err(ApiError::AuthenticationRequired)
        );
    }

    #[test]
    fn tampered_token_always_fails() {
        let resolver = resolver();
        let token = resolver.codec().issue("user-1").unwrap();
        let mut tampered = token.clone();
        tampered.push('x');
        let header = format!("Bearer {tampered}");

        for required in [false, true] {
            assert_matches!(
                resolver.resolve(Some(&header), required),
                Err(ApiError::AuthenticationFailed(_))
            );
        }
    }

    #[test]
    fn token_from_other_secret_fails() {
        let foreign = TokenCodec::new("another-secret").issue("user-1").unwrap();
        let header = format!("Bearer {foreign}");

        assert_matches!(
            resolver().resolve(Some(&header), false),
            Err(ApiError::AuthenticationFailed(_))
        );
    }

    #[test]
    fn expired_token_fails() {
        let resolver = resolver();
        let expired = resolver
            .codec()
            .issue_with_expiry("user-1", Utc::now() - Duration::hours(1))
            .unwrap();
        let header = format!("Bearer {expired}");

        assert_matches!(
            resolver.resolve(Some(&header), false),
            Err(ApiError::AuthenticationFailed(_))
        );
    }

    #[test]
    fn garbage_credential_fails() {
        assert_matches!(
            resolver().resolve(Some("Basic dXNlcjpwYXNz"), false),
            Err(ApiError::AuthenticationFailed(_))
        );
    }

    #[test]
    fn bearer_extraction() {
        assert_eq!(extract_bearer(Some("Bearer abc")), Some("abc"));
        assert_eq!(extract_bearer(Some("abc")), Some("abc"));
        assert_eq!(extract_bearer(Some("")), None);
        assert_eq!(extract_bearer(None), None);
    }

    #[test]
    fn password_rules() {
        let hasher = PasswordHasher::new(4);

        assert_matches!(hasher.hash("short"), Err(ApiError::ValidationFailed(_)));

        let hashed = hasher.hash("long enough").unwrap();
        assert!(hasher.verify("long enough", &hashed));
        assert!(!hasher.verify("wrong password", &hashed));
        assert!(!hasher.verify("long enough", "not-a-hash"));
    }
}
