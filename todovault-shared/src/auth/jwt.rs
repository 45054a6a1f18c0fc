/// Access token generation and validation
///
/// Tokens are signed with HS256 (HMAC-SHA256) and carry the user's id and
/// username. They are stateless and time-bound: the only revocation
/// mechanism is deleting the user, which the API middleware detects by
/// re-resolving the `sub` claim on every request.
///
/// # Security
///
/// - **Algorithm**: HS256, signature and expiry always validated
/// - **Issuer**: fixed to `todovault`, checked on decode
/// - **Secret**: server-held, at least 32 bytes, from configuration
///
/// # Example
///
/// ```
/// use todovault_shared::auth::jwt::{create_token, validate_token, Claims};
/// use chrono::Duration;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "test-secret-key-at-least-32-bytes-long";
/// let claims = Claims::new(42, "alice".to_string(), Duration::hours(24));
///
/// let token = create_token(&claims, secret)?;
/// let validated = validate_token(&token, secret)?;
/// assert_eq!(validated.sub, 42);
/// assert_eq!(validated.username, "alice");
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Token issuer claim, checked on validation
const ISSUER: &str = "todovault";

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Signature, issuer, or format check failed
    #[error("Failed to validate token: {0}")]
    ValidationError(String),
}

/// Access token claims
///
/// # Claims
///
/// - `sub`: user id
/// - `username`: username at issuance time (display only; authorization
///   always uses `sub`)
/// - `iss`: always "todovault"
/// - `iat` / `exp`: issuance and expiry (Unix timestamps)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user id
    pub sub: i64,

    /// Username at issuance time
    pub username: String,

    /// Issuer
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Creates claims for a user with the given expiry horizon
    pub fn new(user_id: i64, username: String, expires_in: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id,
            username,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
        }
    }

    /// Checks if the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Creates a signed token from claims
///
/// # Errors
///
/// Returns `JwtError::CreateError` if encoding fails.
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a token and extracts its claims
///
/// Verifies the signature, the expiry, and the issuer. Any failure mode
/// (bad signature, malformed token, expired, wrong issuer) is an error;
/// callers map all of them to the same unauthenticated response.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_claims_creation() {
        let claims = Claims::new(7, "admin".to_string(), Duration::hours(24));

        assert_eq!(claims.sub, 7);
        assert_eq!(claims.username, "admin");
        assert_eq!(claims.iss, "todovault");
        assert!(!claims.is_expired());
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_create_and_validate_token() {
        let claims = Claims::new(42, "alice".to_string(), Duration::hours(1));
        let token = create_token(&claims, SECRET).expect("Should create token");

        let validated = validate_token(&token, SECRET).expect("Should validate token");
        assert_eq!(validated.sub, 42);
        assert_eq!(validated.username, "alice");
        assert_eq!(validated.iss, "todovault");
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let claims = Claims::new(1, "admin".to_string(), Duration::hours(1));
        let token = create_token(&claims, SECRET).expect("Should create token");

        let result = validate_token(&token, "a-completely-different-signing-secret");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_expired_token() {
        // Negative duration = already expired
        let claims = Claims::new(1, "admin".to_string(), Duration::seconds(-3600));
        assert!(claims.is_expired());

        let token = create_token(&claims, SECRET).expect("Should create token");
        let result = validate_token(&token, SECRET);

        assert!(matches!(result, Err(JwtError::Expired)));
    }

    #[test]
    fn test_validate_malformed_token() {
        let result = validate_token("not.a.token", SECRET);
        assert!(matches!(result, Err(JwtError::ValidationError(_))));

        let result = validate_token("", SECRET);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_wrong_issuer() {
        // Token signed with the right secret but a different issuer claim
        let mut claims = Claims::new(1, "admin".to_string(), Duration::hours(1));
        claims.iss = "someone-else".to_string();

        let token = create_token(&claims, SECRET).expect("Should create token");
        let result = validate_token(&token, SECRET);
        assert!(result.is_err());
    }
}
