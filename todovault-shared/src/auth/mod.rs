/// Authentication utilities
///
/// This module provides the authentication primitives for TodoVault:
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: Signed, time-bound access tokens
///
/// Tokens are stateless: there is no server-side session table, and logout
/// is client-side discard of the token. Revocation happens implicitly when
/// the embedded user no longer exists (the validator re-resolves the user
/// on every request).
///
/// # Example
///
/// ```no_run
/// use todovault_shared::auth::password::{hash_password, verify_password};
/// use todovault_shared::auth::jwt::{create_token, Claims};
/// use chrono::Duration;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let claims = Claims::new(1, "admin".to_string(), Duration::hours(24));
/// let token = create_token(&claims, "secret-key-at-least-32-bytes-long")?;
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod password;
