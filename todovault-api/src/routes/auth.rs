/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /auth/register` - Register a new account
/// - `POST /auth/login` - Exchange credentials for an access token
///
/// Login failures never reveal whether the username exists: an unknown
/// username and a wrong password both produce the same 401 response.

use crate::{
    app::AppState,
    error::{validation_details, ApiError, ApiResult},
};
use axum::{extract::State, Json};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use todovault_shared::{
    auth::{jwt, password},
    models::user::{CreateUser, User},
};
use tracing::info;
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Username
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,

    /// Password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

impl RegisterRequest {
    /// Normalizes the request ahead of validation
    ///
    /// The username length rule applies to the trimmed value, so surrounding
    /// whitespace cannot carry an under-length username past the validator.
    fn normalized(self) -> Self {
        Self {
            username: self.username.trim().to_string(),
            password: self.password,
        }
    }
}

/// Register response
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    /// User id
    pub user_id: i64,

    /// Username
    pub username: String,

    /// Access token
    pub access_token: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    /// Password
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// User id
    pub user_id: i64,

    /// Username
    pub username: String,

    /// Access token
    pub access_token: String,
}

/// Register a new account
///
/// # Endpoint
///
/// ```text
/// POST /auth/register
/// Content-Type: application/json
///
/// {
///   "username": "alice",
///   "password": "SecureP@ss123"
/// }
/// ```
///
/// # Errors
///
/// - `409 Conflict`: Username already exists
/// - `422 Unprocessable Entity`: Validation failed
/// - `500 Internal Server Error`: Server error
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<RegisterResponse>> {
    let req = req.normalized();
    req.validate().map_err(validation_details)?;

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            username: req.username.clone(),
            password_hash,
        },
    )
    .await?;

    info!(user_id = user.id, username = %user.username, "Registered new account");

    let claims = jwt::Claims::new(
        user.id,
        user.username.clone(),
        Duration::hours(state.config.jwt.token_ttl_hours),
    );
    let access_token = jwt::create_token(&claims, state.jwt_secret())?;

    Ok(Json(RegisterResponse {
        user_id: user.id,
        username: user.username,
        access_token,
    }))
}

/// Exchange credentials for an access token
///
/// # Endpoint
///
/// ```text
/// POST /auth/login
/// Content-Type: application/json
///
/// {
///   "username": "alice",
///   "password": "SecureP@ss123"
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid credentials (unknown username and wrong
///   password are indistinguishable)
/// - `422 Unprocessable Entity`: Validation failed
/// - `500 Internal Server Error`: Server error
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    req.validate().map_err(validation_details)?;

    let user = User::find_by_username(&state.db, req.username.trim())
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::InvalidCredentials);
    }

    info!(user_id = user.id, username = %user.username, "Login succeeded");

    let claims = jwt::Claims::new(
        user.id,
        user.username.clone(),
        Duration::hours(state.config.jwt.token_ttl_hours),
    );
    let access_token = jwt::create_token(&claims, state.jwt_secret())?;

    Ok(Json(LoginResponse {
        user_id: user.id,
        username: user.username,
        access_token,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_request(username: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            password: "password123".to_string(),
        }
    }

    #[test]
    fn test_register_length_checks_trimmed_username() {
        // Whitespace padding must not carry a short username past the rule
        let req = register_request("  a  ").normalized();
        assert!(req.validate().is_err());

        let req = register_request("ab").normalized();
        assert!(req.validate().is_err());

        let req = register_request("abc").normalized();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_register_normalization_trims_username() {
        let req = register_request("  alice  ").normalized();
        assert_eq!(req.username, "alice");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_register_rejects_overlong_username() {
        let req = register_request(&"x".repeat(51)).normalized();
        assert!(req.validate().is_err());

        let req = register_request(&"x".repeat(50)).normalized();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_register_rejects_short_password() {
        let req = RegisterRequest {
            username: "alice".to_string(),
            password: "short".to_string(),
        };
        assert!(req.normalized().validate().is_err());
    }
}
