/// Authenticated account endpoints
///
/// # Endpoints
///
/// - `GET /users/profile` - The calling user's account details

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use todovault_shared::models::user::User;

use crate::app::CurrentUser;
use crate::error::ApiError;

/// Profile response (never includes the password hash)
#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileResponse {
    /// User id
    pub id: i64,

    /// Username
    pub username: String,

    /// Account creation time
    pub created_at: DateTime<Utc>,
}

/// Returns the calling user's account
///
/// # Endpoint
///
/// ```text
/// GET /users/profile
/// Authorization: Bearer <token>
/// ```
pub async fn profile(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Json<ProfileResponse>> {
    let user = User::find_by_id(&state.db, current.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(ProfileResponse {
        id: user.id,
        username: user.username,
        created_at: user.created_at,
    }))
}
