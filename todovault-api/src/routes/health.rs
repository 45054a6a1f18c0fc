/// Health check endpoint
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
///
/// # Response
///
/// ```json
/// {
///   "status": "ok",
///   "version": "0.1.0",
///   "database_up": true
/// }
/// ```

use crate::app::AppState;
use axum::{extract::State, Json};
use serde::Serialize;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "ok" when every check passes, "degraded" otherwise
    pub status: &'static str,

    /// Application version
    pub version: &'static str,

    /// Whether the database answered a trivial query
    pub database_up: bool,
}

/// Reports service liveness and database reachability
///
/// Always answers 200; a failing database check is reported in the body so
/// monitors can distinguish "down" from "degraded".
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database_up = sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&state.db)
        .await
        .is_ok();

    Json(HealthResponse {
        status: if database_up { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        database_up,
    })
}
