/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use todovault_api::{app::AppState, config::Config};
/// use todovault_shared::storage::disk::DiskAttachmentStore;
/// use sqlx::PgPool;
/// use std::sync::Arc;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let store = DiskAttachmentStore::new(&config.storage.upload_dir).await?;
/// let state = AppState::new(pool, config, Arc::new(store));
/// let app = todovault_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    extract::{DefaultBodyLimit, Request},
    middleware::Next,
    response::Response,
    routing::{delete, get, patch, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use todovault_shared::{auth::jwt, models::user::User, storage::AttachmentStore};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Attachment content store
    pub attachments: Arc<dyn AttachmentStore>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config, attachments: Arc<dyn AttachmentStore>) -> Self {
        Self {
            db,
            config: Arc::new(config),
            attachments,
        }
    }

    /// Gets the token signing secret
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Authenticated caller, injected into request extensions by [`jwt_auth_layer`]
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// User id from the token's `sub` claim, re-verified against the database
    pub id: i64,

    /// Username at the time of the request
    pub username: String,
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                  # Health check (public)
/// ├── /auth/
/// │   ├── POST /register       # Create account (public)
/// │   └── POST /login          # Exchange credentials for a token (public)
/// ├── /users/
/// │   └── GET /profile         # Authenticated caller's account
/// └── /todo/
///     ├── GET    /                # List (filtered, paginated, sorted)
///     ├── GET    /stats/overview  # Aggregate counts
///     ├── POST   /                # Create (multipart, optional attachment)
///     ├── GET    /:id
///     ├── PATCH  /:id
///     ├── DELETE /:id/soft        # Deactivate without deleting
///     └── DELETE /:id
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Authentication (per-route basis)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes (public, no auth required)
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login));

    // User routes (require token authentication)
    let user_routes = Router::new()
        .route("/profile", get(routes::users::profile))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Todo routes (require token authentication)
    let todo_routes = Router::new()
        .route("/", get(routes::todos::list_todos))
        .route("/", post(routes::todos::create_todo))
        .route("/stats/overview", get(routes::todos::todo_stats))
        .route("/:id", get(routes::todos::get_todo))
        .route("/:id", patch(routes::todos::update_todo))
        .route("/:id/soft", delete(routes::todos::soft_delete_todo))
        .route("/:id", delete(routes::todos::delete_todo))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Multipart bodies carry the attachment plus form fields; allow a little
    // headroom over the attachment cap itself
    let body_limit = state.config.storage.max_upload_bytes + 64 * 1024;

    Router::new()
        .merge(health_routes)
        .nest("/auth", auth_routes)
        .nest("/users", user_routes)
        .nest("/todo", todo_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Token authentication middleware layer
///
/// Extracts and validates the bearer token from the Authorization header,
/// re-resolves the user from the database, then injects [`CurrentUser`]
/// into request extensions. A token whose subject no longer exists is
/// rejected, which makes account deletion an effective revocation.
pub async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    // Extract Authorization header
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            crate::error::ApiError::Unauthenticated("Missing authorization header".to_string())
        })?;

    // Parse Bearer token
    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        crate::error::ApiError::Unauthenticated("Expected Bearer token".to_string())
    })?;

    // Validate token
    let claims = jwt::validate_token(token, state.jwt_secret())?;

    // Re-resolve the user so stale tokens stop working once the account is gone
    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| {
            crate::error::ApiError::Unauthenticated(
                "User no longer exists or access revoked".to_string(),
            )
        })?;

    req.extensions_mut().insert(CurrentUser {
        id: user.id,
        username: user.username,
    });

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_user_is_cloneable() {
        let user = CurrentUser {
            id: 1,
            username: "admin".to_string(),
        };
        let copy = user.clone();
        assert_eq!(copy.id, 1);
        assert_eq!(copy.username, "admin");
    }
}
