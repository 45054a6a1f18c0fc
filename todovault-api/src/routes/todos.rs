/// Todo endpoints
///
/// # Endpoints
///
/// - `GET    /todo` - List with filtering, sorting, pagination
/// - `GET    /todo/stats/overview` - Aggregate counts for the caller
/// - `POST   /todo` - Create (multipart, optional file attachment)
/// - `GET    /todo/:id` - Fetch one
/// - `PATCH  /todo/:id` - Partial update
/// - `DELETE /todo/:id/soft` - Deactivate without deleting
/// - `DELETE /todo/:id` - Delete record and attachment
///
/// Every route is owner-scoped: the owner id comes from the authenticated
/// identity, never from the request. Reaching into another user's record
/// yields 403; a missing record yields 404.

use crate::{
    app::{AppState, CurrentUser},
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use todovault_shared::models::todo::{
    CreateTodo, ListQuery, Todo, TodoPage, TodoStats, UpdateTodo,
};
use tracing::{error, info, warn};

/// Lists the caller's todos
///
/// # Endpoint
///
/// ```text
/// GET /todo?page=1&limit=10&isActive=true&search=report&sortBy=deadline&sortOrder=asc
/// Authorization: Bearer <token>
/// ```
///
/// Unknown `sortBy` / `sortOrder` values are rejected during query
/// deserialization, so the sort column is always drawn from the allow-list.
pub async fn list_todos(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<TodoPage>> {
    let page = Todo::list(&state.db, current.id, &query).await?;
    Ok(Json(page))
}

/// Aggregate counts for the caller's todos
///
/// # Endpoint
///
/// ```text
/// GET /todo/stats/overview
/// Authorization: Bearer <token>
/// ```
pub async fn todo_stats(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Json<TodoStats>> {
    let stats = Todo::statistics(&state.db, Some(current.id)).await?;
    Ok(Json(stats))
}

/// Fetches one todo by id
pub async fn get_todo(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Todo>> {
    let todo = Todo::get_owned(&state.db, id, current.id).await?;
    Ok(Json(todo))
}

/// Parsed multipart form for todo creation
struct CreateForm {
    title: Option<String>,
    description: Option<String>,
    deadline: Option<DateTime<Utc>>,
    is_active: Option<bool>,
    file: Option<(Vec<u8>, String)>,
}

impl CreateForm {
    async fn from_multipart(mut multipart: Multipart) -> ApiResult<Self> {
        let mut form = Self {
            title: None,
            description: None,
            deadline: None,
            is_active: None,
            file: None,
        };

        while let Some(field) = multipart.next_field().await.map_err(|e| {
            ApiError::ValidationError(vec![ValidationErrorDetail {
                field: "body".to_string(),
                message: format!("Malformed multipart body: {}", e),
            }])
        })? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "title" => form.title = Some(Self::text(field, "title").await?),
                "description" => form.description = Some(Self::text(field, "description").await?),
                "deadline" => {
                    let raw = Self::text(field, "deadline").await?;
                    let parsed = raw.parse::<DateTime<Utc>>().map_err(|_| {
                        ApiError::ValidationError(vec![ValidationErrorDetail {
                            field: "deadline".to_string(),
                            message: "deadline must be an RFC 3339 timestamp".to_string(),
                        }])
                    })?;
                    form.deadline = Some(parsed);
                }
                "isActive" => {
                    let raw = Self::text(field, "isActive").await?;
                    let parsed = raw.parse::<bool>().map_err(|_| {
                        ApiError::ValidationError(vec![ValidationErrorDetail {
                            field: "isActive".to_string(),
                            message: "isActive must be true or false".to_string(),
                        }])
                    })?;
                    form.is_active = Some(parsed);
                }
                "file" => {
                    let original_name = field.file_name().unwrap_or("upload").to_string();
                    let content = field.bytes().await.map_err(|e| {
                        ApiError::ValidationError(vec![ValidationErrorDetail {
                            field: "file".to_string(),
                            message: format!("Failed to read file: {}", e),
                        }])
                    })?;
                    form.file = Some((content.to_vec(), original_name));
                }
                // Unknown fields are ignored
                _ => {}
            }
        }

        Ok(form)
    }

    async fn text(field: axum::extract::multipart::Field<'_>, name: &str) -> ApiResult<String> {
        field.text().await.map_err(|e| {
            ApiError::ValidationError(vec![ValidationErrorDetail {
                field: name.to_string(),
                message: format!("Failed to read field: {}", e),
            }])
        })
    }
}

/// Creates a todo, optionally with an attached file
///
/// # Endpoint
///
/// ```text
/// POST /todo
/// Authorization: Bearer <token>
/// Content-Type: multipart/form-data
///
/// title=Write report
/// deadline=2026-09-01T12:00:00Z
/// description=quarterly numbers   (optional)
/// isActive=true                   (optional, defaults true)
/// file=<binary>                   (optional, max 5 MB)
/// ```
///
/// The attachment is written before the record. If record persistence then
/// fails, the newly written attachment is deleted again so no orphaned
/// content accumulates.
pub async fn create_todo(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Todo>)> {
    let form = CreateForm::from_multipart(multipart).await?;

    let (title, deadline) = match (form.title.clone(), form.deadline) {
        (Some(title), Some(deadline)) => (title, deadline),
        (title, deadline) => {
            let mut missing = Vec::new();
            if title.is_none() {
                missing.push(ValidationErrorDetail {
                    field: "title".to_string(),
                    message: "title is required".to_string(),
                });
            }
            if deadline.is_none() {
                missing.push(ValidationErrorDetail {
                    field: "deadline".to_string(),
                    message: "deadline is required".to_string(),
                });
            }
            return Err(ApiError::ValidationError(missing));
        }
    };

    if let Some((ref content, _)) = form.file {
        if content.len() > state.config.storage.max_upload_bytes {
            return Err(ApiError::ValidationError(vec![ValidationErrorDetail {
                field: "file".to_string(),
                message: format!(
                    "file exceeds the {} byte limit",
                    state.config.storage.max_upload_bytes
                ),
            }]));
        }
    }

    // Attachment first, so a reference exists before the record does
    let attachment_ref = match form.file {
        Some((content, original_name)) => {
            Some(state.attachments.write(&content, &original_name).await?)
        }
        None => None,
    };

    let result = Todo::create(
        &state.db,
        current.id,
        CreateTodo {
            title,
            description: form.description,
            deadline,
            is_active: form.is_active,
            attachment_ref: attachment_ref.clone(),
        },
    )
    .await;

    let todo = match result {
        Ok(todo) => todo,
        Err(e) => {
            // Compensating action: the record never existed, so the
            // attachment must not either
            if let Some(ref reference) = attachment_ref {
                if let Err(cleanup_err) = state.attachments.delete(reference).await {
                    error!(
                        reference = %reference,
                        error = %cleanup_err,
                        "Failed to remove attachment after create failure"
                    );
                }
            }
            return Err(e.into());
        }
    };

    info!(todo_id = todo.id, owner_id = current.id, "Created todo");
    Ok((StatusCode::CREATED, Json(todo)))
}

/// Partially updates a todo
///
/// # Endpoint
///
/// ```text
/// PATCH /todo/:id
/// Authorization: Bearer <token>
/// Content-Type: application/json
///
/// { "title": "Renamed", "isActive": false }
/// ```
///
/// Only supplied fields change. Setting `isActive` here is the only path
/// that reactivates a record; the sweeper and soft delete only ever clear it.
pub async fn update_todo(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateTodoRequest>,
) -> ApiResult<Json<Todo>> {
    let todo = Todo::update(
        &state.db,
        id,
        current.id,
        UpdateTodo {
            title: body.title,
            description: body.description,
            deadline: body.deadline,
            is_active: body.is_active,
        },
    )
    .await?;

    Ok(Json(todo))
}

/// Update request body (camelCase on the wire)
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodoRequest {
    /// New title (3-255 characters)
    pub title: Option<String>,

    /// New description (max 1000 characters)
    pub description: Option<String>,

    /// New deadline
    pub deadline: Option<DateTime<Utc>>,

    /// New active flag
    pub is_active: Option<bool>,
}

/// Deactivates a todo without deleting it
///
/// Idempotent: deactivating an already-inactive record succeeds and leaves
/// it inactive.
pub async fn soft_delete_todo(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Todo>> {
    let todo = Todo::soft_deactivate(&state.db, id, current.id).await?;
    Ok(Json(todo))
}

/// Deletes a todo and its attachment
///
/// The record removal is what callers observe; attachment cleanup is
/// best-effort and a cleanup failure is logged, never surfaced.
pub async fn delete_todo(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let attachment_ref = Todo::delete(&state.db, id, current.id).await?;

    if let Some(reference) = attachment_ref {
        match state.attachments.delete(&reference).await {
            Ok(true) => {}
            Ok(false) => {
                warn!(reference = %reference, "Attachment already missing during delete")
            }
            Err(e) => {
                error!(reference = %reference, error = %e, "Failed to delete attachment")
            }
        }
    }

    info!(todo_id = id, owner_id = current.id, "Deleted todo");
    Ok(StatusCode::NO_CONTENT)
}
