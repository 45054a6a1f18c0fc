/// Todo model and database operations
///
/// Todos are the core entity of TodoVault: owner-scoped records with a
/// deadline, an active flag, and an optional attachment reference. All
/// mutating operations re-derive existence and ownership inside this module
/// before acting; callers never get to skip the check.
///
/// Concurrency: the expiration sweep and user-driven writes race only at the
/// storage layer. Every operation here is a single atomic SQL statement, so
/// no application-level lock is needed.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE todos (
///     id BIGSERIAL PRIMARY KEY,
///     title VARCHAR(255) NOT NULL,
///     description VARCHAR(1000),
///     is_active BOOLEAN NOT NULL DEFAULT TRUE,
///     deadline TIMESTAMPTZ NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     attachment_ref VARCHAR(512),
///     owner_id BIGINT REFERENCES users(id) ON DELETE SET NULL
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use todovault_shared::models::todo::{CreateTodo, ListQuery, Todo};
/// use chrono::{Duration, Utc};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let todo = Todo::create(&pool, 1, CreateTodo {
///     title: "Write report".to_string(),
///     description: None,
///     deadline: Utc::now() + Duration::days(1),
///     is_active: None,
///     attachment_ref: None,
/// }).await?;
/// assert!(todo.is_active);
///
/// let page = Todo::list(&pool, 1, &ListQuery::default()).await?;
/// assert_eq!(page.meta.page, 1);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Maximum title length (characters)
pub const TITLE_MAX_LEN: usize = 255;

/// Minimum title length on update (characters)
pub const TITLE_MIN_LEN: usize = 3;

/// Maximum description length (characters)
pub const DESCRIPTION_MAX_LEN: usize = 1000;

/// Largest accepted page size; larger requests are clamped, not rejected
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Error type for todo repository operations
#[derive(Debug, thiserror::Error)]
pub enum TodoError {
    /// No record with the requested id exists
    #[error("Todo not found")]
    NotFound,

    /// The record exists but belongs to another user
    #[error("Todo belongs to another user")]
    Forbidden,

    /// A field-level constraint was violated (first failing rule)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Underlying persistence error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Todo model representing an owner-scoped task record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Todo {
    /// Unique todo id, assigned at creation and immutable
    pub id: i64,

    /// Title (non-empty, at most 255 characters)
    pub title: String,

    /// Optional free-text description (at most 1000 characters)
    pub description: Option<String>,

    /// Active flag; flips to false automatically once the deadline passes
    pub is_active: bool,

    /// Scheduled deadline
    pub deadline: DateTime<Utc>,

    /// When the record was created (server-assigned, immutable)
    pub created_at: DateTime<Utc>,

    /// Opaque reference into the attachment store, if a file is attached
    pub attachment_ref: Option<String>,

    /// Owning user id; nullable only for legacy rows, never reassigned
    pub owner_id: Option<i64>,
}

/// Input for creating a new todo
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTodo {
    /// Title (required, trimmed, non-empty)
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Scheduled deadline
    pub deadline: DateTime<Utc>,

    /// Active flag; defaults to true when omitted
    pub is_active: Option<bool>,

    /// Attachment reference produced by the attachment store, if any
    pub attachment_ref: Option<String>,
}

/// Input for updating a todo; only supplied fields are applied
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTodo {
    /// New title (3-255 characters)
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New deadline
    pub deadline: Option<DateTime<Utc>>,

    /// New active flag (the only way a record can reactivate)
    pub is_active: Option<bool>,
}

/// Sort keys allowed for the list operation
///
/// Restricted to an allow-list so the sort column is never built from raw
/// caller input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    /// Sort by creation time (default)
    #[default]
    CreatedAt,

    /// Sort by scheduled deadline
    Deadline,

    /// Sort by title
    Title,
}

impl SortKey {
    /// Column name for ORDER BY
    pub fn column(&self) -> &'static str {
        match self {
            SortKey::CreatedAt => "created_at",
            SortKey::Deadline => "deadline",
            SortKey::Title => "title",
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending
    Asc,

    /// Descending (default)
    #[default]
    Desc,
}

impl SortOrder {
    /// SQL keyword for ORDER BY
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    10
}

/// Filter, sort, and pagination parameters for the list operation
///
/// Owner scoping is NOT part of this struct: the owner id is a separate,
/// mandatory argument to [`Todo::list`] so no filter input can bypass it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListQuery {
    /// 1-indexed page number
    pub page: i64,

    /// Page size
    pub limit: i64,

    /// Optional active-flag equality filter
    pub is_active: Option<bool>,

    /// Optional case-insensitive substring match over title or description
    pub search: Option<String>,

    /// Sort key
    pub sort_by: SortKey,

    /// Sort direction
    pub sort_order: SortOrder,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
            is_active: None,
            search: None,
            sort_by: SortKey::default(),
            sort_order: SortOrder::default(),
        }
    }
}

/// Pagination metadata for a list response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageMeta {
    /// Total matching records across all pages
    pub total: i64,

    /// 1-indexed page number
    pub page: i64,

    /// Page size
    pub limit: i64,

    /// Total page count
    pub total_pages: i64,

    /// Whether a later page exists
    pub has_next_page: bool,

    /// Whether an earlier page exists
    pub has_prev_page: bool,
}

impl PageMeta {
    /// Computes pagination metadata from a total count and page parameters
    pub fn new(total: i64, page: i64, limit: i64) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            (total + limit - 1) / limit
        };

        Self {
            total,
            page,
            limit,
            total_pages,
            has_next_page: page < total_pages,
            has_prev_page: page > 1 && total_pages > 0,
        }
    }
}

/// One page of todos plus pagination metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodoPage {
    /// Records on this page
    pub data: Vec<Todo>,

    /// Pagination metadata
    pub meta: PageMeta,
}

/// Per-owner (or global) record counts
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TodoStats {
    /// Total records
    pub total: i64,

    /// Records with is_active = true
    pub active: i64,

    /// Records with is_active = false
    pub inactive: i64,
}

/// Checks title bounds; `min_len` is 1 on create and 3 on update
fn validate_title(title: &str, min_len: usize) -> Result<(), TodoError> {
    let len = title.chars().count();
    if len < min_len {
        return Err(TodoError::Validation(format!(
            "title must be at least {} characters",
            min_len
        )));
    }
    if len > TITLE_MAX_LEN {
        return Err(TodoError::Validation(format!(
            "title must be at most {} characters",
            TITLE_MAX_LEN
        )));
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), TodoError> {
    if description.chars().count() > DESCRIPTION_MAX_LEN {
        return Err(TodoError::Validation(format!(
            "description must be at most {} characters",
            DESCRIPTION_MAX_LEN
        )));
    }
    Ok(())
}

const TODO_COLUMNS: &str =
    "id, title, description, is_active, deadline, created_at, attachment_ref, owner_id";

impl Todo {
    /// Creates a new todo owned by `owner_id`
    ///
    /// The active flag defaults to true when omitted. Title and description
    /// are trimmed and re-validated here even though the HTTP layer already
    /// validated them.
    ///
    /// # Errors
    ///
    /// Returns `TodoError::Validation` on constraint violations, or
    /// `TodoError::Database` if persistence fails.
    pub async fn create(pool: &PgPool, owner_id: i64, data: CreateTodo) -> Result<Self, TodoError> {
        let title = data.title.trim().to_string();
        validate_title(&title, 1)?;

        let description = data
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        if let Some(ref d) = description {
            validate_description(d)?;
        }

        let todo = sqlx::query_as::<_, Todo>(
            r#"
            INSERT INTO todos (title, description, is_active, deadline, attachment_ref, owner_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, title, description, is_active, deadline, created_at, attachment_ref, owner_id
            "#,
        )
        .bind(title)
        .bind(description)
        .bind(data.is_active.unwrap_or(true))
        .bind(data.deadline)
        .bind(data.attachment_ref)
        .bind(owner_id)
        .fetch_one(pool)
        .await?;

        Ok(todo)
    }

    /// Finds a todo by id with no ownership check
    ///
    /// Internal building block; API paths go through [`Todo::get_owned`].
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let todo = sqlx::query_as::<_, Todo>(&format!(
            "SELECT {} FROM todos WHERE id = $1",
            TODO_COLUMNS
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(todo)
    }

    /// Fetches a todo, enforcing existence and ownership
    ///
    /// `NotFound` when no such id exists; `Forbidden` when the record exists
    /// under another owner. The two cases are deliberately distinguishable,
    /// matching the established API contract.
    pub async fn get_owned(pool: &PgPool, id: i64, owner_id: i64) -> Result<Self, TodoError> {
        let todo = Self::find_by_id(pool, id).await?.ok_or(TodoError::NotFound)?;

        if todo.owner_id != Some(owner_id) {
            return Err(TodoError::Forbidden);
        }

        Ok(todo)
    }

    /// Lists todos for one owner with filtering, sorting, and pagination
    ///
    /// The query is scoped by `owner_id` unconditionally. Ties within the
    /// sort key break by id ascending, so page concatenation is
    /// deterministic: walking pages 1..=total_pages at a fixed filter/sort
    /// reproduces the full filtered set exactly.
    pub async fn list(
        pool: &PgPool,
        owner_id: i64,
        query: &ListQuery,
    ) -> Result<TodoPage, sqlx::Error> {
        let page = query.page.max(1);
        let limit = query.limit.clamp(1, MAX_PAGE_LIMIT);

        // Owner scoping always binds first
        let mut conditions = String::from("WHERE owner_id = $1");
        let mut bind_count = 1;

        if query.is_active.is_some() {
            bind_count += 1;
            conditions.push_str(&format!(" AND is_active = ${}", bind_count));
        }

        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s));
        if search.is_some() {
            bind_count += 1;
            conditions.push_str(&format!(
                " AND (title ILIKE ${n} OR description ILIKE ${n})",
                n = bind_count
            ));
        }

        // Total count under the same conditions
        let count_sql = format!("SELECT COUNT(*) FROM todos {}", conditions);
        let mut count_query = sqlx::query_as::<_, (i64,)>(&count_sql).bind(owner_id);
        if let Some(is_active) = query.is_active {
            count_query = count_query.bind(is_active);
        }
        if let Some(ref pattern) = search {
            count_query = count_query.bind(pattern.clone());
        }
        let (total,) = count_query.fetch_one(pool).await?;

        // Page fetch; sort column comes from the enum allow-list, never
        // from raw input
        let data_sql = format!(
            "SELECT {cols} FROM todos {cond} ORDER BY {col} {dir}, id ASC LIMIT ${lim} OFFSET ${off}",
            cols = TODO_COLUMNS,
            cond = conditions,
            col = query.sort_by.column(),
            dir = query.sort_order.as_sql(),
            lim = bind_count + 1,
            off = bind_count + 2,
        );

        let mut data_query = sqlx::query_as::<_, Todo>(&data_sql).bind(owner_id);
        if let Some(is_active) = query.is_active {
            data_query = data_query.bind(is_active);
        }
        if let Some(pattern) = search {
            data_query = data_query.bind(pattern);
        }
        let data = data_query
            .bind(limit)
            .bind((page - 1) * limit)
            .fetch_all(pool)
            .await?;

        Ok(TodoPage {
            data,
            meta: PageMeta::new(total, page, limit),
        })
    }

    /// Applies a partial update after enforcing existence and ownership
    ///
    /// Only supplied fields change; the refreshed record is returned. An
    /// update with no fields set is a no-op that returns the current record.
    pub async fn update(
        pool: &PgPool,
        id: i64,
        owner_id: i64,
        data: UpdateTodo,
    ) -> Result<Self, TodoError> {
        let current = Self::get_owned(pool, id, owner_id).await?;

        let title = data.title.as_deref().map(str::trim).map(str::to_string);
        if let Some(ref t) = title {
            validate_title(t, TITLE_MIN_LEN)?;
        }
        let description = data
            .description
            .as_deref()
            .map(str::trim)
            .map(str::to_string);
        if let Some(ref d) = description {
            validate_description(d)?;
        }

        let mut sets: Vec<String> = Vec::new();
        let mut bind_count = 1; // $1 is the id

        if title.is_some() {
            bind_count += 1;
            sets.push(format!("title = ${}", bind_count));
        }
        if description.is_some() {
            bind_count += 1;
            sets.push(format!("description = ${}", bind_count));
        }
        if data.deadline.is_some() {
            bind_count += 1;
            sets.push(format!("deadline = ${}", bind_count));
        }
        if data.is_active.is_some() {
            bind_count += 1;
            sets.push(format!("is_active = ${}", bind_count));
        }

        if sets.is_empty() {
            return Ok(current);
        }

        let sql = format!(
            "UPDATE todos SET {} WHERE id = $1 RETURNING {}",
            sets.join(", "),
            TODO_COLUMNS
        );

        let mut q = sqlx::query_as::<_, Todo>(&sql).bind(id);
        if let Some(t) = title {
            q = q.bind(t);
        }
        if let Some(d) = description {
            q = q.bind(d);
        }
        if let Some(deadline) = data.deadline {
            q = q.bind(deadline);
        }
        if let Some(is_active) = data.is_active {
            q = q.bind(is_active);
        }

        let todo = q.fetch_one(pool).await?;
        Ok(todo)
    }

    /// Sets the active flag to false after enforcing ownership
    ///
    /// Idempotent: deactivating an already-inactive record succeeds and
    /// leaves the same final state.
    pub async fn soft_deactivate(pool: &PgPool, id: i64, owner_id: i64) -> Result<Self, TodoError> {
        Self::get_owned(pool, id, owner_id).await?;

        let todo = sqlx::query_as::<_, Todo>(&format!(
            "UPDATE todos SET is_active = FALSE WHERE id = $1 RETURNING {}",
            TODO_COLUMNS
        ))
        .bind(id)
        .fetch_one(pool)
        .await?;

        Ok(todo)
    }

    /// Removes the record after enforcing ownership
    ///
    /// Returns the attachment reference that was on the record, if any, so
    /// the caller can delete the stored content. Record removal is the
    /// durable outcome; attachment cleanup is the caller's best-effort step.
    pub async fn delete(pool: &PgPool, id: i64, owner_id: i64) -> Result<Option<String>, TodoError> {
        Self::get_owned(pool, id, owner_id).await?;

        let (attachment_ref,): (Option<String>,) =
            sqlx::query_as("DELETE FROM todos WHERE id = $1 RETURNING attachment_ref")
                .bind(id)
                .fetch_one(pool)
                .await?;

        Ok(attachment_ref)
    }

    /// Returns total / active / inactive counts, optionally scoped to one owner
    pub async fn statistics(pool: &PgPool, owner_id: Option<i64>) -> Result<TodoStats, sqlx::Error> {
        let stats = match owner_id {
            Some(owner) => {
                sqlx::query_as::<_, TodoStats>(
                    r#"
                    SELECT COUNT(*) AS total,
                           COUNT(*) FILTER (WHERE is_active) AS active,
                           COUNT(*) FILTER (WHERE NOT is_active) AS inactive
                    FROM todos
                    WHERE owner_id = $1
                    "#,
                )
                .bind(owner)
                .fetch_one(pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, TodoStats>(
                    r#"
                    SELECT COUNT(*) AS total,
                           COUNT(*) FILTER (WHERE is_active) AS active,
                           COUNT(*) FILTER (WHERE NOT is_active) AS inactive
                    FROM todos
                    "#,
                )
                .fetch_one(pool)
                .await?
            }
        };

        Ok(stats)
    }

    /// Deactivates every overdue todo across all owners
    ///
    /// One set-based conditional update, so the sweep never races a
    /// concurrent user write via read-then-write. Re-running it when no rows
    /// match does nothing. Returns the number of rows deactivated.
    pub async fn expire_overdue(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("UPDATE todos SET is_active = FALSE WHERE deadline < NOW() AND is_active = TRUE")
                .execute(pool)
                .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_key_columns() {
        assert_eq!(SortKey::CreatedAt.column(), "created_at");
        assert_eq!(SortKey::Deadline.column(), "deadline");
        assert_eq!(SortKey::Title.column(), "title");
    }

    #[test]
    fn test_sort_key_deserializes_camel_case() {
        let key: SortKey = serde_json::from_str("\"createdAt\"").unwrap();
        assert_eq!(key, SortKey::CreatedAt);

        let key: SortKey = serde_json::from_str("\"deadline\"").unwrap();
        assert_eq!(key, SortKey::Deadline);

        // Anything outside the allow-list is rejected
        let result: Result<SortKey, _> = serde_json::from_str("\"owner_id\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_sort_order_sql() {
        assert_eq!(SortOrder::Asc.as_sql(), "ASC");
        assert_eq!(SortOrder::Desc.as_sql(), "DESC");
    }

    #[test]
    fn test_list_query_defaults() {
        let query = ListQuery::default();
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, 10);
        assert!(query.is_active.is_none());
        assert!(query.search.is_none());
        assert_eq!(query.sort_by, SortKey::CreatedAt);
        assert_eq!(query.sort_order, SortOrder::Desc);
    }

    #[test]
    fn test_list_query_deserializes_partial_input() {
        let query: ListQuery =
            serde_json::from_str(r#"{"isActive": true, "sortBy": "title", "sortOrder": "asc"}"#)
                .unwrap();
        assert_eq!(query.page, 1);
        assert_eq!(query.is_active, Some(true));
        assert_eq!(query.sort_by, SortKey::Title);
        assert_eq!(query.sort_order, SortOrder::Asc);
    }

    #[test]
    fn test_page_meta_empty() {
        let meta = PageMeta::new(0, 1, 10);
        assert_eq!(meta.total_pages, 0);
        assert!(!meta.has_next_page);
        assert!(!meta.has_prev_page);
    }

    #[test]
    fn test_page_meta_exact_multiple() {
        let meta = PageMeta::new(20, 1, 10);
        assert_eq!(meta.total_pages, 2);
        assert!(meta.has_next_page);
        assert!(!meta.has_prev_page);
    }

    #[test]
    fn test_page_meta_partial_last_page() {
        let meta = PageMeta::new(21, 3, 10);
        assert_eq!(meta.total_pages, 3);
        assert!(!meta.has_next_page);
        assert!(meta.has_prev_page);
    }

    #[test]
    fn test_page_meta_middle_page() {
        let meta = PageMeta::new(35, 2, 10);
        assert_eq!(meta.total_pages, 4);
        assert!(meta.has_next_page);
        assert!(meta.has_prev_page);
    }

    #[test]
    fn test_page_meta_page_size_one() {
        let meta = PageMeta::new(3, 3, 1);
        assert_eq!(meta.total_pages, 3);
        assert!(!meta.has_next_page);
        assert!(meta.has_prev_page);
    }

    #[test]
    fn test_validate_title_create_bounds() {
        assert!(validate_title("a", 1).is_ok());
        assert!(validate_title("", 1).is_err());
        assert!(validate_title(&"x".repeat(255), 1).is_ok());
        assert!(validate_title(&"x".repeat(256), 1).is_err());
    }

    #[test]
    fn test_validate_title_update_bounds() {
        assert!(validate_title("ab", TITLE_MIN_LEN).is_err());
        assert!(validate_title("abc", TITLE_MIN_LEN).is_ok());
    }

    #[test]
    fn test_validate_description_bounds() {
        assert!(validate_description(&"d".repeat(1000)).is_ok());
        assert!(validate_description(&"d".repeat(1001)).is_err());
    }

    #[test]
    fn test_update_todo_default_is_empty() {
        let update = UpdateTodo::default();
        assert!(update.title.is_none());
        assert!(update.description.is_none());
        assert!(update.deadline.is_none());
        assert!(update.is_active.is_none());
    }

    // Integration tests for query and lifecycle operations are in
    // tests/repository_tests.rs and require a running PostgreSQL database.
}
