/// API route handlers
///
/// # Modules
///
/// - `health`: Health check endpoint
/// - `auth`: Registration and login
/// - `users`: Authenticated account endpoints
/// - `todos`: Todo CRUD, querying, and attachment handling

pub mod auth;
pub mod health;
pub mod todos;
pub mod users;
