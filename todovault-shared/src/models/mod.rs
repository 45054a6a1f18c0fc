/// Database models for TodoVault
///
/// This module contains all database models and their query operations.
///
/// # Models
///
/// - `user`: User accounts (credential store)
/// - `todo`: Owner-scoped todo records with querying, lifecycle mutations,
///   and the bulk expiration statement used by the sweeper

pub mod todo;
pub mod user;
