//! # TodoVault Shared Library
//!
//! This crate contains shared types, utilities, and business logic used across
//! the TodoVault API server and the expiration sweeper.
//!
//! ## Module Organization
//!
//! - `models`: Database models (users, todos) and their query operations
//! - `auth`: Password hashing and access-token primitives
//! - `db`: Connection pooling and migrations
//! - `storage`: Attachment store for uploaded files

pub mod auth;
pub mod db;
pub mod models;
pub mod storage;

/// Current version of the TodoVault shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
