//! # TodoVault API Server Library
//!
//! This library provides the core functionality for the TodoVault API server.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers
//! - `seed`: Default operator account seeding

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
pub mod seed;
