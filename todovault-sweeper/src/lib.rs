//! # TodoVault Sweeper Library
//!
//! Background expiration sweeping for TodoVault: periodically deactivates
//! todos whose deadline has passed.
//!
//! ## Modules
//!
//! - `sweeper`: the periodic sweep loop

pub mod sweeper;
