//! Stockroom Core - Shared types library.
//!
//! This crate provides common types used across all Stockroom components:
//! - `server` - Point-of-sale and inventory HTTP service
//! - `cli` - Command-line tools for seeding and store management
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access, no HTTP.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, usernames, roles, statuses
//!   and reporting periods

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
