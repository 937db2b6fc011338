//! Farm Report Core - Shared domain types.
//!
//! This crate provides the types used across all farm report components:
//! - `server` - HTTP API for farm records and yield reports
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure arithmetic - no I/O, no
//! database access, no HTTP clients. This keeps it lightweight and allows it
//! to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, emails, coordinates, distances and yield cohorts

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
