//! # Libris Common Library
//!
//! Shared code for the Libris book-catalog service:
//! - Database bootstrap, schema, and per-entity queries
//! - Configuration loading and root folder resolution
//! - Common error types

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
