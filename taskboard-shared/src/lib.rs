//! # Taskboard Shared Library
//!
//! Record-store models and the relevance search engine used by the
//! Taskboard API server.
//!
//! ## Module Organization
//!
//! - `db`: Connection pool and migrations
//! - `models`: Tasks and their associated records (shares, files, comments, tags, logs)
//! - `search`: Relevance-ranked task search

pub mod db;
pub mod models;
pub mod search;

/// Current version of the Taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
