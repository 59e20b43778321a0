//! # Taskboard API Server Library
//!
//! HTTP layer of the task board: task CRUD, attachment uploads and
//! relevance-ranked search over tasks stored in PostgreSQL.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `docs`: OpenAPI document
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Requester identification
//! - `routes`: API route handlers
//! - `storage`: Attachment blob storage

pub mod app;
pub mod config;
pub mod docs;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod storage;
