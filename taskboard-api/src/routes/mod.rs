/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `tasks`: Task listing, search and mutations

pub mod health;
pub mod tasks;
