/// Middleware modules for the API server
///
/// - `requester`: Identifies the acting user from the `X-User-Id` header

pub mod requester;
