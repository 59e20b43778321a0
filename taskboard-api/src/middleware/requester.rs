/// Acting-user identification
///
/// Mutating task routes identify the caller by the `X-User-Id` header. The
/// middleware decodes it once and injects a [`Requester`] into the request
/// extensions; handlers read it with `Extension<Requester>`.
///
/// A missing header yields an anonymous requester, which may still edit
/// public tasks. A present but non-numeric header is rejected with 400.

use crate::error::ApiError;
use axum::{extract::Request, http::HeaderMap, middleware::Next, response::Response};

/// Header carrying the acting user's ID
pub const USER_ID_HEADER: &str = "x-user-id";

/// The user performing a request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Requester {
    pub user_id: Option<i32>,
}

impl Requester {
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, ApiError> {
        let Some(value) = headers.get(USER_ID_HEADER) else {
            return Ok(Self::default());
        };

        let user_id = value
            .to_str()
            .ok()
            .and_then(|raw| raw.trim().parse::<i32>().ok())
            .ok_or_else(|| ApiError::BadRequest("X-User-Id must be an integer user id".to_string()))?;

        Ok(Self {
            user_id: Some(user_id),
        })
    }
}

/// Injects the [`Requester`] into request extensions
pub async fn requester_layer(mut req: Request, next: Next) -> Result<Response, ApiError> {
    let requester = Requester::from_headers(req.headers())?;
    req.extensions_mut().insert(requester);

    Ok(next.run(req).await)
}
