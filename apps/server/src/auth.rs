//! Principal extraction.
//!
//! Authentication happens upstream; the proxy in front of the server forwards
//! the caller's identity in `x-user-id` and `x-user-role`.

use axum::{extract::FromRequestParts, http::request::Parts, http::HeaderMap};
use vaultfolio_core::{Principal, Role};

use crate::error::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Reads the principal from the forwarded headers.
///
/// A missing role means `USER`. An unknown role yields `None`.
pub fn principal_from_headers(headers: &HeaderMap) -> Option<Principal> {
    let user_id = headers
        .get(USER_ID_HEADER)?
        .to_str()
        .ok()?
        .trim()
        .to_string();
    if user_id.is_empty() {
        return None;
    }
    let role = match headers.get(USER_ROLE_HEADER) {
        None => Role::User,
        Some(value) => Role::from_db_str(&value.to_str().ok()?.trim().to_ascii_uppercase())?,
    };
    Some(Principal { user_id, role })
}

/// Extractor for the authenticated caller.
pub struct Caller(pub Principal);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        principal_from_headers(&parts.headers)
            .map(Caller)
            .ok_or_else(|| ApiError::unauthenticated("Missing or invalid caller identity"))
    }
}
