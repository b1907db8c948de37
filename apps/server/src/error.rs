use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use vaultfolio_core::errors::{Audience, ErrorKind};
use vaultfolio_core::Error;

use crate::auth::principal_from_headers;

pub type ApiResult<T> = Result<T, ApiError>;

/// Error returned by handlers.
///
/// The body carries the user-facing message. The admin-facing message rides
/// along in the response extensions and is swapped in by [`disclose_errors`]
/// when the caller is an admin.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    user_message: String,
    admin_message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody<'a> {
    code: &'a str,
    message: &'a str,
}

#[derive(Clone)]
struct AdminDetail {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            status: StatusCode::UNAUTHORIZED,
            code: "UNAUTHENTICATED",
            user_message: message.clone(),
            admin_message: message,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "VALIDATION",
            user_message: message.clone(),
            admin_message: message,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

fn classify(kind: ErrorKind) -> (StatusCode, &'static str) {
    match kind {
        ErrorKind::Validation => (StatusCode::BAD_REQUEST, "VALIDATION"),
        ErrorKind::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        ErrorKind::Unauthorized => (StatusCode::FORBIDDEN, "UNAUTHORIZED"),
        ErrorKind::InvalidState => (StatusCode::CONFLICT, "INVALID_STATE"),
        ErrorKind::InsufficientBalance => {
            (StatusCode::UNPROCESSABLE_ENTITY, "INSUFFICIENT_BALANCE")
        }
        ErrorKind::Conflict => (StatusCode::CONFLICT, "CONCURRENT_MODIFICATION"),
        ErrorKind::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL"),
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let kind = err.kind();
        let (status, code) = classify(kind);
        if kind == ErrorKind::Internal {
            tracing::error!("Request failed: {}", err);
        } else {
            tracing::debug!("Request rejected: {}", err);
        }
        Self {
            status,
            code,
            user_message: err.public_message(Audience::User),
            admin_message: err.public_message(Audience::Admin),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            code: self.code,
            message: &self.user_message,
        };
        let mut response = (self.status, Json(body)).into_response();
        response.extensions_mut().insert(AdminDetail {
            status: self.status,
            code: self.code,
            message: self.admin_message,
        });
        response
    }
}

/// Gives admins the specific error message instead of the generic one.
pub async fn disclose_errors(request: Request, next: Next) -> Response {
    let audience = principal_from_headers(request.headers())
        .map(|p| p.audience())
        .unwrap_or(Audience::User);
    let mut response = next.run(request).await;
    if audience != Audience::Admin {
        return response;
    }
    match response.extensions_mut().remove::<AdminDetail>() {
        Some(detail) => {
            let body = ErrorBody {
                code: detail.code,
                message: &detail.message,
            };
            (detail.status, Json(body)).into_response()
        }
        None => response,
    }
}
