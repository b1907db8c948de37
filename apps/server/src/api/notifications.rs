use std::sync::Arc;

use crate::{auth::Caller, error::ApiResult, main_lib::AppState};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use vaultfolio_core::notifications::InAppNotification;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InboxQuery {
    #[serde(default)]
    unread_only: bool,
}

async fn list_notifications(
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
    Query(q): Query<InboxQuery>,
) -> ApiResult<Json<Vec<InAppNotification>>> {
    let notifications = state
        .notification_service
        .list_notifications(&principal, q.unread_only)?;
    Ok(Json(notifications))
}

async fn mark_read(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
) -> ApiResult<StatusCode> {
    state
        .notification_service
        .mark_read(&principal, &id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/notifications", get(list_notifications))
        .route("/notifications/{id}/read", post(mark_read))
}
