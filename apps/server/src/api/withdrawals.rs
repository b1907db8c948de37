use std::sync::Arc;

use crate::{auth::Caller, error::ApiResult, main_lib::AppState};
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use vaultfolio_core::withdrawals::{NewWithdrawal, Withdrawal, WithdrawalStatus};

#[derive(Deserialize)]
struct StatusQuery {
    status: WithdrawalStatus,
}

#[derive(Deserialize, Default)]
struct NotesBody {
    notes: Option<String>,
}

async fn request_withdrawal(
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
    Json(request): Json<NewWithdrawal>,
) -> ApiResult<Json<Withdrawal>> {
    let withdrawal = state
        .withdrawal_service
        .request_withdrawal(&principal, request)
        .await?;
    Ok(Json(withdrawal))
}

async fn list_by_status(
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
    Query(q): Query<StatusQuery>,
) -> ApiResult<Json<Vec<Withdrawal>>> {
    let withdrawals = state
        .withdrawal_service
        .list_by_status(&principal, q.status)?;
    Ok(Json(withdrawals))
}

async fn get_withdrawal(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
) -> ApiResult<Json<Withdrawal>> {
    Ok(Json(state.withdrawal_service.get_withdrawal(&principal, &id)?))
}

async fn approve_withdrawal(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
    body: Option<Json<NotesBody>>,
) -> ApiResult<Json<Withdrawal>> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let withdrawal = state
        .withdrawal_service
        .approve_withdrawal(&principal, &id, body.notes)
        .await?;
    Ok(Json(withdrawal))
}

async fn reject_withdrawal(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
    body: Option<Json<NotesBody>>,
) -> ApiResult<Json<Withdrawal>> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let withdrawal = state
        .withdrawal_service
        .reject_withdrawal(&principal, &id, body.notes)
        .await?;
    Ok(Json(withdrawal))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/withdrawals", get(list_by_status).post(request_withdrawal))
        .route("/withdrawals/{id}", get(get_withdrawal))
        .route("/withdrawals/{id}/approve", post(approve_withdrawal))
        .route("/withdrawals/{id}/reject", post(reject_withdrawal))
}
