use std::sync::Arc;

use crate::{
    auth::Caller,
    error::{ApiError, ApiResult},
    main_lib::AppState,
};
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use vaultfolio_core::investments::{Investment, InvestmentState, NewInvestment};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateInvestmentBody {
    /// Defaults to the caller.
    user_id: Option<String>,
    asset_id: String,
    amount: Decimal,
    deposit_method: String,
    deposit_proof: Option<String>,
}

#[derive(Deserialize)]
struct StateQuery {
    state: InvestmentState,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ReviewBody {
    reason: Option<String>,
    notes: Option<String>,
}

async fn create_investment(
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
    Json(body): Json<CreateInvestmentBody>,
) -> ApiResult<Json<Investment>> {
    let new_investment = NewInvestment {
        user_id: body.user_id.unwrap_or_else(|| principal.user_id.clone()),
        asset_id: body.asset_id,
        amount: body.amount,
        deposit_method: body.deposit_method,
        deposit_proof: body.deposit_proof,
    };
    let investment = state
        .investment_service
        .create_investment(&principal, new_investment)
        .await?;
    Ok(Json(investment))
}

async fn list_by_state(
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
    Query(q): Query<StateQuery>,
) -> ApiResult<Json<Vec<Investment>>> {
    let investments = state
        .investment_service
        .list_by_state(&principal, q.state)?;
    Ok(Json(investments))
}

async fn get_investment(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
) -> ApiResult<Json<Investment>> {
    Ok(Json(state.investment_service.get_investment(&principal, &id)?))
}

async fn approve_investment(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
) -> ApiResult<Json<Investment>> {
    let investment = state
        .investment_service
        .approve_investment(&principal, &id)
        .await?;
    Ok(Json(investment))
}

async fn reject_investment(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
    body: Option<Json<ReviewBody>>,
) -> ApiResult<Json<Investment>> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let investment = state
        .investment_service
        .reject_investment(&principal, &id, body.reason)
        .await?;
    Ok(Json(investment))
}

async fn request_closure(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
) -> ApiResult<Json<Investment>> {
    let investment = state
        .investment_service
        .request_closure(&principal, &id)
        .await?;
    Ok(Json(investment))
}

async fn approve_closure(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
    body: Option<Json<ReviewBody>>,
) -> ApiResult<Json<Investment>> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let investment = state
        .investment_service
        .approve_closure(&principal, &id, body.notes)
        .await?;
    Ok(Json(investment))
}

async fn reject_closure(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
    Json(body): Json<ReviewBody>,
) -> ApiResult<Json<Investment>> {
    let reason = body
        .reason
        .ok_or_else(|| ApiError::bad_request("A rejection reason is required"))?;
    let investment = state
        .investment_service
        .reject_closure(&principal, &id, &reason)
        .await?;
    Ok(Json(investment))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/investments", get(list_by_state).post(create_investment))
        .route("/investments/{id}", get(get_investment))
        .route("/investments/{id}/approve", post(approve_investment))
        .route("/investments/{id}/reject", post(reject_investment))
        .route("/investments/{id}/closure", post(request_closure))
        .route("/investments/{id}/closure/approve", post(approve_closure))
        .route("/investments/{id}/closure/reject", post(reject_closure))
}
