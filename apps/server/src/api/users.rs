use std::sync::Arc;

use crate::{auth::Caller, error::ApiResult, main_lib::AppState};
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Serialize;
use vaultfolio_core::{
    balances::{BalanceAdjustment, BalanceAdjustmentResult, BalanceLedgerEntry},
    investments::{Investment, PortfolioSummary},
    transactions::Transaction,
    users::{NewUser, User},
    withdrawals::Withdrawal,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BalanceResponse {
    user_id: String,
    balance: Decimal,
}

async fn create_user(
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
    Json(new_user): Json<NewUser>,
) -> ApiResult<Json<User>> {
    let user = state.user_service.create_user(&principal, new_user).await?;
    Ok(Json(user))
}

async fn list_users(
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.user_service.list_users(&principal)?))
}

async fn get_user(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
) -> ApiResult<Json<User>> {
    Ok(Json(state.user_service.get_user(&principal, &id)?))
}

async fn get_balance(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
) -> ApiResult<Json<BalanceResponse>> {
    let balance = state.balance_service.get_balance(&principal, &id)?;
    Ok(Json(BalanceResponse {
        user_id: id,
        balance,
    }))
}

async fn get_balance_history(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
) -> ApiResult<Json<Vec<BalanceLedgerEntry>>> {
    let history = state.balance_service.get_balance_history(&principal, &id)?;
    Ok(Json(history))
}

async fn adjust_balance(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
    Json(adjustment): Json<BalanceAdjustment>,
) -> ApiResult<Json<BalanceAdjustmentResult>> {
    let result = state
        .balance_service
        .adjust_balance(&principal, &id, adjustment)
        .await?;
    Ok(Json(result))
}

async fn list_user_investments(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
) -> ApiResult<Json<Vec<Investment>>> {
    let investments = state
        .investment_service
        .list_user_investments(&principal, &id)?;
    Ok(Json(investments))
}

async fn get_portfolio_summary(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
) -> ApiResult<Json<PortfolioSummary>> {
    let summary = state
        .investment_service
        .get_portfolio_summary(&principal, &id)?;
    Ok(Json(summary))
}

async fn list_user_withdrawals(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
) -> ApiResult<Json<Vec<Withdrawal>>> {
    let withdrawals = state
        .withdrawal_service
        .list_user_withdrawals(&principal, &id)?;
    Ok(Json(withdrawals))
}

async fn list_user_transactions(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
) -> ApiResult<Json<Vec<Transaction>>> {
    let transactions = state
        .transaction_service
        .list_user_transactions(&principal, &id)?;
    Ok(Json(transactions))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", get(get_user))
        .route("/users/{id}/balance", get(get_balance))
        .route("/users/{id}/balance/history", get(get_balance_history))
        .route("/users/{id}/balance/adjustments", post(adjust_balance))
        .route("/users/{id}/investments", get(list_user_investments))
        .route("/users/{id}/portfolio", get(get_portfolio_summary))
        .route("/users/{id}/withdrawals", get(list_user_withdrawals))
        .route("/users/{id}/transactions", get(list_user_transactions))
}
