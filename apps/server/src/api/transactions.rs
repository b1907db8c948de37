use std::sync::Arc;

use crate::{auth::Caller, error::ApiResult, main_lib::AppState};
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use vaultfolio_core::transactions::{Transaction, TransactionType};

#[derive(Deserialize)]
struct TransactionQuery {
    #[serde(rename = "type")]
    transaction_type: Option<TransactionType>,
}

async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
    Query(q): Query<TransactionQuery>,
) -> ApiResult<Json<Vec<Transaction>>> {
    let transactions = state
        .transaction_service
        .list_transactions(&principal, q.transaction_type)?;
    Ok(Json(transactions))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/transactions", get(list_transactions))
}
