use std::sync::Arc;

use crate::{auth::Caller, error::ApiResult, main_lib::AppState};
use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use vaultfolio_core::assets::{Asset, AssetUpdate, NewAsset, PriceUpdate};

#[derive(Deserialize)]
struct AssetListQuery {
    active: Option<bool>,
}

#[derive(Deserialize)]
struct PriceBody {
    price: Decimal,
}

async fn list_assets(
    State(state): State<Arc<AppState>>,
    Caller(_principal): Caller,
    Query(q): Query<AssetListQuery>,
) -> ApiResult<Json<Vec<Asset>>> {
    Ok(Json(state.asset_service.list_assets(q.active)?))
}

async fn get_asset(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Caller(_principal): Caller,
) -> ApiResult<Json<Asset>> {
    Ok(Json(state.asset_service.get_asset(&id)?))
}

async fn create_asset(
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
    Json(new_asset): Json<NewAsset>,
) -> ApiResult<Json<Asset>> {
    let asset = state
        .asset_service
        .create_asset(&principal, new_asset)
        .await?;
    Ok(Json(asset))
}

async fn update_asset(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
    Json(update): Json<AssetUpdate>,
) -> ApiResult<Json<Asset>> {
    let asset = state
        .asset_service
        .update_asset(&principal, &id, update)
        .await?;
    Ok(Json(asset))
}

async fn update_price(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
    Json(body): Json<PriceBody>,
) -> ApiResult<Json<PriceUpdate>> {
    let update = state
        .asset_service
        .update_price(&principal, &id, body.price)
        .await?;
    Ok(Json(update))
}

async fn deactivate_asset(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Caller(principal): Caller,
) -> ApiResult<Json<Asset>> {
    let asset = state
        .asset_service
        .deactivate_asset(&principal, &id)
        .await?;
    Ok(Json(asset))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/assets", get(list_assets).post(create_asset))
        .route("/assets/{id}", get(get_asset).put(update_asset))
        .route("/assets/{id}/price", put(update_price))
        .route("/assets/{id}/deactivate", post(deactivate_asset))
}
