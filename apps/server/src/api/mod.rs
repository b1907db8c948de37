mod assets;
mod investments;
mod notifications;
mod transactions;
mod users;
mod withdrawals;

use std::sync::Arc;

use axum::{
    http::{HeaderValue, Method, StatusCode},
    middleware,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{config::Config, error::disclose_errors, main_lib::AppState};

async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_allow_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers(Any)
}

fn timeout_layer(config: &Config) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, config.request_timeout)
}

pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let api = Router::new()
        .route("/healthz", get(healthz))
        .merge(users::router())
        .merge(assets::router())
        .merge(investments::router())
        .merge(withdrawals::router())
        .merge(transactions::router())
        .merge(notifications::router());

    Router::new()
        .nest("/api/v1", api)
        .layer(middleware::from_fn(disclose_errors))
        .layer(timeout_layer(config))
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}
