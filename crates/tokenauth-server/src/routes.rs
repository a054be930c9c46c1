//! HTTP routes: an open health check and the token-protected API.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};
use tokenauth_middleware::protect;
use tokenauth_store::TokenStore;

pub fn build_router(store: Arc<TokenStore>) -> Router {
    let protected = protect(Router::new().route("/", get(authorized)), Arc::clone(&store));

    Router::new()
        .route("/healthz", get(health))
        .with_state(store)
        .merge(protected)
}

async fn health(State(store): State<Arc<TokenStore>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "tokens": store.len(),
    }))
}

async fn authorized() -> Json<Value> {
    Json(json!({ "status": "authorized" }))
}
