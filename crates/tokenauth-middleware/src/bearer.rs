//! Bearer token authentication middleware for Axum.
//!
//! # Setup
//!
//! ```ignore
//! use std::sync::Arc;
//! use axum::{routing::get, Router};
//! use tokenauth_middleware::protect;
//! use tokenauth_store::TokenStore;
//!
//! let store = TokenStore::initialize("tokens.yml").await?;
//! let app = protect(Router::new().route("/", get(handler)), store);
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};
use tokenauth_common::TokenValidator;
use tracing::debug;

/// Scheme prefix of an accepted `Authorization` header. Case-sensitive.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Shared validator handed to the middleware as state.
pub type SharedValidator = Arc<dyn TokenValidator>;

/// The token carried by an `Authorization: Bearer <token>` header, if any.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix(BEARER_PREFIX)
}

/// Reject the request with 401 unless it carries a valid bearer token.
pub async fn require_bearer_token(
    State(validator): State<SharedValidator>,
    request: Request,
    next: Next,
) -> Response {
    let authorized = match bearer_token(request.headers()) {
        Some(token) => validator.is_token_valid(token),
        None => {
            debug!(uri = %request.uri(), "missing or malformed bearer authorization");
            return StatusCode::UNAUTHORIZED.into_response();
        }
    };

    if !authorized {
        debug!(uri = %request.uri(), "bearer token rejected");
        return StatusCode::UNAUTHORIZED.into_response();
    }

    next.run(request).await
}

/// Put every route of `router` behind bearer token authentication.
pub fn protect<S, V>(router: Router<S>, validator: Arc<V>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    V: TokenValidator + 'static,
{
    let validator: SharedValidator = validator;
    router.layer(middleware::from_fn_with_state(
        validator,
        require_bearer_token,
    ))
}
