//! HTTP boundary for token authentication.
//!
//! Extracts the bearer token from the `Authorization` header and checks it
//! against any [`TokenValidator`](tokenauth_common::TokenValidator).

pub mod bearer;


pub use bearer::{bearer_token, protect, require_bearer_token, SharedValidator, BEARER_PREFIX};
