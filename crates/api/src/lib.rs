//! HTTP API layer for foodgram-rs.
//!
//! This crate provides the REST API:
//!
//! - **Endpoints**: users, auth tokens, ingredients, recipes and short links
//! - **Extractors**: authentication and page-number pagination
//! - **Middleware**: token authentication
//! - **Responses**: JSON views with absolute media URLs
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::{MAX_BODY_BYTES, router, short_link_router};
pub use middleware::AppState;
