use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use sqlx::SqlitePool;

use crate::{
    error::ApiError,
    middleware::{FixedWindowLimiter, OriginPolicy, rate_limit_middleware},
};

mod contact;
mod health;

/// Largest accepted request body
pub const BODY_LIMIT: usize = 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub contact_command: folio_contact::Command,
    /// Present when contact records are persisted
    pub pool: Option<SqlitePool>,
    pub rate_limiter: Arc<FixedWindowLimiter>,
    pub origin_policy: Arc<OriginPolicy>,
}

pub async fn fallback() -> ApiError {
    ApiError::NotFound
}

pub fn router(app_state: AppState) -> Router {
    // Admission happens before the body is read.
    let contact_routes = Router::new()
        .route("/api/contact", post(contact::action))
        .route_layer(axum::middleware::from_fn_with_state(
            app_state.rate_limiter.clone(),
            rate_limit_middleware,
        ));

    Router::new()
        .route("/api/health", get(health::health))
        .route("/api/ready", get(health::ready))
        .merge(contact_routes)
        .fallback(fallback)
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .with_state(app_state)
}
