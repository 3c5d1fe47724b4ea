//! Cross-origin admission: requests from origins outside the allow-list are
//! refused before routing, allowed origins get CORS headers.

use std::{collections::HashSet, sync::Arc};

use axum::{
    extract::{Request, State},
    http::{HeaderValue, Method, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::error::ApiError;

#[derive(Debug, Clone)]
pub struct OriginPolicy {
    allow_any: bool,
    origins: HashSet<String>,
}

impl OriginPolicy {
    pub fn new(allowed_origins: &[String]) -> Self {
        let allow_any = allowed_origins.iter().any(|o| o.trim() == "*");
        let origins = allowed_origins
            .iter()
            .map(|o| o.trim().trim_end_matches('/').to_string())
            .filter(|o| !o.is_empty() && o != "*")
            .collect();

        Self { allow_any, origins }
    }

    pub fn is_allowed(&self, origin: &str) -> bool {
        self.allow_any || self.origins.contains(origin)
    }
}

/// Reject requests whose `Origin` header is present but not allowed.
///
/// Requests without an `Origin` header (server-to-server calls, curl) pass.
pub async fn origin_guard(
    State(policy): State<Arc<OriginPolicy>>,
    req: Request,
    next: Next,
) -> Response {
    if let Some(origin) = req.headers().get(header::ORIGIN) {
        let allowed = origin
            .to_str()
            .map(|origin| policy.is_allowed(origin))
            .unwrap_or(false);

        if !allowed {
            tracing::warn!(
                origin = ?origin,
                method = %req.method(),
                path = %req.uri().path(),
                "Rejected request from disallowed origin"
            );
            return ApiError::OriginNotAllowed.into_response();
        }
    }

    next.run(req).await
}

pub fn cors_layer(policy: &OriginPolicy) -> CorsLayer {
    let allow_origin = if policy.allow_any {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            policy
                .origins
                .iter()
                .filter_map(|o| HeaderValue::from_str(o).ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}
