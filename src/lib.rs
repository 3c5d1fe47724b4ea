pub mod config;
pub mod db;
pub mod email;
pub mod error;
pub mod middleware;
pub mod migrate;
pub mod observability;
pub mod routes;
pub mod server;

pub use config::Config;
pub use routes::AppState;

/// Create app router with admission control and response hardening
///
/// Used by the server and by integration tests that drive the router
/// without binding a socket.
pub fn create_app(state: AppState) -> axum::Router {
    use tower_http::trace::TraceLayer;

    let origin_policy = state.origin_policy.clone();

    routes::router(state)
        .layer(middleware::cors_layer(&origin_policy))
        .layer(axum::middleware::from_fn_with_state(
            origin_policy,
            middleware::origin_guard,
        ))
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(TraceLayer::new_for_http())
}
