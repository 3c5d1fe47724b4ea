use std::{net::SocketAddr, sync::Arc};

use axum::{
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use folio::config::RateLimitConfig;
use serde_json::json;

mod helpers;

use helpers::{ALLOWED_ORIGIN, RecordingMailer, TestApp, contact_request, message, send};

fn rate_limit(max_requests: u32) -> RateLimitConfig {
    RateLimitConfig {
        window_secs: 900,
        max_requests,
        trust_forwarded_for: false,
    }
}

#[tokio::test]
async fn test_rate_limit_applies_before_validation() -> anyhow::Result<()> {
    let mailer = Arc::new(RecordingMailer::default());
    let app = TestApp::with_rate_limit(mailer.clone(), rate_limit(3));
    let router = app.router();
    let invalid = json!({ "name": "Ada" });

    for remaining in ["2", "1", "0"] {
        let response = send(&router, contact_request(&invalid)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()["ratelimit-limit"], "3");
        assert_eq!(response.headers()["ratelimit-remaining"], remaining);
    }

    let response = send(&router, contact_request(&invalid)).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let retry_after: u64 = response.headers()[header::RETRY_AFTER].to_str()?.parse()?;
    assert!(retry_after > 0 && retry_after <= 900);
    assert_eq!(
        message(response).await,
        "Too many requests, please try again later."
    );
    assert!(mailer.sent().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_rate_limit_is_per_client() -> anyhow::Result<()> {
    let mailer = Arc::new(RecordingMailer::default());
    let app = TestApp::with_rate_limit(mailer.clone(), rate_limit(1));
    let first = app.router_from(SocketAddr::from(([198, 51, 100, 1], 50000)));
    let second = app.router_from(SocketAddr::from(([198, 51, 100, 2], 50000)));

    let body = helpers::valid_submission();
    assert_eq!(send(&first, contact_request(&body)).await.status(), StatusCode::OK);
    assert_eq!(
        send(&first, contact_request(&body)).await.status(),
        StatusCode::TOO_MANY_REQUESTS
    );
    assert_eq!(send(&second, contact_request(&body)).await.status(), StatusCode::OK);
    assert_eq!(mailer.sent().len(), 2);

    Ok(())
}

#[tokio::test]
async fn test_rate_limit_does_not_cover_health() -> anyhow::Result<()> {
    let app = TestApp::with_rate_limit(Arc::new(RecordingMailer::default()), rate_limit(1));
    let router = app.router();

    for _ in 0..3 {
        let request = Request::builder().uri("/api/health").body(Body::empty())?;
        let response = send(&router, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get("ratelimit-limit").is_none());
    }

    Ok(())
}

#[tokio::test]
async fn test_disallowed_origin_is_rejected() -> anyhow::Result<()> {
    let mailer = Arc::new(RecordingMailer::default());
    let app = TestApp::new(mailer.clone());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/contact")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::ORIGIN, "https://evil.example")
        .body(Body::from(helpers::valid_submission().to_string()))?;
    let response = send(&app.router(), request).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none()
    );
    assert_eq!(message(response).await, "Origin not allowed.");
    assert!(mailer.sent().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_allowed_origin_gets_cors_headers() -> anyhow::Result<()> {
    let app = TestApp::new(Arc::new(RecordingMailer::default()));

    let response = send(&app.router(), contact_request(&helpers::valid_submission())).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        ALLOWED_ORIGIN
    );

    Ok(())
}

#[tokio::test]
async fn test_preflight_from_allowed_origin() -> anyhow::Result<()> {
    let app = TestApp::new(Arc::new(RecordingMailer::default()));

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/contact")
        .header(header::ORIGIN, ALLOWED_ORIGIN)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())?;
    let response = send(&app.router(), request).await;

    assert!(response.status().is_success());
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        ALLOWED_ORIGIN
    );

    Ok(())
}

#[tokio::test]
async fn test_request_without_origin_passes() -> anyhow::Result<()> {
    let mailer = Arc::new(RecordingMailer::default());
    let app = TestApp::new(mailer.clone());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/contact")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(helpers::valid_submission().to_string()))?;
    let response = send(&app.router(), request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(mailer.sent().len(), 1);

    Ok(())
}
