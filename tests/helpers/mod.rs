#![allow(dead_code)]

use std::{
    net::SocketAddr,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use axum::{
    Router,
    body::Body,
    extract::connect_info::MockConnectInfo,
    http::{Request, Response, header},
};
use folio::{
    AppState,
    config::{CorsConfig, RateLimitConfig},
    middleware::{FixedWindowLimiter, OriginPolicy},
};
use folio_contact::{ContactRecord, ContactStore, Mailer, Notification};
use http_body_util::BodyExt;
use sqlx::SqlitePool;
use tower::ServiceExt;

pub const ALLOWED_ORIGIN: &str = "http://localhost:5173";

pub async fn setup_test_pool(path: PathBuf) -> anyhow::Result<SqlitePool> {
    let url = format!("sqlite:{}", path.to_str().unwrap());
    let pool = folio::db::create_pool(&url, 2).await?;
    folio::db::migrate(&pool).await?;

    Ok(pool)
}

pub async fn latest_records(pool: &SqlitePool, limit: i64) -> anyhow::Result<Vec<ContactRecord>> {
    let records = sqlx::query_as::<_, ContactRecord>(
        "SELECT id, name, email, message, created_at FROM contact_record ORDER BY created_at DESC, id DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(records)
}

pub async fn count_records(pool: &SqlitePool) -> anyhow::Result<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM contact_record")
        .fetch_one(pool)
        .await?;

    Ok(count)
}

#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<Notification>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, notification: &Notification) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push(notification.clone());

        Ok(())
    }
}

#[derive(Default)]
pub struct FailingMailer {
    pub attempts: Mutex<usize>,
}

impl FailingMailer {
    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _notification: &Notification) -> anyhow::Result<()> {
        *self.attempts.lock().unwrap() += 1;

        anyhow::bail!("connection refused by smtp.example.com:587")
    }
}

#[derive(Default)]
pub struct RecordingStore {
    pub records: Mutex<Vec<ContactRecord>>,
}

impl RecordingStore {
    pub fn records(&self) -> Vec<ContactRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ContactStore for RecordingStore {
    async fn insert(&self, record: &ContactRecord) -> anyhow::Result<()> {
        self.records.lock().unwrap().push(record.clone());

        Ok(())
    }
}

#[derive(Default)]
pub struct FailingStore;

#[async_trait::async_trait]
impl ContactStore for FailingStore {
    async fn insert(&self, _record: &ContactRecord) -> anyhow::Result<()> {
        anyhow::bail!("database is locked")
    }
}

pub struct TestApp {
    state: AppState,
}

impl TestApp {
    pub fn new(mailer: Arc<dyn Mailer>) -> Self {
        Self::with_rate_limit(mailer, RateLimitConfig::default())
    }

    pub fn with_rate_limit(mailer: Arc<dyn Mailer>, rate_limit: RateLimitConfig) -> Self {
        let state = AppState {
            contact_command: folio_contact::Command::new(mailer),
            pool: None,
            rate_limiter: Arc::new(FixedWindowLimiter::new(&rate_limit)),
            origin_policy: Arc::new(OriginPolicy::new(&CorsConfig::default().allowed_origins)),
        };

        Self { state }
    }

    pub fn store(mut self, store: Arc<dyn ContactStore>) -> Self {
        self.state.contact_command = self.state.contact_command.with_store(store);
        self
    }

    pub fn pool(mut self, pool: SqlitePool) -> Self {
        self.state.pool = Some(pool);
        self
    }

    /// Router as seen by a client connecting from `addr`
    pub fn router_from(&self, addr: SocketAddr) -> Router {
        folio::create_app(self.state.clone()).layer(MockConnectInfo(addr))
    }

    pub fn router(&self) -> Router {
        self.router_from(SocketAddr::from(([127, 0, 0, 1], 40000)))
    }
}

pub fn contact_request(body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/contact")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::ORIGIN, ALLOWED_ORIGIN)
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn valid_submission() -> serde_json::Value {
    serde_json::json!({
        "name": "Ada Lovelace",
        "email": "ada@example.com",
        "message": "I'd like to talk about a project."
    })
}

pub async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
    router.clone().oneshot(request).await.unwrap()
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

pub async fn message(response: Response<Body>) -> String {
    json_body(response).await["message"]
        .as_str()
        .unwrap()
        .to_string()
}
