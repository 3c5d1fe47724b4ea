#![allow(dead_code)]

use std::{path::PathBuf, str::FromStr, sync::Mutex};

use folio_contact::{ContactRecord, ContactStore, Mailer, Notification};
use sqlx::{SqlitePool, sqlite::SqliteConnectOptions};
use sqlx_migrator::{Migrate, Plan};

pub async fn setup_test_pool(path: PathBuf) -> anyhow::Result<SqlitePool> {
    let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.to_str().unwrap()))?
        .create_if_missing(true);
    let pool = SqlitePool::connect_with(opts).await?;
    let mut conn = pool.acquire().await?;
    folio_db::migrator()?
        .run(&mut conn, &Plan::apply_all())
        .await?;

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

#[async_trait::async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _notification: &Notification) -> anyhow::Result<()> {
        *self.attempts.lock().unwrap() += 1;

        anyhow::bail!("535 authentication failed")
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
pub struct FailingStore {
    pub attempts: Mutex<usize>,
}

#[async_trait::async_trait]
impl ContactStore for FailingStore {
    async fn insert(&self, _record: &ContactRecord) -> anyhow::Result<()> {
        *self.attempts.lock().unwrap() += 1;

        anyhow::bail!("database is locked")
    }
}
