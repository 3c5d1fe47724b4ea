//! Database migration command

use anyhow::Context;

use crate::Config;

/// Apply all pending migrations to the configured database
pub async fn migrate(config: &Config) -> anyhow::Result<()> {
    let url = config
        .database
        .url
        .as_deref()
        .context("database.url (or DATABASE_URL) must be set to run migrations")?;

    let pool = crate::db::create_pool(url, 1).await?;
    crate::db::migrate(&pool).await?;
    pool.close().await;

    Ok(())
}
