use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use folio_contact::SqliteContactStore;

use crate::{
    email::SmtpMailer,
    middleware::{FixedWindowLimiter, OriginPolicy, rate_limit::purge_task},
    routes::AppState,
};

pub async fn serve(
    config: crate::config::Config,
    host_override: Option<String>,
    port_override: Option<u16>,
) -> Result<()> {
    tracing::info!("Starting folio server...");

    // Use CLI overrides if provided, otherwise use config
    let host = host_override.unwrap_or(config.server.host.to_owned());
    let port = port_override.unwrap_or(config.server.port);

    let mailer = SmtpMailer::new(&config.email)?;
    if config.email.verify_on_startup {
        mailer
            .verify()
            .await
            .context("SMTP relay verification failed")?;
        tracing::info!("SMTP relay verified");
    } else {
        tracing::info!("SMTP relay not verified at startup, failures surface per submission");
    }

    let mut contact_command = folio_contact::Command::new(Arc::new(mailer));

    let pool = match &config.database.url {
        Some(url) => {
            let pool = crate::db::create_pool(url, config.database.max_connections).await?;
            crate::db::migrate(&pool).await?;
            contact_command =
                contact_command.with_store(Arc::new(SqliteContactStore::new(pool.clone())));
            tracing::info!("Contact records will be persisted");
            Some(pool)
        }
        None => {
            tracing::info!("No database configured, contact records will not be persisted");
            None
        }
    };

    let rate_limiter = Arc::new(FixedWindowLimiter::new(&config.rate_limit));
    let purge_handle = tokio::spawn(purge_task(
        rate_limiter.clone(),
        rate_limiter.window().min(Duration::from_secs(60)),
    ));

    let origin_policy = Arc::new(OriginPolicy::new(&config.cors.allowed_origins));
    tracing::info!(
        allowed_origins = ?config.cors.allowed_origins,
        max_requests = config.rate_limit.max_requests,
        window_secs = config.rate_limit.window_secs,
        "Admission control configured"
    );

    let state = AppState {
        contact_command,
        pool: pool.clone(),
        rate_limiter,
        origin_policy,
    };

    let app = crate::create_app(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    purge_handle.abort();

    if let Some(pool) = pool {
        tracing::info!("Closing database pool...");
        pool.close().await;
    }

    tracing::info!("Graceful shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal");
        },
    }

    tracing::info!("Starting graceful shutdown...");
}
