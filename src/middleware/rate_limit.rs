//! Fixed-window rate limiting keyed by client IP.
//!
//! Each client gets its own window starting at its first request. Once the
//! window elapses the counter starts over.

use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use tracing::{debug, warn};

use crate::{config::RateLimitConfig, error::ApiError};

#[derive(Debug, Clone, Copy)]
struct Window {
    started_at: Instant,
    count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed { remaining: u32, reset_after: Duration },
    Limited { retry_after: Duration },
}

pub struct FixedWindowLimiter {
    window: Duration,
    max_requests: u32,
    trust_forwarded_for: bool,
    clients: DashMap<IpAddr, Window>,
}

impl FixedWindowLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            window: Duration::from_secs(config.window_secs),
            max_requests: config.max_requests,
            trust_forwarded_for: config.trust_forwarded_for,
            clients: DashMap::new(),
        }
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn check(&self, ip: IpAddr) -> Decision {
        self.check_at(ip, Instant::now())
    }

    pub fn check_at(&self, ip: IpAddr, now: Instant) -> Decision {
        let mut entry = self.clients.entry(ip).or_insert_with(|| {
            debug!(ip = %ip, "Opening rate limit window");
            Window {
                started_at: now,
                count: 0,
            }
        });

        if now.duration_since(entry.started_at) >= self.window {
            entry.started_at = now;
            entry.count = 0;
        }

        let reset_after = self
            .window
            .saturating_sub(now.duration_since(entry.started_at));

        if entry.count >= self.max_requests {
            return Decision::Limited {
                retry_after: reset_after,
            };
        }

        entry.count += 1;

        Decision::Allowed {
            remaining: self.max_requests - entry.count,
            reset_after,
        }
    }

    /// Drop windows that have fully elapsed.
    pub fn purge_expired(&self) {
        self.purge_expired_at(Instant::now());
    }

    pub fn purge_expired_at(&self, now: Instant) {
        self.clients
            .retain(|_, w| now.duration_since(w.started_at) < self.window);
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    /// Peer address of the connection, or the first `X-Forwarded-For` hop
    /// when the deployment sits behind a trusted proxy.
    pub fn client_ip(&self, req: &Request) -> IpAddr {
        if self.trust_forwarded_for {
            let forwarded = req
                .headers()
                .get("x-forwarded-for")
                .and_then(|h| h.to_str().ok())
                .and_then(|h| h.split(',').next())
                .and_then(|ip| ip.trim().parse::<IpAddr>().ok());

            if let Some(ip) = forwarded {
                return ip;
            }
        }

        req.extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
    }
}

/// Background task purging elapsed windows
pub async fn purge_task(limiter: Arc<FixedWindowLimiter>, interval: Duration) {
    let mut purge_interval = tokio::time::interval(interval);
    purge_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        purge_interval.tick().await;
        limiter.purge_expired();
        debug!(clients = limiter.client_count(), "Purged rate limit windows");
    }
}

fn ceil_secs(duration: Duration) -> u64 {
    duration.as_millis().div_ceil(1000) as u64
}

pub async fn rate_limit_middleware(
    State(limiter): State<Arc<FixedWindowLimiter>>,
    req: Request,
    next: Next,
) -> Response {
    let ip = limiter.client_ip(&req);

    match limiter.check(ip) {
        Decision::Allowed {
            remaining,
            reset_after,
        } => {
            let mut response = next.run(req).await;
            let headers = response.headers_mut();
            headers.insert(
                HeaderName::from_static("ratelimit-limit"),
                HeaderValue::from(limiter.max_requests()),
            );
            headers.insert(
                HeaderName::from_static("ratelimit-remaining"),
                HeaderValue::from(remaining),
            );
            headers.insert(
                HeaderName::from_static("ratelimit-reset"),
                HeaderValue::from(ceil_secs(reset_after)),
            );
            response
        }
        Decision::Limited { retry_after } => {
            warn!(
                ip = %ip,
                retry_after_secs = ceil_secs(retry_after),
                "Rate limit exceeded"
            );
            ApiError::RateLimited {
                retry_after_secs: ceil_secs(retry_after),
            }
            .into_response()
        }
    }
}
