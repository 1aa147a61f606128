//! Rate Limiting Middleware
//!
//! Fixed-window request budget per client IP, applied in front of both
//! HTTP surfaces. Over-budget requests get a 429 with the usual envelope.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::error::KvError;

#[derive(Debug)]
struct Window {
    count: u32,
    started_at: Instant,
}

// == Rate Limiter ==
/// Shared fixed-window counter, one window per client IP.
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    clients: Mutex<HashMap<IpAddr, Window>>,
}

impl RateLimiter {
    // == Constructor ==
    /// Allows `max_requests` per `window_ms` milliseconds per client.
    pub fn new(max_requests: u32, window_ms: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_millis(window_ms),
            clients: Mutex::new(HashMap::new()),
        }
    }

    // == Check ==
    /// Counts a request against `ip`'s window; returns whether it fits.
    pub fn check(&self, ip: IpAddr) -> bool {
        let mut clients = self.clients.lock().expect("rate limiter poisoned");
        let now = Instant::now();
        let window = clients.entry(ip).or_insert(Window {
            count: 0,
            started_at: now,
        });

        if now.duration_since(window.started_at) >= self.window {
            window.count = 0;
            window.started_at = now;
        }

        window.count += 1;
        window.count <= self.max_requests
    }
}

// == Middleware ==
/// Axum middleware enforcing the limiter.
///
/// The client IP comes from `ConnectInfo`; harnesses that drive the
/// router without a socket (tests) fall back to one shared bucket.
pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));

    if !limiter.check(ip) {
        warn!(%ip, "rate limit exceeded");
        return KvError::RateLimited.into_response();
    }
    next.run(request).await
}
