use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use axum::{
    extract::{Request, State},
    http::{header::RETRY_AFTER, HeaderMap, HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

const RATE_LIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
const RATE_LIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
const RATE_LIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

/// Expired client windows are swept at most this often.
const SWEEP_INTERVAL_SECS: u64 = 5 * 60;

#[derive(Debug, Clone, Copy)]
struct ClientWindow {
    /// Unix seconds, a multiple of the window length.
    started_at: u64,
    count: usize,
}

#[derive(Debug)]
struct RateLimitTable {
    clients: HashMap<String, ClientWindow>,
    last_sweep: u64,
}

/// Per-client fixed-window limiter.
///
/// Windows are aligned to multiples of the window length, so every client's
/// window resets at the same instant.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    max_requests: usize,
    window_secs: u64,
    table: Arc<Mutex<RateLimitTable>>,
}

/// Result of counting one request against its client's window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: usize,
    pub remaining: usize,
    /// Unix seconds at which the current window ends.
    pub reset_at: u64,
    /// Seconds until the window ends, at least 1.
    pub retry_after: u64,
}

impl RateLimitState {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window_secs: window.as_secs().max(1),
            table: Arc::new(Mutex::new(RateLimitTable {
                clients: HashMap::new(),
                last_sweep: 0,
            })),
        }
    }

    /// Counts a request from `client` at unix time `now` and reports whether
    /// it may proceed. Blocked requests do not consume budget.
    pub async fn check(&self, client: &str, now: u64) -> RateLimitDecision {
        let window_start = now - now % self.window_secs;
        let reset_at = window_start + self.window_secs;

        let mut table = self.table.lock().await;

        if now.saturating_sub(table.last_sweep) >= SWEEP_INTERVAL_SECS {
            let window_secs = self.window_secs;
            table
                .clients
                .retain(|_, w| w.started_at + window_secs > now);
            table.last_sweep = now;
        }

        let entry = table
            .clients
            .entry(client.to_owned())
            .or_insert(ClientWindow {
                started_at: window_start,
                count: 0,
            });
        if entry.started_at != window_start {
            *entry = ClientWindow {
                started_at: window_start,
                count: 0,
            };
        }

        let allowed = entry.count < self.max_requests;
        if allowed {
            entry.count += 1;
        }
        let remaining = self.max_requests.saturating_sub(entry.count);
        drop(table);

        RateLimitDecision {
            allowed,
            limit: self.max_requests,
            remaining,
            reset_at,
            retry_after: (reset_at - now).max(1),
        }
    }

    #[cfg(test)]
    async fn tracked_clients(&self) -> usize {
        self.table.lock().await.clients.len()
    }
}

#[derive(Debug, Serialize)]
struct MiddlewareErrorBody {
    success: bool,
    error: MiddlewareError,
}

#[derive(Debug, Serialize)]
struct MiddlewareError {
    code: &'static str,
    message: &'static str,
}

/// Axum middleware that extracts or generates a request ID.
///
/// If the incoming request has an `x-request-id` header, that value is used.
/// Otherwise a new `UUIDv4` is generated. The ID is:
/// - Inserted into request extensions as [`RequestId`]
/// - Set on the response as the `x-request-id` header
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// Middleware enforcing the per-client request-per-window limit.
///
/// Every response carries `X-RateLimit-*` headers; a blocked request gets a
/// 429 with `Retry-After`.
pub async fn enforce_rate_limit(
    State(rate_limit): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    let client = client_id(req.headers());
    let decision = rate_limit.check(&client, unix_now()).await;

    let mut res = if decision.allowed {
        next.run(req).await
    } else {
        tracing::warn!(client = %client, "rate limit exceeded");
        let mut res = (
            StatusCode::TOO_MANY_REQUESTS,
            Json(MiddlewareErrorBody {
                success: false,
                error: MiddlewareError {
                    code: "rate_limited",
                    message: "too many requests; please try again later",
                },
            }),
        )
            .into_response();
        res.headers_mut()
            .insert(RETRY_AFTER, HeaderValue::from(decision.retry_after));
        res
    };

    let headers = res.headers_mut();
    headers.insert(RATE_LIMIT_LIMIT, HeaderValue::from(decision.limit));
    headers.insert(RATE_LIMIT_REMAINING, HeaderValue::from(decision.remaining));
    headers.insert(RATE_LIMIT_RESET, HeaderValue::from(decision.reset_at));
    res
}

/// Identifies the caller: first `x-forwarded-for` entry, then `x-real-ip`,
/// then `"unknown"`.
fn client_id(headers: &HeaderMap) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    header("x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or_else(|| header("x-real-ip"))
        .unwrap_or("unknown")
        .to_owned()
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}
