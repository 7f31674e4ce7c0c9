//! Fixed-window request limiting keyed by client address.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::{header, StatusCode};
use actix_web::middleware::Next;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};

use crate::configuration::RateLimitSettings;

/// Above this many tracked clients, expired windows are swept on insert.
const PURGE_THRESHOLD: usize = 1024;

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    /// `None` when the window is too long to represent as an `Instant`.
    reset_at: Option<Instant>,
}

impl Window {
    fn is_open(&self, now: Instant) -> bool {
        self.reset_at.map_or(true, |reset_at| now <= reset_at)
    }
}

pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    trust_forwarded_headers: bool,
    clients: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            trust_forwarded_headers: false,
            clients: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_settings(settings: &RateLimitSettings) -> Self {
        Self::new(settings.max_requests, settings.window())
            .trust_forwarded_headers(settings.trust_forwarded_headers)
    }

    /// Key clients on the proxy-appended forwarding hop rather than the peer.
    pub fn trust_forwarded_headers(mut self, trust: bool) -> Self {
        self.trust_forwarded_headers = trust;
        self
    }

    /// Record a request from `key` and report whether it may proceed.
    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    pub fn check_at(&self, key: &str, now: Instant) -> bool {
        // A poisoned map only holds counters, so keep using it.
        let mut clients = match self.clients.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        match clients.get_mut(key) {
            Some(window) if window.is_open(now) => {
                if window.count >= self.max_requests {
                    return false;
                }
                window.count += 1;
                true
            }
            _ => {
                if clients.len() >= PURGE_THRESHOLD {
                    clients.retain(|_, window| window.is_open(now));
                }
                clients.insert(
                    key.to_string(),
                    Window {
                        count: 1,
                        reset_at: now.checked_add(self.window),
                    },
                );
                true
            }
        }
    }

    /// Drop every client whose window has elapsed at `now`.
    pub fn purge_expired(&self, now: Instant) {
        let mut clients = match self.clients.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        clients.retain(|_, window| window.is_open(now));
    }

    pub fn tracked_clients(&self) -> usize {
        match self.clients.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    /// Identify the caller of `request` under this limiter's trust setting.
    pub fn client_key(&self, request: &HttpRequest) -> String {
        let forwarded = if self.trust_forwarded_headers {
            forwarded_client(request)
        } else {
            None
        };
        forwarded
            .or_else(|| request.peer_addr().map(|peer| peer.ip().to_string()))
            .unwrap_or_else(|| "unknown".to_string())
    }
}

#[derive(thiserror::Error, Debug)]
#[error("Too many requests. Please try again later.")]
pub struct RateLimitExceeded;

impl ResponseError for RateLimitExceeded {
    fn status_code(&self) -> StatusCode {
        StatusCode::TOO_MANY_REQUESTS
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .json(serde_json::json!({ "error": self.to_string() }))
    }
}

/// Reject callers that exhausted their window before the handler runs.
pub async fn enforce_rate_limit(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, actix_web::Error> {
    if let Some(limiter) = req.app_data::<web::Data<RateLimiter>>() {
        let key = limiter.client_key(req.request());
        if !limiter.check(&key) {
            tracing::warn!(client = %key, "Rate limit exceeded");
            return Err(RateLimitExceeded.into());
        }
    }
    next.call(req).await
}

/// The hop appended by the nearest proxy: the rightmost `X-Forwarded-For`
/// entry, else the last `for=` of `Forwarded`.
fn forwarded_client(request: &HttpRequest) -> Option<String> {
    let headers = request.headers();
    let from_x_forwarded_for = headers
        .get_all("x-forwarded-for")
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .last()
        .map(str::trim)
        .filter(|hop| !hop.is_empty())
        .map(|hop| strip_port(hop).to_string());
    if from_x_forwarded_for.is_some() {
        return from_x_forwarded_for;
    }

    headers
        .get_all(header::FORWARDED)
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(|c: char| c == ',' || c == ';'))
        .filter_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            name.trim()
                .eq_ignore_ascii_case("for")
                .then(|| value.trim())
        })
        .last()
        .map(strip_port)
        .filter(|hop| !hop.is_empty())
        .map(str::to_string)
}

/// Reduce a forwarded node to its bare address: no quotes, port or brackets.
fn strip_port(addr: &str) -> &str {
    let addr = addr.trim().trim_matches('"');
    if let Ok(socket) = addr.parse::<std::net::SocketAddr>() {
        // `[::1]:8080` and `1.2.3.4:8080` both carry a port.
        return match socket {
            std::net::SocketAddr::V4(_) => addr.rsplit_once(':').map_or(addr, |(ip, _)| ip),
            std::net::SocketAddr::V6(_) => addr
                .rsplit_once(':')
                .map_or(addr, |(ip, _)| ip.trim_start_matches('[').trim_end_matches(']')),
        };
    }
    addr.trim_start_matches('[').trim_end_matches(']')
}
