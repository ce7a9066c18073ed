//! HTTP middleware for the job board API.
//!
//! - [`LoginThrottle`] / [`throttle_logins`]: per-client budget on the
//!   credential endpoints, keyed on the peer address.
//! - [`api_security_headers`]: response hardening for a JSON-only API.
//! - [`hide_internal_errors`]: strips 500 details in production.
//! - [`cors_layer`], [`http_span`]: layer builders used by the router.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use axum::http::{Method, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use governor::clock::Clock;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{info_span, warn, Span};

use crate::error::{redacted_internal_error, ApiError};
use crate::metrics;

/// Once this many clients are tracked, idle buckets are dropped.
const MAX_TRACKED_CLIENTS: usize = 10_000;

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REQUEST_ID: &str = "x-request-id";

/// Per-client rate limit for signup and login.
pub struct LoginThrottle {
    limiter: DefaultKeyedRateLimiter<IpAddr>,
    trusted_proxies: Vec<IpAddr>,
}

impl LoginThrottle {
    /// `requests_per_second` of zero is treated as one.
    pub fn new(requests_per_second: u32, trusted_proxies: Vec<IpAddr>) -> Self {
        let per_second = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        Self {
            limiter: RateLimiter::keyed(Quota::per_second(per_second)),
            trusted_proxies,
        }
    }

    /// Spend one request from `client`'s budget, or return how long to wait.
    pub fn check(&self, client: IpAddr) -> Result<(), Duration> {
        let outcome = self
            .limiter
            .check_key(&client)
            .map_err(|not_until| not_until.wait_time_from(self.limiter.clock().now()));

        if self.limiter.len() > MAX_TRACKED_CLIENTS {
            self.limiter.retain_recent();
        }

        outcome
    }

    /// Who the request is from, for throttling purposes.
    ///
    /// The TCP peer, unless the peer is one of our own proxies; then the
    /// nearest `X-Forwarded-For` hop that isn't. A request with no known
    /// peer shares the unspecified-address bucket.
    pub fn client_ip(&self, peer: Option<IpAddr>, headers: &HeaderMap) -> IpAddr {
        let Some(peer) = peer else {
            return IpAddr::V4(Ipv4Addr::UNSPECIFIED);
        };
        if !self.trusted_proxies.contains(&peer) {
            return peer;
        }

        let hops: Vec<&str> = headers
            .get_all(X_FORWARDED_FOR)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(','))
            .map(str::trim)
            .collect();

        // Right to left: entries our proxies appended come last
        for hop in hops.into_iter().rev() {
            match hop.parse::<IpAddr>() {
                Ok(ip) if self.trusted_proxies.contains(&ip) => continue,
                Ok(ip) => return ip,
                Err(_) => break,
            }
        }
        peer
    }
}

/// Reject credential requests over the caller's budget with 429.
pub async fn throttle_logins(
    State(throttle): State<Arc<LoginThrottle>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let client = throttle.client_ip(peer, request.headers());

    if let Err(wait) = throttle.check(client) {
        warn!(client = %client, path = %request.uri().path(), "Login throttled");
        metrics::record_rate_limit_hit(request.uri().path());

        let retry_after = wait.as_secs_f64().ceil().max(1.0) as u64;
        let mut response = ApiError::RateLimited.into_response();
        response
            .headers_mut()
            .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
        return response;
    }

    next.run(request).await
}

/// Headers set on every response unless a handler already chose one.
const API_RESPONSE_HEADERS: [(HeaderName, &str); 5] = [
    (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (header::X_FRAME_OPTIONS, "DENY"),
    (header::CACHE_CONTROL, "no-store"),
    (header::REFERRER_POLICY, "no-referrer"),
    (
        header::CONTENT_SECURITY_POLICY,
        "default-src 'none'; frame-ancestors 'none'",
    ),
];

pub async fn api_security_headers(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    for (name, value) in API_RESPONSE_HEADERS {
        headers
            .entry(name)
            .or_insert_with(|| HeaderValue::from_static(value));
    }
    response
}

/// In production, replace any 500 body with a generic one.
pub async fn hide_internal_errors(
    State(production): State<bool>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let response = next.run(request).await;
    if production && response.status() == StatusCode::INTERNAL_SERVER_ERROR {
        return redacted_internal_error();
    }
    response
}

/// CORS for a bearer-token API: no cookies, so credentials stay off.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins.iter().filter_map(|o| HeaderValue::from_str(o).ok()))
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .expose_headers([HeaderName::from_static(X_REQUEST_ID), header::RETRY_AFTER])
        .max_age(Duration::from_secs(3600))
}

/// Span for one HTTP request, tagged with the id set by `SetRequestIdLayer`.
pub fn http_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");

    info_span!(
        "http",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
    )
}
