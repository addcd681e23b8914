//! Shared HTTP utilities for gateway implementations.

use std::time::Duration;

use http::header::{HeaderMap, HeaderValue, IF_NONE_MATCH};

use crate::github::rate_limit::RateLimitInfo;

/// Poll interval applied when the server omits `X-Poll-Interval` or sends an
/// unparseable value. GitHub documents 60 seconds as the feed minimum; the
/// fallback keeps a header-stripping proxy from turning the loop into a
/// busy-wait.
pub(super) const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

pub(super) fn build_conditional_headers(cache_token: Option<&str>) -> Option<HeaderMap> {
    let token = cache_token?;
    let value = token.parse().ok()?;

    let mut headers = HeaderMap::new();
    headers.insert(IF_NONE_MATCH, value);
    Some(headers)
}

pub(super) fn header_to_string(header_value: Option<&HeaderValue>) -> Option<String> {
    header_value
        .and_then(|raw| raw.to_str().ok())
        .map(ToOwned::to_owned)
}

/// Reads the server-dictated minimum poll interval, in whole seconds.
///
/// The value is authoritative: servers may raise it at any time to slow a
/// client down, and the session schedules exactly what it is told.
pub(super) fn poll_interval_from_headers(headers: &HeaderMap) -> Duration {
    header_to_string(headers.get("x-poll-interval"))
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .map_or(DEFAULT_POLL_INTERVAL, Duration::from_secs)
}

fn numeric_header<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    header_to_string(headers.get(name)).and_then(|raw| raw.trim().parse().ok())
}

/// Extracts rate limit details from response headers, when all are present.
pub(super) fn rate_limit_from_headers(headers: &HeaderMap) -> Option<RateLimitInfo> {
    let limit = numeric_header(headers, "x-ratelimit-limit")?;
    let remaining = numeric_header(headers, "x-ratelimit-remaining")?;
    let reset_at = numeric_header(headers, "x-ratelimit-reset")?;
    Some(RateLimitInfo::new(limit, remaining, reset_at))
}

pub(super) fn extract_github_message(body: &str) -> Option<String> {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return None;
    };
    value
        .get("message")
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned)
}
