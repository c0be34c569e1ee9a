//! Edge-cache regeneration policy, applied as middleware around the card route.
//!
//! The policy does two things:
//!
//! - Merges default headers (content type, a long `Cache-Control` with
//!   `stale-while-revalidate`) onto every response. A header the handler set
//!   itself is never overwritten, so `no-store` on error surfaces always wins.
//! - Keeps successful, cacheable responses in-process for the revalidation
//!   window, keyed by path and query, so repeated requests skip the pipeline.

use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use moka::future::Cache;

use crate::config::{CACHE_MAX_AGE, CDN_CACHE_MAX_AGE, REVALIDATE_SECS, STALE_WHILE_REVALIDATE};
use crate::render::SVG_CONTENT_TYPE;

/// Largest response body kept in the regeneration cache.
const MAX_CACHED_BODY: usize = 4 * 1024 * 1024;

/// Capacity of the regeneration cache (rendered cards are a few KB each).
const RENDERED_CAPACITY: u64 = 10_000;

/// `Cache-Control` value for successful cards.
pub fn cache_control_value() -> String {
    format!(
        "public, max-age={CACHE_MAX_AGE}, s-maxage={CDN_CACHE_MAX_AGE}, stale-while-revalidate={STALE_WHILE_REVALIDATE}"
    )
}

/// Headers every card response carries unless the handler says otherwise.
pub fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(SVG_CONTENT_TYPE),
    );
    if let Ok(value) = HeaderValue::from_str(&cache_control_value()) {
        headers.insert(header::CACHE_CONTROL, value);
    }
    headers
}

/// A response kept for reuse.
#[derive(Clone, Debug)]
struct RenderedResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    cached_at: chrono::DateTime<chrono::Utc>,
}

impl IntoResponse for RenderedResponse {
    fn into_response(self) -> Response {
        (self.status, self.headers, self.body).into_response()
    }
}

/// Regeneration policy state for [`regenerate`].
#[derive(Clone)]
pub struct Regeneration {
    headers: Arc<HeaderMap>,
    rendered: Cache<String, RenderedResponse>,
}

impl Regeneration {
    /// A policy reusing responses for `revalidate` and merging `headers`.
    pub fn new(revalidate: Duration, headers: HeaderMap) -> Self {
        let rendered = Cache::builder()
            .max_capacity(RENDERED_CAPACITY)
            .time_to_live(revalidate)
            .build();

        Self {
            headers: Arc::new(headers),
            rendered,
        }
    }

    /// Merge the default headers onto `response` without replacing any it set.
    fn merge_headers(&self, mut response: Response) -> Response {
        let target = response.headers_mut();
        for (name, value) in self.headers.iter() {
            if !target.contains_key(name) {
                target.insert(name.clone(), value.clone());
            }
        }
        response
    }
}

impl Default for Regeneration {
    fn default() -> Self {
        Self::new(Duration::from_secs(REVALIDATE_SECS), default_headers())
    }
}

/// Whether a response may be reused from the regeneration cache.
fn is_reusable(response: &Response) -> bool {
    if !response.status().is_success() {
        return false;
    }

    let cache_control = response
        .headers()
        .get(header::CACHE_CONTROL)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    !["no-store", "no-cache", "private"]
        .iter()
        .any(|directive| cache_control.contains(directive))
}

/// Middleware applying a [`Regeneration`] policy to the wrapped handler.
pub async fn regenerate(
    State(policy): State<Regeneration>,
    request: Request,
    next: Next,
) -> Response {
    let key = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    if let Some(cached) = policy.rendered.get(&key).await {
        tracing::debug!(key = %key, cached_at = %cached.cached_at, "rendered response reused");
        return cached.into_response();
    }

    let response = policy.merge_headers(next.run(request).await);
    if !is_reusable(&response) {
        return response;
    }

    let (parts, body) = response.into_parts();
    match axum::body::to_bytes(body, MAX_CACHED_BODY).await {
        Ok(bytes) => {
            let entry = RenderedResponse {
                status: parts.status,
                headers: parts.headers.clone(),
                body: bytes.clone(),
                cached_at: chrono::Utc::now(),
            };
            policy.rendered.insert(key, entry).await;
            Response::from_parts(parts, Body::from(bytes))
        }
        Err(e) => {
            tracing::error!(key = %key, error = %e, "failed to buffer rendered response");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [
                    (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
                    (header::CACHE_CONTROL, "no-store"),
                ],
                "Internal Server Error",
            )
                .into_response()
        }
    }
}
