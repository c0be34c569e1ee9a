//! The card pipeline.
//!
//! Handles `GET /` (and its aliases):
//! 1. Resolves the username (explicit, configured default, or forced default)
//! 2. Serves the usage page when none resolves
//! 3. Fetches the profile through the cache-aside fetcher
//! 4. Renders the card, or an error surface chosen by content negotiation

use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};

use crate::negotiate;
use crate::params::{QueryParams, RenderParams, resolve_username};
use crate::render::{self, DebugContext, HTML_CONTENT_TYPE, SVG_CONTENT_TYPE, pages};
use crate::state::AppState;

/// Render the trophy card for the requested user.
pub async fn card_handler(State(state): State<AppState>, headers: HeaderMap, uri: Uri) -> Response {
    let query = QueryParams::from_uri(&uri);

    let Some(username) = resolve_username(query.get("username"), &state.config) else {
        let base = format!("{}/", public_origin(&headers, &uri));
        tracing::debug!(base = %base, "no username resolved, serving usage page");
        return (
            StatusCode::BAD_REQUEST,
            [(header::CONTENT_TYPE, HTML_CONTENT_TYPE)],
            pages::usage_page(&base),
        )
            .into_response();
    };

    let params = RenderParams::from_query(&query, username, &state.themes);

    match state.fetcher.fetch(&params.username).await {
        Ok(profile) => {
            let theme = state.themes.get(&params.theme);
            let svg = state.renderer.render(&params, &profile, theme);
            build_response(svg)
        }
        Err(error) => {
            let client = negotiate::classify(&headers);
            tracing::warn!(
                username = %params.username,
                cause = ?error.cause,
                client = ?client,
                "profile fetch failed"
            );

            let debug = state.config.debug.then(|| DebugContext {
                username: params.username.clone(),
                token_present: state.config.has_github_token(),
            });

            render::render_service_error(&error, client, &params.username, debug.as_ref())
                .into_response()
        }
    }
}

/// Build the success response. Cache policy comes from the regeneration layer.
fn build_response(svg: String) -> Response {
    let mut headers = HeaderMap::new();

    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(SVG_CONTENT_TYPE),
    );
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );

    // ETag (xxHash of content)
    let hash = xxhash_rust::xxh3::xxh3_64(svg.as_bytes());
    let etag = format!("\"{}\"", hex_fmt::HexFmt(&hash.to_be_bytes()));
    if let Ok(val) = HeaderValue::from_str(&etag) {
        headers.insert(header::ETAG, val);
    }

    (StatusCode::OK, headers, svg).into_response()
}

/// Public origin of this service as seen by the client, e.g. `https://host`.
///
/// Prefers proxy headers, then `Host`, then the request URI.
pub fn public_origin(headers: &HeaderMap, uri: &Uri) -> String {
    let host = first_value(headers, "x-forwarded-host")
        .or_else(|| first_value(headers, header::HOST.as_str()))
        .or_else(|| uri.authority().map(|a| a.to_string()))
        .unwrap_or_else(|| "localhost".to_string());

    let proto = first_value(headers, "x-forwarded-proto")
        .or_else(|| uri.scheme_str().map(str::to_string))
        .unwrap_or_else(|| "http".to_string());

    format!("{proto}://{host}")
}

/// First comma-separated value of a header, trimmed.
fn first_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)?
        .to_str()
        .ok()?
        .split(',')
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_prefers_forwarded_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https, http"));
        headers.insert(
            "x-forwarded-host",
            HeaderValue::from_static(" trophy.example.com , internal"),
        );
        headers.insert(header::HOST, HeaderValue::from_static("10.0.0.1:8080"));

        assert_eq!(
            public_origin(&headers, &Uri::from_static("/")),
            "https://trophy.example.com"
        );
    }

    #[test]
    fn origin_falls_back_to_host() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("localhost:8080"));
        assert_eq!(
            public_origin(&headers, &Uri::from_static("/")),
            "http://localhost:8080"
        );
    }

    #[test]
    fn origin_falls_back_to_uri() {
        let uri = Uri::from_static("https://cards.example.org/?username=x");
        assert_eq!(
            public_origin(&HeaderMap::new(), &uri),
            "https://cards.example.org"
        );
    }

    #[test]
    fn success_response_has_etag_and_type() {
        let response = build_response("<svg/>".to_string());
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/svg+xml");
        let etag = response.headers()[header::ETAG].to_str().unwrap();
        assert!(etag.starts_with('"') && etag.ends_with('"'));
        assert_eq!(etag.len(), 18);
    }
}
