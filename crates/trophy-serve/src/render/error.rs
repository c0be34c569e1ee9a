//! Rendering of upstream failures for a negotiated client type.
//!
//! | cause | HTML status | image |
//! |-------|-------------|-------|
//! | `BadRequest` | 400 | 200, generic error line |
//! | `Unauthorized` | 401 | 200, "auth failed" line |
//! | `RateLimit` | 419 | 200, "rate limit exceeded" line |
//! | `NotFound` | 404 | 200, "user not found" line |
//!
//! Image consumers always get a 200 so the error stays visible instead of a
//! broken-image icon. Every error surface is `no-store`.

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};

use super::error_svg::render_error_svg;
use super::pages::service_error_page;
use super::{HTML_CONTENT_TYPE, SVG_CONTENT_TYPE};
use crate::error::{ServiceError, ServiceErrorKind};
use crate::negotiate::ClientType;

/// Extra detail shown on error surfaces when debugging is enabled.
///
/// Must only be constructed when the debug flag is on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugContext {
    /// The username that failed.
    pub username: String,
    /// Whether an upstream credential is configured (never its value).
    pub token_present: bool,
}

/// A fully rendered error response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedError {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: String,
}

impl IntoResponse for RenderedError {
    fn into_response(self) -> Response {
        let headers = [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static(self.content_type),
            ),
            (header::CACHE_CONTROL, HeaderValue::from_static("no-store")),
        ];

        (self.status, headers, self.body).into_response()
    }
}

/// Render `error` for `client`.
///
/// `username` is always shown on image cards; `debug` adds credential
/// presence and is `None` unless debugging is enabled.
pub fn render_service_error(
    error: &ServiceError,
    client: ClientType,
    username: &str,
    debug: Option<&DebugContext>,
) -> RenderedError {
    if client.wants_image() {
        let mut lines = vec![format!("username: {username}")];
        lines.push(
            match error.cause {
                ServiceErrorKind::Unauthorized => "GitHub API auth failed. Check GITHUB_TOKEN1.",
                ServiceErrorKind::RateLimit => "GitHub API rate limit exceeded. Try later.",
                ServiceErrorKind::NotFound | ServiceErrorKind::BadRequest => {
                    "User not found or GitHub API error."
                }
            }
            .to_string(),
        );
        if let Some(ctx) = debug {
            lines.push(format!("GITHUB_TOKEN1 set: {}", ctx.token_present));
        }

        RenderedError {
            status: StatusCode::OK,
            content_type: SVG_CONTENT_TYPE,
            body: render_error_svg(&error.to_string(), &lines),
        }
    } else {
        RenderedError {
            status: error.status(),
            content_type: HTML_CONTENT_TYPE,
            body: service_error_page(error, debug).into_string(),
        }
    }
}
