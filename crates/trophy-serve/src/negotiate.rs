//! Content negotiation: is the caller embedding an image or browsing a page?
//!
//! Image consumers (`<img>` tags, README proxies) treat any non-2xx response as
//! a broken image, so they must receive a 200 with an error drawn into an SVG.
//! Browsers get real status codes and an HTML page.

use axum::http::HeaderMap;
use axum::http::header::{ACCEPT, USER_AGENT};

/// The kind of client that made a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientType {
    /// Embeds the response as an image.
    Image,
    /// Navigates to the response as a page.
    Html,
    /// Gave no usable hint.
    Other,
}

impl ClientType {
    /// Whether errors must be drawn as an image with a 200 status.
    ///
    /// `Other` counts as an image consumer because the default artifact is an image.
    pub fn wants_image(self) -> bool {
        !matches!(self, Self::Html)
    }
}

/// Classify a request from its headers. First match wins:
///
/// 1. `Sec-Fetch-Dest: image`
/// 2. `Accept` mentions `image/`
/// 3. `User-Agent` looks like GitHub's image proxy, whose `Accept` is unreliable
/// 4. `Accept` mentions `text/html`
pub fn classify(headers: &HeaderMap) -> ClientType {
    let accept = header_lowercase(headers, ACCEPT.as_str());
    let fetch_dest = header_lowercase(headers, "sec-fetch-dest");
    let user_agent = header_lowercase(headers, USER_AGENT.as_str());

    if fetch_dest.trim() == "image" || accept.contains("image/") || is_github_image_proxy(&user_agent)
    {
        ClientType::Image
    } else if accept.contains("text/html") {
        ClientType::Html
    } else {
        ClientType::Other
    }
}

fn is_github_image_proxy(user_agent: &str) -> bool {
    user_agent.contains("github-camo")
        || (user_agent.contains("github") && user_agent.contains("image"))
}

fn header_lowercase(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase()
}
