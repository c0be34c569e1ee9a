//! Rendering of cards, error images, and HTML pages.
//!
//! The success card sits behind [`CardRenderer`] so the pipeline never depends
//! on layout. Error surfaces live in [`error`]; which one a request receives is
//! decided by content negotiation.

pub mod card;
pub mod error;
pub mod error_svg;
pub mod pages;

use crate::params::RenderParams;
use crate::theme::Theme;
use crate::upstream::ProfileData;

pub use card::TrophyCard;
pub use error::{DebugContext, RenderedError, render_service_error};

/// Content type of every image this service returns.
pub const SVG_CONTENT_TYPE: &str = "image/svg+xml";

/// Content type of every HTML page this service returns.
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Turns profile data into card markup.
pub trait CardRenderer: Send + Sync {
    /// Render the card for `profile` using `params` and `theme`.
    fn render(&self, params: &RenderParams, profile: &ProfileData, theme: &Theme) -> String;
}

/// Escape text for use in SVG/XML content and attribute values.
pub fn escape_xml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}
