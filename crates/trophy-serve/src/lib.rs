//! Trophy Serve - on-demand GitHub profile trophy cards.
//!
//! This crate provides a small HTTP service that renders a user's trophy card
//! as SVG. It is designed to be placed behind a CDN (or embedded in README
//! files through an image proxy) and relies on edge caching.
//!
//! # Architecture
//!
//! - **Params**: Parses the query string into typed render parameters
//! - **Cache**: Cache-aside profile lookups (`v1-<username>` keys) in front of the upstream API
//! - **Upstream**: GitHub GraphQL client returning classified errors as values
//! - **Negotiate**: Decides whether the caller embeds an image or browses a page
//! - **Render**: Success card, error SVGs for image consumers, HTML pages for browsers
//! - **Regenerate**: Default cache headers plus in-process reuse of rendered cards
//!
//! # URL Pattern
//!
//! ```text
//! GET /?username=USERNAME&theme=onedark&row=2&column=4&title=Stars,Followers
//! ```
//!
//! `/api` and `/api/` are accepted as aliases of `/`; every other path is a 404.

pub mod cache;
pub mod config;
pub mod error;
pub mod negotiate;
pub mod params;
pub mod regenerate;
pub mod render;
pub mod routes;
pub mod state;
pub mod theme;
pub mod upstream;

pub use config::Config;
pub use routes::router;
pub use state::AppState;
