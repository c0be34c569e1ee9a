//! Application state shared across all request handlers.
//!
//! Every collaborator is constructed here and injected; nothing in the
//! request path reaches for process-wide globals.

use std::sync::Arc;

use crate::cache::{CacheStore, MemoryStore, ProfileFetcher};
use crate::config::Config;
use crate::render::{CardRenderer, TrophyCard};
use crate::theme::ThemeTable;
use crate::upstream::{GithubClient, UpstreamClient};

/// Shared application state available to all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<Config>,

    /// Cache-aside access to upstream profiles.
    pub fetcher: ProfileFetcher,

    /// Success card renderer.
    pub renderer: Arc<dyn CardRenderer>,

    /// Known color themes.
    pub themes: Arc<ThemeTable>,
}

impl AppState {
    /// Create the production state: in-process profile store, GitHub client,
    /// default trophy card, built-in themes.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let store = MemoryStore::new(config.cache_capacity, config.cache_ttl);
        let upstream = GithubClient::new(&config)?;

        tracing::info!(
            cache_capacity = config.cache_capacity,
            cache_ttl_secs = config.cache_ttl.as_secs(),
            upstream = %config.github_api,
            "application state initialized"
        );

        Ok(Self::with_parts(
            config,
            Arc::new(store),
            Arc::new(upstream),
            Arc::new(TrophyCard),
        ))
    }

    /// Assemble state from explicit collaborators.
    pub fn with_parts(
        config: Config,
        store: Arc<dyn CacheStore>,
        upstream: Arc<dyn UpstreamClient>,
        renderer: Arc<dyn CardRenderer>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            fetcher: ProfileFetcher::new(store, upstream),
            renderer,
            themes: Arc::new(ThemeTable::builtin()),
        }
    }
}
