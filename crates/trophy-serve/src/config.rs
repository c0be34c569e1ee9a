//! Application configuration loaded from environment variables.

use std::time::Duration;

/// Browser cache lifetime for rendered cards, in seconds.
pub const CACHE_MAX_AGE: u32 = 18_800;

/// Shared (CDN) cache lifetime for rendered cards, in seconds.
pub const CDN_CACHE_MAX_AGE: u32 = 86_400;

/// Window during which a stale card may be served while it is regenerated.
pub const STALE_WHILE_REVALIDATE: u32 = 86_400;

/// How long a rendered card is reused in-process before regeneration.
pub const REVALIDATE_SECS: u64 = 3_600;

/// Default GitHub GraphQL endpoint.
pub const DEFAULT_GITHUB_API: &str = "https://api.github.com/graphql";

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g., "0.0.0.0:8080").
    pub bind_addr: String,

    /// Expose debug context (username, credential presence) on error surfaces.
    pub debug: bool,

    /// Username used when the request does not name one.
    pub default_username: Option<String>,

    /// Always render `default_username`, ignoring `?username=`.
    pub force_default_username: bool,

    /// Upstream credentials, tried in order.
    pub github_tokens: Vec<String>,

    /// Whether `GITHUB_TOKEN1` itself is set (reported in debug context).
    pub github_token1_set: bool,

    /// GraphQL endpoint of the upstream API.
    pub github_api: String,

    /// Timeout for a single upstream request.
    pub upstream_timeout: Duration,

    /// Maximum number of profiles kept in the in-process store.
    pub cache_capacity: u64,

    /// Time-to-live of a profile in the in-process store.
    pub cache_ttl: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            debug: false,
            default_username: None,
            force_default_username: false,
            github_tokens: Vec::new(),
            github_token1_set: false,
            github_api: DEFAULT_GITHUB_API.to_string(),
            upstream_timeout: Duration::from_secs(10),
            cache_capacity: 10_000,
            cache_ttl: Duration::from_secs(14_400),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - None (a missing credential surfaces as an auth error on first use)
    ///
    /// Optional:
    /// - `TROPHY_BIND_ADDR`: Server bind address (default: "0.0.0.0:8080")
    /// - `DEBUG`: `true` to include debug context in error responses
    /// - `DEFAULT_USERNAME`: Fallback username
    /// - `FORCE_DEFAULT_USERNAME`: `true` to always use `DEFAULT_USERNAME`
    /// - `GITHUB_TOKEN1`, `GITHUB_TOKEN2`: Upstream API tokens
    /// - `GITHUB_API`: GraphQL endpoint (default: GitHub's public API)
    /// - `UPSTREAM_TIMEOUT_SECS`: Upstream timeout (default: 10)
    /// - `CACHE_CAPACITY`: Profile store capacity (default: 10000)
    /// - `CACHE_TTL_SECS`: Profile store TTL (default: 14400)
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let bind_addr = std::env::var("TROPHY_BIND_ADDR").unwrap_or(defaults.bind_addr);

        let debug_enabled = is_true(std::env::var("DEBUG").ok().as_deref());

        let default_username = std::env::var("DEFAULT_USERNAME")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let force_default_username =
            is_true(std::env::var("FORCE_DEFAULT_USERNAME").ok().as_deref());

        let token = |key: &str| {
            std::env::var(key)
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        let token1 = token("GITHUB_TOKEN1");
        let github_token1_set = token1.is_some();
        let github_tokens: Vec<String> = token1.into_iter().chain(token("GITHUB_TOKEN2")).collect();

        let github_api = std::env::var("GITHUB_API")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.github_api);

        let upstream_timeout = match std::env::var("UPSTREAM_TIMEOUT_SECS") {
            Ok(v) => Duration::from_secs(v.trim().parse().map_err(|e| {
                anyhow::anyhow!("UPSTREAM_TIMEOUT_SECS must be a whole number of seconds: {e}")
            })?),
            Err(_) => defaults.upstream_timeout,
        };

        let cache_capacity = match std::env::var("CACHE_CAPACITY") {
            Ok(v) => v
                .trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("CACHE_CAPACITY must be a positive integer: {e}"))?,
            Err(_) => defaults.cache_capacity,
        };

        let cache_ttl = match std::env::var("CACHE_TTL_SECS") {
            Ok(v) => Duration::from_secs(v.trim().parse().map_err(|e| {
                anyhow::anyhow!("CACHE_TTL_SECS must be a whole number of seconds: {e}")
            })?),
            Err(_) => defaults.cache_ttl,
        };

        tracing::info!(
            bind_addr = %bind_addr,
            debug = debug_enabled,
            default_username = ?default_username,
            force_default_username,
            github_token1_set,
            token_count = github_tokens.len(),
            github_api = %github_api,
            cache_capacity,
            cache_ttl_secs = cache_ttl.as_secs(),
            "trophy configuration loaded"
        );

        Ok(Self {
            bind_addr,
            debug: debug_enabled,
            default_username,
            force_default_username,
            github_tokens,
            github_token1_set,
            github_api,
            upstream_timeout,
            cache_capacity,
            cache_ttl,
        })
    }

    /// Whether the primary upstream credential (`GITHUB_TOKEN1`) is configured.
    pub fn has_github_token(&self) -> bool {
        self.github_token1_set
    }
}

/// Interpret an environment flag: `true` in any case, surrounding whitespace ignored.
fn is_true(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}
