//! Typed request parameters.
//!
//! [`QueryParams`] wraps the raw query string; [`RenderParams`] is the
//! immutable, validated view the pipeline and card renderer work with.

use axum::extract::Query;
use axum::http::Uri;

use crate::config::Config;
use crate::theme::ThemeTable;

/// Default number of trophy rows.
pub const DEFAULT_MAX_ROW: u32 = 3;

/// Default number of trophy columns.
pub const DEFAULT_MAX_COLUMN: u32 = 8;

/// Default horizontal spacing between panels.
pub const DEFAULT_MARGIN_W: f64 = 0.0;

/// Default vertical spacing between panels.
pub const DEFAULT_MARGIN_H: f64 = 0.0;

/// Raw query-string pairs, in request order.
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Parse the query string of `uri`. Malformed input yields no parameters.
    pub fn from_uri(uri: &Uri) -> Self {
        match Query::<Vec<(String, String)>>::try_from_uri(uri) {
            Ok(Query(pairs)) => Self { pairs },
            Err(e) => {
                tracing::debug!(error = %e, "ignoring malformed query string");
                Self::default()
            }
        }
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Every value for `key`, in order.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Non-negative integer value, or `default` when absent or unparsable.
    pub fn get_count(&self, key: &str, default: u32) -> u32 {
        self.get(key)
            .and_then(parse_number)
            .map(|n| n.clamp(0.0, f64::from(u32::MAX)) as u32)
            .unwrap_or(default)
    }

    /// Numeric value, or `default` when absent or unparsable.
    pub fn get_number(&self, key: &str, default: f64) -> f64 {
        self.get(key)
            .and_then(parse_number)
            .unwrap_or(default)
    }

    /// Boolean value: `true` (any case) is true, anything else present is false.
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            Some(v) => v.trim().eq_ignore_ascii_case("true"),
            None => default,
        }
    }

    /// Values of a repeatable list field, each split on commas and trimmed.
    pub fn get_list(&self, key: &str) -> Vec<String> {
        self.get_all(key)
            .flat_map(|v| v.split(','))
            .map(|s| s.trim().to_string())
            .collect()
    }
}

/// Parse the whole trimmed value; trailing garbage (`4px`) is rejected.
fn parse_number(value: &str) -> Option<f64> {
    let value = value.trim();
    value
        .parse::<i64>()
        .map(|n| n as f64)
        .or_else(|_| value.parse::<f64>().map(f64::trunc))
        .ok()
        .filter(|n| n.is_finite())
}

/// Pick the username to render.
///
/// With `force_default_username` set and a default configured, the default
/// wins over any explicit value. Otherwise an explicit, non-blank value is
/// used, then the configured default.
pub fn resolve_username(explicit: Option<&str>, config: &Config) -> Option<String> {
    let explicit = explicit.map(str::trim).filter(|s| !s.is_empty());
    let default = config.default_username.as_deref();

    match (config.force_default_username, default, explicit) {
        (true, Some(d), _) => Some(d.to_string()),
        (_, _, Some(e)) => Some(e.to_string()),
        (_, Some(d), None) => Some(d.to_string()),
        _ => None,
    }
}

/// Everything needed to render a card for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderParams {
    pub username: String,
    pub row_count: u32,
    pub column_count: u32,
    /// A key known to the theme table.
    pub theme: String,
    pub margin_width: f64,
    pub padding_height: f64,
    pub suppress_background: bool,
    pub suppress_frame: bool,
    pub title_filters: Vec<String>,
    pub rank_filters: Vec<String>,
}

impl RenderParams {
    /// Build render parameters for an already-resolved username.
    pub fn from_query(query: &QueryParams, username: String, themes: &ThemeTable) -> Self {
        let theme = themes
            .resolve_key(query.get("theme").unwrap_or_default())
            .to_string();

        Self {
            username,
            row_count: query.get_count("row", DEFAULT_MAX_ROW),
            column_count: query.get_count("column", DEFAULT_MAX_COLUMN),
            theme,
            margin_width: query.get_number("margin-w", DEFAULT_MARGIN_W),
            padding_height: query.get_number("margin-h", DEFAULT_MARGIN_H),
            suppress_background: query.get_bool("no-bg", false),
            suppress_frame: query.get_bool("no-frame", false),
            title_filters: query.get_list("title"),
            rank_filters: query.get_list("rank"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::DEFAULT_THEME;

    fn query(q: &str) -> QueryParams {
        let uri: Uri = format!("/?{q}").parse().unwrap();
        QueryParams::from_uri(&uri)
    }

    fn config(default: Option<&str>, force: bool) -> Config {
        Config {
            default_username: default.map(str::to_string),
            force_default_username: force,
            ..Config::default()
        }
    }

    #[test]
    fn defaults_when_query_is_empty() {
        let params = RenderParams::from_query(
            &QueryParams::from_uri(&Uri::from_static("/")),
            "octocat".to_string(),
            &ThemeTable::builtin(),
        );
        assert_eq!(params.row_count, DEFAULT_MAX_ROW);
        assert_eq!(params.column_count, DEFAULT_MAX_COLUMN);
        assert_eq!(params.theme, DEFAULT_THEME);
        assert_eq!(params.margin_width, 0.0);
        assert!(!params.suppress_background);
        assert!(!params.suppress_frame);
        assert!(params.title_filters.is_empty());
    }

    #[test]
    fn parses_all_fields() {
        let q = query(
            "username=octocat&row=2&column=4&theme=nord&margin-w=15&margin-h=7.5&no-bg=true&no-frame=TRUE",
        );
        let params = RenderParams::from_query(&q, "octocat".to_string(), &ThemeTable::builtin());
        assert_eq!(params.row_count, 2);
        assert_eq!(params.column_count, 4);
        assert_eq!(params.theme, "nord");
        assert_eq!(params.margin_width, 15.0);
        assert_eq!(params.padding_height, 7.0);
        assert!(params.suppress_background);
        assert!(params.suppress_frame);
    }

    #[test]
    fn unknown_theme_falls_back() {
        let q = query("theme=sparkles");
        let params = RenderParams::from_query(&q, "octocat".to_string(), &ThemeTable::builtin());
        assert_eq!(params.theme, DEFAULT_THEME);
    }

    #[test]
    fn list_fields_are_flattened_and_trimmed() {
        let q = query("title=Stars,%20Followers&title=Commits&rank=S&rank=%20A%20,B");
        assert_eq!(q.get_list("title"), vec!["Stars", "Followers", "Commits"]);
        assert_eq!(q.get_list("rank"), vec!["S", "A", "B"]);
    }

    #[test]
    fn bad_numbers_use_defaults_and_negatives_clamp() {
        let q = query("row=lots&column=-3&margin-w=wide");
        assert_eq!(q.get_count("row", 3), 3);
        assert_eq!(q.get_count("column", 8), 0);
        assert_eq!(q.get_number("margin-w", 0.0), 0.0);
    }

    #[test]
    fn numbers_with_units_use_defaults() {
        let q = query("row=4px&margin-h=2.5em");
        assert_eq!(q.get_count("row", 3), 3);
        assert_eq!(q.get_number("margin-h", 1.0), 1.0);
    }

    #[test]
    fn explicit_username_is_trimmed() {
        let cfg = config(None, false);
        assert_eq!(
            resolve_username(Some("  octocat "), &cfg).as_deref(),
            Some("octocat")
        );
        assert_eq!(resolve_username(Some("   "), &cfg), None);
        assert_eq!(resolve_username(None, &cfg), None);
    }

    #[test]
    fn default_username_fills_in() {
        let cfg = config(Some("torvalds"), false);
        assert_eq!(resolve_username(None, &cfg).as_deref(), Some("torvalds"));
        assert_eq!(
            resolve_username(Some("other"), &cfg).as_deref(),
            Some("other")
        );
    }

    #[test]
    fn forced_default_overrides_explicit() {
        let cfg = config(Some("torvalds"), true);
        assert_eq!(
            resolve_username(Some("other"), &cfg).as_deref(),
            Some("torvalds")
        );
    }

    #[test]
    fn force_without_default_keeps_explicit() {
        let cfg = config(None, true);
        assert_eq!(
            resolve_username(Some("other"), &cfg).as_deref(),
            Some("other")
        );
    }
}
