//! Color themes for trophy cards.
//!
//! The table is built once and handed to [`crate::state::AppState`]; lookups
//! never fail and fall back to the `default` theme.

use std::collections::HashMap;

/// Key of the theme used when none (or an unknown one) is requested.
pub const DEFAULT_THEME: &str = "default";

/// Colors used to draw a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub background: &'static str,
    pub title: &'static str,
    pub text: &'static str,
    pub icon_circle: &'static str,
    pub laurel: &'static str,
    pub rank_secret: &'static str,
    pub rank_s: &'static str,
    pub rank_a: &'static str,
    pub rank_b: &'static str,
    pub rank_default: &'static str,
    pub next_rank_bar: &'static str,
}

const DEFAULT: Theme = Theme {
    background: "#FFF",
    title: "#000",
    text: "#666",
    icon_circle: "#FFF",
    laurel: "#09D3AC",
    rank_secret: "#FF45F2",
    rank_s: "#FAD200",
    rank_a: "#B0B0B0",
    rank_b: "#A18D66",
    rank_default: "#777",
    next_rank_bar: "#0366D6",
};

const FLAT: Theme = Theme {
    background: "#FFF",
    title: "#000",
    text: "#666",
    icon_circle: "#FFF",
    laurel: "#09D3AC",
    rank_secret: "#FF45F2",
    rank_s: "#EB5454",
    rank_a: "#C0C0C0",
    rank_b: "#A18D66",
    rank_default: "#777",
    next_rank_bar: "#0366D6",
};

const ONEDARK: Theme = Theme {
    background: "#282C34",
    title: "#E5C17C",
    text: "#E06C75",
    icon_circle: "#FFF",
    laurel: "#98C379",
    rank_secret: "#C678DD",
    rank_s: "#E5C17C",
    rank_a: "#98C379",
    rank_b: "#61AFEF",
    rank_default: "#ABB2BF",
    next_rank_bar: "#E5C17C",
};

const GRUVBOX: Theme = Theme {
    background: "#282828",
    title: "#458588",
    text: "#EBDBB2",
    icon_circle: "#FFF",
    laurel: "#B8BB26",
    rank_secret: "#D3869B",
    rank_s: "#FABD2F",
    rank_a: "#A89984",
    rank_b: "#D65D0E",
    rank_default: "#928374",
    next_rank_bar: "#458588",
};

const DRACULA: Theme = Theme {
    background: "#282A36",
    title: "#FF79C6",
    text: "#F8F8F2",
    icon_circle: "#FFF",
    laurel: "#50FA7B",
    rank_secret: "#BD93F9",
    rank_s: "#F1FA8C",
    rank_a: "#8BE9FD",
    rank_b: "#FFB86C",
    rank_default: "#6272A4",
    next_rank_bar: "#FF79C6",
};

const NORD: Theme = Theme {
    background: "#2E3440",
    title: "#88C0D0",
    text: "#D8DEE9",
    icon_circle: "#FFF",
    laurel: "#A3BE8C",
    rank_secret: "#B48EAD",
    rank_s: "#EBCB8B",
    rank_a: "#81A1C1",
    rank_b: "#D08770",
    rank_default: "#4C566A",
    next_rank_bar: "#88C0D0",
};

const DARKHUB: Theme = Theme {
    background: "#0D1117",
    title: "#C9D1D9",
    text: "#8B949E",
    icon_circle: "#FFF",
    laurel: "#3FB950",
    rank_secret: "#DB61A2",
    rank_s: "#D29922",
    rank_a: "#8B949E",
    rank_b: "#A5714B",
    rank_default: "#484F58",
    next_rank_bar: "#58A6FF",
};

/// Named themes available to requests.
#[derive(Debug, Clone)]
pub struct ThemeTable {
    themes: HashMap<&'static str, Theme>,
}

impl ThemeTable {
    /// The built-in theme set.
    pub fn builtin() -> Self {
        let themes = HashMap::from([
            (DEFAULT_THEME, DEFAULT),
            ("flat", FLAT),
            ("onedark", ONEDARK),
            ("gruvbox", GRUVBOX),
            ("dracula", DRACULA),
            ("nord", NORD),
            ("darkhub", DARKHUB),
        ]);
        Self { themes }
    }

    /// Whether `name` is a known theme key.
    pub fn contains(&self, name: &str) -> bool {
        self.themes.contains_key(name)
    }

    /// Resolve a requested key to a known one, falling back to [`DEFAULT_THEME`].
    pub fn resolve_key<'a>(&self, name: &'a str) -> &'a str {
        if self.contains(name) { name } else { DEFAULT_THEME }
    }

    /// Colors for `name`, or the default theme when unknown.
    pub fn get(&self, name: &str) -> &Theme {
        self.themes
            .get(name)
            .or_else(|| self.themes.get(DEFAULT_THEME))
            .unwrap_or(&DEFAULT)
    }
}

impl Default for ThemeTable {
    fn default() -> Self {
        Self::builtin()
    }
}
