//! Default trophy card.
//!
//! Derives a fixed set of trophies from the upstream profile, ranks each one,
//! applies the `title`/`rank` filters, and lays the survivors out on a
//! `row` x `column` grid of square panels.

use chrono::{DateTime, Utc};

use super::{CardRenderer, escape_xml};
use crate::params::RenderParams;
use crate::theme::Theme;
use crate::upstream::ProfileData;

/// Edge length of one trophy panel.
pub const PANEL_SIZE: f64 = 110.0;

/// Trophy rank, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rank {
    Sss,
    Ss,
    S,
    Aaa,
    Aa,
    A,
    B,
    C,
    Unknown,
}

impl Rank {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sss => "SSS",
            Self::Ss => "SS",
            Self::S => "S",
            Self::Aaa => "AAA",
            Self::Aa => "AA",
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::Unknown => "?",
        }
    }

    fn color(self, theme: &Theme) -> &'static str {
        match self {
            Self::Sss | Self::Ss => theme.rank_secret,
            Self::S => theme.rank_s,
            Self::Aaa | Self::Aa | Self::A => theme.rank_a,
            Self::B => theme.rank_b,
            Self::C | Self::Unknown => theme.rank_default,
        }
    }
}

const RANKS: [Rank; 8] = [
    Rank::Sss,
    Rank::Ss,
    Rank::S,
    Rank::Aaa,
    Rank::Aa,
    Rank::A,
    Rank::B,
    Rank::C,
];

/// One trophy kind: its title, unit, and rank thresholds (aligned with `RANKS`).
struct TrophyKind {
    title: &'static str,
    unit: &'static str,
    thresholds: [u64; 8],
}

const COMMITS: TrophyKind = TrophyKind {
    title: "Commits",
    unit: "Commits",
    thresholds: [4000, 2000, 1000, 500, 200, 100, 10, 1],
};
const STARS: TrophyKind = TrophyKind {
    title: "Stars",
    unit: "Stars",
    thresholds: [2000, 700, 200, 100, 50, 30, 10, 1],
};
const FOLLOWERS: TrophyKind = TrophyKind {
    title: "Followers",
    unit: "Followers",
    thresholds: [1000, 400, 200, 100, 50, 20, 10, 1],
};
const REPOSITORIES: TrophyKind = TrophyKind {
    title: "Repositories",
    unit: "Repos",
    thresholds: [128, 64, 32, 20, 15, 10, 5, 1],
};
const PULL_REQUESTS: TrophyKind = TrophyKind {
    title: "PullRequest",
    unit: "PRs",
    thresholds: [1000, 500, 200, 100, 50, 20, 10, 1],
};
const ISSUES: TrophyKind = TrophyKind {
    title: "Issues",
    unit: "Issues",
    thresholds: [1000, 500, 200, 100, 50, 20, 10, 1],
};
const EXPERIENCE: TrophyKind = TrophyKind {
    title: "Experience",
    unit: "Years",
    thresholds: [20, 15, 10, 7, 5, 3, 2, 1],
};

/// A ranked trophy ready to draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trophy {
    pub title: &'static str,
    pub unit: &'static str,
    pub value: u64,
    pub rank: Rank,
}

impl Trophy {
    fn new(kind: &TrophyKind, value: u64) -> Self {
        let rank = RANKS
            .iter()
            .zip(kind.thresholds)
            .find(|(_, threshold)| value >= *threshold)
            .map(|(rank, _)| *rank)
            .unwrap_or(Rank::Unknown);

        Self {
            title: kind.title,
            unit: kind.unit,
            value,
            rank,
        }
    }
}

fn count(profile: &ProfileData, pointer: &str) -> u64 {
    profile
        .pointer(pointer)
        .and_then(|v| v.as_u64())
        .unwrap_or(0)
}

fn total_stars(profile: &ProfileData) -> u64 {
    profile
        .pointer("/repositories/nodes")
        .and_then(|v| v.as_array())
        .map(|nodes| {
            nodes
                .iter()
                .filter_map(|n| n.pointer("/stargazers/totalCount").and_then(|v| v.as_u64()))
                .sum()
        })
        .unwrap_or(0)
}

fn account_years(profile: &ProfileData, now: DateTime<Utc>) -> u64 {
    profile
        .get("createdAt")
        .and_then(|v| v.as_str())
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|created| (now - created.with_timezone(&Utc)).num_days().max(0) as u64 / 365)
        .unwrap_or(0)
}

/// Every trophy the profile earns, in display order.
pub fn trophies(profile: &ProfileData, now: DateTime<Utc>) -> Vec<Trophy> {
    let commits = count(profile, "/contributionsCollection/totalCommitContributions")
        + count(profile, "/contributionsCollection/restrictedContributionsCount");

    vec![
        Trophy::new(&COMMITS, commits),
        Trophy::new(&STARS, total_stars(profile)),
        Trophy::new(&FOLLOWERS, count(profile, "/followers/totalCount")),
        Trophy::new(&REPOSITORIES, count(profile, "/repositories/totalCount")),
        Trophy::new(&PULL_REQUESTS, count(profile, "/pullRequests/totalCount")),
        Trophy::new(&ISSUES, count(profile, "/issues/totalCount")),
        Trophy::new(&EXPERIENCE, account_years(profile, now)),
    ]
}

/// Keep trophies matching `filters`.
///
/// Plain entries form an allow-list (empty means allow all); entries prefixed
/// with `-` exclude. Blank entries are ignored.
fn matches_filters(value: &str, filters: &[String]) -> bool {
    let mut allowed = Vec::new();
    for filter in filters.iter().filter(|f| !f.is_empty()) {
        match filter.strip_prefix('-') {
            Some(excluded) if excluded.eq_ignore_ascii_case(value) => return false,
            Some(_) => {}
            None => allowed.push(filter),
        }
    }
    allowed.is_empty() || allowed.iter().any(|f| f.eq_ignore_ascii_case(value))
}

/// The built-in [`CardRenderer`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TrophyCard;

impl TrophyCard {
    /// Render against an explicit clock.
    pub fn render_at(
        &self,
        params: &RenderParams,
        profile: &ProfileData,
        theme: &Theme,
        now: DateTime<Utc>,
    ) -> String {
        let capacity = (params.row_count as usize).saturating_mul(params.column_count as usize);
        let selected: Vec<Trophy> = trophies(profile, now)
            .into_iter()
            .filter(|t| matches_filters(t.title, &params.title_filters))
            .filter(|t| matches_filters(t.rank.label(), &params.rank_filters))
            .take(capacity)
            .collect();

        let columns = selected.len().min(params.column_count as usize);
        let rows = if columns == 0 {
            0
        } else {
            selected.len().div_ceil(columns)
        };

        let step_x = PANEL_SIZE + params.margin_width;
        let step_y = PANEL_SIZE + params.padding_height;
        let width = span(columns, PANEL_SIZE, params.margin_width);
        let height = span(rows, PANEL_SIZE, params.padding_height);

        let mut svg = String::with_capacity(1024 + selected.len() * 768);
        svg.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}" fill="none">"#
        ));

        for (i, trophy) in selected.iter().enumerate() {
            let x = (i % columns.max(1)) as f64 * step_x;
            let y = (i / columns.max(1)) as f64 * step_y;
            svg.push_str(&panel(trophy, x, y, theme, params));
        }

        svg.push_str("</svg>");
        svg
    }
}

impl CardRenderer for TrophyCard {
    fn render(&self, params: &RenderParams, profile: &ProfileData, theme: &Theme) -> String {
        self.render_at(params, profile, theme, Utc::now())
    }
}

fn span(count: usize, size: f64, gap: f64) -> f64 {
    if count == 0 {
        0.0
    } else {
        count as f64 * size + (count - 1) as f64 * gap
    }
}

fn panel(trophy: &Trophy, x: f64, y: f64, theme: &Theme, params: &RenderParams) -> String {
    let background = if params.suppress_background {
        "none"
    } else {
        theme.background
    };
    let stroke = if params.suppress_frame {
        "none"
    } else {
        "#E4E2E2"
    };
    let rank_color = trophy.rank.color(theme);
    let center = PANEL_SIZE / 2.0;

    format!(
        r##"<g transform="translate({x},{y})"><rect x="0.5" y="0.5" rx="4.5" width="{inner}" height="{inner}" fill="{background}" stroke="{stroke}"/><circle cx="{center}" cy="38" r="24" fill="{icon}" stroke="{laurel}" stroke-width="3"/><text x="{center}" y="38" text-anchor="middle" dominant-baseline="central" font-family="Segoe UI,Helvetica,Arial,sans-serif" font-weight="bold" font-size="16" fill="{rank_color}">{rank}</text><text x="{center}" y="80" text-anchor="middle" font-family="Segoe UI,Helvetica,Arial,sans-serif" font-weight="bold" font-size="13" fill="{title_color}">{title}</text><text x="{center}" y="97" text-anchor="middle" font-family="Segoe UI,Helvetica,Arial,sans-serif" font-size="10.5" fill="{text_color}">{value} {unit}</text></g>"##,
        inner = PANEL_SIZE - 1.0,
        icon = theme.icon_circle,
        laurel = theme.laurel,
        rank = escape_xml(trophy.rank.label()),
        title_color = theme.title,
        title = escape_xml(trophy.title),
        text_color = theme.text,
        value = trophy.value,
        unit = escape_xml(trophy.unit),
    )
}
