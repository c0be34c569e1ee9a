//! Error cards drawn as SVG, for clients that embed the response as an image.

use super::escape_xml;

const WIDTH: u32 = 900;
const LINE_HEIGHT: u32 = 22;
const PADDING_TOP: u32 = 44;
const PADDING_BOTTOM: u32 = 24;
const MIN_HEIGHT: u32 = 120;

/// Font family strings (sans single quotes that confuse `format!`).
const TITLE_FONT: &str = "ui-sans-serif, system-ui, -apple-system, Segoe UI, Roboto, Helvetica, Arial";
const BODY_FONT: &str = "ui-monospace, SFMono-Regular, Menlo, Monaco, Consolas, Liberation Mono, Courier New, monospace";

/// Render an error card with a red title and one monospace line per entry.
pub fn render_error_svg(title: &str, lines: &[String]) -> String {
    let line_count = u32::try_from(lines.len()).unwrap_or(u32::MAX);
    let height = MIN_HEIGHT.max(
        PADDING_TOP
            .saturating_add(line_count.saturating_mul(LINE_HEIGHT))
            .saturating_add(PADDING_BOTTOM),
    );

    let mut svg = String::with_capacity(1024);

    svg.push_str(&format!(
        r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">
  <style>
    .bg {{ fill: #0d1117; }}
    .border {{ fill: none; stroke: #30363d; stroke-width: 1; }}
    .title {{ fill: #f85149; font: 700 18px {title_font}; }}
    .body {{ fill: #c9d1d9; font: 14px {body_font}; }}
  </style>
  <rect x="0" y="0" width="{w}" height="{h}" rx="10" class="bg"/>
  <rect x="0.5" y="0.5" width="{bw}" height="{bh}" rx="10" class="border"/>
  <text x="32" y="28" class="title">{title}</text>
  "##,
        w = WIDTH,
        h = height,
        bw = WIDTH - 1,
        bh = height - 1,
        title_font = TITLE_FONT,
        body_font = BODY_FONT,
        title = escape_xml(title),
    ));

    for (i, line) in lines.iter().enumerate() {
        let y = PADDING_TOP as usize + i * LINE_HEIGHT as usize;
        svg.push_str(&format!(
            r#"<text x="32" y="{y}" class="body">{}</text>"#,
            escape_xml(line)
        ));
    }

    svg.push_str("\n</svg>");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_title_and_lines() {
        let svg = render_error_svg(
            "401 - Unauthorized",
            &["username: octocat".to_string(), "auth failed".to_string()],
        );
        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains(">401 - Unauthorized</text>"));
        assert!(svg.contains(r#"<text x="32" y="44" class="body">username: octocat</text>"#));
        assert!(svg.contains(r#"<text x="32" y="66" class="body">auth failed</text>"#));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn height_has_a_floor() {
        let svg = render_error_svg("404 - Not Found", &[]);
        assert!(svg.contains(r#"width="900" height="120""#));
    }

    #[test]
    fn height_grows_with_lines() {
        let lines: Vec<String> = (0..5).map(|i| format!("line {i}")).collect();
        let svg = render_error_svg("t", &lines);
        // 44 + 5 * 22 + 24
        assert!(svg.contains(r#"height="178""#));
    }

    #[test]
    fn user_input_is_escaped() {
        let svg = render_error_svg("x", &["username: <script>".to_string()]);
        assert!(svg.contains("username: &lt;script&gt;"));
        assert!(!svg.contains("<script>"));
    }
}
