//! HTML pages for browsers: the usage page and upstream error pages.
//!
//! All dynamic values are escaped by maud.

use maud::{DOCTYPE, Markup, PreEscaped, html};

use super::error::DebugContext;
use crate::error::{ServiceError, ServiceErrorKind};

/// Inline CSS shared by every page.
pub const PAGE_CSS: &str = r#"
*{margin:0;padding:0;box-sizing:border-box}
body{font-family:-apple-system,BlinkMacSystemFont,"Segoe UI",Roboto,sans-serif;display:flex;justify-content:center;align-items:center;min-height:100vh;background:#fafafa;color:#1a1a2e;padding:1rem}
.error-page{max-width:560px;width:100%}
.error-page h1{font-size:1.5rem;margin-bottom:.75rem}
.error-page h2{font-size:1.05rem;margin:1.25rem 0 .5rem}
.error-page p{color:#666;margin-bottom:1rem;line-height:1.5}
.error-page a{color:#6c5ce7}
.error-page code{font-family:ui-monospace,SFMono-Regular,Menlo,monospace;font-size:.9em}
.base-url{display:flex;align-items:center;gap:.5rem;margin:.5rem 0 1rem}
.base-url p{margin:0;font-family:ui-monospace,SFMono-Regular,Menlo,monospace;word-break:break-all}
.debug{margin-top:1rem;padding:.75rem;border-radius:6px;background:rgba(108,92,231,.08);font-size:.9rem}
form{display:flex;flex-direction:column;gap:.5rem}
input{padding:.4rem .6rem;border:1px solid #ccc;border-radius:4px}
button{padding:.4rem .8rem;border:0;border-radius:4px;background:#6c5ce7;color:#fff;cursor:pointer}
@media(prefers-color-scheme:dark){
body{background:#0f0f17;color:#e0e0e8}
.error-page p{color:#aaa}
.error-page a{color:#a29bfe}
input{background:#1a1a26;color:#e0e0e8;border-color:#333}
}
"#;

/// Copies the base URL to the clipboard.
const COPY_SCRIPT: &str = r##"
const button = document.querySelector("#copy-base");
const temporarySpan = document.querySelector("#temporary-span");
button.addEventListener("click", () => {
  navigator.clipboard.writeText(document.querySelector("#base-show").textContent);
  temporarySpan.textContent = "Copied!";
  setTimeout(() => { temporarySpan.textContent = ""; }, 1500);
});
"##;

const THEMES_URL: &str = "https://github.com/ryo-ma/github-profile-trophy?tab=readme-ov-file#apply-theme";

fn page(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                meta name="robots" content="noindex";
                style { (PreEscaped(PAGE_CSS)) }
            }
            body {
                main class="error-page" { (content) }
            }
        }
    }
}

/// The page shown when no username can be resolved.
///
/// `base` is the public URL of this service, including the trailing slash.
pub fn usage_page(base: &str) -> Markup {
    let content = html! {
        h1 { "400 - Bad Request" }
        section {
            h2 { "\"username\" is a required query parameter" }
            p { "The URL should look like" }
            div class="base-url" {
                p id="base-show" { (base) "?username=USERNAME" }
                button id="copy-base" type="button" { "Copy Base Url" }
                span id="temporary-span" {}
            }
            p {
                "where " code { "USERNAME" } " is " em { "your GitHub username." }
            }
        }
        section {
            h2 { "You can use this form:" }
            p { "Enter your username and click get trophies" }
            form action=(base) method="get" {
                label for="username" { "GitHub Username" }
                input type="text" name="username" id="username" placeholder="Ex. gabriel-logan" required;
                label for="theme" { "Theme (Optional)" }
                input type="text" name="theme" id="theme" placeholder="Ex. onedark" value="default";
                span {
                    "See all the available themes "
                    a href=(THEMES_URL) target="_blank" { "here" }
                }
                button type="submit" { "Get Trophies" }
            }
        }
        script { (PreEscaped(COPY_SCRIPT)) }
    };

    page("Bad Request", content)
}

/// The page shown to browsers when the upstream fetch failed.
pub fn service_error_page(error: &ServiceError, debug: Option<&DebugContext>) -> Markup {
    let heading = format!("{} - {}", error.code, error.name);

    let content = html! {
        h1 { (heading) }
        @match error.cause {
            ServiceErrorKind::Unauthorized => {
                p {
                    "GitHub API authorization failed. Set a valid "
                    code { "GITHUB_TOKEN1" }
                    " environment variable on your deployment."
                }
            }
            ServiceErrorKind::RateLimit => {
                p { "The GitHub API rate limit has been exceeded. Please try again later." }
            }
            ServiceErrorKind::NotFound => {
                p { "Sorry, the user you are looking for was not found." }
                @if let Some(ctx) = debug {
                    (debug_block(ctx))
                }
            }
            ServiceErrorKind::BadRequest => {
                p { "The request could not be understood." }
            }
        }
    };

    page(&heading, content)
}

fn debug_block(ctx: &DebugContext) -> Markup {
    html! {
        div class="debug" {
            strong { "Debug" }
            br;
            "username: " code { (ctx.username) }
            br;
            "GITHUB_TOKEN1 set: " code { (ctx.token_present.to_string()) }
        }
        div class="debug" {
            "Tips: verify the username exists at "
            code { "https://github.com/" (ctx.username) }
            ". If the token is missing or invalid, set "
            code { "GITHUB_TOKEN1" }
            " on your deployment and redeploy."
        }
    }
}
