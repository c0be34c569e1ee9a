//! Route definitions for the trophy service.
//!
//! ## Routes
//!
//! - `GET /`, `GET /api`, `GET /api/` - Trophy card (see [`card`])
//!
//! Every other path is a plain-text 404 that is never cached.

pub mod card;

use axum::Router;
use axum::http::{StatusCode, header};
use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::get;

use crate::regenerate::{Regeneration, regenerate};
use crate::state::AppState;

/// Paths that serve the card. Some platforms invoke the function on `/api`.
pub const ROOT_ALIASES: [&str; 3] = ["/", "/api", "/api/"];

/// Build the router with the default regeneration policy.
pub fn router(state: AppState) -> Router {
    router_with_policy(state, Regeneration::default())
}

/// Build the router with an explicit regeneration policy.
pub fn router_with_policy(state: AppState, policy: Regeneration) -> Router {
    let mut routes = Router::new();
    for path in ROOT_ALIASES {
        routes = routes.route(path, get(card::card_handler));
    }

    routes
        .route_layer(middleware::from_fn_with_state(policy, regenerate))
        .fallback(not_found)
        .with_state(state)
}

/// Anything outside the root aliases.
async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::CACHE_CONTROL, "no-store"),
        ],
        "Not Found",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use axum::response::Response;
    use serde_json::json;
    use tower::ServiceExt;

    use crate::cache::{CacheStore, MemoryStore};
    use crate::config::Config;
    use crate::error::{CacheError, ServiceError, ServiceErrorKind};
    use crate::regenerate::cache_control_value;
    use crate::render::TrophyCard;
    use crate::upstream::{ProfileData, UpstreamClient};

    struct FakeUpstream {
        result: Result<ProfileData, ServiceError>,
        requested: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl UpstreamClient for FakeUpstream {
        async fn fetch_profile(&self, username: &str) -> Result<ProfileData, ServiceError> {
            self.requested.lock().unwrap().push(username.to_string());
            self.result.clone()
        }
    }

    struct CountingStore {
        inner: MemoryStore,
        writes: AtomicUsize,
    }

    #[async_trait]
    impl CacheStore for CountingStore {
        async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: String) -> Result<(), CacheError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.set(key, value).await
        }
    }

    struct Harness {
        app: Router,
        upstream: Arc<FakeUpstream>,
        store: Arc<CountingStore>,
    }

    fn profile() -> ProfileData {
        serde_json::from_value(json!({
            "createdAt": "2011-01-25T18:44:36Z",
            "followers": { "totalCount": 42 },
            "repositories": { "totalCount": 8, "nodes": [] }
        }))
        .unwrap()
    }

    fn harness(config: Config, result: Result<ProfileData, ServiceError>) -> Harness {
        let upstream = Arc::new(FakeUpstream {
            result,
            requested: Mutex::new(Vec::new()),
        });
        let store = Arc::new(CountingStore {
            inner: MemoryStore::new(100, std::time::Duration::from_secs(60)),
            writes: AtomicUsize::new(0),
        });
        let state = AppState::with_parts(
            config,
            store.clone(),
            upstream.clone(),
            Arc::new(TrophyCard),
        );

        Harness {
            app: router(state),
            upstream,
            store,
        }
    }

    async fn send(app: &Router, uri: &str, headers: &[(&str, &str)]) -> Response {
        let mut builder = Request::builder().uri(uri);
        for (k, v) in headers {
            builder = builder.header(*k, *v);
        }
        app.clone()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn non_root_paths_are_plain_404() {
        let h = harness(Config::default(), Ok(profile()));
        let response = send(&h.app, "/favicon.ico", &[]).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
        assert!(h.upstream.requested.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn success_card_with_default_headers() {
        let h = harness(Config::default(), Ok(profile()));
        let response = send(&h.app, "/?username=octocat", &[]).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/svg+xml");
        assert_eq!(
            response.headers()[header::CACHE_CONTROL],
            cache_control_value().as_str()
        );
        assert!(response.headers().contains_key(header::ETAG));
        assert!(body_string(response).await.starts_with("<svg"));
    }

    #[tokio::test]
    async fn api_aliases_serve_the_card() {
        let h = harness(Config::default(), Ok(profile()));
        for path in ["/api?username=octocat", "/api/?username=octocat"] {
            let response = send(&h.app, path, &[]).await;
            assert_eq!(response.status(), StatusCode::OK, "{path}");
        }
    }

    #[tokio::test]
    async fn repeated_requests_fetch_upstream_once() {
        let h = harness(Config::default(), Ok(profile()));

        send(&h.app, "/?username=octocat", &[]).await;
        send(&h.app, "/?username=octocat&theme=nord", &[]).await;

        assert_eq!(h.upstream.requested.lock().unwrap().len(), 1);
        assert_eq!(h.store.writes.load(Ordering::SeqCst), 1);

        let raw = h.store.get("v1-octocat").await.unwrap().unwrap();
        let cached: ProfileData = serde_json::from_str(&raw).unwrap();
        assert_eq!(cached, profile());
    }

    #[tokio::test]
    async fn missing_username_serves_usage_page() {
        let h = harness(Config::default(), Ok(profile()));
        let response = send(&h.app, "/", &[("host", "trophy.test")]).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/html; charset=utf-8"
        );
        assert_eq!(
            response.headers()[header::CACHE_CONTROL],
            cache_control_value().as_str()
        );
        let body = body_string(response).await;
        assert!(body.contains("<form"));
        assert!(body.contains("http://trophy.test/"));
        assert!(h.upstream.requested.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_username_counts_as_missing() {
        let h = harness(Config::default(), Ok(profile()));
        let response = send(&h.app, "/?username=%20%20", &[]).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn forced_default_username_wins() {
        let config = Config {
            default_username: Some("torvalds".to_string()),
            force_default_username: true,
            ..Config::default()
        };
        let h = harness(config, Ok(profile()));

        let response = send(&h.app, "/?username=other", &[]).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(*h.upstream.requested.lock().unwrap(), vec!["torvalds"]);
    }

    #[tokio::test]
    async fn default_username_fills_missing_param() {
        let config = Config {
            default_username: Some("torvalds".to_string()),
            ..Config::default()
        };
        let h = harness(config, Ok(profile()));

        let response = send(&h.app, "/", &[]).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(*h.upstream.requested.lock().unwrap(), vec!["torvalds"]);
    }

    #[tokio::test]
    async fn unauthorized_for_image_clients_is_200_svg() {
        let h = harness(
            Config::default(),
            Err(ServiceErrorKind::Unauthorized.into()),
        );
        let response = send(
            &h.app,
            "/?username=octocat",
            &[("user-agent", "github-camo (abc)"), ("accept", "*/*")],
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/svg+xml");
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
        let body = body_string(response).await;
        assert!(body.contains("401"));
        assert!(body.contains("auth failed"));
        assert!(!body.contains("GITHUB_TOKEN1 set"));
        assert_eq!(h.store.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unauthorized_for_browsers_is_401_html() {
        let h = harness(
            Config::default(),
            Err(ServiceErrorKind::Unauthorized.into()),
        );
        let response = send(&h.app, "/?username=octocat", &[("accept", "text/html")]).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/html; charset=utf-8"
        );
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
    }

    #[tokio::test]
    async fn errors_are_retried_not_reused() {
        let h = harness(Config::default(), Err(ServiceErrorKind::NotFound.into()));

        send(&h.app, "/?username=ghost", &[]).await;
        send(&h.app, "/?username=ghost", &[]).await;

        assert_eq!(h.upstream.requested.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn debug_context_only_when_enabled() {
        let config = Config {
            debug: true,
            ..Config::default()
        };
        let h = harness(config, Err(ServiceErrorKind::NotFound.into()));
        let response = send(&h.app, "/?username=ghost", &[("accept", "text/html")]).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_string(response).await;
        assert!(body.contains("Debug"));
        assert!(body.contains("ghost"));

        let h = harness(Config::default(), Err(ServiceErrorKind::NotFound.into()));
        let response = send(&h.app, "/?username=ghost", &[("accept", "text/html")]).await;
        assert!(!body_string(response).await.contains("Debug"));
    }

    #[tokio::test]
    async fn debug_reports_primary_token_only() {
        let config = Config {
            debug: true,
            github_tokens: vec!["ghp_two".to_string()],
            github_token1_set: false,
            ..Config::default()
        };
        let h = harness(config, Err(ServiceErrorKind::NotFound.into()));
        let response = send(&h.app, "/?username=ghost", &[("sec-fetch-dest", "image")]).await;

        let body = body_string(response).await;
        assert!(body.contains("GITHUB_TOKEN1 set: false"));

        let config = Config {
            debug: true,
            github_tokens: vec!["ghp_one".to_string()],
            github_token1_set: true,
            ..Config::default()
        };
        let h = harness(config, Err(ServiceErrorKind::NotFound.into()));
        let response = send(&h.app, "/?username=ghost", &[("sec-fetch-dest", "image")]).await;
        assert!(body_string(response).await.contains("GITHUB_TOKEN1 set: true"));
    }

    #[tokio::test]
    async fn unknown_theme_still_renders() {
        let h = harness(Config::default(), Ok(profile()));
        let response = send(&h.app, "/?username=octocat&theme=does-not-exist", &[]).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
