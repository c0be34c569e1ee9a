//! Upstream profile source.
//!
//! [`UpstreamClient`] is the seam the pipeline depends on; [`GithubClient`]
//! implements it against the GitHub GraphQL API. Every failure is returned as
//! a classified [`ServiceError`] value.

use std::time::Duration;

use async_trait::async_trait;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::Config;
use crate::error::{ServiceError, ServiceErrorKind};

/// Profile data as returned by the upstream API.
///
/// Opaque to the pipeline; the only property it inspects is emptiness, which
/// means "not usable".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileData(Map<String, Value>);

impl ProfileData {
    /// Wrap a JSON object.
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// True when the object has no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// A top-level field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// A nested field addressed by a JSON pointer (e.g. `/followers/totalCount`).
    pub fn pointer(&self, pointer: &str) -> Option<&Value> {
        let path = pointer.strip_prefix('/')?;
        match path.split_once('/') {
            Some((head, rest)) => self.0.get(head)?.pointer(&format!("/{rest}")),
            None => self.0.get(path),
        }
    }
}

/// Source of truth for profile data.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Fetch the profile of `username`.
    async fn fetch_profile(&self, username: &str) -> Result<ProfileData, ServiceError>;
}

/// Fields the default card needs, fetched in one round trip.
const USER_QUERY: &str = r#"
query userInfo($username: String!) {
  user(login: $username) {
    createdAt
    contributionsCollection {
      totalCommitContributions
      restrictedContributionsCount
    }
    pullRequests(first: 1) { totalCount }
    issues(first: 1) { totalCount }
    followers(first: 1) { totalCount }
    repositories(first: 100, ownerAffiliations: OWNER, orderBy: {direction: DESC, field: STARGAZERS}) {
      totalCount
      nodes { stargazers { totalCount } }
    }
  }
}
"#;

#[derive(Debug, Serialize)]
struct GraphqlRequest<'a> {
    query: &'static str,
    variables: GraphqlVariables<'a>,
}

#[derive(Debug, Serialize)]
struct GraphqlVariables<'a> {
    username: &'a str,
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    #[serde(default)]
    data: Option<GraphqlData>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct GraphqlData {
    #[serde(default)]
    user: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// GitHub GraphQL client.
///
/// Tokens are tried in order; a rate-limit or auth failure on one token moves
/// on to the next, and the last outcome is returned.
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    endpoint: String,
    tokens: Vec<String>,
}

impl GithubClient {
    /// Create a client from configuration.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        Self::with_tokens(
            &config.github_api,
            config.github_tokens.clone(),
            config.upstream_timeout,
        )
    }

    /// Create a client for an explicit endpoint and token list.
    pub fn with_tokens(
        endpoint: &str,
        tokens: Vec<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("trophy-serve/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
            tokens,
        })
    }

    async fn query_with_token(
        &self,
        username: &str,
        token: &str,
    ) -> Result<ProfileData, ServiceError> {
        let body = GraphqlRequest {
            query: USER_QUERY,
            variables: GraphqlVariables { username },
        };

        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(username = %username, error = %e, "upstream request failed");
                ServiceError::new(ServiceErrorKind::NotFound)
            })?;

        if let Some(kind) = classify_status(resp.status()) {
            tracing::warn!(username = %username, status = %resp.status(), "upstream rejected request");
            return Err(kind.into());
        }

        let parsed: GraphqlResponse = resp.json().await.map_err(|e| {
            tracing::warn!(username = %username, error = %e, "upstream response undecodable");
            ServiceError::new(ServiceErrorKind::NotFound)
        })?;

        interpret_response(parsed).inspect_err(|err| {
            tracing::warn!(username = %username, error = %err, "upstream returned an error");
        })
    }
}

#[async_trait]
impl UpstreamClient for GithubClient {
    async fn fetch_profile(&self, username: &str) -> Result<ProfileData, ServiceError> {
        let mut outcome = Err(ServiceError::new(ServiceErrorKind::Unauthorized));

        for (index, token) in self.tokens.iter().enumerate() {
            outcome = self.query_with_token(username, token).await;
            match &outcome {
                Err(err)
                    if matches!(
                        err.cause,
                        ServiceErrorKind::RateLimit | ServiceErrorKind::Unauthorized
                    ) =>
                {
                    tracing::debug!(token_index = index, cause = ?err.cause, "trying next upstream token");
                }
                _ => break,
            }
        }

        outcome
    }
}

/// Map an HTTP status to an error kind, or `None` when the body should be read.
fn classify_status(status: StatusCode) -> Option<ServiceErrorKind> {
    match status {
        StatusCode::UNAUTHORIZED => Some(ServiceErrorKind::Unauthorized),
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => Some(ServiceErrorKind::RateLimit),
        s if s.is_success() => None,
        _ => Some(ServiceErrorKind::NotFound),
    }
}

fn interpret_response(resp: GraphqlResponse) -> Result<ProfileData, ServiceError> {
    if let Some(err) = resp.errors.first() {
        let kind = match err.kind.as_deref() {
            Some("RATE_LIMITED") => ServiceErrorKind::RateLimit,
            _ => ServiceErrorKind::NotFound,
        };
        tracing::debug!(kind = ?err.kind, message = ?err.message, "graphql error");
        return Err(kind.into());
    }

    resp.data
        .and_then(|d| d.user)
        .map(ProfileData::new)
        .ok_or_else(|| ServiceError::new(ServiceErrorKind::NotFound))
}
