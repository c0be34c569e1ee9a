//! Error types for the trophy service.
//!
//! Upstream failures are plain values ([`ServiceError`]) that every caller
//! branches on explicitly; they are rendered by [`crate::render::error`]
//! according to the negotiated client type and are never cached.

use axum::http::StatusCode;

/// Classification of an upstream failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceErrorKind {
    /// The request itself was unusable.
    BadRequest,
    /// The upstream credential is missing or was rejected.
    Unauthorized,
    /// The upstream rate limit is exhausted.
    RateLimit,
    /// The user does not exist, or the upstream call failed in a way we
    /// cannot classify further.
    NotFound,
}

impl ServiceErrorKind {
    /// HTTP status code reported for this kind.
    ///
    /// Rate limiting uses the non-standard 419, which browsers and CDNs
    /// pass through untouched.
    pub const fn code(self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::Unauthorized => 401,
            Self::RateLimit => 419,
            Self::NotFound => 404,
        }
    }

    /// Short human-readable name shown next to the code.
    pub const fn name(self) -> &'static str {
        match self {
            Self::BadRequest => "Bad Request",
            Self::Unauthorized => "Unauthorized",
            Self::RateLimit => "Rate Limit Exceeded",
            Self::NotFound => "Not Found",
        }
    }
}

/// A classified upstream outcome.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code} - {name}")]
pub struct ServiceError {
    /// What went wrong.
    pub cause: ServiceErrorKind,
    /// HTTP status code associated with `cause`.
    pub code: u16,
    /// Display name associated with `cause`.
    pub name: &'static str,
}

impl ServiceError {
    /// Build the error for a kind, filling in its code and name.
    pub const fn new(cause: ServiceErrorKind) -> Self {
        Self {
            cause,
            code: cause.code(),
            name: cause.name(),
        }
    }

    /// The HTTP status for HTML consumers.
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl From<ServiceErrorKind> for ServiceError {
    fn from(cause: ServiceErrorKind) -> Self {
        Self::new(cause)
    }
}

/// Failure of a cache backing store.
///
/// Never surfaces to clients: a failed read counts as a miss and a failed
/// write is logged.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The backing store could not be reached or refused the operation.
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),

    /// A value could not be encoded for storage or decoded from it.
    #[error("cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
