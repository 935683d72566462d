//! Identity and API-key gating for the HTTP surface.
//!
//! Authentication itself is delegated to an external identity provider; by
//! the time a request reaches this server, the provider's session layer has
//! resolved a stable user id and forwards it in the `x-user-id` header.
//! Requests without one are unauthenticated and get a 401. An optional
//! shared API key (for remote deployments) gates the whole API on top.

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{request::Parts, Request, StatusCode},
    middleware::Next,
    response::Response,
};

/// Header carrying the identity provider's stable user id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated user for a request. Extracting this rejects the
/// request with 401 when no identity was forwarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserId(pub String);

impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| UserId(s.to_string()))
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    "Not authenticated: missing user identity".to_string(),
                )
            })
    }
}

/// API-key configuration loaded from environment variables.
#[derive(Clone, Debug, Default)]
pub struct AuthConfig {
    /// Shared key for the whole API (from HABIT_BERSERK_API_KEY).
    /// `None` disables the check (local development).
    pub api_key: Option<String>,
}

impl AuthConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("HABIT_BERSERK_API_KEY").ok(),
        }
    }

    /// No API key check (for local development/testing).
    pub fn disabled() -> Self {
        Self { api_key: None }
    }

    /// A config with a specific key (for testing).
    pub fn with_api_key(key: impl Into<String>) -> Self {
        Self {
            api_key: Some(key.into()),
        }
    }
}

/// Middleware checking the shared API key, when one is configured.
pub async fn require_api_key(
    State(config): State<AuthConfig>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let expected_key = match &config.api_key {
        Some(key) => key,
        None => return Ok(next.run(request).await),
    };

    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    match auth_header {
        Some(header) if header.starts_with("Bearer ") => {
            let token = &header[7..];
            if token == expected_key {
                Ok(next.run(request).await)
            } else {
                tracing::warn!("Invalid API key provided");
                Err(StatusCode::UNAUTHORIZED)
            }
        }
        Some(_) => {
            tracing::warn!("Invalid Authorization header format");
            Err(StatusCode::UNAUTHORIZED)
        }
        None => {
            tracing::warn!("Missing Authorization header");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}
