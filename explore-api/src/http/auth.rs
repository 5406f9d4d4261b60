//! API token guard
//!
//! The host appends `?apikey=<token>` to every plugin route it calls.
//! Requests under the plugin prefix are rejected unless the token matches.

use axum::{
    extract::{Query, Request, State},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use subtle::ConstantTimeEq;
use tracing::warn;

use super::{AppError, AppState};

#[derive(Debug, Default, Deserialize)]
struct ApiKeyQuery {
    apikey: Option<String>,
}

/// Constant-time token comparison. An empty expected token matches nothing.
#[must_use]
pub fn token_matches(expected: &str, provided: &str) -> bool {
    !expected.is_empty()
        && provided.len() == expected.len()
        && bool::from(provided.as_bytes().ct_eq(expected.as_bytes()))
}

/// Middleware rejecting requests without a valid `apikey` query parameter
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let provided = Query::<ApiKeyQuery>::try_from_uri(request.uri())
        .map(|Query(q)| q)
        .unwrap_or_default()
        .apikey
        .unwrap_or_default();

    if !token_matches(&state.api_token, &provided) {
        warn!(path = %request.uri().path(), "Rejected request with invalid API key");
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_matches() {
        assert!(token_matches("secret", "secret"));
        assert!(!token_matches("secret", "secreT"));
        assert!(!token_matches("secret", "secret2"));
        assert!(!token_matches("secret", ""));
        assert!(!token_matches("", ""));
    }
}
