//! Shared error types
//!
//! `FetchError` covers every way an upstream call can fail. `Error` is the
//! crate-level error for configuration and descriptor problems.

use thiserror::Error;

/// Maximum response body size for upstream calls (16 MB).
pub const MAX_RESPONSE_SIZE: usize = 16 * 1024 * 1024;

/// Upstream error text is truncated to this many characters.
const MAX_MESSAGE_CHARS: usize = 512;

/// Error returned by the outbound `Fetcher`.
#[derive(Debug, Error)]
pub enum FetchError {
    /// No HTTP status was obtained (DNS, connect, timeout, TLS).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The upstream answered with a non-2xx status.
    #[error("HTTP error {status} for {url}: {message}")]
    Remote {
        status: reqwest::StatusCode,
        url: String,
        message: String,
    },

    /// The body was not valid JSON or did not have the expected shape.
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Invalid header value: {0}")]
    InvalidHeader(String),

    #[error("Response too large ({size} bytes, max {MAX_RESPONSE_SIZE})")]
    ResponseTooLarge { size: u64 },
}

impl FetchError {
    /// Short machine-friendly kind, used as a structured log field.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Remote { .. } => "remote",
            Self::Decode(_) | Self::ResponseTooLarge { .. } => "decode",
            Self::InvalidHeader(_) => "request",
        }
    }
}

/// Read a response body, enforcing [`MAX_RESPONSE_SIZE`].
///
/// Checks `Content-Length` hint first (if available), then enforces the
/// limit on the actual body bytes.
async fn bytes_with_limit(response: reqwest::Response) -> std::result::Result<bytes::Bytes, FetchError> {
    if let Some(cl) = response.content_length() {
        if cl as usize > MAX_RESPONSE_SIZE {
            return Err(FetchError::ResponseTooLarge { size: cl });
        }
    }
    let bytes = response.bytes().await?;
    if bytes.len() > MAX_RESPONSE_SIZE {
        return Err(FetchError::ResponseTooLarge { size: bytes.len() as u64 });
    }
    Ok(bytes)
}

/// Read a response body with size limit and deserialize as JSON.
pub async fn json_with_limit<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> std::result::Result<T, FetchError> {
    let bytes = bytes_with_limit(response).await?;
    serde_json::from_slice(&bytes).map_err(Into::into)
}

/// Read a response body with size limit as text (HTML pages).
pub async fn text_with_limit(response: reqwest::Response) -> std::result::Result<String, FetchError> {
    let bytes = bytes_with_limit(response).await?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Check HTTP response status before processing body.
///
/// Non-2xx responses are turned into `FetchError::Remote` carrying the
/// (truncated) upstream body text.
pub async fn check_response(
    resp: reqwest::Response,
) -> std::result::Result<reqwest::Response, FetchError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let url = resp.url().to_string();
    let message = resp.text().await.unwrap_or_default();
    Err(FetchError::Remote {
        status,
        url,
        message: truncate_message(&message),
    })
}

fn truncate_message(message: &str) -> String {
    let trimmed = message.trim();
    if trimmed.chars().count() <= MAX_MESSAGE_CHARS {
        return trimmed.to_string();
    }
    let mut out: String = trimmed.chars().take(MAX_MESSAGE_CHARS).collect();
    out.push('…');
    out
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<reqwest::header::InvalidHeaderValue> for FetchError {
    fn from(err: reqwest::header::InvalidHeaderValue) -> Self {
        Self::InvalidHeader(err.to_string())
    }
}

/// Crate-level error
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid descriptor for {source_id}: {reason}")]
    InvalidDescriptor { source_id: String, reason: String },

    #[error("Upstream error: {0}")]
    Fetch(#[from] FetchError),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_transport() {
        let err = FetchError::Transport("connection refused".to_string());
        assert_eq!(err.to_string(), "Transport error: connection refused");
        assert_eq!(err.kind(), "transport");
    }

    #[test]
    fn test_error_display_remote() {
        let err = FetchError::Remote {
            status: reqwest::StatusCode::NOT_FOUND,
            url: "https://example.com/api".to_string(),
            message: "no such page".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "HTTP error 404 Not Found for https://example.com/api: no such page"
        );
        assert_eq!(err.kind(), "remote");
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: FetchError = json_err.into();
        assert!(matches!(err, FetchError::Decode(_)));
        assert_eq!(err.kind(), "decode");
    }

    #[test]
    fn test_response_too_large_display() {
        let err = FetchError::ResponseTooLarge { size: 20_000_000 };
        let msg = err.to_string();
        assert!(msg.contains("20000000"));
        assert!(msg.contains(&MAX_RESPONSE_SIZE.to_string()));
    }

    #[test]
    fn test_truncate_message() {
        assert_eq!(truncate_message("  short  "), "short");
        let long = "页".repeat(600);
        let truncated = truncate_message(&long);
        assert_eq!(truncated.chars().count(), MAX_MESSAGE_CHARS + 1);
        assert!(truncated.ends_with('…'));
    }

    #[test]
    fn test_invalid_descriptor_display() {
        let err = Error::InvalidDescriptor {
            source_id: "cctv".to_string(),
            reason: "depends key 'area' missing from filter_params".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid descriptor for cctv: depends key 'area' missing from filter_params"
        );
    }
}
