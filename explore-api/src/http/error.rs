//! Handler errors and their JSON rendering
//!
//! Every failure renders as `{"error": <message>, "status": <code>}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("API密钥错误")]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    #[error("Upstream request failed")]
    Upstream,

    #[error("Internal server error")]
    Internal,
}

impl AppError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream => StatusCode::BAD_GATEWAY,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    status: u16,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.to_string(),
            status: status.as_u16(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<explore_core::Error> for AppError {
    fn from(err: explore_core::Error) -> Self {
        use explore_core::Error;

        match err {
            Error::InvalidDescriptor { source_id, reason } => {
                tracing::warn!(source = %source_id, reason = %reason, "Descriptor failed validation");
                Self::NotFound(format!("source '{source_id}' is unavailable"))
            }
            Error::Fetch(e) => {
                tracing::error!(kind = e.kind(), error = %e, "Upstream request failed");
                Self::Upstream
            }
            Error::Config(e) => {
                tracing::error!(error = %e, "Configuration error");
                Self::Internal
            }
        }
    }
}
