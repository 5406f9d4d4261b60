//! Inbound message relay
//!
//! External applications POST `{title, content}` JSON. Accepted messages are
//! handed to a [`MessageSink`]. Once the API key has been checked the
//! endpoint always answers 200 and reports problems in the body.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{body::Bytes, extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, warn};

use explore_core::config::HttpClientConfig;
use explore_core::models::value_to_string;

use super::AppState;

const MSG_INVALID_BODY: &str = "请求体为空或格式不正确";
const MSG_MISSING_FIELDS: &str = "缺少必要的字段title或content";
const MSG_ACCEPTED: &str = "消息接收成功";

/// An accepted inbound message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalMessage {
    pub title: String,
    pub content: String,
}

/// Response envelope shared by every outcome
#[derive(Debug, Serialize, Deserialize)]
pub struct RelayResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ExternalMessage>,
}

impl RelayResponse {
    fn rejected(message: &str) -> Json<Self> {
        warn!("{}", message);
        Json(Self {
            success: false,
            message: message.to_string(),
            data: None,
        })
    }
}

/// Destination for accepted messages. Delivery failures are the sink's to log.
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn deliver(&self, message: &ExternalMessage);
}

/// Writes messages to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

#[async_trait]
impl MessageSink for LogSink {
    async fn deliver(&self, message: &ExternalMessage) {
        info!(title = %message.title, content = %message.content, "External message received");
    }
}

/// POSTs messages as JSON to a configured URL
pub struct HttpForwardSink {
    client: reqwest::Client,
    url: String,
}

impl HttpForwardSink {
    pub fn new(url: impl Into<String>, config: &HttpClientConfig) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl MessageSink for HttpForwardSink {
    async fn deliver(&self, message: &ExternalMessage) {
        let result = self
            .client
            .post(&self.url)
            .json(message)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status);

        match result {
            Ok(_) => info!(url = %self.url, title = %message.title, "External message forwarded"),
            Err(e) => error!(url = %self.url, error = %e, "Failed to forward external message"),
        }
    }
}

/// Pick the sink for a webhook configuration
pub fn sink_for(forward_url: Option<&str>, http: &HttpClientConfig) -> Arc<dyn MessageSink> {
    match forward_url.filter(|u| !u.is_empty()) {
        Some(url) => match HttpForwardSink::new(url, http) {
            Ok(sink) => Arc::new(sink),
            Err(e) => {
                error!(error = %e, "Failed to build forward client, logging messages instead");
                Arc::new(LogSink)
            }
        },
        None => Arc::new(LogSink),
    }
}

/// Validate a raw request body into a message, or the rejection text
fn parse_message(body: &[u8]) -> Result<ExternalMessage, &'static str> {
    let json: Value = serde_json::from_slice(body).map_err(|_| MSG_INVALID_BODY)?;
    let object = json
        .as_object()
        .filter(|o| !o.is_empty())
        .ok_or(MSG_INVALID_BODY)?;

    let title = object.get("title").and_then(value_to_string);
    let content = object.get("content").and_then(value_to_string);
    match (title, content) {
        (Some(title), Some(content)) => Ok(ExternalMessage { title, content }),
        _ => Err(MSG_MISSING_FIELDS),
    }
}

/// `POST /external_message`
pub async fn external_message(State(state): State<AppState>, body: Bytes) -> Json<RelayResponse> {
    let message = match parse_message(&body) {
        Ok(message) => message,
        Err(reason) => return RelayResponse::rejected(reason),
    };

    if let Some(sink) = &state.message_sink {
        sink.deliver(&message).await;
    }

    Json(RelayResponse {
        success: true,
        message: MSG_ACCEPTED.to_string(),
        data: Some(message),
    })
}
