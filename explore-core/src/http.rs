//! Outbound HTTP fetcher
//!
//! Every adapter talks to its upstream through one shared `Fetcher`, which
//! owns the pooled client, the host-wide User-Agent and the timeouts.
//! API responses are decoded to `serde_json::Value`; adapters map them later.
//! HTML pages come back as text for the caller to parse.

use std::collections::BTreeMap;

use reqwest::{
    header::{HeaderMap, HeaderValue, COOKIE, REFERER, USER_AGENT},
    Client,
};
use serde_json::Value;

use crate::config::HttpClientConfig;
use crate::error::{check_response, json_with_limit, text_with_limit, FetchError};

/// Query or filter parameters.
///
/// A `BTreeMap` keeps keys sorted, so two maps with the same entries always
/// iterate (and therefore serialize and hash) identically.
pub type ParamMap = BTreeMap<String, String>;

/// Maximum redirects followed for a single upstream call
const MAX_REDIRECTS: usize = 5;

/// Shared HTTP client wrapper for upstream catalog APIs
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Build a fetcher with the host User-Agent and configured timeouts
    pub fn new(user_agent: &str, config: &HttpClientConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .connect_timeout(config.connect_timeout())
            .timeout(config.timeout())
            .pool_max_idle_per_host(10)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| FetchError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    fn headers(referer: &str) -> Result<HeaderMap, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(REFERER, HeaderValue::from_str(referer)?);
        Ok(headers)
    }

    /// GET `url` with the given query and Referer, decoding the JSON body
    pub async fn get(&self, url: &str, query: &ParamMap, referer: &str) -> Result<Value, FetchError> {
        tracing::debug!(url, ?query, "GET upstream");

        let response = self
            .client
            .get(url)
            .headers(Self::headers(referer)?)
            .query(query)
            .send()
            .await?;

        let response = check_response(response).await?;
        json_with_limit(response).await
    }

    /// POST a JSON `body` to `url` with the given query and Referer
    pub async fn post(
        &self,
        url: &str,
        query: &ParamMap,
        body: &Value,
        referer: &str,
    ) -> Result<Value, FetchError> {
        tracing::debug!(url, ?query, "POST upstream");

        let response = self
            .client
            .post(url)
            .headers(Self::headers(referer)?)
            .query(query)
            .json(body)
            .send()
            .await?;

        let response = check_response(response).await?;
        json_with_limit(response).await
    }

    /// GET an HTML page as a logged-in user: `cookie` is sent verbatim and
    /// `user_agent` replaces the host User-Agent when given
    pub async fn get_html(
        &self,
        url: &str,
        query: &ParamMap,
        cookie: Option<&str>,
        user_agent: Option<&str>,
    ) -> Result<String, FetchError> {
        tracing::debug!(url, ?query, "GET page");

        let mut headers = HeaderMap::new();
        if let Some(cookie) = cookie.filter(|c| !c.is_empty()) {
            headers.insert(COOKIE, HeaderValue::from_str(cookie)?);
        }
        if let Some(user_agent) = user_agent.filter(|ua| !ua.is_empty()) {
            headers.insert(USER_AGENT, HeaderValue::from_str(user_agent)?);
        }

        let response = self
            .client
            .get(url)
            .headers(headers)
            .query(query)
            .send()
            .await?;

        let response = check_response(response).await?;
        text_with_limit(response).await
    }
}
