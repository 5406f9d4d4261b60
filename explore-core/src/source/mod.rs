// Discover Source Contract
//
// Every upstream catalog adapter implements DiscoverSource. The registry
// turns each one into a DiscoverMediaSource descriptor plus one GET route.

mod registry;

pub use registry::SourceRegistry;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;

use crate::http::ParamMap;
use crate::models::{DiscoverMediaSource, MediaInfo, PageParams};

/// GET route exposed for one source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSpec {
    /// Path relative to the shared prefix, always starting with `/`
    pub path: String,
}

impl RouteSpec {
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// Upstream catalog adapter
///
/// Implementations must be safe for concurrent calls. `query` never fails:
/// upstream and decode errors are logged and produce an empty list.
#[async_trait]
pub trait DiscoverSource: Send + Sync {
    // ========== Identity ==========

    /// Source id, also used as `mediaid_prefix` (e.g. "bangumidaily")
    fn id(&self) -> &'static str;

    /// Display name
    fn name(&self) -> &'static str;

    /// Page size used when the caller does not send `count`
    fn default_count(&self) -> u32;

    // ========== Filter Schema ==========

    /// Recognized filter keys and their defaults
    async fn filter_params(&self) -> IndexMap<String, Option<String>>;

    /// Filter key -> keys gating its visibility
    async fn depends(&self) -> IndexMap<String, Vec<String>> {
        IndexMap::new()
    }

    /// Widget tree the host renders
    async fn filter_ui(&self) -> Vec<Value>;

    // ========== Query ==========

    /// Discover entry point. `filters` holds only non-empty values.
    async fn query(&self, filters: &ParamMap, page: PageParams) -> Vec<MediaInfo>;

    // ========== Registration ==========

    fn routes(&self) -> Vec<RouteSpec> {
        vec![RouteSpec::get(format!("/{}_discover", self.id()))]
    }

    /// Full descriptor; `api_path` embeds the host API token
    async fn descriptor(&self, api_prefix: &str, api_token: &str) -> DiscoverMediaSource {
        DiscoverMediaSource {
            name: self.name().to_string(),
            mediaid_prefix: self.id().to_string(),
            api_path: format!(
                "{}/{}_discover?apikey={}",
                api_prefix.trim_end_matches('/'),
                self.id(),
                api_token
            ),
            filter_params: self.filter_params().await,
            filter_ui: self.filter_ui().await,
            depends: self.depends().await,
        }
    }
}

/// Bind raw request parameters to a source's filter keys.
///
/// Keys outside `filter_params` are dropped. A missing or blank value falls
/// back to the key's default; keys without a default are omitted.
#[must_use]
pub fn resolve_filters<'a>(
    raw: impl IntoIterator<Item = (&'a String, &'a String)>,
    filter_params: &IndexMap<String, Option<String>>,
) -> ParamMap {
    let mut resolved: ParamMap = filter_params
        .iter()
        .filter_map(|(k, v)| v.as_ref().map(|v| (k.clone(), v.clone())))
        .collect();

    for (key, value) in raw {
        let value = value.trim();
        if value.is_empty() || !filter_params.contains_key(key) {
            continue;
        }
        resolved.insert(key.clone(), value.to_string());
    }

    resolved.retain(|_, v| !v.is_empty());
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn params() -> IndexMap<String, Option<String>> {
        let mut p = IndexMap::new();
        p.insert("fc".to_string(), Some("电视剧".to_string()));
        p.insert("year".to_string(), None);
        p.insert("area".to_string(), None);
        p
    }

    #[test]
    fn test_resolve_applies_defaults() {
        let raw: HashMap<String, String> = HashMap::new();
        let resolved = resolve_filters(&raw, &params());
        assert_eq!(resolved.get("fc").map(String::as_str), Some("电视剧"));
        assert_eq!(resolved.len(), 1);
    }

    #[test]
    fn test_resolve_drops_unknown_and_blank() {
        let mut raw = HashMap::new();
        raw.insert("fc".to_string(), "电影".to_string());
        raw.insert("year".to_string(), "2020".to_string());
        raw.insert("area".to_string(), "  ".to_string());
        raw.insert("apikey".to_string(), "secret".to_string());
        let resolved = resolve_filters(&raw, &params());
        assert_eq!(resolved.get("fc").map(String::as_str), Some("电影"));
        assert_eq!(resolved.get("year").map(String::as_str), Some("2020"));
        assert!(!resolved.contains_key("area"));
        assert!(!resolved.contains_key("apikey"));
    }

    #[test]
    fn test_route_spec_get() {
        let route = RouteSpec::get("/cctv_discover");
        assert_eq!(route.path, "/cctv_discover");
    }
}
