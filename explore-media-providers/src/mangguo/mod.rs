//! Mango TV channel library
//!
//! Like Tencent Video the filter axes are discovered once per process from
//! a per-channel config endpoint; list queries then page upstream.

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{error, info, warn};

use explore_core::cache::{CacheKey, ResponseCache};
use explore_core::http::{Fetcher, ParamMap};
use explore_core::models::{value_to_string, MediaInfo, MediaType, PageParams};
use explore_core::source::DiscoverSource;
use explore_core::ui::{chips_from_values, ChipRow, BootstrapRow};

pub const SOURCE_ID: &str = "mangguo";
const DEFAULT_BASE_URL: &str = "https://pianku.api.mgtv.com";
const LIST_PATH: &str = "/rider/list/pcweb/v3";
const CHANNEL_CONFIG_PATH: &str = "/rider/config/channel/v1";
const REFERER: &str = "https://www.mgtv.com";
const DEFAULT_COUNT: u32 = 80;
const SUPPORT_FLAG: &str = "10000000";

const CHANNEL_AXIS: &str = "mtype";
const DEFAULT_CHANNEL: &str = "电视剧";

/// (mtype, channelId)
pub const CHANNELS: [(&str, &str); 7] = [
    ("电视剧", "2"),
    ("电影", "3"),
    ("动漫", "50"),
    ("少儿", "10"),
    ("综艺", "1"),
    ("纪录片", "51"),
    ("教育", "115"),
];

pub const STATIC_AXES: [&str; 8] = [
    "chargeInfo",
    "sort",
    "kind",
    "edition",
    "area",
    "fitAge",
    "year",
    "feature",
];

/// Tag name upstream uses for the "all" chip
const ALL_TAG: &str = "全部";

fn channel_id(mtype: &str) -> &'static str {
    CHANNELS
        .iter()
        .find(|(key, _)| *key == mtype)
        .map_or(CHANNELS[0].1, |(_, id)| *id)
}

/// Mango TV adapter
pub struct Mangguo {
    fetcher: Fetcher,
    cache: ResponseCache,
    base_url: String,
    bootstrap: OnceCell<Vec<BootstrapRow>>,
}

impl Mangguo {
    #[must_use]
    pub fn new(fetcher: Fetcher, cache: ResponseCache) -> Self {
        Self {
            fetcher,
            cache,
            base_url: DEFAULT_BASE_URL.to_string(),
            bootstrap: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub async fn bootstrap_rows(&self) -> &[BootstrapRow] {
        self.bootstrap.get_or_init(|| self.run_bootstrap()).await
    }

    async fn run_bootstrap(&self) -> Vec<BootstrapRow> {
        let url = format!("{}{}", self.base_url, CHANNEL_CONFIG_PATH);
        let mut rows = Vec::new();
        for (key, id) in CHANNELS {
            let query: ParamMap = [
                ("platform", "pcweb"),
                ("allowedRC", "1"),
                ("channelId", id),
                ("_support", SUPPORT_FLAG),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

            match self.fetcher.get(&url, &query, REFERER).await {
                Ok(body) => rows.extend(list_items_to_rows(key, &body)),
                Err(e) => warn!(source = SOURCE_ID, channel = key, kind = e.kind(), error = %e, "Channel config request failed"),
            }
        }
        info!(source = SOURCE_ID, rows = rows.len(), "Filter bootstrap finished");
        rows
    }
}

/// `data.listItems[]` -> one row per item, chips from its tags
fn list_items_to_rows(channel_key: &str, body: &Value) -> Vec<BootstrapRow> {
    let Some(items) = body.pointer("/data/listItems").and_then(Value::as_array) else {
        warn!(source = SOURCE_ID, channel = channel_key, "Channel config has no listItems");
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let model = item.get("eName").and_then(Value::as_str)?;
            let label = item.get("typeName").and_then(Value::as_str).unwrap_or(model);
            let options = item
                .get("items")
                .and_then(Value::as_array)
                .map(|tags| {
                    tags.iter()
                        .filter_map(|tag| {
                            let name = tag.get("tagName").and_then(Value::as_str)?;
                            if name == ALL_TAG {
                                return None;
                            }
                            Some((tag.get("tagId")?.clone(), name.to_string()))
                        })
                        .collect()
                })
                .unwrap_or_default();

            Some(BootstrapRow {
                channel_key: channel_key.to_string(),
                label: label.to_string(),
                model: model.to_string(),
                options,
            })
        })
        .collect()
}

fn list_params(mtype: &str, filters: &ParamMap, page: PageParams) -> ParamMap {
    let mut params: ParamMap = filters
        .iter()
        .filter(|(k, v)| k.as_str() != CHANNEL_AXIS && !v.is_empty())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    for (k, v) in [
        ("allowedRC", "1"),
        ("platform", "pcweb"),
        ("channelId", channel_id(mtype)),
        ("hudong", "1"),
        ("_support", SUPPORT_FLAG),
    ] {
        params.insert(k.to_string(), v.to_string());
    }
    params.insert("pn".to_string(), page.page.to_string());
    params.insert("pc".to_string(), page.page_size.to_string());
    params
}

fn doc_to_media(doc: &Value, media_type: MediaType) -> Option<MediaInfo> {
    let title = doc
        .get("title")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty())?;
    let clip_id = doc.get("clipId").and_then(value_to_string)?;
    Some(
        MediaInfo::new(media_type, SOURCE_ID, clip_id, title)
            .with_year(doc.get("year").and_then(value_to_string))
            .with_poster(doc.get("img").and_then(Value::as_str).map(str::to_string)),
    )
}

#[async_trait]
impl DiscoverSource for Mangguo {
    fn id(&self) -> &'static str {
        SOURCE_ID
    }

    fn name(&self) -> &'static str {
        "芒果TV"
    }

    fn default_count(&self) -> u32 {
        DEFAULT_COUNT
    }

    async fn filter_params(&self) -> IndexMap<String, Option<String>> {
        let mut params = IndexMap::new();
        params.insert(CHANNEL_AXIS.to_string(), Some(DEFAULT_CHANNEL.to_string()));
        for axis in STATIC_AXES {
            params.insert(axis.to_string(), None);
        }
        for row in self.bootstrap_rows().await {
            params.entry(row.model.clone()).or_insert(None);
        }
        params
    }

    async fn depends(&self) -> IndexMap<String, Vec<String>> {
        self.filter_params()
            .await
            .into_keys()
            .filter(|k| k != CHANNEL_AXIS)
            .map(|k| (k, vec![CHANNEL_AXIS.to_string()]))
            .collect()
    }

    async fn filter_ui(&self) -> Vec<Value> {
        let channels = chips_from_values(CHANNELS.iter().map(|(key, _)| *key));
        let mut ui = vec![ChipRow::new("种类", CHANNEL_AXIS, channels).into_value()];
        ui.extend(
            self.bootstrap_rows()
                .await
                .iter()
                .cloned()
                .map(|row| row.into_value(CHANNEL_AXIS)),
        );
        ui
    }

    async fn query(&self, filters: &ParamMap, page: PageParams) -> Vec<MediaInfo> {
        let mtype = filters
            .get(CHANNEL_AXIS)
            .map_or(DEFAULT_CHANNEL, String::as_str);
        let media_type = if mtype == "电影" {
            MediaType::Movie
        } else {
            MediaType::Tv
        };

        let params = list_params(mtype, filters, page);
        let url = format!("{}{}", self.base_url, LIST_PATH);
        let key = CacheKey::new("mangguo.list", &params);

        let body = match self
            .cache
            .get_or_fetch(key, || self.fetcher.get(&url, &params, REFERER))
            .await
        {
            Ok(body) => body,
            Err(e) => {
                error!(source = SOURCE_ID, mtype, page = page.page, kind = e.kind(), error = %e, "Mango TV request failed");
                return Vec::new();
            }
        };

        body.pointer("/data/hitDocs")
            .and_then(Value::as_array)
            .map(|docs| {
                docs.iter()
                    .filter_map(|doc| doc_to_media(doc, media_type))
                    .take(page.page_size as usize)
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_params() {
        let mut filters = ParamMap::new();
        filters.insert("mtype".to_string(), "电影".to_string());
        filters.insert("year".to_string(), "2024".to_string());
        let params = list_params("电影", &filters, PageParams::new(Some(2), None, 80));
        assert_eq!(params.get("channelId").map(String::as_str), Some("3"));
        assert_eq!(params.get("pn").map(String::as_str), Some("2"));
        assert_eq!(params.get("pc").map(String::as_str), Some("80"));
        assert_eq!(params.get("hudong").map(String::as_str), Some("1"));
        assert_eq!(params.get("_support").map(String::as_str), Some("10000000"));
        assert_eq!(params.get("year").map(String::as_str), Some("2024"));
        assert!(!params.contains_key("mtype"));
    }

    #[test]
    fn test_unknown_channel_falls_back() {
        assert_eq!(channel_id("体育"), "2");
        assert_eq!(channel_id("教育"), "115");
    }

    #[test]
    fn test_list_items_to_rows() {
        let body = json!({"data": {"listItems": [
            {"typeName": "类型", "eName": "kind", "items": [
                {"tagId": "all", "tagName": "全部"},
                {"tagId": "a1", "tagName": "古装"}
            ]},
            {"typeName": "无键"}
        ]}});
        let rows = list_items_to_rows("电视剧", &body);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].label, "类型");
        assert_eq!(rows[0].model, "kind");
        assert_eq!(rows[0].options, vec![(json!("a1"), "古装".to_string())]);
    }

    #[test]
    fn test_doc_to_media() {
        let doc = json!({"title": "乘风破浪", "year": 2023, "clipId": 519400, "img": "https://x/1.jpg"});
        let info = doc_to_media(&doc, MediaType::Tv).unwrap();
        assert_eq!(info.media_id, "519400");
        assert_eq!(info.title_year.as_deref(), Some("乘风破浪 (2023)"));
        assert!(doc_to_media(&json!({"clipId": 1}), MediaType::Tv).is_none());
    }
}
