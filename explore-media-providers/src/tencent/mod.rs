//! Tencent Video channel pages
//!
//! Two phases: a one-time bootstrap request per channel discovers the
//! filter axes that channel supports, then queries post filtered, paginated
//! page requests. The bootstrap result lives for the adapter's lifetime and
//! is never refreshed.

pub mod bootstrap;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::{json, Value};
use tokio::sync::OnceCell;
use tracing::{error, info, warn};
use url::Url;

use explore_core::cache::{CacheKey, ResponseCache};
use explore_core::error::FetchError;
use explore_core::http::{Fetcher, ParamMap};
use explore_core::models::{value_to_string, MediaInfo, MediaType, PageParams};
use explore_core::source::DiscoverSource;
use explore_core::ui::{chip, ChipRow, BootstrapRow};

pub const SOURCE_ID: &str = "tencentvideo";
const DEFAULT_BASE_URL: &str = "https://pbaccess.video.qq.com";
const PAGE_DATA_PATH: &str =
    "/trpc.universal_backend_service.page_server_rpc.PageServer/GetPageData";
const REFERER: &str = "https://v.qq.com/";
const DEFAULT_COUNT: u32 = 10;
const PAGE_CONTEXT_KEY: &str = "data_src_647bd63b21ef4b64b50fe65201d89c6e_page";

/// Used when no absolute poster URL is available
pub const DEFAULT_POSTER: &str = "https://v.qq.com/assets/default_poster.jpg";

/// Channel selector axis
const CHANNEL_AXIS: &str = "mtype";
const DEFAULT_CHANNEL: &str = "tv";

/// (mtype key, channel id, display name)
pub const CHANNELS: [(&str, &str, &str); 6] = [
    ("tv", "100113", "电视剧"),
    ("movie", "100173", "电影"),
    ("variety", "100109", "综艺"),
    ("anime", "100119", "动漫"),
    ("children", "100150", "少儿"),
    ("documentary", "100105", "纪录片"),
];

/// Filter axes always advertised, whether or not the bootstrap saw them
pub const STATIC_AXES: [&str; 24] = [
    "recommend_3",
    "itrailer",
    "exclusive",
    "child_ip",
    "characteristic",
    "anime_status",
    "recommend",
    "language",
    "iregion",
    "iyear",
    "all",
    "sort",
    "ipay",
    "producer",
    "iarea",
    "pay",
    "attr",
    "item",
    "itype",
    "recommend_2",
    "recommend_1",
    "award",
    "theater",
    "gender",
];

const FIXED_QUERY: [(&str, &str); 4] = [
    ("video_appid", "1000005"),
    ("vplatform", "2"),
    ("vversion_name", "8.9.10"),
    ("new_mark_label_enabled", "1"),
];

fn channel_id(mtype: &str) -> Option<&'static str> {
    CHANNELS
        .iter()
        .find(|(key, _, _)| *key == mtype)
        .map(|(_, id, _)| *id)
}

/// Tencent Video adapter
pub struct TencentVideo {
    fetcher: Fetcher,
    cache: ResponseCache,
    base_url: String,
    bootstrap: OnceCell<Vec<BootstrapRow>>,
}

impl TencentVideo {
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

    fn url(&self) -> String {
        format!("{}{}", self.base_url, PAGE_DATA_PATH)
    }

    async fn post_page(&self, body: &Value) -> Result<Value, FetchError> {
        let query: ParamMap = FIXED_QUERY
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        self.fetcher.post(&self.url(), &query, body, REFERER).await
    }

    /// Bootstrapped filter rows, probing every channel on first use.
    ///
    /// Concurrent first callers share one bootstrap burst.
    pub async fn bootstrap_rows(&self) -> &[BootstrapRow] {
        self.bootstrap.get_or_init(|| self.run_bootstrap()).await
    }

    async fn run_bootstrap(&self) -> Vec<BootstrapRow> {
        let mut rows = Vec::new();
        for (key, id, _) in CHANNELS {
            let body = page_body(id, None, 0);
            let items = match self.post_page(&body).await {
                Ok(resp) => item_datas(&resp, id, 0),
                Err(e) => {
                    error!(source = SOURCE_ID, channel_id = id, kind = e.kind(), error = %e, "Filter bootstrap request failed");
                    Vec::new()
                }
            };
            rows.extend(bootstrap::group_rows(key, &items));
        }
        info!(source = SOURCE_ID, rows = rows.len(), "Filter bootstrap finished");
        rows
    }
}

/// Request body for one channel page. `page_index` is zero-based and is
/// sent only when positive; the bootstrap request sends it explicitly as 0.
fn page_body(channel_id: &str, filters: Option<&str>, page_index: u32) -> Value {
    let mut page_params = json!({
        "channel_id": channel_id,
        "page_type": "channel_operation",
        "page_id": "channel_list_second_page",
    });
    if let Some(filters) = filters.filter(|f| !f.is_empty()) {
        page_params["filter_params"] = Value::String(filters.to_string());
    }

    let mut body = json!({ "page_params": page_params });
    if page_index > 0 || filters.is_none() {
        body["page_context"] = json!({ PAGE_CONTEXT_KEY: page_index.to_string() });
    }
    body
}

/// `k1=v1&k2=v2` for every filter except the channel selector
fn filter_string(filters: &ParamMap) -> String {
    filters
        .iter()
        .filter(|(k, v)| k.as_str() != CHANNEL_AXIS && !v.is_empty())
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Walk `data.module_list_datas[1].module_datas[0].item_data_lists.item_datas`
fn item_datas(body: &Value, channel_id: &str, page: u32) -> Vec<Value> {
    let Some(data) = body.get("data").filter(|d| !d.is_null()) else {
        error!(source = SOURCE_ID, channel_id, page, "No data returned");
        return Vec::new();
    };
    let modules = data
        .get("module_list_datas")
        .and_then(Value::as_array)
        .map_or(&[][..], Vec::as_slice);
    let Some(module) = modules.get(1) else {
        error!(
            source = SOURCE_ID,
            channel_id,
            page,
            len = modules.len(),
            "module_list_datas has insufficient length"
        );
        return Vec::new();
    };
    let Some(first) = module
        .get("module_datas")
        .and_then(Value::as_array)
        .and_then(|m| m.first())
    else {
        error!(source = SOURCE_ID, channel_id, page, "No module_datas");
        return Vec::new();
    };
    let items = first
        .pointer("/item_data_lists/item_datas")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    if items.is_empty() {
        warn!(source = SOURCE_ID, channel_id, page, "No item_datas");
    }
    items
}

fn is_absolute_http(candidate: &str) -> bool {
    (candidate.starts_with("http://") || candidate.starts_with("https://"))
        && Url::parse(candidate).is_ok()
}

/// First absolute poster among `new_pic_vt` (with `/350` removed),
/// `pic_url` and `image_url`, else [`DEFAULT_POSTER`]
fn resolve_poster(params: &Value, title: &str) -> String {
    let field = |key: &str| {
        params
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    };
    let candidates = [
        field("new_pic_vt").map(|u| u.replace("/350", "")),
        field("pic_url").map(str::to_string),
        field("image_url").map(str::to_string),
    ];

    for candidate in candidates.into_iter().flatten() {
        if is_absolute_http(&candidate) {
            return candidate;
        }
        warn!(source = SOURCE_ID, title, poster = %candidate, "Invalid poster URL");
    }
    DEFAULT_POSTER.to_string()
}

fn item_to_media(item: &Value, media_type: MediaType) -> Option<MediaInfo> {
    if item.get("item_type").and_then(value_to_string).as_deref() != Some("2") {
        return None;
    }
    let params = item.get("item_params")?;
    let title = params
        .get("title")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty())?;
    let cid = params.get("cid").and_then(value_to_string)?;
    let year = params.get("year").and_then(value_to_string);

    Some(
        MediaInfo::new(media_type, SOURCE_ID, cid, title)
            .with_year(year)
            .with_poster(Some(resolve_poster(params, title))),
    )
}

#[async_trait]
impl DiscoverSource for TencentVideo {
    fn id(&self) -> &'static str {
        SOURCE_ID
    }

    fn name(&self) -> &'static str {
        "腾讯视频"
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
        let channel_chips = CHANNELS
            .iter()
            .map(|(key, _, name)| chip(*key, *name))
            .collect();
        let mut ui = vec![ChipRow::new("种类", CHANNEL_AXIS, channel_chips).into_value()];
        ui.extend(
            self.bootstrap_rows()
                .await
                .iter()
                .cloned()
                .map(|row| row.into_value(CHANNEL_AXIS)),
        );
        ui
    }

    /// `count` is accepted but not forwarded; upstream page size is fixed.
    async fn query(&self, filters: &ParamMap, page: PageParams) -> Vec<MediaInfo> {
        let mtype = filters
            .get(CHANNEL_AXIS)
            .map_or(DEFAULT_CHANNEL, String::as_str);
        let Some(id) = channel_id(mtype) else {
            warn!(source = SOURCE_ID, mtype, "Unknown channel");
            return Vec::new();
        };
        let media_type = if mtype == "movie" {
            MediaType::Movie
        } else {
            MediaType::Tv
        };

        let filter_params = filter_string(filters);
        let page_index = page.page - 1;
        let body = page_body(id, Some(&filter_params), page_index);

        let mut key_params = filters.clone();
        key_params.insert(CHANNEL_AXIS.to_string(), mtype.to_string());
        key_params.insert("page".to_string(), page.page.to_string());
        let key = CacheKey::new("tencent.page_data", &key_params);

        let response = match self.cache.get_or_fetch(key, || self.post_page(&body)).await {
            Ok(response) => response,
            Err(e) => {
                error!(source = SOURCE_ID, mtype, page = page.page, kind = e.kind(), error = %e, "Tencent Video request failed");
                return Vec::new();
            }
        };

        item_datas(&response, id, page.page)
            .iter()
            .filter_map(|item| item_to_media(item, media_type))
            .collect()
    }
}
