//! CCTV video album library

pub mod vocabulary;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;
use tracing::{error, warn};

use explore_core::cache::{CacheKey, ResponseCache};
use explore_core::http::{Fetcher, ParamMap};
use explore_core::models::{value_to_string, MediaInfo, MediaType, PageParams};
use explore_core::source::DiscoverSource;
use explore_core::ui::{chip, chips_from_values, show_when, ChipRow};

use vocabulary::{Fc, CHANNELS, CHANNEL_PARTITIONS, YEAR_PARTITIONS};

pub const SOURCE_ID: &str = "cctv";
const DEFAULT_BASE_URL: &str = "https://api.cntv.cn";
const ALBUM_LIST_PATH: &str = "/newVideoset/getCboxVideoAlbumList";
const REFERER: &str = "https://app.cctv.com/";
const DEFAULT_COUNT: u32 = 30;

/// Secondary axes forwarded upstream when set
const OPTIONAL_AXES: [&str; 5] = ["area", "sc", "year", "fl", "channel"];

/// CCTV adapter
pub struct Cctv {
    fetcher: Fetcher,
    cache: ResponseCache,
    base_url: String,
}

impl Cctv {
    #[must_use]
    pub fn new(fetcher: Fetcher, cache: ResponseCache) -> Self {
        Self {
            fetcher,
            cache,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

/// Upstream query for one page
fn upstream_params(fc: &str, filters: &ParamMap, page: PageParams) -> ParamMap {
    let mut params = ParamMap::new();
    params.insert("p".to_string(), page.page.to_string());
    params.insert("n".to_string(), page.page_size.to_string());
    params.insert("serviceId".to_string(), "cbox".to_string());
    params.insert("sort".to_string(), "desc".to_string());
    params.insert("fc".to_string(), fc.to_string());
    for axis in OPTIONAL_AXES {
        if let Some(value) = filters.get(axis).filter(|v| !v.is_empty()) {
            params.insert(axis.to_string(), value.clone());
        }
    }
    params
}

fn strip_brackets(title: &str) -> String {
    title.chars().filter(|c| !matches!(c, '《' | '》')).collect()
}

fn album_to_media(item: &Value, media_type: MediaType) -> Option<MediaInfo> {
    let title = strip_brackets(item.get("title").and_then(Value::as_str)?);
    let title = title.trim();
    if title.is_empty() {
        return None;
    }
    let id = item.get("id").and_then(value_to_string)?;
    let poster = item.get("image").and_then(Value::as_str).map(str::to_string);
    Some(MediaInfo::new(media_type, SOURCE_ID, id, title).with_poster(poster))
}

fn parse_albums(body: &Value, media_type: MediaType) -> Vec<MediaInfo> {
    let Some(list) = body.pointer("/data/list").and_then(Value::as_array) else {
        warn!(source = SOURCE_ID, "CCTV response has no data.list");
        return Vec::new();
    };
    list.iter()
        .filter_map(|item| album_to_media(item, media_type))
        .collect()
}

fn filter_ui() -> Vec<Value> {
    let fc_values: Vec<&str> = Fc::ALL.iter().map(Fc::as_str).collect();
    let channel_chips = CHANNELS.iter().map(|(key, label)| chip(*key, *label)).collect();
    let labels = |partitions: &[Fc]| partitions.iter().map(Fc::as_str).collect::<Vec<_>>();

    let mut rows = vec![
        ChipRow::new("种类", "fc", chips_from_values(fc_values)),
        ChipRow::new("频道", "channel", channel_chips)
            .shown_when(show_when("fc", &labels(&CHANNEL_PARTITIONS))),
    ];

    for fc in Fc::ALL {
        let areas = vocabulary::areas(fc);
        if !areas.is_empty() {
            rows.push(
                ChipRow::new("地区", "area", chips_from_values(areas.iter().copied()))
                    .shown_when(show_when("fc", &[fc.as_str()])),
            );
        }
    }

    for fc in Fc::ALL {
        rows.push(
            ChipRow::new("类型", "sc", chips_from_values(vocabulary::genres(fc).iter().copied()))
                .shown_when(show_when("fc", &[fc.as_str()])),
        );
    }

    let years = vocabulary::years();
    rows.push(
        ChipRow::new("年份", "year", chips_from_values(years.iter().map(String::as_str)))
            .shown_when(show_when("fc", &labels(&YEAR_PARTITIONS))),
    );

    let letters = vocabulary::letters();
    rows.push(ChipRow::new(
        "字母顺序",
        "fl",
        chips_from_values(letters.iter().map(String::as_str)),
    ));

    rows.into_iter().map(ChipRow::into_value).collect()
}

#[async_trait]
impl DiscoverSource for Cctv {
    fn id(&self) -> &'static str {
        SOURCE_ID
    }

    fn name(&self) -> &'static str {
        "CCTV"
    }

    fn default_count(&self) -> u32 {
        DEFAULT_COUNT
    }

    async fn filter_params(&self) -> IndexMap<String, Option<String>> {
        let mut params = IndexMap::new();
        params.insert("fc".to_string(), Some(Fc::Series.as_str().to_string()));
        for axis in OPTIONAL_AXES {
            params.insert(axis.to_string(), None);
        }
        params
    }

    async fn depends(&self) -> IndexMap<String, Vec<String>> {
        OPTIONAL_AXES
            .iter()
            .map(|axis| ((*axis).to_string(), vec!["fc".to_string()]))
            .collect()
    }

    async fn filter_ui(&self) -> Vec<Value> {
        filter_ui()
    }

    async fn query(&self, filters: &ParamMap, page: PageParams) -> Vec<MediaInfo> {
        let fc = filters
            .get("fc")
            .map_or(Fc::Series.as_str(), String::as_str);
        let media_type = if fc == Fc::Film.as_str() {
            MediaType::Movie
        } else {
            MediaType::Tv
        };

        let params = upstream_params(fc, filters, page);
        let url = format!("{}{}", self.base_url, ALBUM_LIST_PATH);
        let key = CacheKey::new("cctv.album_list", &params);

        match self
            .cache
            .get_or_fetch(key, || self.fetcher.get(&url, &params, REFERER))
            .await
        {
            Ok(body) => {
                let mut items = parse_albums(&body, media_type);
                items.truncate(page.page_size as usize);
                items
            }
            Err(e) => {
                error!(source = SOURCE_ID, fc, page = page.page, kind = e.kind(), error = %e, "CCTV request failed");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use explore_core::ui::collect_models;
    use serde_json::json;

    #[test]
    fn test_strip_brackets() {
        assert_eq!(strip_brackets("《长津湖》"), "长津湖");
        assert_eq!(strip_brackets("新闻《联播》特辑"), "新闻联播特辑");
    }

    #[test]
    fn test_upstream_params_skip_empty_axes() {
        let mut filters = ParamMap::new();
        filters.insert("year".to_string(), "2020".to_string());
        filters.insert("sc".to_string(), String::new());
        let params = upstream_params("电影", &filters, PageParams::new(Some(2), Some(10), 30));
        assert_eq!(params.get("p").map(String::as_str), Some("2"));
        assert_eq!(params.get("n").map(String::as_str), Some("10"));
        assert_eq!(params.get("serviceId").map(String::as_str), Some("cbox"));
        assert_eq!(params.get("sort").map(String::as_str), Some("desc"));
        assert_eq!(params.get("year").map(String::as_str), Some("2020"));
        assert!(!params.contains_key("sc"));
    }

    #[test]
    fn test_parse_albums() {
        let body = json!({"data": {"list": [
            {"id": "VIDA1", "title": "《山海情》", "image": "https://p1.img.cctvpic.com/a.jpg"},
            {"id": 42, "title": "大决战"},
            {"id": "VIDA3", "title": "《》"},
            {"title": "no id"}
        ]}});
        let items = parse_albums(&body, MediaType::Tv);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "山海情");
        assert_eq!(items[0].poster_path.as_deref(), Some("https://p1.img.cctvpic.com/a.jpg"));
        assert_eq!(items[1].media_id, "42");
        assert!(items[1].poster_path.is_none());
    }

    #[test]
    fn test_parse_albums_missing_list() {
        assert!(parse_albums(&json!({"data": {}}), MediaType::Tv).is_empty());
        assert!(parse_albums(&json!([]), MediaType::Movie).is_empty());
    }

    #[test]
    fn test_filter_ui_rows() {
        let ui = filter_ui();
        // fc, channel, two area rows, five genre rows, year, fl
        assert_eq!(ui.len(), 11);
        assert!(ui[0]["props"].get("show").is_none());
        assert_eq!(ui[1]["props"]["show"], "{{fc == '纪录片' || fc == '特别节目'}}");
        assert_eq!(ui[2]["props"]["show"], "{{fc == '电视剧'}}");
        assert_eq!(ui[3]["props"]["show"], "{{fc == '动画片'}}");
        assert_eq!(ui[3]["content"][1]["content"].as_array().unwrap().len(), 5);
        assert_eq!(ui[9]["props"]["show"], "{{fc == '电视剧' || fc == '电影' || fc == '纪录片'}}");
        assert_eq!(ui[10]["content"][1]["props"]["model"], "fl");

        let channel = &ui[1]["content"][1]["content"][0];
        assert_eq!(channel["props"]["value"], "CCTV-1综合,CCTV-1高清,CCTV-1综合高清");
        assert_eq!(channel["text"], "CCTV-1 综合");
    }

    #[test]
    fn test_filter_ui_models_are_known() {
        let models = collect_models(&filter_ui());
        for model in models {
            assert!(model == "fc" || OPTIONAL_AXES.contains(&model.as_str()), "{model}");
        }
    }
}
