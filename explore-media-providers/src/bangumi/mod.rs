//! Bangumi daily broadcast calendar
//!
//! The calendar endpoint returns the whole week in one response, so the
//! adapter caches it once and filters and paginates locally.

pub mod types;

use async_trait::async_trait;
use chrono::{Datelike, Local};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, warn};

use explore_core::cache::{CacheKey, ResponseCache};
use explore_core::http::{Fetcher, ParamMap};
use explore_core::models::{MediaInfo, MediaType, PageParams};
use explore_core::source::DiscoverSource;
use explore_core::ui::{chip, ChipRow};

use types::{CalendarDay, Subject};

pub const SOURCE_ID: &str = "bangumidaily";
const DEFAULT_BASE_URL: &str = "https://api.bgm.tv";
const REFERER: &str = "https://api.bgm.tv/";
const DEFAULT_COUNT: u32 = 20;

/// Weekday filter value meaning "every day"
const ALL_DAYS: &str = "0";

const WEEKDAYS: [(u32, &str); 8] = [
    (0, "全部"),
    (1, "星期一"),
    (2, "星期二"),
    (3, "星期三"),
    (4, "星期四"),
    (5, "星期五"),
    (6, "星期六"),
    (7, "星期日"),
];

/// Bangumi daily calendar adapter
pub struct BangumiDaily {
    fetcher: Fetcher,
    cache: ResponseCache,
    base_url: String,
}

impl BangumiDaily {
    #[must_use]
    pub fn new(fetcher: Fetcher, cache: ResponseCache) -> Self {
        Self {
            fetcher,
            cache,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the adapter at another host (stub servers in tests)
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn calendar(&self) -> Option<Vec<CalendarDay>> {
        let url = format!("{}/calendar", self.base_url);
        let query = ParamMap::new();
        let key = CacheKey::new("bangumi.calendar", &query);
        let raw = match self
            .cache
            .get_or_fetch(key, || self.fetcher.get(&url, &query, REFERER))
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                error!(source = SOURCE_ID, kind = e.kind(), error = %e, "Bangumi calendar request failed");
                return None;
            }
        };

        let Some(days) = raw.as_array() else {
            error!(source = SOURCE_ID, "Unexpected Bangumi calendar shape");
            return None;
        };
        Some(
            days.iter()
                .filter_map(|day| {
                    CalendarDay::deserialize(day)
                        .map_err(|e| warn!(source = SOURCE_ID, error = %e, "Skipping malformed calendar day"))
                        .ok()
                })
                .collect(),
        )
    }
}

fn subject_to_media(subject: &Subject) -> Option<MediaInfo> {
    let title = subject.display_title()?;
    Some(
        MediaInfo::new(MediaType::Tv, SOURCE_ID, subject.id.to_string(), title)
            .with_source("bangumi")
            .with_bangumi_id(subject.id)
            .with_poster(subject.images.as_ref().and_then(|i| i.large.clone()))
            .with_vote_average(subject.rating.as_ref().and_then(|r| r.score))
            .with_first_air_date(subject.air_date.clone()),
    )
}

/// Flatten the calendar in day order, keeping one day or all of them
fn select_days(days: &[CalendarDay], weekday: &str) -> Vec<MediaInfo> {
    days.iter()
        .filter(|day| weekday == ALL_DAYS || day.weekday.id.to_string() == weekday)
        .flat_map(|day| day.items.iter())
        .filter_map(subject_to_media)
        .collect()
}

/// Weekday chips ordered "全部", today, then the remaining days
fn weekday_chips(today: u32) -> Vec<Value> {
    let mut days = WEEKDAYS.to_vec();
    days.sort_by_key(|(value, _)| match *value {
        0 => (0, 0),
        v if v == today => (1, 0),
        v => (2, v),
    });
    days.into_iter().map(|(value, text)| chip(value, text)).collect()
}

#[async_trait]
impl DiscoverSource for BangumiDaily {
    fn id(&self) -> &'static str {
        SOURCE_ID
    }

    fn name(&self) -> &'static str {
        "Bangumi每日放送"
    }

    fn default_count(&self) -> u32 {
        DEFAULT_COUNT
    }

    async fn filter_params(&self) -> IndexMap<String, Option<String>> {
        let mut params = IndexMap::new();
        params.insert("weekday".to_string(), Some(ALL_DAYS.to_string()));
        params
    }

    async fn filter_ui(&self) -> Vec<Value> {
        let today = Local::now().weekday().number_from_monday();
        vec![ChipRow::new("星期", "weekday", weekday_chips(today)).into_value()]
    }

    async fn query(&self, filters: &ParamMap, page: PageParams) -> Vec<MediaInfo> {
        let weekday = filters.get("weekday").map_or(ALL_DAYS, String::as_str);
        let Some(days) = self.calendar().await else {
            return Vec::new();
        };
        page.slice(select_days(&days, weekday))
    }
}
