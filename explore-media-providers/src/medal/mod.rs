//! Medal wall for NexusPHP trackers
//!
//! Scrapes every page of each configured site's `medal.php` with the
//! user's cookie. Complete per-site results go through the shared response
//! cache, so a site is fetched at most once per TTL.

mod parser;

pub use parser::{parse_medal_page, MedalPage};

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use explore_core::cache::{CacheKey, ResponseCache};
use explore_core::config::{MedalConfig, MedalSiteConfig};
use explore_core::http::{Fetcher, ParamMap};
use explore_core::FetchError;

const MEDAL_PATH: &str = "/medal.php";
const DEFAULT_CURRENCY: &str = "魔力";

/// Sale window markers meaning "no end date"
const UNLIMITED: [&str; 2] = ["不限", "长期"];
const TIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

/// One medal offered by a site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Medal {
    pub name: String,
    pub description: String,
    #[serde(rename = "imageSmall")]
    pub image_small: String,
    #[serde(rename = "saleBeginTime")]
    pub sale_begin_time: String,
    #[serde(rename = "saleEndTime")]
    pub sale_end_time: String,
    pub price: i64,
    pub currency: String,
    pub site: String,
    pub validity: String,
    pub bonus_rate: String,
    pub stock: String,
    pub purchase_status: String,
    pub gift_status: String,
}

impl Default for Medal {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            image_small: String::new(),
            sale_begin_time: String::new(),
            sale_end_time: String::new(),
            price: 0,
            currency: DEFAULT_CURRENCY.to_string(),
            site: String::new(),
            validity: String::new(),
            bonus_rate: String::new(),
            stock: String::new(),
            purchase_status: String::new(),
            gift_status: String::new(),
        }
    }
}

fn parse_sale_time(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.split('~').next().unwrap_or(raw).trim();
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

impl Medal {
    /// Whether `now` falls inside the sale window. Blank or unparsable
    /// bounds mean not on sale; "不限" and "长期" mean always.
    #[must_use]
    pub fn on_sale_at(&self, now: NaiveDateTime) -> bool {
        let (begin, end) = (self.sale_begin_time.trim(), self.sale_end_time.trim());
        if begin.is_empty() || end.is_empty() {
            return false;
        }
        if UNLIMITED.iter().any(|m| begin.contains(m) || end.contains(m)) {
            return true;
        }
        match (parse_sale_time(begin), parse_sale_time(end)) {
            (Some(begin), Some(end)) => begin <= now && now <= end,
            _ => {
                debug!(begin, end, "Unparsable medal sale window");
                false
            }
        }
    }

    #[must_use]
    pub fn on_sale_now(&self) -> bool {
        self.on_sale_at(Local::now().naive_local())
    }
}

/// Medal scraper over the configured sites
pub struct MedalWall {
    fetcher: Fetcher,
    cache: ResponseCache,
    sites: Vec<MedalSiteConfig>,
    max_pages: u32,
}

impl MedalWall {
    #[must_use]
    pub fn new(fetcher: Fetcher, cache: ResponseCache, config: &MedalConfig) -> Self {
        Self {
            fetcher,
            cache,
            sites: config.sites.clone(),
            max_pages: config.max_pages.max(1),
        }
    }

    pub fn sites(&self) -> &[MedalSiteConfig] {
        &self.sites
    }

    pub fn site(&self, name: &str) -> Option<&MedalSiteConfig> {
        self.sites.iter().find(|s| s.name == name)
    }

    /// Every medal of one site, served from the cache when fresh.
    ///
    /// Fails only when the first page cannot be fetched or parsed; a failure
    /// on a later page keeps what was collected so far.
    pub async fn site_medals(&self, site: &MedalSiteConfig) -> Result<Vec<Medal>, FetchError> {
        let mut key_params = ParamMap::new();
        key_params.insert("site".to_string(), site.name.clone());
        key_params.insert("url".to_string(), site.url.clone());
        let key = CacheKey::new("medal.site", &key_params);

        let value = self
            .cache
            .get_or_fetch(key, || async {
                let medals = self.scrape_site(site).await?;
                Ok::<_, FetchError>(serde_json::to_value(medals)?)
            })
            .await?;
        Ok(Vec::<Medal>::deserialize(value.as_ref())?)
    }

    /// Medals of every site in configuration order. Sites that fail are
    /// logged and left out.
    pub async fn all_medals(&self) -> Vec<Medal> {
        let mut all = Vec::new();
        for site in &self.sites {
            match self.site_medals(site).await {
                Ok(medals) => all.extend(medals),
                Err(e) => {
                    error!(site = %site.name, kind = e.kind(), error = %e, "Medal page request failed");
                }
            }
        }
        info!(sites = self.sites.len(), medals = all.len(), "Medal wall assembled");
        all
    }

    async fn scrape_site(&self, site: &MedalSiteConfig) -> Result<Vec<Medal>, FetchError> {
        let url = format!("{}{}", site.url.trim_end_matches('/'), MEDAL_PATH);
        let mut medals = Vec::new();
        let mut page = 0;

        for fetched in 1..=self.max_pages {
            let mut query = ParamMap::new();
            if page > 0 {
                query.insert("page".to_string(), page.to_string());
            }

            let parsed = match self.fetch_page(site, &url, &query).await {
                Ok(parsed) => parsed,
                Err(e) if page == 0 => return Err(e),
                Err(e) => {
                    warn!(site = %site.name, page, kind = e.kind(), error = %e, "Stopping at failed medal page");
                    break;
                }
            };
            debug!(site = %site.name, page, count = parsed.medals.len(), "Medal page parsed");
            medals.extend(parsed.medals);

            match parsed.next_page {
                Some(next) if next > page => page = next,
                _ => break,
            }
            if fetched == self.max_pages {
                warn!(site = %site.name, max_pages = self.max_pages, "Medal page limit reached");
            }
        }

        info!(site = %site.name, count = medals.len(), "Medal wall scraped");
        Ok(medals)
    }

    async fn fetch_page(
        &self,
        site: &MedalSiteConfig,
        url: &str,
        query: &ParamMap,
    ) -> Result<MedalPage, FetchError> {
        let html = self
            .fetcher
            .get_html(url, query, site.cookie.as_deref(), site.user_agent.as_deref())
            .await?;
        parse_medal_page(&html, &site.name, &site.url)
    }
}

/// `[{title, value}]` options naming every configured site
#[must_use]
pub fn site_options(sites: &[MedalSiteConfig]) -> Vec<Value> {
    sites
        .iter()
        .map(|s| serde_json::json!({"title": s.name, "value": s.name}))
        .collect()
}
