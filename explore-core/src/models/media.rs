//! Normalized catalog entries returned to the host

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Media kind, serialized with the host's own vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaType {
    #[serde(rename = "电影")]
    Movie,
    #[serde(rename = "电视剧")]
    Tv,
}

/// One catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    #[serde(rename = "type")]
    pub media_type: MediaType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_year: Option<String>,

    pub mediaid_prefix: String,

    pub media_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vote_average: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_air_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bangumi_id: Option<u64>,
}

impl MediaInfo {
    pub fn new(
        media_type: MediaType,
        mediaid_prefix: &str,
        media_id: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            media_type,
            source: None,
            title: title.into(),
            year: None,
            title_year: None,
            mediaid_prefix: mediaid_prefix.to_string(),
            media_id: media_id.into(),
            poster_path: None,
            vote_average: None,
            first_air_date: None,
            bangumi_id: None,
        }
    }

    /// Set the release year; also fills `title_year` as `"{title} ({year})"`
    #[must_use]
    pub fn with_year(mut self, year: Option<String>) -> Self {
        if let Some(year) = year.filter(|y| !y.trim().is_empty()) {
            self.title_year = Some(format!("{} ({})", self.title, year));
            self.year = Some(year);
        }
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: &str) -> Self {
        self.source = Some(source.to_string());
        self
    }

    #[must_use]
    pub fn with_poster(mut self, poster_path: Option<String>) -> Self {
        self.poster_path = poster_path.filter(|p| !p.is_empty());
        self
    }

    #[must_use]
    pub const fn with_vote_average(mut self, vote_average: Option<f64>) -> Self {
        self.vote_average = vote_average;
        self
    }

    #[must_use]
    pub fn with_first_air_date(mut self, first_air_date: Option<String>) -> Self {
        self.first_air_date = first_air_date.filter(|d| !d.is_empty());
        self
    }

    #[must_use]
    pub const fn with_bangumi_id(mut self, bangumi_id: u64) -> Self {
        self.bangumi_id = Some(bangumi_id);
        self
    }
}

/// Render a JSON scalar as a string.
///
/// Upstreams are inconsistent about ids and years (`"2020"` vs `2020`);
/// strings pass through, numbers are stringified, anything else is `None`.
#[must_use]
pub fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_media_type_serializes_host_vocabulary() {
        assert_eq!(serde_json::to_value(MediaType::Movie).unwrap(), json!("电影"));
        assert_eq!(serde_json::to_value(MediaType::Tv).unwrap(), json!("电视剧"));
    }

    #[test]
    fn test_with_year_sets_title_year() {
        let info = MediaInfo::new(MediaType::Movie, "tencentvideo", "mzc001", "长津湖")
            .with_year(Some("2021".to_string()));
        assert_eq!(info.year.as_deref(), Some("2021"));
        assert_eq!(info.title_year.as_deref(), Some("长津湖 (2021)"));

        let no_year = MediaInfo::new(MediaType::Tv, "cctv", "1", "新闻联播").with_year(None);
        assert!(no_year.year.is_none());
        assert!(no_year.title_year.is_none());
    }

    #[test]
    fn test_serialization_skips_missing_fields() {
        let info = MediaInfo::new(MediaType::Tv, "bangumidaily", "42", "葬送的芙莉莲")
            .with_source("bangumi")
            .with_bangumi_id(42)
            .with_vote_average(Some(9.1));
        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value["type"], "电视剧");
        assert_eq!(value["source"], "bangumi");
        assert_eq!(value["media_id"], "42");
        assert_eq!(value["bangumi_id"], 42);
        assert!(value.get("poster_path").is_none());
        assert!(value.get("year").is_none());
    }

    #[test]
    fn test_value_to_string() {
        assert_eq!(value_to_string(&json!("abc")), Some("abc".to_string()));
        assert_eq!(value_to_string(&json!(2020)), Some("2020".to_string()));
        assert_eq!(value_to_string(&json!("")), None);
        assert_eq!(value_to_string(&json!(null)), None);
        assert_eq!(value_to_string(&json!({"a": 1})), None);
    }
}
