//! Bangumi calendar response structures

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

/// One day of the broadcast calendar
#[derive(Debug, Clone, Deserialize)]
pub struct CalendarDay {
    pub weekday: Weekday,
    #[serde(default, deserialize_with = "skip_malformed_subjects")]
    pub items: Vec<Subject>,
}

/// Decode each subject on its own; one bad entry must not sink the day
fn skip_malformed_subjects<'de, D>(deserializer: D) -> Result<Vec<Subject>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .iter()
        .filter_map(|item| match Subject::deserialize(item) {
            Ok(subject) => Some(subject),
            Err(e) => {
                warn!(error = %e, "Skipping malformed calendar subject");
                None
            }
        })
        .collect())
}

/// 1 = Monday ... 7 = Sunday
#[derive(Debug, Clone, Deserialize)]
pub struct Weekday {
    pub id: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Subject {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub name_cn: Option<String>,
    #[serde(default)]
    pub air_date: Option<String>,
    #[serde(default)]
    pub images: Option<Images>,
    #[serde(default)]
    pub rating: Option<Rating>,
}

impl Subject {
    /// Chinese title when present, otherwise the original name
    pub fn display_title(&self) -> Option<&str> {
        [self.name_cn.as_deref(), self.name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Images {
    #[serde(default)]
    pub large: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Rating {
    #[serde(default)]
    pub score: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_malformed_subject_is_skipped() {
        let day: CalendarDay = serde_json::from_value(json!({
            "weekday": {"id": 3},
            "items": [
                {"id": 10, "name": "ok"},
                {"id": null, "name": "no id"},
                {"id": 11, "name": 42},
                {"id": 12, "name_cn": "好"}
            ]
        }))
        .unwrap();
        let ids: Vec<_> = day.items.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![10, 12]);
    }

    #[test]
    fn test_null_items_is_empty_day() {
        let day: CalendarDay =
            serde_json::from_value(json!({"weekday": {"id": 1}, "items": null})).unwrap();
        assert!(day.items.is_empty());
        assert!(serde_json::from_value::<CalendarDay>(json!({"weekday": {"id": null}})).is_err());
    }
}
