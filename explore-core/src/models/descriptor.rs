//! Registration descriptor advertised to the host

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::ui::collect_models;

/// Describes one discover source: where to query it, which filters it
/// understands, and how to render them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoverMediaSource {
    /// Display name
    pub name: String,
    pub mediaid_prefix: String,
    /// Relative route including the host API token
    pub api_path: String,
    /// Recognized filter keys and their defaults
    pub filter_params: IndexMap<String, Option<String>>,
    /// Opaque widget tree
    pub filter_ui: Vec<Value>,
    /// Filter key -> keys whose value gates its visibility
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub depends: IndexMap<String, Vec<String>>,
}

impl DiscoverMediaSource {
    /// Check that `depends` and every widget `model` only reference known filter keys
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| Error::InvalidDescriptor {
            source_id: self.mediaid_prefix.clone(),
            reason,
        };

        for (key, parents) in &self.depends {
            if !self.filter_params.contains_key(key) {
                return Err(invalid(format!("depends key '{key}' missing from filter_params")));
            }
            if let Some(parent) = parents.iter().find(|p| !self.filter_params.contains_key(*p)) {
                return Err(invalid(format!(
                    "parent '{parent}' of '{key}' missing from filter_params"
                )));
            }
        }

        if let Some(model) = collect_models(&self.filter_ui)
            .into_iter()
            .find(|m| !self.filter_params.contains_key(m))
        {
            return Err(invalid(format!("filter_ui model '{model}' missing from filter_params")));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::ChipRow;

    fn descriptor() -> DiscoverMediaSource {
        let mut filter_params = IndexMap::new();
        filter_params.insert("fc".to_string(), Some("电视剧".to_string()));
        filter_params.insert("area".to_string(), None);
        let mut depends = IndexMap::new();
        depends.insert("area".to_string(), vec!["fc".to_string()]);

        DiscoverMediaSource {
            name: "CCTV".to_string(),
            mediaid_prefix: "cctv".to_string(),
            api_path: "plugin/ExploreServices/cctv_discover?apikey=t".to_string(),
            filter_params,
            filter_ui: vec![
                ChipRow::new("种类", "fc", vec![]).into_value(),
                ChipRow::new("地区", "area", vec![]).into_value(),
            ],
            depends,
        }
    }

    #[test]
    fn test_valid_descriptor() {
        assert!(descriptor().validate().is_ok());
    }

    #[test]
    fn test_unknown_depends_parent_is_rejected() {
        let mut d = descriptor();
        d.depends.insert("area".to_string(), vec!["mtype".to_string()]);
        let err = d.validate().unwrap_err();
        assert!(err.to_string().contains("parent 'mtype'"));
    }

    #[test]
    fn test_unknown_depends_key_is_rejected() {
        let mut d = descriptor();
        d.depends.insert("sc".to_string(), vec!["fc".to_string()]);
        assert!(d.validate().is_err());
    }

    #[test]
    fn test_unknown_ui_model_is_rejected() {
        let mut d = descriptor();
        d.filter_ui.push(ChipRow::new("年份", "year", vec![]).into_value());
        let err = d.validate().unwrap_err();
        assert!(err.to_string().contains("'year'"));
    }

    #[test]
    fn test_serializes_null_defaults_and_skips_empty_depends() {
        let mut d = descriptor();
        d.depends.clear();
        let value = serde_json::to_value(&d).unwrap();
        assert_eq!(value["filter_params"]["area"], Value::Null);
        assert_eq!(value["filter_params"]["fc"], "电视剧");
        assert!(value.get("depends").is_none());
    }
}
