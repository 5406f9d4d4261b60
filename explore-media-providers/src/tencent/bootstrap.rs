//! One-time filter axis discovery
//!
//! The first page of every channel carries `item_type == "11"` entries that
//! describe the filter options for that channel. Each `index_name` becomes
//! one chip row bound to its `index_item_key`.

use indexmap::IndexMap;
use serde_json::Value;

use explore_core::models::value_to_string;
use explore_core::ui::BootstrapRow;

/// Option value used by upstream for the "all" affordance
const ALL_OPTION: &str = "-1";

fn field(item: &Value, key: &str) -> Option<String> {
    item.pointer(&format!("/item_params/{key}"))
        .and_then(value_to_string)
}

/// Group filter descriptor items into chip rows, in first-seen order
pub fn group_rows(channel_key: &str, items: &[Value]) -> Vec<BootstrapRow> {
    let mut groups: IndexMap<String, Vec<&Value>> = IndexMap::new();
    for item in items {
        if item.get("item_type").and_then(value_to_string).as_deref() != Some("11") {
            continue;
        }
        let Some(index_name) = field(item, "index_name") else {
            continue;
        };
        groups.entry(index_name).or_default().push(item);
    }

    groups
        .into_iter()
        .filter_map(|(index_name, entries)| {
            let first = entries.first()?;
            let model = field(first, "index_item_key")?;
            let label = if field(first, "option_value").as_deref() == Some(ALL_OPTION) {
                field(first, "option_name").unwrap_or(index_name)
            } else {
                index_name
            };

            let options = entries
                .iter()
                .filter(|e| field(e, "option_value").as_deref() != Some(ALL_OPTION))
                .filter_map(|e| {
                    let value = e.pointer("/item_params/option_value")?.clone();
                    Some((value, field(e, "option_name").unwrap_or_default()))
                })
                .collect();

            Some(BootstrapRow {
                channel_key: channel_key.to_string(),
                label,
                model,
                options,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn option(index_name: &str, key: &str, value: &str, name: &str) -> Value {
        json!({
            "item_type": "11",
            "item_params": {
                "index_name": index_name,
                "index_item_key": key,
                "option_value": value,
                "option_name": name,
            }
        })
    }

    #[test]
    fn test_groups_by_index_name() {
        let items = vec![
            option("类型", "itype", "-1", "全部类型"),
            option("类型", "itype", "1", "动作"),
            json!({"item_type": "2", "item_params": {"title": "x"}}),
            option("地区", "iarea", "814", "内地"),
            option("类型", "itype", "2", "喜剧"),
            option("地区", "iarea", "815", "香港"),
        ];
        let rows = group_rows("movie", &items);
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].label, "全部类型");
        assert_eq!(rows[0].model, "itype");
        assert_eq!(rows[0].channel_key, "movie");
        assert_eq!(
            rows[0].options,
            vec![(json!("1"), "动作".to_string()), (json!("2"), "喜剧".to_string())]
        );

        assert_eq!(rows[1].label, "地区");
        assert_eq!(rows[1].model, "iarea");
        assert_eq!(rows[1].options.len(), 2);
    }

    #[test]
    fn test_numeric_item_type_and_missing_key() {
        let items = vec![
            json!({"item_type": 11, "item_params": {
                "index_name": "年份", "index_item_key": "iyear",
                "option_value": 2024, "option_name": "2024"}}),
            json!({"item_type": "11", "item_params": {"index_name": "坏行", "option_value": "1"}}),
        ];
        let rows = group_rows("tv", &items);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].options, vec![(json!(2024), "2024".to_string())]);
    }

    #[test]
    fn test_no_filter_items() {
        assert!(group_rows("tv", &[]).is_empty());
    }
}
