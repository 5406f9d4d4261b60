//! Filter UI builders
//!
//! The host renders filter widgets from an opaque JSON tree. Adapters only
//! ever emit one shape, a labelled row holding a chip group bound to a
//! filter key (`model`), optionally gated by a `{{expr}}` visibility
//! predicate that the host evaluates.

use serde_json::{json, Value};

/// A single selectable chip
pub fn chip(value: impl Into<Value>, text: impl Into<String>) -> Value {
    json!({
        "component": "VChip",
        "props": {"filter": true, "tile": true, "value": value.into()},
        "text": text.into(),
    })
}

/// Chips whose value and label are the same string
pub fn chips_from_values<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<Value> {
    values.into_iter().map(|v| chip(v, v)).collect()
}

/// Visibility predicate `{{axis == 'a' || axis == 'b'}}`
#[must_use]
pub fn show_when(axis: &str, values: &[&str]) -> String {
    let clauses = values
        .iter()
        .map(|v| format!("{axis} == '{v}'"))
        .collect::<Vec<_>>()
        .join(" || ");
    format!("{{{{{clauses}}}}}")
}

/// Labelled chip group bound to one filter key
#[derive(Debug, Clone)]
pub struct ChipRow {
    label: String,
    model: String,
    chips: Vec<Value>,
    show: Option<String>,
}

impl ChipRow {
    pub fn new(label: impl Into<String>, model: impl Into<String>, chips: Vec<Value>) -> Self {
        Self {
            label: label.into(),
            model: model.into(),
            chips,
            show: None,
        }
    }

    /// Gate the row behind a host-evaluated predicate (see [`show_when`])
    #[must_use]
    pub fn shown_when(mut self, predicate: String) -> Self {
        self.show = Some(predicate);
        self
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        let mut props = json!({"class": "flex justify-start items-center"});
        if let Some(show) = self.show {
            props["show"] = Value::String(show);
        }
        json!({
            "component": "div",
            "props": props,
            "content": [
                {
                    "component": "div",
                    "props": {"class": "mr-5"},
                    "content": [{"component": "VLabel", "text": self.label}],
                },
                {
                    "component": "VChipGroup",
                    "props": {"model": self.model},
                    "content": self.chips,
                },
            ],
        })
    }
}

/// A filter row discovered from an upstream at bootstrap time.
///
/// Rows belong to one channel and are shown only while the channel selector
/// has that channel's key.
#[derive(Debug, Clone, PartialEq)]
pub struct BootstrapRow {
    pub channel_key: String,
    pub label: String,
    pub model: String,
    pub options: Vec<(Value, String)>,
}

impl BootstrapRow {
    #[must_use]
    pub fn into_value(self, selector: &str) -> Value {
        let chips = self
            .options
            .into_iter()
            .map(|(value, text)| chip(value, text))
            .collect();
        ChipRow::new(self.label, self.model, chips)
            .shown_when(show_when(selector, &[&self.channel_key]))
            .into_value()
    }
}

/// Every `model` referenced anywhere in a UI tree, in document order
#[must_use]
pub fn collect_models(tree: &[Value]) -> Vec<String> {
    fn walk(node: &Value, out: &mut Vec<String>) {
        if let Some(model) = node.pointer("/props/model").and_then(Value::as_str) {
            out.push(model.to_string());
        }
        if let Some(children) = node.get("content").and_then(Value::as_array) {
            for child in children {
                walk(child, out);
            }
        }
    }

    let mut models = Vec::new();
    for node in tree {
        walk(node, &mut models);
    }
    models
}
