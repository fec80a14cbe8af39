//! Output formatting and control utilities.
//!
//! CHANGELOG:
//! - 10/19/2026 - Truncate on char boundaries; drop the minimal preset
//! - 01/10/2026 - Initial implementation

use serde::Serialize;
use serde_json::{json, Value};

/// Output control settings from CLI flags.
#[derive(Debug, Clone, Default)]
pub struct OutputControls {
    pub json: bool,
    pub compact: bool,
    pub fields: Option<String>,
    pub max_text_chars: Option<u32>,
}

impl OutputControls {
    /// Render data as JSON according to output controls.
    pub fn emit<T: Serialize>(&self, data: &T) -> String {
        let value = serde_json::to_value(data).unwrap_or(json!(null));

        let filtered = match self.fields {
            Some(ref fields) => filter_fields(&value, fields),
            None => value,
        };

        let truncated = match self.max_text_chars {
            Some(max_chars) => truncate_text_fields(&filtered, max_chars as usize),
            None => filtered,
        };

        if self.compact {
            serde_json::to_string(&truncated).unwrap_or_else(|_| "{}".to_string())
        } else {
            serde_json::to_string_pretty(&truncated).unwrap_or_else(|_| "{}".to_string())
        }
    }

    /// Print data to stdout according to output controls.
    pub fn print<T: Serialize>(&self, data: &T) {
        println!("{}", self.emit(data));
    }

    /// Shorten free text for table output.
    pub fn clip(&self, text: &str) -> String {
        match self.max_text_chars {
            Some(max) => truncate_str(text, max as usize),
            None => text.to_string(),
        }
    }
}

/// Filter JSON value to only include specified fields.
fn filter_fields(value: &Value, fields: &str) -> Value {
    let field_list: Vec<&str> = fields.split(',').map(|s| s.trim()).collect();

    match value {
        Value::Array(arr) => Value::Array(arr.iter().map(|v| filter_fields(v, fields)).collect()),
        Value::Object(map) => {
            let mut filtered = serde_json::Map::new();
            for field in &field_list {
                if let Some(v) = map.get(*field) {
                    filtered.insert(field.to_string(), v.clone());
                }
            }
            Value::Object(filtered)
        }
        _ => value.clone(),
    }
}

/// Truncate string fields in JSON value.
fn truncate_text_fields(value: &Value, max_chars: usize) -> Value {
    match value {
        Value::String(s) => Value::String(truncate_str(s, max_chars)),
        Value::Array(arr) => {
            Value::Array(arr.iter().map(|v| truncate_text_fields(v, max_chars)).collect())
        }
        Value::Object(map) => {
            let mut truncated = serde_json::Map::new();
            for (k, v) in map {
                truncated.insert(k.clone(), truncate_text_fields(v, max_chars));
            }
            Value::Object(truncated)
        }
        _ => value.clone(),
    }
}

fn truncate_str(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", &s[..end]),
        None => s.to_string(),
    }
}

/// Format error as JSON.
pub fn format_error(error: &str) -> String {
    serde_json::to_string(&json!({
        "error": error,
        "success": false
    }))
    .unwrap_or_else(|_| format!(r#"{{"error":"{}"}}"#, error))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_fields_on_array() {
        let value = json!([{"id": 1, "artifact_type": "TSK_PM_CONTACT", "file_id": 3}]);
        let filtered = filter_fields(&value, "id, file_id");
        assert_eq!(filtered, json!([{"id": 1, "file_id": 3}]));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_str("Grüße aus Zürich", 4), "Grüß...");
        assert_eq!(truncate_str("short", 10), "short");

        let value = json!({"subject": "Hello there", "nested": ["abcdef"]});
        let truncated = truncate_text_fields(&value, 5);
        assert_eq!(truncated, json!({"subject": "Hello...", "nested": ["abcde..."]}));
    }

    #[test]
    fn test_emit_compact() {
        let controls = OutputControls {
            json: true,
            compact: true,
            ..Default::default()
        };
        assert_eq!(controls.emit(&json!({"a": 1})), r#"{"a":1}"#);
    }

    #[test]
    fn test_format_error() {
        let err: Value = serde_json::from_str(&format_error("boom")).unwrap();
        assert_eq!(err["success"], false);
        assert_eq!(err["error"], "boom");
    }
}
