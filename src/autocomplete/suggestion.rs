//! Suggestions as returned by the suggest endpoints.

use serde_json::Value;

/// One candidate completion.
///
/// Endpoints answer either with plain strings or with
/// `{"label": .., "value": .., "hint": ..}` records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Suggestion {
    Text(String),
    Record {
        label: Option<String>,
        value: Option<String>,
        hint: Option<String>,
    },
}

impl Suggestion {
    /// Text shown in the row. Falls back to the value.
    pub fn label(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Record { label, value, .. } => {
                label.as_deref().or(value.as_deref()).unwrap_or("")
            }
        }
    }

    /// Text committed into the input. Falls back to the label.
    pub fn value(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Record { label, value, .. } => {
                value.as_deref().or(label.as_deref()).unwrap_or("")
            }
        }
    }

    pub fn hint(&self) -> &str {
        match self {
            Self::Text(_) => "",
            Self::Record { hint, .. } => hint.as_deref().unwrap_or(""),
        }
    }

    fn from_value(item: &Value) -> Option<Self> {
        match item {
            Value::String(text) => Some(Self::Text(text.clone())),
            Value::Number(_) | Value::Bool(_) => Some(Self::Text(item.to_string())),
            Value::Object(fields) => Some(Self::Record {
                label: fields.get("label").and_then(field_text),
                value: fields.get("value").and_then(field_text),
                hint: fields.get("hint").and_then(field_text),
            }),
            Value::Null | Value::Array(_) => None,
        }
    }
}

fn field_text(field: &Value) -> Option<String> {
    match field {
        Value::String(text) => Some(text.clone()),
        Value::Number(_) | Value::Bool(_) => Some(field.to_string()),
        _ => None,
    }
}

/// Reads a response body. Anything but an array yields no suggestions;
/// null and nested arrays inside the array are skipped.
pub fn parse_suggestions(body: &Value) -> Vec<Suggestion> {
    match body {
        Value::Array(items) => items.iter().filter_map(Suggestion::from_value).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_strings() {
        let parsed = parse_suggestions(&json!(["a", "b"]));
        assert_eq!(parsed, vec![Suggestion::Text("a".into()), Suggestion::Text("b".into())]);
        assert_eq!(parsed[0].label(), "a");
        assert_eq!(parsed[0].value(), "a");
        assert_eq!(parsed[0].hint(), "");
    }

    #[test]
    fn test_records_with_fallbacks() {
        let parsed = parse_suggestions(&json!([
            {"label": "jdoe", "value": "jdoe", "hint": "jdoe@example.com"},
            {"value": "only-value"},
            {"label": "only-label", "hint": null},
            {}
        ]));
        assert_eq!(parsed.len(), 4);
        assert_eq!(parsed[0].hint(), "jdoe@example.com");
        assert_eq!(parsed[1].label(), "only-value");
        assert_eq!(parsed[2].value(), "only-label");
        assert_eq!(parsed[2].hint(), "");
        assert_eq!(parsed[3].label(), "");
        assert_eq!(parsed[3].value(), "");
    }

    #[test]
    fn test_non_array_body_is_empty() {
        assert!(parse_suggestions(&json!({"results": ["a"]})).is_empty());
        assert!(parse_suggestions(&json!("a")).is_empty());
        assert!(parse_suggestions(&Value::Null).is_empty());
    }

    #[test]
    fn test_scalars_and_nulls_inside_array() {
        let parsed = parse_suggestions(&json!([42, null, true, ["x"]]));
        assert_eq!(
            parsed,
            vec![Suggestion::Text("42".into()), Suggestion::Text("true".into())]
        );
    }
}
