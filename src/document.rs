//! Hierarchical key/value documents.
//!
//! A [`Document`] is the parsed form of a config file: a table whose values
//! are scalars, lists or nested tables. Key lookup is case-insensitive, and
//! the typed getters are lenient, so `"true"` reads as a bool and `"10"` as an
//! integer. That keeps the flat formats (properties, env, ini), which only
//! carry strings, usable with the same schema as yaml or json.

use serde_json::{Map, Value};

/// A parsed config table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    root: Map<String, Value>,
}

impl Document {
    /// Wrap a JSON value. Anything but an object yields an empty document.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(root) => Self { root },
            _ => Self::default(),
        }
    }

    /// Returns true if `key` is present with a non-null value.
    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| !v.is_null())
    }

    /// Look up a value, trying an exact match before a case-insensitive one.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.root.get(key).or_else(|| {
            self.root
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v)
        })
    }

    /// Returns the nested table under `key`, if it is one.
    pub fn subsection(&self, key: &str) -> Option<Document> {
        match self.get(key)? {
            Value::Object(map) => Some(Self { root: map.clone() }),
            _ => None,
        }
    }

    /// Keys of this table in their natural (sorted) order.
    pub fn all_keys(&self) -> Vec<String> {
        self.root.keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// String value of `key`; scalars are stringified, anything else is empty.
    pub fn get_string(&self, key: &str) -> String {
        self.get(key).map(scalar_to_string).unwrap_or_default()
    }

    /// Bool value of `key`, false when absent or unparseable.
    pub fn get_bool(&self, key: &str) -> bool {
        match self.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
            Some(Value::String(s)) => parse_bool(s).unwrap_or(false),
            _ => false,
        }
    }

    /// Integer value of `key`, 0 when absent or unparseable.
    pub fn get_i64(&self, key: &str) -> i64 {
        match self.get(key) {
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .unwrap_or(0),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
            Some(Value::Bool(b)) => i64::from(*b),
            _ => 0,
        }
    }

    /// List value of `key`. A string is split on commas.
    pub fn get_string_list(&self, key: &str) -> Option<Vec<String>> {
        match self.get(key)? {
            Value::Array(items) => Some(items.iter().map(scalar_to_string).collect()),
            Value::String(s) => Some(
                s.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
            Value::Null => None,
            _ => Some(Vec::new()),
        }
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim() {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Document {
        Document::from_value(json!({
            "appenders": ["console", "file"],
            "console": { "target": "stdout", "logLevel": "debug" },
            "rolling": { "maxSize": "10", "compress": "true", "maxAge": 7, "localTime": 1 },
            "empty": null
        }))
    }

    #[test]
    fn test_has_and_get() {
        let doc = sample();
        assert!(doc.has("appenders"));
        assert!(!doc.has("missing"));
        assert!(!doc.has("empty"));
        assert!(doc.get("console").is_some());
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let doc = sample();
        let console = doc.subsection("CONSOLE").expect("section");
        assert_eq!(console.get_string("loglevel"), "debug");
        assert_eq!(console.get_string("LogLevel"), "debug");
    }

    #[test]
    fn test_subsection_requires_table() {
        let doc = sample();
        assert!(doc.subsection("console").is_some());
        assert!(doc.subsection("appenders").is_none());
        assert!(doc.subsection("missing").is_none());
    }

    #[test]
    fn test_lenient_getters() {
        let rolling = sample().subsection("rolling").unwrap();
        assert_eq!(rolling.get_i64("maxSize"), 10);
        assert_eq!(rolling.get_i64("maxAge"), 7);
        assert_eq!(rolling.get_i64("maxBackups"), 0);
        assert!(rolling.get_bool("compress"));
        assert!(rolling.get_bool("localTime"));
        assert!(!rolling.get_bool("missing"));
        assert_eq!(rolling.get_string("maxAge"), "7");
    }

    #[test]
    fn test_string_list() {
        let doc = Document::from_value(json!({
            "list": ["a", "b"],
            "csv": "a, b ,,c",
            "number": 3
        }));
        assert_eq!(doc.get_string_list("list").unwrap(), vec!["a", "b"]);
        assert_eq!(doc.get_string_list("csv").unwrap(), vec!["a", "b", "c"]);
        assert!(doc.get_string_list("number").unwrap().is_empty());
        assert!(doc.get_string_list("missing").is_none());
    }

    #[test]
    fn test_all_keys_sorted() {
        let doc = Document::from_value(json!({ "b": 1, "a": 2, "c": 3 }));
        assert_eq!(doc.all_keys(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_from_non_object() {
        assert!(Document::from_value(json!([1, 2])).is_empty());
    }
}
