use crate::error::Result;
use crate::flatten::key::{push_index, push_member};
use crate::flatten::types::{FlattenMode, FlattenOptions, FlattenedDocument, ROOT_KEY};
use serde_json::{Map, Value};

/// Flattens nested JSON into a single-level document of path keys
#[derive(Debug, Clone, Default)]
pub struct JsonFlattener {
    options: FlattenOptions,
}

impl JsonFlattener {
    pub fn new() -> Self {
        JsonFlattener::default()
    }

    pub fn with_options(options: FlattenOptions) -> Self {
        JsonFlattener { options }
    }

    pub fn with_separator(mut self, separator: char) -> Self {
        self.options.separator = separator;
        self
    }

    pub fn with_mode(mut self, mode: FlattenMode) -> Self {
        self.options.mode = mode;
        self
    }

    pub fn options(&self) -> &FlattenOptions {
        &self.options
    }

    /// Flatten a JSON value into flattened text
    pub fn flatten(&self, value: &Value) -> Result<String> {
        self.flatten_as_map(value)?.to_text()
    }

    /// Parse `json` and flatten it into flattened text
    pub fn flatten_str(&self, json: &str) -> Result<String> {
        let value: Value = serde_json::from_str(json)?;
        self.flatten(&value)
    }

    /// Flatten a JSON value into an ordered key/value document
    pub fn flatten_as_map(&self, value: &Value) -> Result<FlattenedDocument> {
        self.options.validate()?;
        let mut document = FlattenedDocument::new();

        match value {
            // An empty root object is already flat
            Value::Object(obj) if obj.is_empty() => {}
            _ => self.flatten_value(value, ROOT_KEY, &mut document),
        }

        tracing::trace!(pairs = document.len(), "flattened document");
        Ok(document)
    }

    /// Recursively emit the leaves below `value` at `prefix`
    fn flatten_value(&self, value: &Value, prefix: &str, document: &mut FlattenedDocument) {
        match value {
            Value::Object(obj) if !self.is_leaf(value) => self.flatten_object(obj, prefix, document),
            Value::Array(arr) if !self.is_leaf(value) => self.flatten_array(arr, prefix, document),
            _ => document.insert(prefix.to_string(), value.clone()),
        }
    }

    fn flatten_object(&self, obj: &Map<String, Value>, prefix: &str, document: &mut FlattenedDocument) {
        for (name, child) in obj.iter() {
            let key = push_member(prefix, name, self.options.separator);
            self.flatten_value(child, &key, document);
        }
    }

    fn flatten_array(&self, arr: &[Value], prefix: &str, document: &mut FlattenedDocument) {
        for (idx, child) in arr.iter().enumerate() {
            let key = push_index(prefix, idx);
            self.flatten_value(child, &key, document);
        }
    }

    /// Scalars, empty containers, and arrays in `KeepArrays` mode are stored whole
    fn is_leaf(&self, value: &Value) -> bool {
        match value {
            Value::Object(obj) => obj.is_empty(),
            Value::Array(arr) => arr.is_empty() || self.options.mode == FlattenMode::KeepArrays,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FlatJsonError;
    use serde_json::json;

    #[test]
    fn test_flat_object_is_unchanged() {
        let flattener = JsonFlattener::new();
        assert_eq!(flattener.flatten(&json!({"abc": 123})).unwrap(), r#"{"abc":123}"#);
    }

    #[test]
    fn test_nested_object() {
        let flattener = JsonFlattener::new();
        assert_eq!(flattener.flatten(&json!({"abc": {"CBA": 123}})).unwrap(), r#"{"abc.CBA":123}"#);
    }

    #[test]
    fn test_arrays_and_traversal_order() {
        let input = json!({
            "z": 1,
            "numbers": [3, 2, 1],
            "a": {"b": [{"c": true}, null]},
        });

        let document = JsonFlattener::new().flatten_as_map(&input).unwrap();
        let keys: Vec<&str> = document.keys().map(String::as_str).collect();

        assert_eq!(
            keys,
            vec!["z", "numbers[0]", "numbers[1]", "numbers[2]", "a.b[0].c", "a.b[1]"]
        );
        assert_eq!(document.get("a.b[1]"), Some(&Value::Null));
    }

    #[test]
    fn test_empty_containers_are_kept() {
        let input = json!({"numbers": [], "words": ["abc"], "props": {}});
        assert_eq!(
            JsonFlattener::new().flatten(&input).unwrap(),
            r#"{"numbers":[],"words[0]":"abc","props":{}}"#
        );
    }

    #[test]
    fn test_root_leaves() {
        let flattener = JsonFlattener::new();
        assert_eq!(flattener.flatten(&json!({})).unwrap(), "{}");
        assert_eq!(flattener.flatten(&json!([])).unwrap(), r#"{"":[]}"#);
        assert_eq!(flattener.flatten(&json!("text")).unwrap(), r#"{"":"text"}"#);
        assert_eq!(flattener.flatten(&json!([1, [2]])).unwrap(), r#"{"[0]":1,"[1][0]":2}"#);
    }

    #[test]
    fn test_keep_arrays_mode() {
        let flattener = JsonFlattener::new().with_mode(FlattenMode::KeepArrays);
        assert_eq!(
            flattener.flatten(&json!({"a": {"b": [1, {"c": 2}]}})).unwrap(),
            r#"{"a.b":[1,{"c":2}]}"#
        );
    }

    #[test]
    fn test_custom_separator_and_reserved_names() {
        let flattener = JsonFlattener::new().with_separator('/');
        assert_eq!(
            flattener.flatten(&json!({"a": {"b.c": 1, "d/e": 2}})).unwrap(),
            r#"{"a/b.c":1,"a[\"d/e\"]":2}"#
        );
    }

    #[test]
    fn test_string_escaping_and_numbers_preserved() {
        let text = r#"{"s":"quote \" and \\ and \n","n":1.50,"big":123456789012345678901234567890}"#;
        let flattened = JsonFlattener::new().flatten_str(text).unwrap();
        assert_eq!(flattened, text);
    }

    #[test]
    fn test_reserved_separator_is_an_error() {
        let flattener = JsonFlattener::new().with_separator('[');
        let err = flattener.flatten(&json!({"a": {"b": 1}})).unwrap_err();
        assert!(matches!(err, FlatJsonError::InvalidSeparator('[')));
    }

    #[test]
    fn test_invalid_json_is_a_parse_error() {
        let err = JsonFlattener::new().flatten_str("{not json").unwrap_err();
        assert!(matches!(err, FlatJsonError::Parse(_)));
    }
}
