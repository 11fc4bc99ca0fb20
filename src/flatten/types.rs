use crate::error::{FlatJsonError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key used for a document whose root is itself a leaf (a scalar or `[]`)
pub const ROOT_KEY: &str = "";

/// How arrays are treated while flattening
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlattenMode {
    /// Arrays are flattened element by element into `[i]` keys
    #[default]
    Normal,
    /// Arrays are kept whole as leaf values
    KeepArrays,
}

/// Characters the key grammar reserves, so never usable as the separator
pub const RESERVED_KEY_CHARS: [char; 4] = ['[', ']', '"', '\\'];

/// Options shared by the flattener and unflattener
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawFlattenOptions")]
pub struct FlattenOptions {
    /// Separator placed between object member names
    pub separator: char,

    /// Array handling
    pub mode: FlattenMode,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        FlattenOptions {
            separator: '.',
            mode: FlattenMode::Normal,
        }
    }
}

impl FlattenOptions {
    pub fn new(separator: char, mode: FlattenMode) -> Result<Self> {
        let options = FlattenOptions { separator, mode };
        options.validate()?;
        Ok(options)
    }

    /// Reject a separator that flattened keys could not be parsed back with
    pub fn validate(&self) -> Result<()> {
        if RESERVED_KEY_CHARS.contains(&self.separator) {
            return Err(FlatJsonError::InvalidSeparator(self.separator));
        }
        Ok(())
    }
}

/// Options as read from a config file, before validation
#[derive(Deserialize)]
#[serde(default)]
struct RawFlattenOptions {
    separator: char,
    mode: FlattenMode,
}

impl Default for RawFlattenOptions {
    fn default() -> Self {
        let FlattenOptions { separator, mode } = FlattenOptions::default();
        RawFlattenOptions { separator, mode }
    }
}

impl TryFrom<RawFlattenOptions> for FlattenOptions {
    type Error = FlatJsonError;

    fn try_from(raw: RawFlattenOptions) -> Result<Self> {
        FlattenOptions::new(raw.separator, raw.mode)
    }
}

/// An ordered mapping from flat keys to leaf values - one flattened document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlattenedDocument {
    entries: Map<String, Value>,
}

impl FlattenedDocument {
    pub fn new() -> Self {
        FlattenedDocument { entries: Map::new() }
    }

    pub(crate) fn insert(&mut self, key: String, value: Value) {
        self.entries.insert(key, value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pairs in document traversal order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    /// Serialize as flattened text: `{"k1":v1,"k2":v2}` with no whitespace
    pub fn to_text(&self) -> Result<String> {
        serde_json::to_string(&self.entries).map_err(|e| FlatJsonError::Serialization(e.to_string()))
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.entries
    }
}

impl From<Map<String, Value>> for FlattenedDocument {
    fn from(entries: Map<String, Value>) -> Self {
        FlattenedDocument { entries }
    }
}

impl IntoIterator for FlattenedDocument {
    type Item = (String, Value);
    type IntoIter = serde_json::map::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_text_has_no_whitespace() {
        let mut doc = FlattenedDocument::new();
        doc.insert("a.b".to_string(), json!(1));
        doc.insert("c[0]".to_string(), json!("x y"));

        assert_eq!(doc.to_text().unwrap(), r#"{"a.b":1,"c[0]":"x y"}"#);
    }

    #[test]
    fn test_options_from_partial_json() {
        let options: FlattenOptions = serde_json::from_str(r#"{"mode":"keep_arrays"}"#).unwrap();

        assert_eq!(options.separator, '.');
        assert_eq!(options.mode, FlattenMode::KeepArrays);
    }

    #[test]
    fn test_reserved_separators_are_rejected() {
        for separator in RESERVED_KEY_CHARS {
            assert!(matches!(
                FlattenOptions::new(separator, FlattenMode::Normal),
                Err(FlatJsonError::InvalidSeparator(c)) if c == separator
            ));
        }
        assert!(FlattenOptions::new('/', FlattenMode::Normal).is_ok());

        let err = serde_json::from_str::<FlattenOptions>(r#"{"separator":"["}"#).unwrap_err();
        assert!(err.to_string().contains("reserved"));
    }
}
