//! Flattened JSON configuration
//!
//! A `FlattenedJsonConfig` is built once at startup and handed to every
//! converter that needs it. Cloning is cheap; the customizers are shared.

use crate::flatten::{FlattenOptions, JsonFlattener, JsonUnflattener};
use std::fmt;
use std::sync::Arc;

pub type FlattenerCustomizer = Arc<dyn Fn(JsonFlattener) -> JsonFlattener + Send + Sync>;
pub type UnflattenerCustomizer = Arc<dyn Fn(JsonUnflattener) -> JsonUnflattener + Send + Sync>;

#[derive(Clone)]
pub struct FlattenedJsonConfig {
    /// Base options for every flattener and unflattener
    pub options: FlattenOptions,

    flattener_customizer: FlattenerCustomizer,
    unflattener_customizer: UnflattenerCustomizer,
}

impl Default for FlattenedJsonConfig {
    fn default() -> Self {
        FlattenedJsonConfig {
            options: FlattenOptions::default(),
            flattener_customizer: Arc::new(|f: JsonFlattener| f),
            unflattener_customizer: Arc::new(|u: JsonUnflattener| u),
        }
    }
}

impl fmt::Debug for FlattenedJsonConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlattenedJsonConfig")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl FlattenedJsonConfig {
    pub fn new(options: FlattenOptions) -> Self {
        FlattenedJsonConfig {
            options,
            ..Default::default()
        }
    }

    pub fn with_flattener_customizer<F>(mut self, customizer: F) -> Self
    where
        F: Fn(JsonFlattener) -> JsonFlattener + Send + Sync + 'static,
    {
        self.flattener_customizer = Arc::new(customizer);
        self
    }

    pub fn with_unflattener_customizer<F>(mut self, customizer: F) -> Self
    where
        F: Fn(JsonUnflattener) -> JsonUnflattener + Send + Sync + 'static,
    {
        self.unflattener_customizer = Arc::new(customizer);
        self
    }

    /// A flattener built from the base options, then customized
    pub fn create_flattener(&self) -> JsonFlattener {
        (self.flattener_customizer)(JsonFlattener::with_options(self.options.clone()))
    }

    /// An unflattener built from the base options, then customized
    pub fn create_unflattener(&self) -> JsonUnflattener {
        (self.unflattener_customizer)(JsonUnflattener::with_options(self.options.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::FlattenMode;
    use serde_json::json;

    #[test]
    fn test_default_config_round_trips() {
        let config = FlattenedJsonConfig::default();
        let text = config.create_flattener().flatten(&json!({"a": {"b": [1]}})).unwrap();

        assert_eq!(text, r#"{"a.b[0]":1}"#);
        assert_eq!(config.create_unflattener().unflatten(&text).unwrap(), json!({"a": {"b": [1]}}));
    }

    #[test]
    fn test_customizers_are_applied() {
        let config = FlattenedJsonConfig::default()
            .with_flattener_customizer(|f| f.with_separator('_').with_mode(FlattenMode::KeepArrays))
            .with_unflattener_customizer(|u| u.with_separator('_'));

        let flattener = config.create_flattener();
        assert_eq!(flattener.options().separator, '_');

        let text = flattener.flatten(&json!({"a": {"b": [1, 2]}})).unwrap();
        assert_eq!(text, r#"{"a_b":[1,2]}"#);
        assert_eq!(config.create_unflattener().unflatten(&text).unwrap(), json!({"a": {"b": [1, 2]}}));
    }

    #[test]
    fn test_config_is_shareable_across_threads() {
        let config = FlattenedJsonConfig::default();
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let config = config.clone();
                std::thread::spawn(move || config.create_flattener().flatten(&json!({"n": [i]})).unwrap())
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap(), format!(r#"{{"n[0]":{}}}"#, i));
        }
    }
}
