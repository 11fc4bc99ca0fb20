//! Attribute conversion - typed values to and from flattened column text
//!
//! A converter pairs an [`AttributeCodec`] (typed value to JSON value) with a
//! [`FlattenedJsonConfig`] (JSON value to flattened text). Any type with
//! serde support converts through [`SerdeCodec`]; other representations can
//! plug in their own codec.

use crate::config::FlattenedJsonConfig;
use crate::error::{FlatJsonError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::marker::PhantomData;

/// Encodes a typed attribute as a JSON value and decodes it back
pub trait AttributeCodec<T> {
    fn encode(&self, attribute: &T) -> Result<Value>;
    fn decode(&self, value: Value) -> Result<T>;
}

/// Codec for any serde-serializable type, backed by serde_json
#[derive(Debug, Clone, Copy, Default)]
pub struct SerdeCodec;

impl<T: Serialize + DeserializeOwned> AttributeCodec<T> for SerdeCodec {
    fn encode(&self, attribute: &T) -> Result<Value> {
        serde_json::to_value(attribute).map_err(|e| FlatJsonError::Serialization(e.to_string()))
    }

    fn decode(&self, value: Value) -> Result<T> {
        serde_json::from_value(value).map_err(|e| FlatJsonError::Serialization(e.to_string()))
    }
}

/// Converts attributes of type `T` to flattened column text and back
#[derive(Debug, Clone)]
pub struct FlattenedJsonConverter<T, C = SerdeCodec> {
    config: FlattenedJsonConfig,
    codec: C,
    _attribute: PhantomData<fn() -> T>,
}

/// Converter for untyped JSON attributes
pub type JsonValueConverter = FlattenedJsonConverter<Value>;

impl<T> FlattenedJsonConverter<T, SerdeCodec>
where
    SerdeCodec: AttributeCodec<T>,
{
    pub fn new(config: FlattenedJsonConfig) -> Self {
        FlattenedJsonConverter::with_codec(config, SerdeCodec)
    }
}

impl<T, C: AttributeCodec<T>> FlattenedJsonConverter<T, C> {
    pub fn with_codec(config: FlattenedJsonConfig, codec: C) -> Self {
        FlattenedJsonConverter {
            config,
            codec,
            _attribute: PhantomData,
        }
    }

    pub fn config(&self) -> &FlattenedJsonConfig {
        &self.config
    }

    /// Attribute to the text stored in the database column
    pub fn to_column(&self, attribute: &T) -> Result<String> {
        let value = self.codec.encode(attribute).inspect_err(|err| {
            tracing::debug!(error = %err, "failed to encode attribute");
        })?;
        self.config.create_flattener().flatten(&value)
    }

    /// Database column text back to the attribute
    pub fn from_column(&self, column: &str) -> Result<T> {
        let value = self.config.create_unflattener().unflatten(column)?;
        self.codec.decode(value).inspect_err(|err| {
            tracing::debug!(error = %err, "failed to decode attribute");
        })
    }
}
