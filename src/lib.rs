//! # flatjson - Flattened JSON Columns
//!
//! Store nested JSON in a single text column as a flat, one-level JSON
//! object, read it back losslessly, and search it with SQL string matching.
//!
//! ## Modules
//!
//! - **flatten**: Flatten nested JSON into path keys and rebuild it
//! - **pattern**: Build LIKE / REGEXP predicates for flattened key/value pairs
//! - **convert**: Typed attributes to and from column text
//! - **config**: Explicit, shareable flattener/unflattener configuration
//!
//! ## Quick Start
//!
//! ### Flattening
//!
//! ```rust
//! use flatjson::{JsonFlattener, JsonUnflattener};
//! use serde_json::json;
//!
//! # fn main() -> flatjson::Result<()> {
//! let data = json!({"abc": {"CBA": 123}, "numbers": [3, 2, 1]});
//!
//! let text = JsonFlattener::new().flatten(&data)?;
//! assert_eq!(text, r#"{"abc.CBA":123,"numbers[0]":3,"numbers[1]":2,"numbers[2]":1}"#);
//!
//! let restored = JsonUnflattener::new().unflatten(&text)?;
//! assert_eq!(restored, data);
//! # Ok(())
//! # }
//! ```
//!
//! ### Searching
//!
//! ```rust
//! use flatjson::pattern::{flattened_json_like, SqlDialect};
//!
//! let predicate = flattened_json_like("test_attr", "numbers[0]", "3");
//! let sql = SqlDialect::standard().render(&predicate);
//! // (test_attr like '%"numbers[0]":3,%' or test_attr like '%"numbers[0]":3}')
//!
//! assert!(predicate.matches_text(r#"{"numbers[0]":3,"numbers[1]":2}"#).unwrap());
//! ```

use anyhow::{Context, Result as AnyResult};
use serde_json::Value;
use std::io::{BufRead, Write};

pub mod error;
pub mod config;
pub mod flatten;
pub mod convert;
pub mod pattern;

// Re-export commonly used types for convenience
pub use error::{FlatJsonError, Result};
pub use config::FlattenedJsonConfig;
pub use flatten::{FlattenMode, FlattenOptions, FlattenedDocument, JsonFlattener, JsonUnflattener};
pub use convert::{AttributeCodec, FlattenedJsonConverter, JsonValueConverter, SerdeCodec};
pub use pattern::{MatchOp, Predicate, SqlDialect};

/// Flatten a newline-delimited JSON stream, one flattened document per line
pub fn flatten_json<R: BufRead, W: Write>(
    reader: R,
    writer: &mut W,
    config: &FlattenedJsonConfig,
) -> AnyResult<usize> {
    let flattener = config.create_flattener();
    let mut count = 0;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read line")?;
        if line.trim().is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(&line)
            .with_context(|| format!("Failed to parse JSON on line {}", line_no + 1))?;

        let text = flattener
            .flatten(&value)
            .with_context(|| format!("Failed to flatten line {}", line_no + 1))?;
        writeln!(writer, "{}", text).context("Failed to write document")?;
        count += 1;
    }

    Ok(count)
}

/// Unflatten a stream of flattened documents, one per line
pub fn unflatten_json<R: BufRead, W: Write>(
    reader: R,
    writer: &mut W,
    config: &FlattenedJsonConfig,
) -> AnyResult<usize> {
    let unflattener = config.create_unflattener();
    let mut count = 0;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read line")?;
        if line.trim().is_empty() {
            continue;
        }
        let value = unflattener
            .unflatten(&line)
            .with_context(|| format!("Failed to unflatten line {}", line_no + 1))?;

        let json = serde_json::to_string(&value).context("Failed to serialize document")?;
        writeln!(writer, "{}", json).context("Failed to write document")?;
        count += 1;
    }

    Ok(count)
}
