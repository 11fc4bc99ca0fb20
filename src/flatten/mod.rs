//! JSON flattening - store nested JSON as a single-level object
//!
//! Nested documents are flattened into an ordered mapping from path keys
//! (`a.b[2].c`) to leaf values, serialized as one JSON object per document.
//! The unflattener reverses the transformation exactly, so the text can be
//! stored in a plain string column and read back without loss.

pub mod types;
pub mod key;
pub mod flattener;
pub mod unflattener;

pub use types::{FlattenMode, FlattenOptions, FlattenedDocument, RESERVED_KEY_CHARS, ROOT_KEY};
pub use key::{parse_key, PathStep};
pub use flattener::JsonFlattener;
pub use unflattener::JsonUnflattener;
