use crate::error::{FlatJsonError, Result};
use crate::flatten::key::{parse_key, PathStep};
use crate::flatten::types::{FlattenOptions, FlattenedDocument};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Rebuilds nested JSON from flattened text
#[derive(Debug, Clone, Default)]
pub struct JsonUnflattener {
    options: FlattenOptions,
}

/// Partially rebuilt document. `Vacant` marks a slot no key has written yet,
/// so array padding can later be replaced by a nested container.
#[derive(Debug)]
enum Node {
    Vacant,
    Leaf(Value),
    Object(ObjectNode),
    Array(Vec<Node>),
}

#[derive(Debug, Default)]
struct ObjectNode {
    entries: Vec<(String, Node)>,
    positions: HashMap<String, usize>,
}

impl ObjectNode {
    fn slot(&mut self, name: &str) -> &mut Node {
        let idx = match self.positions.get(name) {
            Some(&idx) => idx,
            None => {
                self.entries.push((name.to_string(), Node::Vacant));
                self.positions.insert(name.to_string(), self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx].1
    }
}

impl Node {
    fn kind(&self) -> &'static str {
        match self {
            Node::Vacant => "nothing",
            Node::Leaf(_) => "a value",
            Node::Object(_) => "an object",
            Node::Array(_) => "an array",
        }
    }

    fn into_value(self) -> Value {
        match self {
            Node::Vacant => Value::Null,
            Node::Leaf(value) => value,
            Node::Object(obj) => {
                let mut map = Map::new();
                for (name, child) in obj.entries {
                    map.insert(name, child.into_value());
                }
                Value::Object(map)
            }
            Node::Array(items) => Value::Array(items.into_iter().map(Node::into_value).collect()),
        }
    }
}

impl JsonUnflattener {
    pub fn new() -> Self {
        JsonUnflattener::default()
    }

    pub fn with_options(options: FlattenOptions) -> Self {
        JsonUnflattener { options }
    }

    pub fn with_separator(mut self, separator: char) -> Self {
        self.options.separator = separator;
        self
    }

    pub fn options(&self) -> &FlattenOptions {
        &self.options
    }

    /// Parse flattened text and rebuild the nested JSON value
    pub fn unflatten(&self, text: &str) -> Result<Value> {
        let parsed: Value = serde_json::from_str(text)?;
        match parsed {
            Value::Object(map) => self.unflatten_map(FlattenedDocument::from(map)),
            Value::Null => Err(FlatJsonError::NotAnObject("null")),
            Value::Bool(_) => Err(FlatJsonError::NotAnObject("a boolean")),
            Value::Number(_) => Err(FlatJsonError::NotAnObject("a number")),
            Value::String(_) => Err(FlatJsonError::NotAnObject("a string")),
            Value::Array(_) => Err(FlatJsonError::NotAnObject("an array")),
        }
    }

    /// Rebuild the nested JSON value from an already parsed flat document
    pub fn unflatten_map(&self, document: FlattenedDocument) -> Result<Value> {
        self.options.validate()?;
        if document.is_empty() {
            return Ok(Value::Object(Map::new()));
        }

        // Every element of a flattened array owns at least one pair, so no
        // index can reach the pair count
        let pairs = document.len();
        let mut root = Node::Vacant;
        for (key, value) in document {
            let steps = parse_key(&key, self.options.separator)?;
            Self::insert(&mut root, &steps, value, &key, pairs).inspect_err(|err| {
                tracing::debug!(%key, error = %err, "unflatten failed");
            })?;
        }

        tracing::trace!(pairs, "unflattened document");
        Ok(root.into_value())
    }

    /// Walk `steps` from `node`, creating containers as needed, and store `leaf` at the end
    fn insert(node: &mut Node, steps: &[PathStep], leaf: Value, key: &str, pairs: usize) -> Result<()> {
        let Some((step, rest)) = steps.split_first() else {
            return match node {
                Node::Vacant => {
                    *node = Node::Leaf(leaf);
                    Ok(())
                }
                other => Err(FlatJsonError::conflict(
                    key,
                    format!("path already holds {}", other.kind()),
                )),
            };
        };

        let child = match step {
            PathStep::Member(name) => {
                if let Node::Vacant = node {
                    *node = Node::Object(ObjectNode::default());
                }
                match node {
                    Node::Object(obj) => obj.slot(name),
                    other => {
                        return Err(FlatJsonError::conflict(
                            key,
                            format!("member {:?} requires an object, found {}", name, other.kind()),
                        ))
                    }
                }
            }
            PathStep::Index(idx) => {
                let len = idx
                    .checked_add(1)
                    .filter(|&len| len <= pairs)
                    .ok_or_else(|| {
                        FlatJsonError::invalid_key(
                            key,
                            format!("array index [{}] out of range for {} pairs", idx, pairs),
                        )
                    })?;
                if let Node::Vacant = node {
                    *node = Node::Array(Vec::new());
                }
                match node {
                    Node::Array(items) => {
                        if items.len() < len {
                            items.resize_with(len, || Node::Vacant);
                        }
                        &mut items[*idx]
                    }
                    other => {
                        return Err(FlatJsonError::conflict(
                            key,
                            format!("index [{}] requires an array, found {}", idx, other.kind()),
                        ))
                    }
                }
            }
        };

        Self::insert(child, rest, leaf, key, pairs)
    }
}
