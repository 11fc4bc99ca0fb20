//! Flat key grammar
//!
//! A flat key is a sequence of path steps. Member steps are written as
//! `name` at the root and `.name` below it; index steps are written as `[i]`.
//! Member names that would be ambiguous in that grammar (empty, or containing
//! the separator, a bracket, a quote or a backslash) are written as
//! `["name"]` with `"` and `\` escaped by a backslash.

use crate::error::{FlatJsonError, Result};
use crate::flatten::types::RESERVED_KEY_CHARS;
use std::iter::Peekable;
use std::str::CharIndices;

/// One step of a flat key path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
    Member(String),
    Index(usize),
}

impl PathStep {
    pub fn is_index(&self) -> bool {
        matches!(self, PathStep::Index(_))
    }
}

fn needs_quoting(name: &str, separator: char) -> bool {
    name.is_empty()
        || name
            .chars()
            .any(|c| c == separator || RESERVED_KEY_CHARS.contains(&c))
}

/// Append a member step to `prefix`
pub(crate) fn push_member(prefix: &str, name: &str, separator: char) -> String {
    if needs_quoting(name, separator) {
        let mut key = String::with_capacity(prefix.len() + name.len() + 4);
        key.push_str(prefix);
        key.push_str("[\"");
        for c in name.chars() {
            if c == '"' || c == '\\' {
                key.push('\\');
            }
            key.push(c);
        }
        key.push_str("\"]");
        key
    } else if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}{}{}", prefix, separator, name)
    }
}

/// Append an index step to `prefix`
pub(crate) fn push_index(prefix: &str, index: usize) -> String {
    format!("{}[{}]", prefix, index)
}

/// Tokenize a flat key into path steps. The empty key has no steps and
/// addresses the document root.
pub fn parse_key(key: &str, separator: char) -> Result<Vec<PathStep>> {
    let mut steps = Vec::new();
    let mut chars = key.char_indices().peekable();
    let mut first = true;

    while let Some(&(pos, c)) = chars.peek() {
        if c == '[' {
            chars.next();
            steps.push(parse_bracket(key, &mut chars)?);
        } else if first {
            steps.push(PathStep::Member(read_name(key, separator, &mut chars)?));
        } else if c == separator {
            chars.next();
            steps.push(PathStep::Member(read_name(key, separator, &mut chars)?));
        } else {
            return Err(FlatJsonError::invalid_key(
                key,
                format!("unexpected {:?} at offset {}", c, pos),
            ));
        }
        first = false;
    }

    Ok(steps)
}

fn read_name(key: &str, separator: char, chars: &mut Peekable<CharIndices>) -> Result<String> {
    let mut name = String::new();
    while let Some(&(pos, c)) = chars.peek() {
        if c == separator || c == '[' {
            break;
        }
        if c == ']' || c == '"' {
            return Err(FlatJsonError::invalid_key(
                key,
                format!("unquoted {:?} at offset {}", c, pos),
            ));
        }
        name.push(c);
        chars.next();
    }

    if name.is_empty() {
        return Err(FlatJsonError::invalid_key(key, "empty member name"));
    }
    Ok(name)
}

fn parse_bracket(key: &str, chars: &mut Peekable<CharIndices>) -> Result<PathStep> {
    let step = if let Some(&(_, '"')) = chars.peek() {
        chars.next();
        PathStep::Member(read_quoted(key, chars)?)
    } else {
        let mut digits = String::new();
        while let Some(&(_, c)) = chars.peek() {
            if c == ']' {
                break;
            }
            digits.push(c);
            chars.next();
        }
        PathStep::Index(parse_index(key, &digits)?)
    };

    match chars.next() {
        Some((_, ']')) => Ok(step),
        _ => Err(FlatJsonError::invalid_key(key, "missing closing ']'")),
    }
}

/// Canonical decimal index: ASCII digits only, no sign and no leading zero
fn parse_index(key: &str, digits: &str) -> Result<usize> {
    let canonical = !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
        && (digits == "0" || !digits.starts_with('0'));
    if !canonical {
        return Err(FlatJsonError::invalid_key(key, format!("bad array index {:?}", digits)));
    }
    digits
        .parse::<usize>()
        .map_err(|_| FlatJsonError::invalid_key(key, format!("array index {:?} too large", digits)))
}

fn read_quoted(key: &str, chars: &mut Peekable<CharIndices>) -> Result<String> {
    let mut name = String::new();
    loop {
        match chars.next() {
            Some((_, '\\')) => match chars.next() {
                Some((_, c)) => name.push(c),
                None => return Err(FlatJsonError::invalid_key(key, "dangling escape")),
            },
            Some((_, '"')) => return Ok(name),
            Some((_, c)) => name.push(c),
            None => return Err(FlatJsonError::invalid_key(key, "unterminated quoted name")),
        }
    }
}
