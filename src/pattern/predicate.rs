use crate::error::{FlatJsonError, Result};
use regex::{Regex, RegexBuilder};

/// The string-matching operation a predicate applies to its column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchOp {
    Like,
    LikeIgnoreCase,
    /// Boolean regex search (`regexp_like`)
    RegexpLike,
    /// Boolean regex match over the whole column (`regexp_matches`)
    RegexpMatches,
    /// Regex search expressed as `substring(column, regex) IS NOT NULL`
    SubstringMatches,
}

impl MatchOp {
    pub fn is_regex(self) -> bool {
        !matches!(self, MatchOp::Like | MatchOp::LikeIgnoreCase)
    }
}

/// A boolean condition over text columns, handed to a SQL dialect for rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Match {
        column: String,
        op: MatchOp,
        pattern: String,
    },
    Or(Box<Predicate>, Box<Predicate>),
}

impl Predicate {
    pub fn new(column: impl Into<String>, op: MatchOp, pattern: impl Into<String>) -> Self {
        Predicate::Match {
            column: column.into(),
            op,
            pattern: pattern.into(),
        }
    }

    pub fn or(self, other: Predicate) -> Self {
        Predicate::Or(Box::new(self), Box::new(other))
    }

    /// Compile the patterns for repeated in-memory evaluation
    pub fn compile(&self) -> Result<CompiledPredicate> {
        match self {
            Predicate::Match { column, op, pattern } => Ok(CompiledPredicate::Match {
                column: column.clone(),
                regex: compile_pattern(*op, pattern)?,
            }),
            Predicate::Or(left, right) => Ok(CompiledPredicate::Or(
                Box::new(left.compile()?),
                Box::new(right.compile()?),
            )),
        }
    }

    /// Evaluate against a single flattened text standing in for every column
    pub fn matches_text(&self, text: &str) -> Result<bool> {
        Ok(self.compile()?.matches_text(text))
    }
}

/// A predicate with its patterns compiled, mirroring what the database would do
#[derive(Debug, Clone)]
pub enum CompiledPredicate {
    Match { column: String, regex: Regex },
    Or(Box<CompiledPredicate>, Box<CompiledPredicate>),
}

impl CompiledPredicate {
    /// Evaluate against a row; a missing (NULL) column never matches
    pub fn matches<'a, F>(&self, row: &F) -> bool
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        match self {
            CompiledPredicate::Match { column, regex } => row(column.as_str()).is_some_and(|text| regex.is_match(text)),
            CompiledPredicate::Or(left, right) => left.matches(row) || right.matches(row),
        }
    }

    pub fn matches_text(&self, text: &str) -> bool {
        self.matches(&|_: &str| Some(text))
    }
}

fn compile_pattern(op: MatchOp, pattern: &str) -> Result<Regex> {
    let (source, ignore_case) = match op {
        MatchOp::Like => (like_to_regex(pattern), false),
        MatchOp::LikeIgnoreCase => (like_to_regex(pattern), true),
        MatchOp::RegexpLike | MatchOp::SubstringMatches => (sql_regex_to_rust(pattern), false),
        MatchOp::RegexpMatches => (format!("^(?:{})$", sql_regex_to_rust(pattern)), false),
    };

    RegexBuilder::new(&source)
        .case_insensitive(ignore_case)
        .build()
        .map_err(|e| FlatJsonError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })
}

/// Anchored regex equivalent of a SQL LIKE pattern (`%` any run, `_` any char)
fn like_to_regex(pattern: &str) -> String {
    let mut source = String::with_capacity(pattern.len() + 8);
    source.push_str("(?s)^");
    for c in pattern.chars() {
        match c {
            '%' => source.push_str(".*"),
            '_' => source.push('.'),
            other => source.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }
    source.push('$');
    source
}

/// Database regex engines read `\<` and `\>` as literal angle brackets,
/// where the regex crate reads them as word boundaries.
fn sql_regex_to_rust(pattern: &str) -> String {
    let mut source = String::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            source.push(c);
            continue;
        }
        match chars.next() {
            Some(angle @ ('<' | '>')) => source.push(angle),
            Some(next) => {
                source.push('\\');
                source.push(next);
            }
            None => source.push('\\'),
        }
    }
    source
}
