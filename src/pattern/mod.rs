//! Flattened JSON search - SQL predicates over flattened text
//!
//! Builders produce [`Predicate`]s for LIKE, `regexp_like`, `regexp_matches`
//! and `substring` searches of a key/value pair. A [`SqlDialect`] renders
//! them to SQL; [`Predicate::compile`] evaluates them in memory.

pub mod builder;
pub mod predicate;
pub mod dialect;

pub use builder::{
    flattened_json_like, flattened_json_like_with, flattened_json_regexp_like,
    flattened_json_regexp_like_with, flattened_json_regexp_matches,
    flattened_json_regexp_matches_with, flattened_json_substring_matches,
    flattened_json_substring_matches_with, like, like_pair_patterns, like_with,
    quote_regex_special_chars, regexp_like, regexp_matches, regexp_pair_pattern,
    substring_matches, LIKE_PAIR_INFIX, LIKE_PAIR_PREFIX, LIKE_PAIR_SUFFIX1, LIKE_PAIR_SUFFIX2,
    REGEXP_PAIR_INFIX, REGEXP_PAIR_PREFIX, REGEXP_PAIR_SUFFIX,
};
pub use predicate::{CompiledPredicate, MatchOp, Predicate};
pub use dialect::{quote_literal, SqlDialect};
