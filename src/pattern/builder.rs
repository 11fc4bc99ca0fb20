//! Search patterns for key/value pairs inside flattened text
//!
//! In flattened text a pair is written either as `"key":value,` when another
//! member follows, or as `"key":value}` when it is the last member. LIKE
//! searches therefore need two alternatives, and regex searches accept
//! either `,` or `}` after the value (and `{` or `,` before the key).
//!
//! Keys and values are inserted as given: values must already be in their
//! JSON form (`"\"xyz\""` for a string, `"3"` for a number).

use crate::pattern::predicate::{MatchOp, Predicate};
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

pub const REGEXP_PAIR_PREFIX: &str = ".*[{,]\"";
pub const REGEXP_PAIR_INFIX: &str = "\":";
pub const REGEXP_PAIR_SUFFIX: &str = "[,}].*";

pub const LIKE_PAIR_PREFIX: &str = "%\"";
pub const LIKE_PAIR_INFIX: &str = "\":";
pub const LIKE_PAIR_SUFFIX1: &str = ",%";
pub const LIKE_PAIR_SUFFIX2: &str = "}";

/// Characters escaped by `quote_regex_special_chars`: `<([{\^-=$!|]})?*+.>`
static REGEX_SPECIAL_CHARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[<(\[{\\^\-=$!|\]})?*+.>]").unwrap()
});

/// Prefix every regex metacharacter in `s` with a backslash
pub fn quote_regex_special_chars(s: &str) -> Cow<'_, str> {
    REGEX_SPECIAL_CHARS.replace_all(s, r"\$0")
}

/// LIKE patterns for a pair followed by another member, and for a final pair
pub fn like_pair_patterns(key: &str, value: &str) -> [String; 2] {
    [
        format!("{}{}{}{}{}", LIKE_PAIR_PREFIX, key, LIKE_PAIR_INFIX, value, LIKE_PAIR_SUFFIX1),
        format!("{}{}{}{}{}", LIKE_PAIR_PREFIX, key, LIKE_PAIR_INFIX, value, LIKE_PAIR_SUFFIX2),
    ]
}

/// Regex matching a pair anywhere in flattened text
pub fn regexp_pair_pattern(key: &str, value_regex: &str, quote_key: bool) -> String {
    let key = if quote_key {
        quote_regex_special_chars(key)
    } else {
        Cow::Borrowed(key)
    };
    format!(
        "{}{}{}{}{}",
        REGEXP_PAIR_PREFIX, key, REGEXP_PAIR_INFIX, value_regex, REGEXP_PAIR_SUFFIX
    )
}

pub fn like(column: &str, pattern: &str) -> Predicate {
    like_with(column, pattern, false)
}

pub fn like_with(column: &str, pattern: &str, ignore_case: bool) -> Predicate {
    let op = if ignore_case {
        MatchOp::LikeIgnoreCase
    } else {
        MatchOp::Like
    };
    Predicate::new(column, op, pattern)
}

/// `column` contains the pair `"key":value`
pub fn flattened_json_like(column: &str, key: &str, value: &str) -> Predicate {
    flattened_json_like_with(column, key, value, false)
}

pub fn flattened_json_like_with(column: &str, key: &str, value: &str, ignore_case: bool) -> Predicate {
    let [middle, last] = like_pair_patterns(key, value);
    like_with(column, &middle, ignore_case).or(like_with(column, &last, ignore_case))
}

pub fn regexp_like(column: &str, regex: &str) -> Predicate {
    Predicate::new(column, MatchOp::RegexpLike, regex)
}

/// `column` contains a pair for `key` whose value matches `value_regex`; the key is quoted
pub fn flattened_json_regexp_like(column: &str, key: &str, value_regex: &str) -> Predicate {
    flattened_json_regexp_like_with(column, key, value_regex, true)
}

pub fn flattened_json_regexp_like_with(
    column: &str,
    key: &str,
    value_regex: &str,
    quote_key: bool,
) -> Predicate {
    regexp_like(column, &regexp_pair_pattern(key, value_regex, quote_key))
}

pub fn regexp_matches(column: &str, regex: &str) -> Predicate {
    Predicate::new(column, MatchOp::RegexpMatches, regex)
}

pub fn flattened_json_regexp_matches(column: &str, key: &str, value_regex: &str) -> Predicate {
    flattened_json_regexp_matches_with(column, key, value_regex, true)
}

pub fn flattened_json_regexp_matches_with(
    column: &str,
    key: &str,
    value_regex: &str,
    quote_key: bool,
) -> Predicate {
    regexp_matches(column, &regexp_pair_pattern(key, value_regex, quote_key))
}

pub fn substring_matches(column: &str, regex: &str) -> Predicate {
    Predicate::new(column, MatchOp::SubstringMatches, regex)
}

pub fn flattened_json_substring_matches(column: &str, key: &str, value_regex: &str) -> Predicate {
    flattened_json_substring_matches_with(column, key, value_regex, true)
}

pub fn flattened_json_substring_matches_with(
    column: &str,
    key: &str,
    value_regex: &str,
    quote_key: bool,
) -> Predicate {
    substring_matches(column, &regexp_pair_pattern(key, value_regex, quote_key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_every_special_char() {
        assert_eq!(
            quote_regex_special_chars(r"<([{\^-=$!|]})?*+.>"),
            r"\<\(\[\{\\\^\-\=\$\!\|\]\}\)\?\*\+\.\>"
        );
        assert_eq!(quote_regex_special_chars("plain_key"), "plain_key");
        assert_eq!(quote_regex_special_chars("numbers[0]"), r"numbers\[0\]");
    }

    #[test]
    fn test_like_pair_patterns() {
        assert_eq!(
            like_pair_patterns("numbers[0]", "3"),
            [r#"%"numbers[0]":3,%"#.to_string(), r#"%"numbers[0]":3}"#.to_string()]
        );
    }

    #[test]
    fn test_regexp_pair_pattern() {
        assert_eq!(
            regexp_pair_pattern("numbers[0]", r"\d+", true),
            r#".*[{,]"numbers\[0\]":\d+[,}].*"#
        );
        assert_eq!(
            regexp_pair_pattern("numbers[0]", r"\d+", false),
            r#".*[{,]"numbers[0]":\d+[,}].*"#
        );
    }

    #[test]
    fn test_flattened_json_like_ors_both_positions() {
        let predicate = flattened_json_like_with("test_attr", "words[1]", "\"xyz\"", true);
        assert_eq!(
            predicate,
            Predicate::new("test_attr", MatchOp::LikeIgnoreCase, r#"%"words[1]":"xyz",%"#)
                .or(Predicate::new("test_attr", MatchOp::LikeIgnoreCase, r#"%"words[1]":"xyz"}"#))
        );
    }

    #[test]
    fn test_regex_variants_share_the_pattern() {
        let expected = r#".*[{,]"a\.b":1[,}].*"#;
        assert_eq!(flattened_json_regexp_like("c", "a.b", "1"), Predicate::new("c", MatchOp::RegexpLike, expected));
        assert_eq!(
            flattened_json_regexp_matches("c", "a.b", "1"),
            Predicate::new("c", MatchOp::RegexpMatches, expected)
        );
        assert_eq!(
            flattened_json_substring_matches("c", "a.b", "1"),
            Predicate::new("c", MatchOp::SubstringMatches, expected)
        );
    }
}
