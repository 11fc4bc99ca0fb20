//! Property-based tests for the flatten codec and the pattern builders.

use flatjson::pattern::{flattened_json_like, flattened_json_regexp_like, flattened_json_regexp_matches};
use flatjson::{JsonFlattener, JsonUnflattener};
use proptest::prelude::*;
use serde_json::{json, Value};

// ============================================================================
// Strategies
// ============================================================================

/// Member names, biased towards characters the key grammar reserves
fn member_name() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z]{1,6}",
        "[a-z.\\[\\]\"\\\\]{0,4}",
    ]
}

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        (-1.0e6f64..1.0e6).prop_map(|f| json!(f)),
        "\\PC{0,8}".prop_map(Value::String),
    ];

    leaf.prop_recursive(4, 48, 5, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..5).prop_map(Value::Array),
            prop::collection::vec((member_name(), inner), 0..5)
                .prop_map(|members| Value::Object(members.into_iter().collect())),
        ]
    })
}

/// A flat key as it appears inside flattened text (JSON-escaped, unquoted)
fn encoded_key(key: &str) -> String {
    let quoted = serde_json::to_string(key).unwrap();
    quoted[1..quoted.len() - 1].to_string()
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// Unflattening restores exactly what was flattened.
    #[test]
    fn round_trip_is_lossless(value in arb_json()) {
        let text = JsonFlattener::new().flatten(&value).unwrap();
        let restored = JsonUnflattener::new().unflatten(&text).unwrap();
        prop_assert_eq!(restored, value);
    }

    /// Custom separators round trip as well.
    #[test]
    fn round_trip_with_custom_separator(value in arb_json(), separator in prop::sample::select(vec!['/', '_', ':'])) {
        let text = JsonFlattener::new().with_separator(separator).flatten(&value).unwrap();
        let restored = JsonUnflattener::new().with_separator(separator).unflatten(&text).unwrap();
        prop_assert_eq!(restored, value);
    }

    /// Flattening is deterministic and the text preserves key order.
    #[test]
    fn flatten_is_deterministic(value in arb_json()) {
        let flattener = JsonFlattener::new();
        let first = flattener.flatten(&value).unwrap();
        prop_assert_eq!(&first, &flattener.flatten(&value).unwrap());

        let document = flattener.flatten_as_map(&value).unwrap();
        let reparsed: serde_json::Map<String, Value> = serde_json::from_str(&first).unwrap();
        let keys: Vec<&String> = document.keys().collect();
        prop_assert_eq!(keys, reparsed.keys().collect::<Vec<_>>());
    }

    /// Every flattened pair is found by the patterns built from it.
    #[test]
    fn patterns_match_their_own_pairs(value in arb_json()) {
        let flattener = JsonFlattener::new();
        let text = flattener.flatten(&value).unwrap();

        for (key, leaf) in flattener.flatten_as_map(&value).unwrap().iter() {
            let key = encoded_key(key);
            let value_text = serde_json::to_string(leaf).unwrap();
            let value_regex = regex::escape(&value_text);

            prop_assert!(flattened_json_like("c", &key, &value_text).matches_text(&text).unwrap());
            prop_assert!(flattened_json_regexp_like("c", &key, &value_regex).matches_text(&text).unwrap());
            prop_assert!(flattened_json_regexp_matches("c", &key, &value_regex).matches_text(&text).unwrap());
        }
    }
}
