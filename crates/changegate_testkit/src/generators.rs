//! Property-based test generators using proptest.
//!
//! Generated values are trees: no node is shared and there are no cycles.
//! Numbers are finite and never `NaN`, so every generated value compares
//! unchanged against itself.

use changegate_core::Value;
use proptest::prelude::*;

/// Strategy for mapping keys.
pub fn key_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z][a-zA-Z0-9_]{0,9}").expect("Invalid regex")
}

/// Strategy for non-composite, non-callable values.
pub fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Undefined),
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-1.0e6..1.0e6f64).prop_map(Value::Number),
        any::<i32>().prop_map(Value::from),
        "[a-z ]{0,12}".prop_map(Value::String),
    ]
}

/// Strategy for nested values up to four levels deep.
pub fn value_strategy() -> impl Strategy<Value = Value> {
    scalar_strategy().prop_recursive(4, 64, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(|items| Value::sequence(items)),
            prop::collection::btree_map(key_strategy(), inner, 0..6)
                .prop_map(|entries| Value::mapping(entries)),
        ]
    })
}

/// Strategy for a value that is always a mapping at the root.
pub fn form_strategy() -> impl Strategy<Value = Value> {
    prop::collection::btree_map(key_strategy(), value_strategy(), 1..8)
        .prop_map(|entries| Value::mapping(entries))
}

/// Strategy for JSON documents with exactly representable numbers.
pub fn json_strategy() -> impl Strategy<Value = serde_json::Value> {
    let leaf = prop_oneof![
        Just(serde_json::Value::Null),
        any::<bool>().prop_map(serde_json::Value::Bool),
        any::<i32>().prop_map(|n| serde_json::Value::from(n)),
        "[a-z ]{0,12}".prop_map(serde_json::Value::String),
    ];
    leaf.prop_recursive(4, 64, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(serde_json::Value::Array),
            prop::collection::btree_map(key_strategy(), inner, 0..6)
                .prop_map(|entries| serde_json::Value::Object(entries.into_iter().collect())),
        ]
    })
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Creates a configuration for thorough tests.
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            cases: 1024,
            max_shrink_iters: 10000,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
