//! Conversion between [`Value`] and `serde_json`.
//!
//! Loading JSON is lossless apart from number precision: every number becomes
//! an `f64`. Exporting follows `JSON.stringify`: `Undefined` and callables are
//! dropped from mappings and written as `null` elsewhere, non-finite numbers
//! become `null`, and cycles are an error.

use crate::diff::{PathSegment, ValuePath};
use crate::error::{CoreError, CoreResult};
use crate::value::{Mapping, NodeId, Sequence, Value};
use serde_json::{Map, Number};
use std::collections::HashSet;

// Largest integer an f64 holds exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            // Only arbitrary-precision numbers lack an f64 form.
            serde_json::Value::Number(n) => n.as_f64().map_or(Value::Null, Value::Number),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Sequence(Sequence::from_vec(items.into_iter().map(Value::from).collect()))
            }
            serde_json::Value::Object(entries) => Value::Mapping(Mapping::from_entries(entries)),
        }
    }
}

impl Value {
    /// Parse JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if `text` is not valid JSON.
    pub fn from_json_str(text: &str) -> CoreResult<Self> {
        let json: serde_json::Value = serde_json::from_str(text)?;
        Ok(json.into())
    }

    /// Parse JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if `bytes` are not valid JSON.
    pub fn from_json_slice(bytes: &[u8]) -> CoreResult<Self> {
        let json: serde_json::Value = serde_json::from_slice(bytes)?;
        Ok(json.into())
    }

    /// Export to a `serde_json` value.
    ///
    /// A root that is `Undefined` or callable exports as `null`. Nodes shared
    /// by several parents are written once per parent.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::CyclicValue`] if the value references itself.
    pub fn to_json(&self) -> CoreResult<serde_json::Value> {
        let mut exporter = Exporter::default();
        exporter.export(self)
    }

    /// Export to compact JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::CyclicValue`] if the value references itself.
    pub fn to_json_string(&self) -> CoreResult<String> {
        Ok(serde_json::to_string(&self.to_json()?)?)
    }
}

#[derive(Default)]
struct Exporter {
    open: HashSet<NodeId>,
    path: ValuePath,
}

impl Exporter {
    fn export(&mut self, value: &Value) -> CoreResult<serde_json::Value> {
        Ok(match value {
            Value::Undefined | Value::Null | Value::Callable(_) => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => export_number(*n),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Sequence(seq) => {
                self.open_node(seq.id())?;
                let mut items = Vec::with_capacity(seq.len());
                for (index, item) in seq.to_vec().iter().enumerate() {
                    self.path.push(PathSegment::Index(index));
                    items.push(self.export(item)?);
                    self.path.pop();
                }
                self.open.remove(&seq.id());
                serde_json::Value::Array(items)
            }
            Value::Mapping(map) => {
                self.open_node(map.id())?;
                let mut entries = Map::new();
                for (key, item) in map.entries() {
                    if item.is_undefined() || item.is_callable() {
                        continue;
                    }
                    self.path.push(PathSegment::Key(key.clone()));
                    let exported = self.export(&item)?;
                    self.path.pop();
                    entries.insert(key, exported);
                }
                self.open.remove(&map.id());
                serde_json::Value::Object(entries)
            }
        })
    }

    fn open_node(&mut self, id: NodeId) -> CoreResult<()> {
        if self.open.insert(id) {
            Ok(())
        } else {
            Err(CoreError::cyclic_value(self.path.to_string()))
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn export_number(n: f64) -> serde_json::Value {
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        // Integral values print without a fractional part, as JSON.stringify does.
        serde_json::Value::Number(Number::from(n as i64))
    } else {
        Number::from_f64(n).map_or(serde_json::Value::Null, serde_json::Value::Number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::has_changed;
    use serde_json::json;

    #[test]
    fn loads_nested_documents() {
        let value = Value::from(json!({
            "caseId": 1042,
            "room": "OR-4",
            "delayed": false,
            "notes": null,
            "staff": [{ "name": "Ada", "role": "surgeon" }],
        }));

        assert_eq!(value.get("caseId").and_then(|v| v.as_number()), Some(1042.0));
        assert!(value.get("notes").unwrap().is_null());
        let staff = value.get("staff").unwrap();
        assert_eq!(staff.as_sequence().unwrap().len(), 1);
    }

    #[test]
    fn parse_errors_surface() {
        assert!(matches!(
            Value::from_json_str("{\"room\":"),
            Err(CoreError::Json(_))
        ));
    }

    #[test]
    fn exports_like_json_stringify() {
        let value = Value::mapping([
            ("label", Value::from("Timeout")),
            ("onTick", Value::callable(|_| Value::Undefined)),
            ("removed", Value::Undefined),
            ("elapsed", Value::from(12.0)),
            ("ratio", Value::from(f64::NAN)),
            (
                "marks",
                Value::sequence([
                    Value::Undefined,
                    Value::from(1),
                    Value::callable(|_| Value::Null),
                ]),
            ),
        ]);

        assert_eq!(
            value.to_json().unwrap(),
            json!({
                "label": "Timeout",
                "elapsed": 12,
                "ratio": null,
                "marks": [null, 1, null],
            })
        );
    }

    #[test]
    fn integral_numbers_export_without_fraction() {
        assert_eq!(Value::from(-0.0).to_json_string().unwrap(), "0");
        assert_eq!(Value::from(3.25).to_json_string().unwrap(), "3.25");
        assert_eq!(Value::from(1e300).to_json_string().unwrap(), "1e+300");
    }

    #[test]
    fn cycles_fail_with_path() {
        let map = Mapping::from_entries([("items", Value::sequence(Vec::<Value>::new()))]);
        let items = map.get("items").unwrap();
        items.as_sequence().unwrap().push(map.clone());

        let err = Value::Mapping(map).to_json().unwrap_err();
        match err {
            CoreError::CyclicValue { path } => assert_eq!(path, "$.items[0]"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn shared_nodes_export_twice() {
        let shared = Value::mapping([("minutes", 5)]);
        let value = Value::mapping([("a", shared.clone()), ("b", shared)]);
        assert_eq!(
            value.to_json().unwrap(),
            json!({ "a": { "minutes": 5 }, "b": { "minutes": 5 } })
        );
    }

    #[test]
    fn reloaded_export_is_unchanged() {
        let original = Value::from_json_str(
            r#"{"case":{"id":7,"timers":[{"label":"Prep","seconds":90.5}]},"tags":["urgent"]}"#,
        )
        .unwrap();
        let reloaded = Value::from(original.to_json().unwrap());
        assert!(!has_changed(&original, &reloaded));
    }
}
