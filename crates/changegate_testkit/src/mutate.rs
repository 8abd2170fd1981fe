//! Helpers that derive a second value from a first one.
//!
//! All helpers return fresh copies and never touch their input.

use changegate_core::{NodeId, PathSegment, Value, ValuePath};
use std::collections::HashSet;

/// Copy of `value` with the keys of every mapping in reverse order.
///
/// Shared nodes and cycles are reproduced in the copy.
pub fn reversed_keys(value: &Value) -> Value {
    value.snapshot_with(|entries| entries.reverse())
}

/// Paths of every non-composite position in `value`, in traversal order.
///
/// Back-references are skipped, so cyclic values yield a finite list.
pub fn leaf_paths(value: &Value) -> Vec<ValuePath> {
    let mut paths = Vec::new();
    let mut open = HashSet::new();
    collect_leaves(value, &mut ValuePath::root(), &mut open, &mut paths);
    paths
}

fn collect_leaves(
    value: &Value,
    path: &mut ValuePath,
    open: &mut HashSet<NodeId>,
    paths: &mut Vec<ValuePath>,
) {
    let Some(id) = value.node_id() else {
        paths.push(path.clone());
        return;
    };
    if !open.insert(id) {
        return;
    }
    match value {
        Value::Sequence(seq) => {
            for (index, item) in seq.to_vec().iter().enumerate() {
                path.push(PathSegment::Index(index));
                collect_leaves(item, path, open, paths);
                path.pop();
            }
        }
        Value::Mapping(map) => {
            for (key, item) in map.entries() {
                path.push(PathSegment::Key(key));
                collect_leaves(&item, path, open, paths);
                path.pop();
            }
        }
        _ => {}
    }
    open.remove(&id);
}

/// The value at `path`, if the path resolves.
pub fn value_at(value: &Value, path: &ValuePath) -> Option<Value> {
    path.segments()
        .iter()
        .try_fold(value.clone(), |node, segment| child(&node, segment))
}

fn child(value: &Value, segment: &PathSegment) -> Option<Value> {
    match (value, segment) {
        (Value::Mapping(map), PathSegment::Key(key)) => map.get(key),
        (Value::Sequence(seq), PathSegment::Index(index)) => seq.get(*index),
        _ => None,
    }
}

/// Snapshot of `value` with the position at `path` replaced.
///
/// The root path returns `replacement` itself. A path that does not resolve
/// leaves the snapshot unmodified.
pub fn replace_at(value: &Value, path: &ValuePath, replacement: Value) -> Value {
    let Some((last, parents)) = path.segments().split_last() else {
        return replacement;
    };
    let copy = value.snapshot();
    let parent = parents
        .iter()
        .try_fold(copy.clone(), |node, segment| child(&node, segment));

    match (parent, last) {
        (Some(Value::Mapping(map)), PathSegment::Key(key)) => {
            map.insert(key.clone(), replacement);
        }
        (Some(Value::Sequence(seq)), PathSegment::Index(index)) => {
            seq.set(*index, replacement);
        }
        _ => {}
    }
    copy
}

/// A scalar guaranteed to differ from `leaf`.
pub fn distinct_leaf(leaf: &Value) -> Value {
    match leaf {
        Value::Undefined => Value::Null,
        Value::Null => Value::Undefined,
        Value::Bool(b) => Value::Bool(!b),
        Value::Number(n) if n.abs() < 1.0e15 => Value::Number(n + 1.0),
        Value::Number(_) => Value::Number(0.0),
        Value::String(s) => Value::String(format!("{s}~")),
        _ => Value::String("~".to_string()),
    }
}
