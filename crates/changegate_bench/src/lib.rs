//! Benchmark utilities.

use changegate_core::{Mapping, Sequence, Value};

/// Build a mapping tree `depth` levels deep with `width` keys per level.
pub fn wide_tree(depth: usize, width: usize) -> Value {
    if depth == 0 {
        Value::from("leaf")
    } else {
        Value::mapping((0..width).map(|i| (format!("key_{i}"), wide_tree(depth - 1, width))))
    }
}

/// Build a sequence of `len` small records.
pub fn record_list(len: usize) -> Value {
    Value::sequence((0..len).map(|i| {
        Value::mapping([
            ("id", Value::from(i as f64)),
            ("label", Value::from(format!("timer {i}"))),
            ("running", Value::from(i % 2 == 0)),
        ])
    }))
}

/// Build a chain of `depth` nested single-element sequences.
pub fn nested_chain(depth: usize) -> Value {
    let root = Sequence::new();
    let mut tail = root.clone();
    for _ in 0..depth {
        let next = Sequence::new();
        tail.push(next.clone());
        tail = next;
    }
    tail.push(0);
    Value::Sequence(root)
}

/// A ring of `len` mappings, each pointing at the next and the last back
/// at the first.
pub fn ring(len: usize) -> Value {
    let nodes: Vec<Mapping> = (0..len)
        .map(|i| Mapping::from_entries([("index", i as f64)]))
        .collect();
    for (i, node) in nodes.iter().enumerate() {
        node.insert("next", nodes[(i + 1) % len].clone());
    }
    nodes.first().cloned().map_or(Value::Null, Value::Mapping)
}
