//! Human-readable rendering of values.

use crate::value::{NodeId, Value};
use std::fmt::{self, Write};

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut open = Vec::new();
        render(self, f, &mut open)
    }
}

/// Writes `value` as a JavaScript-like literal. Nodes already in `open`
/// are back-references and print as `[Circular]`.
fn render(value: &Value, f: &mut fmt::Formatter<'_>, open: &mut Vec<NodeId>) -> fmt::Result {
    match value {
        Value::Undefined => f.write_str("undefined"),
        Value::Null => f.write_str("null"),
        Value::Bool(b) => write!(f, "{b}"),
        Value::Number(n) => render_number(*n, f),
        Value::String(s) => write!(f, "{s:?}"),
        Value::Callable(c) => match c.name() {
            Some(name) => write!(f, "[Function {name}]"),
            None => f.write_str("[Function (anonymous)]"),
        },
        Value::Sequence(seq) => {
            if open.contains(&seq.id()) {
                return f.write_str("[Circular]");
            }
            open.push(seq.id());
            f.write_char('[')?;
            for (i, item) in seq.read().iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                render(item, f, open)?;
            }
            open.pop();
            f.write_char(']')
        }
        Value::Mapping(map) => {
            if open.contains(&map.id()) {
                return f.write_str("[Circular]");
            }
            let entries = map.read();
            if entries.is_empty() {
                return f.write_str("{}");
            }
            open.push(map.id());
            f.write_str("{ ")?;
            for (i, (key, item)) in entries.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{key}: ")?;
                render(item, f, open)?;
            }
            open.pop();
            f.write_str(" }")
        }
    }
}

fn render_number(n: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if n.is_infinite() {
        f.write_str(if n > 0.0 { "Infinity" } else { "-Infinity" })
    } else {
        write!(f, "{n}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Callable, Mapping, Sequence};

    #[test]
    fn renders_primitives() {
        assert_eq!(Value::Undefined.to_string(), "undefined");
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::from(3).to_string(), "3");
        assert_eq!(Value::from(2.5).to_string(), "2.5");
        assert_eq!(Value::from(f64::NEG_INFINITY).to_string(), "-Infinity");
        assert_eq!(Value::from("say \"hi\"").to_string(), r#""say \"hi\"""#);
    }

    #[test]
    fn renders_nested() {
        let value = Value::mapping([
            ("room", Value::from("OR-2")),
            ("staff", Value::from(vec!["Ada", "Lin"])),
            ("meta", Value::mapping(Vec::<(String, Value)>::new())),
        ]);
        assert_eq!(
            value.to_string(),
            r#"{ room: "OR-2", staff: ["Ada", "Lin"], meta: {} }"#
        );
    }

    #[test]
    fn renders_callables() {
        let named = Value::from(Callable::named("onSave", |_| Value::Undefined));
        assert_eq!(named.to_string(), "[Function onSave]");
        assert_eq!(
            Value::callable(|_| Value::Null).to_string(),
            "[Function (anonymous)]"
        );
    }

    #[test]
    fn renders_cycles_as_circular() {
        let map = Mapping::from_entries([("id", 1)]);
        map.insert("self", map.clone());
        assert_eq!(Value::Mapping(map).to_string(), "{ id: 1, self: [Circular] }");

        let seq = Sequence::new();
        seq.push(seq.clone());
        assert_eq!(Value::Sequence(seq).to_string(), "[[Circular]]");
    }

    #[test]
    fn shared_siblings_are_not_circular() {
        let shared = Value::from(vec![1]);
        let value = Value::from(vec![shared.clone(), shared]);
        assert_eq!(value.to_string(), "[[1], [1]]");
    }
}
