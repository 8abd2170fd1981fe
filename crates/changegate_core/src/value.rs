//! Dynamic value type.
//!
//! Primitives are held by value. Sequences and mappings are shared handles:
//! cloning one aliases the same node, which is how self-referential graphs
//! are built. Each composite node has a [`NodeId`] that stays stable for as
//! long as the node is alive.

use indexmap::IndexMap;
use parking_lot::{RwLock, RwLockReadGuard};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Identity of a composite node.
///
/// Two handles have the same id exactly when they point at the same node.
/// Ids say nothing about contents: two empty mappings have different ids.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({:#x})", self.0)
    }
}

/// The variant of a [`Value`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Missing or absent.
    Undefined,
    /// Explicit null.
    Null,
    /// Boolean.
    Bool,
    /// Double-precision number.
    Number,
    /// Text string.
    String,
    /// Opaque function handle.
    Callable,
    /// Ordered sequence.
    Sequence,
    /// String-keyed mapping.
    Mapping,
}

impl ValueKind {
    /// Lowercase name of this kind.
    pub const fn name(self) -> &'static str {
        match self {
            ValueKind::Undefined => "undefined",
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Callable => "callable",
            ValueKind::Sequence => "sequence",
            ValueKind::Mapping => "mapping",
        }
    }

    /// Returns true for sequences and mappings.
    pub const fn is_composite(self) -> bool {
        matches!(self, ValueKind::Sequence | ValueKind::Mapping)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

type CallableFn = dyn Fn(&[Value]) -> Value + Send + Sync;

/// An opaque function handle.
///
/// Change detection never calls it; it only looks at whether a callable is
/// present. Two handles are identical when they share the same function
/// allocation.
#[derive(Clone)]
pub struct Callable {
    name: Option<Arc<str>>,
    func: Arc<CallableFn>,
}

impl Callable {
    /// Wrap an anonymous function.
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Self {
            name: None,
            func: Arc::new(func),
        }
    }

    /// Wrap a named function.
    pub fn named<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Self {
            name: Some(Arc::from(name.into())),
            func: Arc::new(func),
        }
    }

    /// Name given at construction, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Invoke the function.
    pub fn call(&self, args: &[Value]) -> Value {
        (self.func)(args)
    }

    /// Returns true if both handles share the same function.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}

/// A shared, mutable ordered list of values.
#[derive(Clone, Default)]
pub struct Sequence(Arc<RwLock<Vec<Value>>>);

impl Sequence {
    /// Create an empty sequence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sequence holding `items`.
    pub fn from_vec(items: Vec<Value>) -> Self {
        Self(Arc::new(RwLock::new(items)))
    }

    /// Identity of this node.
    pub fn id(&self) -> NodeId {
        NodeId(Arc::as_ptr(&self.0) as usize)
    }

    /// Returns true if both handles point at the same node.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns true if the sequence has no elements.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Element at `index`.
    pub fn get(&self, index: usize) -> Option<Value> {
        self.read().get(index).cloned()
    }

    /// Append an element.
    pub fn push(&self, value: impl Into<Value>) {
        self.0.write().push(value.into());
    }

    /// Replace the element at `index`, returning the previous one.
    ///
    /// Returns `None` and leaves the sequence untouched when `index` is out
    /// of bounds.
    pub fn set(&self, index: usize, value: impl Into<Value>) -> Option<Value> {
        let mut items = self.0.write();
        let slot = items.get_mut(index)?;
        Some(std::mem::replace(slot, value.into()))
    }

    /// Remove and return the last element.
    pub fn pop(&self) -> Option<Value> {
        self.0.write().pop()
    }

    /// Copy of the element handles.
    pub fn to_vec(&self) -> Vec<Value> {
        self.read().clone()
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Vec<Value>> {
        self.0.read_recursive()
    }
}

impl fmt::Debug for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequence")
            .field("id", &self.id())
            .field("len", &self.len())
            .finish()
    }
}

/// A shared, mutable mapping from string keys to values.
///
/// Entries remember insertion order for display purposes only; order never
/// affects comparison.
#[derive(Clone, Default)]
pub struct Mapping(Arc<RwLock<IndexMap<String, Value>>>);

impl Mapping {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mapping from key-value pairs. Later duplicates win.
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect::<IndexMap<_, _>>();
        Self(Arc::new(RwLock::new(map)))
    }

    /// Identity of this node.
    pub fn id(&self) -> NodeId {
        NodeId(Arc::as_ptr(&self.0) as usize)
    }

    /// Returns true if both handles point at the same node.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns true if the mapping has no keys.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Value stored under `key`.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.read().get(key).cloned()
    }

    /// Returns true if `key` is present, even when it maps to `Undefined`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.read().contains_key(key)
    }

    /// Insert or replace an entry, returning the previous value.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.write().insert(key.into(), value.into())
    }

    /// Remove an entry, returning its value.
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.0.write().shift_remove(key)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    /// Copy of the entries in insertion order.
    pub fn entries(&self) -> Vec<(String, Value)> {
        self.read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, IndexMap<String, Value>> {
        self.0.read_recursive()
    }
}

impl fmt::Debug for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mapping")
            .field("id", &self.id())
            .field("keys", &self.keys())
            .finish()
    }
}

/// A dynamically-typed value.
///
/// `Debug` output never descends into composites, so it is safe on cyclic
/// graphs. Use `Display` for a readable rendering of the contents.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Missing or absent value.
    #[default]
    Undefined,
    /// Explicit null, distinct from `Undefined`.
    Null,
    /// Boolean value.
    Bool(bool),
    /// IEEE 754 double.
    Number(f64),
    /// Text string.
    String(String),
    /// Function handle.
    Callable(Callable),
    /// Ordered sequence (shared).
    Sequence(Sequence),
    /// String-keyed mapping (shared).
    Mapping(Mapping),
}

impl Value {
    /// Create a sequence value from items.
    pub fn sequence<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::Sequence(Sequence::from_vec(
            items.into_iter().map(Into::into).collect(),
        ))
    }

    /// Create a mapping value from key-value pairs.
    pub fn mapping<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Value::Mapping(Mapping::from_entries(entries))
    }

    /// Create a callable value from a function.
    pub fn callable<F>(func: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Value::Callable(Callable::new(func))
    }

    /// The kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Undefined => ValueKind::Undefined,
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Callable(_) => ValueKind::Callable,
            Value::Sequence(_) => ValueKind::Sequence,
            Value::Mapping(_) => ValueKind::Mapping,
        }
    }

    /// Returns true for sequences and mappings.
    pub fn is_composite(&self) -> bool {
        self.kind().is_composite()
    }

    /// Returns true for `Undefined`.
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Returns true for `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true for callables.
    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Callable(_))
    }

    /// Identity of a composite value.
    pub fn node_id(&self) -> Option<NodeId> {
        match self {
            Value::Sequence(seq) => Some(seq.id()),
            Value::Mapping(map) => Some(map.id()),
            _ => None,
        }
    }

    /// Strict equality.
    ///
    /// Primitives compare by value using native `f64` equality for numbers
    /// (`NaN` is unequal to itself, `0.0 == -0.0`). Callables and composites
    /// compare by identity. Values of different kinds are never equal.
    pub fn strict_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Callable(a), Value::Callable(b)) => a.ptr_eq(b),
            (Value::Sequence(a), Value::Sequence(b)) => a.ptr_eq(b),
            (Value::Mapping(a), Value::Mapping(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Get this value as a boolean, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get this value as a number, if it is one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get this value as a string slice, if it is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get this value as a callable, if it is one.
    pub fn as_callable(&self) -> Option<&Callable> {
        match self {
            Value::Callable(c) => Some(c),
            _ => None,
        }
    }

    /// Get this value as a sequence handle, if it is one.
    pub fn as_sequence(&self) -> Option<&Sequence> {
        match self {
            Value::Sequence(seq) => Some(seq),
            _ => None,
        }
    }

    /// Get this value as a mapping handle, if it is one.
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Value::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a key in this mapping value.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.as_mapping().and_then(|map| map.get(key))
    }

    /// Deep copy with fresh composite identities.
    ///
    /// Nodes shared inside `self` stay shared inside the copy and cycles are
    /// reproduced, so the copy is structurally equal to the original while
    /// later mutations of either side do not reach the other. Callables are
    /// shared, not copied.
    pub fn snapshot(&self) -> Value {
        self.snapshot_with(|_| {})
    }

    /// Deep copy like [`Value::snapshot`], letting `arrange` reorder the
    /// entries of each mapping before they are inserted into its copy.
    pub fn snapshot_with<F>(&self, mut arrange: F) -> Value
    where
        F: FnMut(&mut Vec<(String, Value)>),
    {
        let mut copies = HashMap::new();
        snapshot_value(self, &mut copies, &mut arrange)
    }
}

fn snapshot_value<F>(value: &Value, copies: &mut HashMap<NodeId, Value>, arrange: &mut F) -> Value
where
    F: FnMut(&mut Vec<(String, Value)>),
{
    match value {
        Value::Sequence(seq) => {
            if let Some(copy) = copies.get(&seq.id()) {
                return copy.clone();
            }
            let copy = Sequence::new();
            copies.insert(seq.id(), Value::Sequence(copy.clone()));
            for item in seq.to_vec() {
                copy.push(snapshot_value(&item, copies, arrange));
            }
            Value::Sequence(copy)
        }
        Value::Mapping(map) => {
            if let Some(copy) = copies.get(&map.id()) {
                return copy.clone();
            }
            let copy = Mapping::new();
            copies.insert(map.id(), Value::Mapping(copy.clone()));
            let mut entries = map.entries();
            arrange(&mut entries);
            for (key, item) in entries {
                copy.insert(key, snapshot_value(&item, copies, arrange));
            }
            Value::Mapping(copy)
        }
        other => other.clone(),
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<i64> for Value {
    #[allow(clippy::cast_precision_loss)]
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<Callable> for Value {
    fn from(c: Callable) -> Self {
        Value::Callable(c)
    }
}

impl From<Sequence> for Value {
    fn from(seq: Sequence) -> Self {
        Value::Sequence(seq)
    }
}

impl From<Mapping> for Value {
    fn from(map: Mapping) -> Self {
        Value::Mapping(map)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::sequence(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Undefined, Into::into)
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Value::Null
    }
}
