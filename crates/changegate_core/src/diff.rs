//! Structural change detection.
//!
//! [`has_changed`] answers whether two values differ in shape or leaf
//! content, ignoring mapping key order. It is total: every pair of values
//! yields an answer, including self-referential graphs.
//!
//! The walk descends both values in lockstep and stops at the first
//! difference:
//!
//! 1. Strictly equal values (same primitive, same callable, same node) are
//!    unchanged.
//! 2. Otherwise, if either side is not a composite the pair has changed.
//!    This covers `Null` vs `Undefined`, distinct callables and `NaN`.
//! 3. A node already on the active path closes a cycle and is treated as
//!    unchanged.
//! 4. Sequences compare by length, then index by index. Mappings compare by
//!    key count, then key presence, then value by value. Under a mapping key
//!    two callables are always equal; a callable facing anything else is a
//!    change.
//!
//! [`first_difference`] runs the same walk and reports where it stopped.

use crate::value::{Mapping, NodeId, Sequence, Value, ValueKind};
use std::collections::HashSet;
use std::fmt;
use std::ops::{Deref, DerefMut};
use tracing::{debug, trace};

/// Returns true if `old` and `new` are structurally different.
///
/// The walk recurses once per nesting level and has no depth limit, so a
/// deep enough acyclic input exhausts the stack. Compare values of untrusted
/// depth with a [`Differ`] built from [`DiffOptions::max_depth`].
pub fn has_changed(old: &Value, new: &Value) -> bool {
    Differ::default().has_changed(old, new)
}

/// Locate the first structural difference between `old` and `new`.
///
/// Returns `None` exactly when [`has_changed`] returns false.
pub fn first_difference(old: &Value, new: &Value) -> Option<Difference> {
    Differ::default().first_difference(old, new)
}

/// Options for a [`Differ`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffOptions {
    /// Maximum number of nested composite levels to descend.
    ///
    /// When a comparison would go deeper, the pair is reported as
    /// [`DifferenceKind::DepthLimitExceeded`]. `None` means unlimited,
    /// bounded only by the thread's stack.
    pub max_depth: Option<usize>,
}

impl DiffOptions {
    /// Creates options with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum nesting depth.
    #[must_use]
    pub const fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Removes the nesting depth limit.
    #[must_use]
    pub const fn unlimited_depth(mut self) -> Self {
        self.max_depth = None;
        self
    }
}

/// Change detector configured with [`DiffOptions`].
///
/// A `Differ` holds no per-call state and can be shared between threads.
#[derive(Debug, Clone, Default)]
pub struct Differ {
    options: DiffOptions,
}

impl Differ {
    /// Create a differ with the given options.
    pub fn new(options: DiffOptions) -> Self {
        Self { options }
    }

    /// The options this differ was built with.
    pub fn options(&self) -> &DiffOptions {
        &self.options
    }

    /// Returns true if `old` and `new` are structurally different.
    pub fn has_changed(&self, old: &Value, new: &Value) -> bool {
        self.first_difference(old, new).is_some()
    }

    /// Locate the first structural difference between `old` and `new`.
    pub fn first_difference(&self, old: &Value, new: &Value) -> Option<Difference> {
        let mut state = ComparisonState::default();
        let found = self.compare(old, new, &mut state);
        if let Some(difference) = &found {
            trace!(path = %difference.path, kind = %difference.kind, "change detected");
        }
        found
    }

    fn compare(&self, old: &Value, new: &Value, state: &mut ComparisonState) -> Option<Difference> {
        if old.strict_eq(new) {
            return None;
        }

        // Null, Undefined and every other primitive end here.
        let (Some(old_id), Some(new_id)) = (old.node_id(), new.node_id()) else {
            return Some(Difference::here(DifferenceKind::between(old, new)));
        };

        if state.is_active(old_id) || state.is_active(new_id) {
            return None;
        }

        if let Some(limit) = self.options.max_depth {
            if state.depth() >= limit {
                debug!(limit, "depth limit reached");
                return Some(Difference::here(DifferenceKind::DepthLimitExceeded { limit }));
            }
        }

        let mut active = state.enter(old_id, new_id);
        match (old, new) {
            (Value::Sequence(a), Value::Sequence(b)) => self.compare_sequences(a, b, &mut active),
            (Value::Mapping(a), Value::Mapping(b)) => self.compare_mappings(a, b, &mut active),
            _ => Some(Difference::here(DifferenceKind::between(old, new))),
        }
    }

    fn compare_sequences(
        &self,
        old: &Sequence,
        new: &Sequence,
        state: &mut ComparisonState,
    ) -> Option<Difference> {
        let old_items = old.read();
        let new_items = new.read();

        if old_items.len() != new_items.len() {
            return Some(Difference::here(DifferenceKind::LengthChanged {
                old: old_items.len(),
                new: new_items.len(),
            }));
        }

        old_items
            .iter()
            .zip(new_items.iter())
            .enumerate()
            .find_map(|(index, (a, b))| {
                self.compare(a, b, state)
                    .map(|d| d.within(PathSegment::Index(index)))
            })
    }

    fn compare_mappings(
        &self,
        old: &Mapping,
        new: &Mapping,
        state: &mut ComparisonState,
    ) -> Option<Difference> {
        let old_entries = old.read();
        let new_entries = new.read();

        if old_entries.len() != new_entries.len() {
            return Some(Difference::here(DifferenceKind::KeyCountChanged {
                old: old_entries.len(),
                new: new_entries.len(),
            }));
        }

        // Equal counts, so every old key present means the key sets match.
        if let Some(key) = old_entries.keys().find(|k| !new_entries.contains_key(*k)) {
            return Some(Difference::here(DifferenceKind::MissingKey { key: key.clone() }));
        }

        old_entries.iter().find_map(|(key, a)| {
            let b = &new_entries[key.as_str()];
            let found = match (a, b) {
                (Value::Callable(_), Value::Callable(_)) => None,
                (Value::Callable(_), _) | (_, Value::Callable(_)) => {
                    Some(Difference::here(DifferenceKind::CallableMismatch))
                }
                _ => self.compare(a, b, state),
            };
            found.map(|d| d.within(PathSegment::Key(key.clone())))
        })
    }
}

/// Nodes on the active comparison path.
///
/// Created fresh for each top-level comparison and dropped with it.
/// Membership is by node identity only.
#[derive(Debug, Default)]
struct ComparisonState {
    active: HashSet<NodeId>,
    depth: usize,
}

impl ComparisonState {
    fn is_active(&self, id: NodeId) -> bool {
        self.active.contains(&id)
    }

    fn depth(&self) -> usize {
        self.depth
    }

    /// Mark a pair of nodes active until the returned guard drops.
    fn enter(&mut self, old: NodeId, new: NodeId) -> ActivePair<'_> {
        self.active.insert(old);
        self.active.insert(new);
        self.depth += 1;
        ActivePair {
            state: self,
            old,
            new,
        }
    }
}

/// Unmarks its pair of nodes on drop, whichever way the comparison exits.
struct ActivePair<'a> {
    state: &'a mut ComparisonState,
    old: NodeId,
    new: NodeId,
}

impl Deref for ActivePair<'_> {
    type Target = ComparisonState;

    fn deref(&self) -> &ComparisonState {
        &*self.state
    }
}

impl DerefMut for ActivePair<'_> {
    fn deref_mut(&mut self) -> &mut ComparisonState {
        &mut *self.state
    }
}

impl Drop for ActivePair<'_> {
    fn drop(&mut self) {
        self.state.active.remove(&self.old);
        self.state.active.remove(&self.new);
        self.state.depth -= 1;
    }
}

/// One step in a [`ValuePath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Mapping key.
    Key(String),
    /// Sequence index.
    Index(usize),
}

/// Location of a value inside a root value.
///
/// Displays as `$` for the root, `$.user.age` for keys and `$.rooms[2]` for
/// indices. Keys that are not plain identifiers are quoted: `$["first name"]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ValuePath(Vec<PathSegment>);

impl ValuePath {
    /// The root path.
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns true for the root path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Segments from the root down.
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Append a segment.
    pub fn push(&mut self, segment: PathSegment) {
        self.0.push(segment);
    }

    /// Remove the last segment.
    pub fn pop(&mut self) -> Option<PathSegment> {
        self.0.pop()
    }

    /// Returns a new path with `segment` appended.
    #[must_use]
    pub fn child(&self, segment: PathSegment) -> Self {
        let mut path = self.clone();
        path.push(segment);
        path
    }
}

impl FromIterator<PathSegment> for ValuePath {
    fn from_iter<I: IntoIterator<Item = PathSegment>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for ValuePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for segment in &self.0 {
            match segment {
                PathSegment::Index(index) => write!(f, "[{index}]")?,
                PathSegment::Key(key) if is_identifier(key) => write!(f, ".{key}")?,
                PathSegment::Key(key) => write!(f, "[{key:?}]")?,
            }
        }
        Ok(())
    }
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Why two values differ at a given path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DifferenceKind {
    /// Same kind, different value.
    ValueChanged,
    /// Values of different kinds.
    KindChanged {
        /// Kind on the old side.
        old: ValueKind,
        /// Kind on the new side.
        new: ValueKind,
    },
    /// Sequences of different lengths.
    LengthChanged {
        /// Old length.
        old: usize,
        /// New length.
        new: usize,
    },
    /// Mappings with different numbers of keys.
    KeyCountChanged {
        /// Old key count.
        old: usize,
        /// New key count.
        new: usize,
    },
    /// A key of the old mapping is absent from the new one.
    MissingKey {
        /// The absent key.
        key: String,
    },
    /// Only one side of a mapping entry is callable.
    CallableMismatch,
    /// Nesting exceeded [`DiffOptions::max_depth`].
    DepthLimitExceeded {
        /// The configured limit.
        limit: usize,
    },
}

impl DifferenceKind {
    fn between(old: &Value, new: &Value) -> Self {
        let (old, new) = (old.kind(), new.kind());
        if old == new {
            DifferenceKind::ValueChanged
        } else {
            DifferenceKind::KindChanged { old, new }
        }
    }
}

impl fmt::Display for DifferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DifferenceKind::ValueChanged => f.write_str("value changed"),
            DifferenceKind::KindChanged { old, new } => {
                write!(f, "kind changed from {old} to {new}")
            }
            DifferenceKind::LengthChanged { old, new } => {
                write!(f, "length changed from {old} to {new}")
            }
            DifferenceKind::KeyCountChanged { old, new } => {
                write!(f, "key count changed from {old} to {new}")
            }
            DifferenceKind::MissingKey { key } => write!(f, "key {key:?} is missing"),
            DifferenceKind::CallableMismatch => f.write_str("only one side is callable"),
            DifferenceKind::DepthLimitExceeded { limit } => {
                write!(f, "nesting exceeds {limit} levels")
            }
        }
    }
}

/// The first difference found between two values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Difference {
    /// Where the difference is.
    pub path: ValuePath,
    /// What differs there.
    pub kind: DifferenceKind,
}

impl Difference {
    fn here(kind: DifferenceKind) -> Self {
        Self {
            path: ValuePath::root(),
            kind,
        }
    }

    // Paths are built while unwinding, so the parent segment goes in front.
    fn within(mut self, segment: PathSegment) -> Self {
        self.path.0.insert(0, segment);
        self
    }
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.kind)
    }
}
