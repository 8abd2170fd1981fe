//! # changegate core
//!
//! Structural change detection for form data.
//!
//! Edit screens keep a snapshot of the values they were opened with and
//! only enable saving once the live values differ from it. This crate
//! decides "differ":
//!
//! - Mapping key order never matters, at any depth
//! - `Null` and `Undefined` are distinct
//! - Callables under a mapping key are compared by presence only
//! - Self-referential values terminate; a back-reference counts as unchanged
//!
//! ## Usage
//!
//! ```
//! use changegate_core::{has_changed, first_difference, Value};
//!
//! let saved = Value::mapping([("user", Value::mapping([("name", "John"), ("age", "30")]))]);
//! let edited = Value::mapping([("user", Value::mapping([("age", "31"), ("name", "John")]))]);
//!
//! assert!(has_changed(&saved, &edited));
//! let difference = first_difference(&saved, &edited).unwrap();
//! assert_eq!(difference.path.to_string(), "$.user.age");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod diff;
mod error;
mod json;
mod render;
mod value;

pub use diff::{
    first_difference, has_changed, DiffOptions, Differ, Difference, DifferenceKind, PathSegment,
    ValuePath,
};
pub use error::{CoreError, CoreResult};
pub use value::{Callable, Mapping, NodeId, Sequence, Value, ValueKind};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
