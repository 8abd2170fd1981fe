//! # changegate testkit
//!
//! Test utilities for changegate.
//!
//! This crate provides:
//! - Property-based value generators using proptest
//! - Fixtures shaped like the edit forms of an operating-room tracker
//! - Helpers that reorder keys or change a single leaf of a value
//!
//! ## Usage
//!
//! ```rust,ignore
//! use changegate_testkit::prelude::*;
//!
//! proptest! {
//!     #[test]
//!     fn reordering_is_not_a_change(v in value_strategy()) {
//!         prop_assert!(!has_changed(&v, &reversed_keys(&v)));
//!     }
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod mutate;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::mutate::*;
    pub use changegate_core::{first_difference, has_changed, Value};
    pub use proptest::prelude::*;
}

pub use fixtures::*;
pub use generators::*;
pub use mutate::*;
