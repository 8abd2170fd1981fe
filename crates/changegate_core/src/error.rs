//! Error types for the core crate.
//!
//! Change detection itself is total and never fails; these errors come from
//! the JSON bridge around it.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur when moving values in or out of JSON.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Input text was not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A cyclic value has no JSON representation.
    #[error("cyclic value cannot be serialized: back-reference at {path}")]
    CyclicValue {
        /// Path of the reference that closes the cycle.
        path: String,
    },
}

impl CoreError {
    /// Create a cyclic value error.
    pub fn cyclic_value(path: impl Into<String>) -> Self {
        Self::CyclicValue { path: path.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cyclic_value_message_names_path() {
        let err = CoreError::cyclic_value("$.case.self");
        assert_eq!(
            err.to_string(),
            "cyclic value cannot be serialized: back-reference at $.case.self"
        );
    }

    #[test]
    fn json_error_converts() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{");
        let err: CoreError = parse.unwrap_err().into();
        assert!(matches!(err, CoreError::Json(_)));
    }
}
