//! Diff command implementation.

use crate::error::CliError;
use changegate_core::{DiffOptions, Differ, Value};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Outcome of comparing two documents.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct DiffReport {
    /// Whether the documents differ.
    pub changed: bool,
    /// Path of the first difference.
    pub path: Option<String>,
    /// Why the values differ at `path`.
    pub reason: Option<String>,
}

/// Runs the diff command. Returns whether the documents differ.
pub fn run(
    old: &Path,
    new: &Path,
    format: &str,
    options: DiffOptions,
) -> Result<bool, Box<dyn std::error::Error>> {
    let report = compare_files(old, new, options)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            print_text_output(&report);
        }
    }

    Ok(report.changed)
}

/// Load both documents and compare them.
pub fn compare_files(old: &Path, new: &Path, options: DiffOptions) -> Result<DiffReport, CliError> {
    let old_value = load(old)?;
    let new_value = load(new)?;

    info!("Comparing {:?} against {:?}", new, old);
    let differ = Differ::new(options);
    let report = match differ.first_difference(&old_value, &new_value) {
        Some(difference) => DiffReport {
            changed: true,
            path: Some(difference.path.to_string()),
            reason: Some(difference.kind.to_string()),
        },
        None => DiffReport {
            changed: false,
            path: None,
            reason: None,
        },
    };
    Ok(report)
}

fn load(path: &Path) -> Result<Value, CliError> {
    let bytes = fs::read(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Read {} bytes from {:?}", bytes.len(), path);
    Value::from_json_slice(&bytes).map_err(|source| CliError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn print_text_output(report: &DiffReport) {
    match (&report.path, &report.reason) {
        (Some(path), Some(reason)) => println!("✗ Changed at {path}: {reason}"),
        _ => println!("✓ No changes"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use changegate_testkit::case_form_json;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_doc(dir: &TempDir, name: &str, doc: &serde_json::Value) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, serde_json::to_vec_pretty(doc).unwrap()).unwrap();
        path
    }

    #[test]
    fn identical_documents() {
        let dir = TempDir::new().unwrap();
        let old = write_doc(&dir, "old.json", &case_form_json());
        let new = write_doc(&dir, "new.json", &case_form_json());

        let report = compare_files(&old, &new, DiffOptions::new()).unwrap();
        assert_eq!(
            report,
            DiffReport {
                changed: false,
                path: None,
                reason: None,
            }
        );
    }

    #[test]
    fn reordered_keys_are_not_a_change() {
        let dir = TempDir::new().unwrap();
        let old = dir.path().join("old.json");
        let new = dir.path().join("new.json");
        fs::write(&old, r#"{"room":"OR-1","staff":[{"id":1,"name":"Ada"}]}"#).unwrap();
        fs::write(&new, r#"{"staff":[{"name":"Ada","id":1}],"room":"OR-1"}"#).unwrap();

        let report = compare_files(&old, &new, DiffOptions::new()).unwrap();
        assert!(!report.changed);
    }

    #[test]
    fn edited_document_reports_path() {
        let dir = TempDir::new().unwrap();
        let mut edited = case_form_json();
        edited["staff"][1]["role"] = "scrub nurse".into();
        let old = write_doc(&dir, "old.json", &case_form_json());
        let new = write_doc(&dir, "new.json", &edited);

        let report = compare_files(&old, &new, DiffOptions::new()).unwrap();
        assert!(report.changed);
        assert_eq!(report.path.as_deref(), Some("$.staff[1].role"));
        assert_eq!(report.reason.as_deref(), Some("value changed"));
    }

    #[test]
    fn depth_limit_is_applied() {
        let dir = TempDir::new().unwrap();
        let old = write_doc(&dir, "old.json", &case_form_json());
        let new = write_doc(&dir, "new.json", &case_form_json());

        let report = compare_files(&old, &new, DiffOptions::new().max_depth(1)).unwrap();
        assert!(report.changed);
        assert_eq!(report.reason.as_deref(), Some("nesting exceeds 1 levels"));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = TempDir::new().unwrap();
        let old = write_doc(&dir, "old.json", &case_form_json());
        let missing = dir.path().join("missing.json");

        let err = compare_files(&old, &missing, DiffOptions::new()).unwrap_err();
        assert!(matches!(err, CliError::Read { ref path, .. } if path == &missing));
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let old = write_doc(&dir, "old.json", &case_form_json());
        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{\"room\": ").unwrap();

        let err = compare_files(&old, &broken, DiffOptions::new()).unwrap_err();
        assert!(matches!(err, CliError::Parse { .. }));
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn report_serializes_with_nulls() {
        let report = DiffReport {
            changed: false,
            path: None,
            reason: None,
        };
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            serde_json::json!({ "changed": false, "path": null, "reason": null })
        );
    }
}
