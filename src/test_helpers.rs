//! Shared test utilities for the quiz-index test suite.
//!
//! Builders write small source trees into a temp directory; lookups panic
//! with the available ids on a miss so failures read clearly.
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! let subject = write_subject(tmp.path(), "math", json!({"name": "Math"}));
//! write_question(&subject.join("questions/q1"), json!({"topic": "algebra"}));
//!
//! let catalog = scan(tmp.path(), &Config::default()).unwrap();
//! assert_eq!(question_ids(find_subject(&catalog, "math")), vec!["q1"]);
//! ```

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::scan::{Catalog, QUESTION_FILE, SUBJECT_FILE, ScannedQuestion, Subject};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/questions/` to a temp directory and return it.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/questions");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// Source tree builders
// =========================================================================

/// Create `{root}/{code}/subject.json` and return the subject directory.
pub fn write_subject(root: &Path, code: &str, descriptor: Value) -> PathBuf {
    let dir = root.join(code);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(SUBJECT_FILE), descriptor.to_string()).unwrap();
    dir
}

/// Create a question directory with its `question.json`.
pub fn write_question(dir: &Path, content: Value) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join(QUESTION_FILE), content.to_string()).unwrap();
}

/// Write a placeholder file (scan only checks names and extensions).
pub fn touch(path: &Path) {
    fs::write(path, "fake image").unwrap();
}

/// Parse a generated JSON file.
pub fn read_json_file(path: &Path) -> Value {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()));
    serde_json::from_str(&content).unwrap()
}

// =========================================================================
// Catalog lookups
// =========================================================================

/// Find a subject by code. Panics if not found.
pub fn find_subject<'a>(catalog: &'a Catalog, code: &str) -> &'a Subject {
    catalog
        .subjects
        .iter()
        .find(|s| s.code == code)
        .unwrap_or_else(|| panic!("subject '{code}' not found. Available: {:?}", subject_codes(catalog)))
}

/// Find a question by id within a subject. Panics if not found.
pub fn find_question<'a>(subject: &'a Subject, id: &str) -> &'a ScannedQuestion {
    subject
        .questions
        .iter()
        .find(|q| q.question.id == id)
        .unwrap_or_else(|| {
            panic!(
                "question '{id}' not found in subject '{}'. Available: {:?}",
                subject.code,
                question_ids(subject)
            )
        })
}

/// All subject codes in catalog order.
pub fn subject_codes(catalog: &Catalog) -> Vec<&str> {
    catalog.subjects.iter().map(|s| s.code.as_str()).collect()
}

/// All question ids of a subject in output order.
pub fn question_ids(subject: &Subject) -> Vec<&str> {
    subject
        .questions
        .iter()
        .map(|q| q.question.id.as_str())
        .collect()
}
