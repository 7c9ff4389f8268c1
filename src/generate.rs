//! Output tree generation.
//!
//! Stage 2 of the build. Takes a scanned [`Catalog`] and materializes the
//! web-servable tree the front end reads.
//!
//! ## Output Structure
//!
//! ```text
//! web/public/
//! ├── subjects.json                    # {"subjects": [{id, ...descriptor, code}]}
//! └── subjects/                        # Output root, wiped on every build
//!     └── math/
//!         ├── subject.json             # Descriptor with the full topic list
//!         ├── questions.json           # {"questions": [...]}
//!         ├── questions/q001/quiz.png  # Flat-layout assets
//!         └── topics/geometry/q002/    # Legacy-layout assets
//!             └── photo.png
//! ```
//!
//! The output root is deleted and recreated before anything is written, so
//! a build is a pure function of the source tree. Global subject ids are
//! assigned 1, 2, ... in catalog order.
//!
//! JSON files use the configured indentation, keep keys in insertion order
//! and write non-ASCII text as UTF-8 rather than `\u` escapes.

use crate::config::Config;
use crate::scan::{Catalog, SUBJECT_FILE, ScannedQuestion};
use crate::types::{QuestionsIndex, SubjectEntry, SubjectsIndex};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub const QUESTIONS_FILE: &str = "questions.json";

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(
        "Refusing to clear output {}: it contains the source tree {}",
        .output.display(),
        .source_root.display()
    )]
    OutputOverlapsSource {
        output: PathBuf,
        source_root: PathBuf,
    },
}

/// Counts of what a build wrote.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub subjects: usize,
    pub topics: usize,
    pub questions: usize,
    pub assets: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} subjects, {} topics, {} questions, {} assets",
            self.subjects, self.topics, self.questions, self.assets
        )
    }
}

pub fn generate(
    catalog: &Catalog,
    output_root: &Path,
    index_path: &Path,
    config: &Config,
) -> Result<Summary, GenerateError> {
    ensure_disjoint(&catalog.root, output_root)?;
    reset_dir(output_root)?;

    let mut summary = Summary::default();
    let mut entries = Vec::with_capacity(catalog.subjects.len());

    for subject in &catalog.subjects {
        let subject_dir = output_root.join(&subject.code);
        fs::create_dir_all(&subject_dir)?;

        for scanned in &subject.questions {
            let target = subject_dir.join(scanned.relative_dir());
            summary.assets += copy_assets(scanned, &target)?;
        }

        write_json(
            &subject_dir.join(SUBJECT_FILE),
            &subject.descriptor,
            config.json_indent,
        )?;
        let questions = QuestionsIndex {
            questions: subject.questions.iter().map(|q| &q.question).collect(),
        };
        write_json(
            &subject_dir.join(QUESTIONS_FILE),
            &questions,
            config.json_indent,
        )?;

        entries.push(SubjectEntry::new(
            entries.len() + 1,
            &subject.code,
            &subject.descriptor,
        ));
        summary.subjects += 1;
        summary.topics += subject.descriptor.topics.len();
        summary.questions += subject.questions.len();
        debug!(subject = %subject.code, dir = %subject_dir.display(), "wrote subject");
    }

    if let Some(parent) = index_path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    write_json(
        index_path,
        &SubjectsIndex { subjects: entries },
        config.json_indent,
    )?;

    info!(%summary, output = %output_root.display(), "build finished");
    Ok(summary)
}

/// Refuse an output root that is the source root or one of its ancestors.
///
/// Both sides are resolved first so `..` segments and symlinks cannot hide
/// the overlap.
fn ensure_disjoint(source_root: &Path, output_root: &Path) -> Result<(), GenerateError> {
    let source = fs::canonicalize(source_root)?;
    let output = resolve_path(output_root)?;
    if source.starts_with(&output) {
        return Err(GenerateError::OutputOverlapsSource {
            output,
            source_root: source,
        });
    }
    Ok(())
}

/// Canonicalize a path that may not exist yet.
///
/// The deepest existing ancestor is canonicalized and the missing tail is
/// applied on top of it. The tail names nothing on disk, so its `..`
/// segments can be folded lexically.
fn resolve_path(path: &Path) -> io::Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    let mut existing = absolute.as_path();
    let mut tail = Vec::new();
    let mut resolved = loop {
        match fs::canonicalize(existing) {
            Ok(resolved) => break resolved,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                match (existing.components().next_back(), existing.parent()) {
                    (Some(last), Some(parent)) => {
                        tail.push(last);
                        existing = parent;
                    }
                    _ => return Err(e),
                }
            }
            Err(e) => return Err(e),
        }
    };
    for part in tail.into_iter().rev() {
        match part {
            Component::ParentDir => {
                resolved.pop();
            }
            Component::CurDir => {}
            other => resolved.push(other),
        }
    }
    Ok(resolved)
}

fn reset_dir(dir: &Path) -> Result<(), GenerateError> {
    if dir.exists() {
        fs::remove_dir_all(dir)?;
    }
    fs::create_dir_all(dir)?;
    Ok(())
}

/// Copy a question's image files byte-for-byte. The target directory is
/// created even when there is nothing to copy.
fn copy_assets(scanned: &ScannedQuestion, target: &Path) -> Result<usize, GenerateError> {
    fs::create_dir_all(target)?;
    for name in &scanned.assets {
        fs::copy(scanned.source_dir.join(name), target.join(name))?;
    }
    Ok(scanned.assets.len())
}

/// Serialize `value` as indented JSON with a trailing newline.
fn write_json<T: Serialize>(path: &Path, value: &T, indent: usize) -> Result<(), GenerateError> {
    let indent = " ".repeat(indent);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    buf.push(b'\n');
    fs::write(path, buf)?;
    Ok(())
}
