//! # quiz-index
//!
//! Builds the static data the quiz front end serves. The source tree of
//! subjects, topics and questions is the data source; the build turns it into
//! a web-servable directory of images plus three tiers of JSON indices.
//!
//! # Architecture: Two-Stage Build
//!
//! ```text
//! 1. Scan      questions/  →  Catalog               (read-only, in memory)
//! 2. Generate  Catalog     →  web/public/subjects/  (wiped and rewritten)
//!                          →  web/public/subjects.json
//! ```
//!
//! Scanning does all layout reconciliation and normalization without writing
//! anything, so `quiz-index check` can validate a tree safely. Generation is
//! mechanical: copy assets, serialize records.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Stage 1: subject discovery, flat and legacy layouts, topic names, de-duplication |
//! | [`generate`] | Stage 2: output wipe, asset copy, JSON indices |
//! | [`types`] | Typed records for `subjects.json`, `subject.json` and `questions.json` |
//! | [`config`] | Optional `config.toml` in the source root |
//! | [`output`] | CLI output formatting |
//!
//! # Two Source Layouts
//!
//! Older subjects nest questions under topic directories
//! (`math/geometry/q003/`). Newer ones keep every question in one flat
//! `questions/` directory and name their topics inside `question.json`. Both
//! may coexist in one subject; when the same question id appears in both,
//! the flat copy is used and the legacy copy is ignored.
//!
//! # Stable Output
//!
//! Subjects are processed in lexicographic order, and authored JSON keys keep
//! their file order, so rebuilding an unchanged tree produces byte-identical
//! output and the same global subject ids.

pub mod config;
pub mod generate;
pub mod output;
pub mod scan;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;

use std::path::Path;
use thiserror::Error;

pub use generate::Summary;

#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Scan(#[from] scan::ScanError),
    #[error(transparent)]
    Generate(#[from] generate::GenerateError),
}

/// Rebuild the output tree and global index from `source_root`.
///
/// Loads `config.toml` from the source root (stock defaults when absent) for
/// everything except the two output locations, which are given explicitly.
pub fn run(source_root: &Path, output_root: &Path, index_path: &Path) -> Result<Summary, RunError> {
    let config = config::load_config(source_root)?;
    build(source_root, output_root, index_path, &config)
}

/// [`run`] with an already-resolved config.
pub fn build(
    source_root: &Path,
    output_root: &Path,
    index_path: &Path,
    config: &config::Config,
) -> Result<Summary, RunError> {
    let catalog = scan::scan(source_root, config)?;
    Ok(generate::generate(&catalog, output_root, index_path, config)?)
}
