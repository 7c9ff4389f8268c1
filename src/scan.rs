//! Source tree scanning and question normalization.
//!
//! Stage 1 of the build. Walks the source root, reconciles the two question
//! layouts and produces a [`Catalog`] that the generate stage writes out.
//! Scanning never touches the output tree.
//!
//! ## Directory Structure
//!
//! ```text
//! questions/                       # Source root
//! ├── config.toml                  # Build configuration (optional)
//! ├── math/                        # Subject (needs subject.json)
//! │   ├── subject.json             # Descriptor, optional master "topics" list
//! │   ├── questions/               # Flat layout
//! │   │   └── q001/
//! │   │       ├── question.json    # "topic" or "topics" inside
//! │   │       └── quiz.png
//! │   └── geometry/                # Legacy layout: topic directory
//! │       ├── topic.json           # {"name": "..."} (optional)
//! │       └── q002/
//! │           ├── question.json
//! │           └── photo.png
//! └── drafts/                      # No subject.json = skipped
//! ```
//!
//! ## Layout Reconciliation
//!
//! - Subjects are processed in lexicographic order of directory name, which
//!   fixes the numbering of the global index.
//! - The flat `questions/` directory is read first. Every other directory of
//!   the subject is a legacy topic directory.
//! - A question id seen earlier in the subject wins: a legacy question with
//!   the id of a flat one is skipped entirely, assets included.
//! - Topics found as legacy directories but missing from the master list are
//!   appended to it, named by their `topic.json` or else by the directory.
//! - Hidden entries (leading `.`) are ignored at every level.

use crate::config::Config;
use crate::types::{Answer, Question, SubjectDescriptor, Topic};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

pub const SUBJECT_FILE: &str = "subject.json";
pub const QUESTION_FILE: &str = "question.json";
pub const TOPIC_FILE: &str = "topic.json";
/// Name of the flat-layout directory inside a subject.
pub const FLAT_DIR: &str = "questions";

const QUIZ_PHOTO_FILE: &str = "quiz.png";
const PHOTO_FILE: &str = "photo.png";

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Invalid JSON in {}: {err}", .path.display())]
    Json {
        path: PathBuf,
        err: serde_json::Error,
    },
    #[error("Invalid question {}: {reason}", .path.display())]
    InvalidQuestion { path: PathBuf, reason: String },
}

/// Everything discovered in one scan of the source root.
#[derive(Debug)]
pub struct Catalog {
    pub root: PathBuf,
    pub subjects: Vec<Subject>,
}

/// A subject with its final descriptor and merged question list.
#[derive(Debug)]
pub struct Subject {
    /// Directory name, used as the subject code.
    pub code: String,
    /// Descriptor whose `topics` already include discovered legacy topics.
    pub descriptor: SubjectDescriptor,
    pub questions: Vec<ScannedQuestion>,
}

/// Which layout a question was found in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// `{subject}/questions/{id}`
    Flat,
    /// `{subject}/{topic}/{id}`
    Legacy { topic: String },
}

impl Origin {
    /// Path of a question directory relative to its subject, `/`-separated.
    ///
    /// Shared by the public URL and the output tree so the two always agree.
    pub fn relative_dir(&self, question_id: &str) -> String {
        match self {
            Origin::Flat => format!("{FLAT_DIR}/{question_id}"),
            Origin::Legacy { topic } => format!("topics/{topic}/{question_id}"),
        }
    }
}

/// A normalized question together with where its assets come from.
#[derive(Debug)]
pub struct ScannedQuestion {
    pub question: Question,
    pub origin: Origin,
    pub source_dir: PathBuf,
    /// Image file names to copy, sorted.
    pub assets: Vec<String>,
}

impl ScannedQuestion {
    pub fn relative_dir(&self) -> String {
        self.origin.relative_dir(&self.question.id)
    }
}

impl Catalog {
    pub fn question_count(&self) -> usize {
        self.subjects.iter().map(|s| s.questions.len()).sum()
    }

    pub fn topic_count(&self) -> usize {
        self.subjects.iter().map(|s| s.descriptor.topics.len()).sum()
    }
}

pub fn scan(root: &Path, config: &Config) -> Result<Catalog, ScanError> {
    let mut subjects = Vec::new();
    for subject_dir in child_dirs(root)? {
        if let Some(subject) = scan_subject(&subject_dir, config)? {
            debug!(
                subject = %subject.code,
                questions = subject.questions.len(),
                topics = subject.descriptor.topics.len(),
                "scanned subject"
            );
            subjects.push(subject);
        }
    }
    Ok(Catalog {
        root: root.to_path_buf(),
        subjects,
    })
}

fn scan_subject(dir: &Path, config: &Config) -> Result<Option<Subject>, ScanError> {
    let code = dir_name(dir);
    let descriptor_path = dir.join(SUBJECT_FILE);
    if !descriptor_path.is_file() {
        debug!(dir = %dir.display(), "no {SUBJECT_FILE}, skipping");
        return Ok(None);
    }
    let mut descriptor: SubjectDescriptor = read_json(&descriptor_path)?;
    let mut topics = TopicList::new(std::mem::take(&mut descriptor.topics));

    let mut questions = Vec::new();
    let mut seen = HashSet::new();

    let flat_dir = dir.join(FLAT_DIR);
    if flat_dir.is_dir() {
        for question_dir in child_dirs(&flat_dir)? {
            if let Some(q) = scan_question(&question_dir, &code, Origin::Flat, config)? {
                seen.insert(q.question.id.clone());
                questions.push(q);
            }
        }
    }

    for topic_dir in child_dirs(dir)? {
        let topic_id = dir_name(&topic_dir);
        if topic_id == FLAT_DIR {
            continue;
        }
        topics.discover(&topic_id, &topic_dir);

        for question_dir in child_dirs(&topic_dir)? {
            let question_id = dir_name(&question_dir);
            if seen.contains(&question_id) {
                debug!(
                    subject = %code,
                    topic = %topic_id,
                    question = %question_id,
                    "question already collected, skipping legacy copy"
                );
                continue;
            }
            let origin = Origin::Legacy {
                topic: topic_id.clone(),
            };
            if let Some(q) = scan_question(&question_dir, &code, origin, config)? {
                seen.insert(q.question.id.clone());
                questions.push(q);
            }
        }
    }

    descriptor.topics = topics.into_vec();
    Ok(Some(Subject {
        code,
        descriptor,
        questions,
    }))
}

fn scan_question(
    dir: &Path,
    subject_code: &str,
    origin: Origin,
    config: &Config,
) -> Result<Option<ScannedQuestion>, ScanError> {
    let content_path = dir.join(QUESTION_FILE);
    if !content_path.is_file() {
        debug!(dir = %dir.display(), "no {QUESTION_FILE}, skipping");
        return Ok(None);
    }
    let authored: Value = read_json(&content_path)?;

    let id = dir_name(dir);
    let public_dir = format!(
        "{}/{}/{}",
        config.public_prefix,
        subject_code,
        origin.relative_dir(&id)
    );
    let photos = Photos {
        quiz_photo: public_photo(dir, QUIZ_PHOTO_FILE, &public_dir),
        photo: public_photo(dir, PHOTO_FILE, &public_dir),
    };

    let question = normalize_question(authored, &id, subject_code, &origin, photos)
        .map_err(|reason| ScanError::InvalidQuestion {
            path: content_path.clone(),
            reason,
        })?;

    Ok(Some(ScannedQuestion {
        question,
        origin,
        source_dir: dir.to_path_buf(),
        assets: collect_assets(dir, config)?,
    }))
}

/// Public paths of the two well-known images, `None` when absent.
struct Photos {
    quiz_photo: Option<String>,
    photo: Option<String>,
}

fn public_photo(dir: &Path, file: &str, public_dir: &str) -> Option<String> {
    dir.join(file)
        .is_file()
        .then(|| format!("{public_dir}/{file}"))
}

/// Turn authored question content into a [`Question`].
///
/// Synthesized keys replace authored ones of the same name. A singular
/// `topic` is kept as authored but also feeds `topics` when no plural list
/// exists; legacy questions always belong to exactly their directory's topic.
fn normalize_question(
    authored: Value,
    id: &str,
    subject_code: &str,
    origin: &Origin,
    photos: Photos,
) -> Result<Question, String> {
    let Value::Object(mut extra) = authored else {
        return Err("top level must be a JSON object".to_string());
    };

    for key in ["id", "subjectCode", "quizPhoto", "photo"] {
        extra.shift_remove(key);
    }
    let authored_topics = extra.shift_remove("topics");
    let answers = extra
        .shift_remove("answers")
        .map(index_answers)
        .transpose()?;

    let topics = match origin {
        Origin::Legacy { topic } => vec![topic.clone()],
        Origin::Flat => match authored_topics {
            Some(list) => topic_ids(list),
            None => extra.get("topic").cloned().map(topic_ids).unwrap_or_default(),
        },
    };

    Ok(Question {
        extra,
        id: id.to_string(),
        subject_code: subject_code.to_string(),
        topics,
        quiz_photo: photos.quiz_photo,
        photo: photos.photo,
        answers,
    })
}

/// Coerce an authored `topic`/`topics` value into a list of topic ids.
///
/// Arrays map element-wise, a bare string is a one-element list, `null` is
/// empty. Non-string scalars use their JSON text.
fn topic_ids(value: Value) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items.into_iter().flat_map(topic_ids).collect(),
        Value::String(s) => vec![s],
        other => vec![other.to_string()],
    }
}

fn index_answers(value: Value) -> Result<Vec<Answer>, String> {
    let Value::Array(items) = value else {
        return Err("answers must be an array".to_string());
    };
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(mut extra) => {
                extra.shift_remove("index");
                Ok(Answer {
                    extra,
                    index: i + 1,
                })
            }
            _ => Err(format!("answer {} must be a JSON object", i + 1)),
        })
        .collect()
}

// =============================================================================
// Topics
// =============================================================================

/// The master topic list of a subject, grown as legacy directories appear.
struct TopicList {
    topics: Vec<Topic>,
    known: HashSet<String>,
}

impl TopicList {
    fn new(topics: Vec<Topic>) -> Self {
        let known = topics.iter().map(|t| t.id.clone()).collect();
        Self { topics, known }
    }

    /// Record a legacy topic directory. Topics already in the master list keep
    /// their authored name.
    fn discover(&mut self, topic_id: &str, dir: &Path) {
        if self.known.contains(topic_id) {
            return;
        }
        let name = topic_name(dir, topic_id);
        self.known.insert(topic_id.to_string());
        self.topics.push(Topic::new(topic_id, name));
    }

    fn into_vec(self) -> Vec<Topic> {
        self.topics
    }
}

#[derive(Deserialize)]
struct TopicSidecar {
    name: Option<String>,
}

/// Resolve a topic's display name from `topic.json`, falling back to its id.
fn topic_name(dir: &Path, topic_id: &str) -> String {
    let path = dir.join(TOPIC_FILE);
    if !path.exists() {
        return topic_id.to_string();
    }
    match read_json::<TopicSidecar>(&path) {
        Ok(sidecar) => sidecar.name.unwrap_or_else(|| topic_id.to_string()),
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "unreadable topic sidecar, using directory name"
            );
            topic_id.to_string()
        }
    }
}

// =============================================================================
// Filesystem helpers
// =============================================================================

/// Immediate, non-hidden subdirectories of `path` in file-name order.
fn child_dirs(path: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let mut dirs = Vec::new();
    for entry in sorted_children(path) {
        let entry = entry?;
        if entry.file_type().is_dir() && !is_hidden(entry.file_name()) {
            dirs.push(entry.into_path());
        }
    }
    Ok(dirs)
}

/// Image file names directly inside a question directory, sorted.
fn collect_assets(dir: &Path, config: &Config) -> Result<Vec<String>, ScanError> {
    let mut assets = Vec::new();
    for entry in sorted_children(dir) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_image = entry
            .path()
            .extension()
            .map(|e| config.is_image_extension(&e.to_string_lossy()))
            .unwrap_or(false);
        if is_image {
            assets.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    Ok(assets)
}

fn sorted_children(path: &Path) -> walkdir::IntoIter {
    WalkDir::new(path)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ScanError> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|err| ScanError::Json {
        path: path.to_path_buf(),
        err,
    })
}
