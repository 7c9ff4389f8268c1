//! Records written to the public JSON indices.
//!
//! Fields the build synthesizes (`id`, `code`, `subjectCode`, `topics`,
//! `quizPhoto`, `photo`, answer `index`) are typed struct fields. Everything
//! else an author puts in `subject.json` or `question.json` lives in an
//! [`Extra`] map that is flattened back into the output, so unknown keys pass
//! through a rebuild untouched and in their original order.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Authored keys that have no typed field, in file order.
pub type Extra = Map<String, Value>;

/// A topic of a subject: `{"id": ..., "name": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Topic {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            extra: Extra::new(),
        }
    }
}

/// Subject descriptor as authored in `subject.json`.
///
/// `topics` is the master topic list. After a scan it also holds every topic
/// discovered from legacy topic directories.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubjectDescriptor {
    #[serde(flatten)]
    pub extra: Extra,
    #[serde(default)]
    pub topics: Vec<Topic>,
}

/// One answer choice, annotated with its 1-based position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    #[serde(flatten)]
    pub extra: Extra,
    pub index: usize,
}

/// A normalized question as it appears in `questions.json`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(flatten)]
    pub extra: Extra,
    pub id: String,
    pub subject_code: String,
    pub topics: Vec<String>,
    /// Public path of `quiz.png`, serialized as `false` when absent.
    #[serde(serialize_with = "path_or_false")]
    pub quiz_photo: Option<String>,
    /// Public path of `photo.png`, serialized as `false` when absent.
    #[serde(serialize_with = "path_or_false")]
    pub photo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answers: Option<Vec<Answer>>,
}

/// The front end treats a missing image as the literal `false`.
fn path_or_false<S: Serializer>(path: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
    match path {
        Some(p) => serializer.serialize_str(p),
        None => serializer.serialize_bool(false),
    }
}

/// Entry of the global subjects index: synthesized `id`, the descriptor's
/// fields, then the subject `code`.
#[derive(Debug, Clone, Serialize)]
pub struct SubjectEntry {
    pub id: usize,
    #[serde(flatten)]
    pub descriptor: SubjectDescriptor,
    pub code: String,
}

impl SubjectEntry {
    /// Build an entry from a descriptor. Authored `id`/`code` keys are
    /// dropped so the synthesized values are the only ones emitted.
    pub fn new(id: usize, code: &str, descriptor: &SubjectDescriptor) -> Self {
        let mut descriptor = descriptor.clone();
        descriptor.extra.shift_remove("id");
        descriptor.extra.shift_remove("code");
        Self {
            id,
            descriptor,
            code: code.to_string(),
        }
    }
}

/// `subjects.json`
#[derive(Debug, Serialize)]
pub struct SubjectsIndex {
    pub subjects: Vec<SubjectEntry>,
}

/// `{subject}/questions.json`
#[derive(Debug, Serialize)]
pub struct QuestionsIndex<'a> {
    pub questions: Vec<&'a Question>,
}
