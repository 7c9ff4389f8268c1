//! CLI output formatting.
//!
//! Output is information-first: every subject and question leads with its
//! positional index and identity, with source paths as indented `Source:`
//! context lines.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Subjects
//! 001 math (3 questions)
//!     Source: math/
//!     Topics: algebra (Algebra), geometry (Geometrie)
//!     001 q001 [algebra]
//!         Source: questions/q001/
//!         Assets: quiz.png
//!     002 q003 [geometry]
//!         Source: geometry/q003/
//!
//! 2 subjects, 3 topics, 4 questions
//! ```
//!
//! ## Build
//!
//! ```text
//! Processed 2 subjects.
//! ```
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout.

use crate::generate::Summary;
use crate::scan::{Catalog, FLAT_DIR, Origin, ScannedQuestion, Subject};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `001 math (3 questions)`
fn subject_header(index: usize, subject: &Subject) -> String {
    let n = subject.questions.len();
    let noun = if n == 1 { "question" } else { "questions" };
    format!("{} {} ({} {})", format_index(index), subject.code, n, noun)
}

/// `001 q001 [algebra, geometry]`, or just the id when untagged.
fn question_line(index: usize, scanned: &ScannedQuestion) -> String {
    let q = &scanned.question;
    if q.topics.is_empty() {
        format!("{} {}", format_index(index), q.id)
    } else {
        format!("{} {} [{}]", format_index(index), q.id, q.topics.join(", "))
    }
}

/// Source directory of a question relative to its subject.
fn question_source(scanned: &ScannedQuestion) -> String {
    match &scanned.origin {
        Origin::Flat => format!("{}/{}/", FLAT_DIR, scanned.question.id),
        Origin::Legacy { topic } => format!("{}/{}/", topic, scanned.question.id),
    }
}

/// Format the inventory of a scanned source tree.
pub fn format_scan_output(catalog: &Catalog) -> Vec<String> {
    let mut lines = vec!["Subjects".to_string()];

    for (i, subject) in catalog.subjects.iter().enumerate() {
        lines.push(subject_header(i + 1, subject));
        lines.push(format!("{}Source: {}/", indent(1), subject.code));

        if !subject.descriptor.topics.is_empty() {
            let topics: Vec<String> = subject
                .descriptor
                .topics
                .iter()
                .map(|t| {
                    if t.name == t.id {
                        t.id.clone()
                    } else {
                        format!("{} ({})", t.id, t.name)
                    }
                })
                .collect();
            lines.push(format!("{}Topics: {}", indent(1), topics.join(", ")));
        }

        for (j, scanned) in subject.questions.iter().enumerate() {
            lines.push(format!("{}{}", indent(1), question_line(j + 1, scanned)));
            lines.push(format!("{}Source: {}", indent(2), question_source(scanned)));
            if !scanned.assets.is_empty() {
                lines.push(format!("{}Assets: {}", indent(2), scanned.assets.join(", ")));
            }
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "{} subjects, {} topics, {} questions",
        catalog.subjects.len(),
        catalog.topic_count(),
        catalog.question_count()
    ));
    lines
}

/// Print the scan inventory to stdout.
pub fn print_scan_output(catalog: &Catalog) {
    for line in format_scan_output(catalog) {
        println!("{}", line);
    }
}

/// The one-line build report the deploy scripts look for.
pub fn format_build_output(summary: &Summary) -> String {
    format!("Processed {} subjects.", summary.subjects)
}

pub fn print_build_output(summary: &Summary) {
    println!("{}", format_build_output(summary));
}
