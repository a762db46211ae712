//! Conformance checks for normalized documents.
//!
//! The downstream indexer rejects documents that lose their provenance key or
//! carry empty core fields. `lint` reports such problems without failing, so
//! callers can decide whether a document is still worth shipping.

use std::fmt;

use crate::config::SOURCE_NAME;
use crate::types::{NormalizedDocument, RawDocument};

/// One conformance problem found in a normalized document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LintIssue {
    EmptyTitle,
    EmptyDateCreated,
    NoContributors,
    /// Contributor at this position has an empty name.
    EmptyContributorName(usize),
    WrongSource(String),
    ProvenanceMismatch { doc_id: String, service_id: String },
}

impl fmt::Display for LintIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title is empty"),
            Self::EmptyDateCreated => write!(f, "date_created is empty"),
            Self::NoContributors => write!(f, "no contributors"),
            Self::EmptyContributorName(index) => {
                write!(f, "contributor {index} has an empty full_name")
            }
            Self::WrongSource(source) => {
                write!(f, "source is '{source}', expected '{SOURCE_NAME}'")
            }
            Self::ProvenanceMismatch { doc_id, service_id } => {
                write!(f, "doc_id '{doc_id}' does not match service_id '{service_id}'")
            }
        }
    }
}

/// Check a normalized document against the record it came from.
///
/// # Returns
/// All issues found; an empty list means the document conforms.
#[must_use]
pub fn lint(raw: &RawDocument, document: &NormalizedDocument) -> Vec<LintIssue> {
    let mut issues = Vec::new();

    if document.title.trim().is_empty() {
        issues.push(LintIssue::EmptyTitle);
    }
    if document.date_created.trim().is_empty() {
        issues.push(LintIssue::EmptyDateCreated);
    }
    if document.contributors.is_empty() {
        issues.push(LintIssue::NoContributors);
    }
    issues.extend(
        document
            .contributors
            .iter()
            .enumerate()
            .filter(|(_, c)| c.full_name.trim().is_empty())
            .map(|(index, _)| LintIssue::EmptyContributorName(index)),
    );
    if document.source != SOURCE_NAME {
        issues.push(LintIssue::WrongSource(document.source.clone()));
    }
    if raw.doc_id() != document.id.service_id {
        issues.push(LintIssue::ProvenanceMismatch {
            doc_id: raw.doc_id().to_string(),
            service_id: document.id.service_id.clone(),
        });
    }

    issues
}
