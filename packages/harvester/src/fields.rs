//! Field extraction table for SciTech records.
//!
//! Every output field is described once: which vocabulary and local name it
//! is read from, and what happens when the record does not carry it. The
//! normalizer walks these tables instead of issuing ad hoc lookups.

use roxmltree::Node;

use crate::config::{DC_ELEMENTS_NS, DC_TERMS_NS, NOT_PROVIDED, NO_DESCRIPTION};
use crate::error::{HarvesterError, Result};
use crate::xml::{find_ns_child, ns_text};

use Requirement::{Fallback, Optional, Required};
use Vocabulary::{Elements, Terms};

/// XML vocabulary a field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vocabulary {
    /// Dublin Core elements (`dc:`).
    Elements,
    /// Dublin Core terms (`dcq:`).
    Terms,
}

impl Vocabulary {
    /// Namespace URI of the vocabulary.
    #[must_use]
    pub fn uri(&self) -> &'static str {
        match self {
            Self::Elements => DC_ELEMENTS_NS,
            Self::Terms => DC_TERMS_NS,
        }
    }
}

/// What to do when a record lacks a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Absence fails normalization.
    Required,
    /// Absence yields the given value.
    Fallback(&'static str),
    /// Absence is represented by the caller (e.g. an empty list).
    Optional,
}

/// One row of the extraction table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Output key.
    pub key: &'static str,
    pub vocabulary: Vocabulary,
    /// Element local name in the record.
    pub local_name: &'static str,
    pub requirement: Requirement,
}

impl FieldSpec {
    const fn new(
        key: &'static str,
        vocabulary: Vocabulary,
        local_name: &'static str,
        requirement: Requirement,
    ) -> Self {
        Self {
            key,
            vocabulary,
            local_name,
            requirement,
        }
    }

    /// The field's element, if the record carries it (blank or not).
    pub fn element<'a, 'input>(&self, record: Node<'a, 'input>) -> Option<Node<'a, 'input>> {
        find_ns_child(record, self.vocabulary.uri(), self.local_name)
    }

    /// Trimmed, non-blank text of the field.
    pub fn text(&self, record: Node<'_, '_>) -> Option<String> {
        ns_text(record, self.vocabulary.uri(), self.local_name)
    }

    /// Extract the field, applying its requirement.
    ///
    /// # Errors
    /// `MissingField` for an absent required field. Fields marked
    /// `Optional` resolve to an empty string.
    pub fn extract(&self, record: Node<'_, '_>, doc_id: &str) -> Result<String> {
        match (self.text(record), self.requirement) {
            (Some(text), _) => Ok(text),
            (None, Requirement::Fallback(fallback)) => Ok(fallback.to_string()),
            (None, Requirement::Optional) => Ok(String::new()),
            (None, Requirement::Required) => Err(self.missing(doc_id)),
        }
    }

    /// Error for this field being absent from `doc_id`.
    #[must_use]
    pub fn missing(&self, doc_id: &str) -> HarvesterError {
        HarvesterError::MissingField {
            doc_id: doc_id.to_string(),
            field: self.key.to_string(),
        }
    }
}

pub const TITLE: FieldSpec = FieldSpec::new("title", Elements, "title", Required);
pub const CREATOR: FieldSpec = FieldSpec::new("creator", Elements, "creator", Required);
pub const DATE_CREATED: FieldSpec = FieldSpec::new("date_created", Elements, "date", Required);
pub const SERVICE_ID: FieldSpec = FieldSpec::new("service_id", Elements, "ostiId", Required);
pub const SUBJECT: FieldSpec = FieldSpec::new("tags", Elements, "subject", Optional);
pub const DESCRIPTION: FieldSpec =
    FieldSpec::new("description", Elements, "description", Fallback(NO_DESCRIPTION));
pub const DOI: FieldSpec = FieldSpec::new("doi", Elements, "doi", Fallback(NOT_PROVIDED));
pub const URL: FieldSpec = FieldSpec::new("url", Terms, "identifier-purl", Fallback(NOT_PROVIDED));

/// Key of the nested identifier map inside `properties`.
pub const IDENTIFIER_INFO_KEY: &str = "identifier_info";

/// Plain-text entries of `properties`.
pub const PROPERTY_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("article_type", Elements, "type", Fallback(NOT_PROVIDED)),
    FieldSpec::new("date_entered", Elements, "dateEntry", Fallback(NOT_PROVIDED)),
    FieldSpec::new("research_org", Terms, "publisherResearch", Fallback(NOT_PROVIDED)),
    FieldSpec::new("research_sponsor", Terms, "publisherSponsor", Fallback(NOT_PROVIDED)),
    FieldSpec::new("research_country", Terms, "publisherCountry", Fallback(NOT_PROVIDED)),
    FieldSpec::new("relation", Elements, "relation", Fallback(NOT_PROVIDED)),
    FieldSpec::new("coverage", Elements, "coverage", Fallback(NOT_PROVIDED)),
    FieldSpec::new("format", Elements, "format", Fallback(NOT_PROVIDED)),
    FieldSpec::new("language", Elements, "language", Fallback(NOT_PROVIDED)),
];

/// Entries of `properties.identifier_info`.
pub const IDENTIFIER_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("identifier", Elements, "identifier", Fallback(NOT_PROVIDED)),
    FieldSpec::new("identifier_report", Elements, "identifierReport", Fallback(NOT_PROVIDED)),
    FieldSpec::new("identifier_contract", Terms, "identifierDOEcontract", Fallback(NOT_PROVIDED)),
    FieldSpec::new("identifier_citation", Terms, "identifier-citation", Fallback(NOT_PROVIDED)),
    FieldSpec::new("identifier_other", Elements, "identifierOther", Fallback(NOT_PROVIDED)),
];
