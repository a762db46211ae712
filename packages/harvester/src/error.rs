//! Error types for the harvester.
//!
//! A single `HarvesterError` covers the whole harvest cycle. Fetch-side
//! failures carry the page index, normalization failures carry the record ID,
//! so a failed run can be traced back to the offending page or record.

use thiserror::Error;

/// Main error type for the harvester library.
#[derive(Debug, Error)]
pub enum HarvesterError {
    /// Date string could not be parsed.
    #[error("Invalid date format: '{0}'. Expected YYYY-MM-DD or MM/DD/YYYY (e.g., 2025-01-01)")]
    InvalidDate(String),

    /// End of the date window lies before its start.
    #[error("Invalid date window: end date {to} is before start date {from}")]
    InvalidDateWindow { from: String, to: String },

    /// Base URL of the search endpoint could not be parsed.
    #[error("Invalid search endpoint URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// HTTP client could not be built or a request failed outside a page fetch.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Downloading one result page failed.
    #[error("Failed to download result page {page}: {source}")]
    PageDownload {
        page: u32,
        #[source]
        source: reqwest::Error,
    },

    /// A response page was not well-formed XML.
    #[error("XML parsing failed for result page {page}: {source}")]
    XmlParse {
        page: u32,
        #[source]
        source: roxmltree::Error,
    },

    /// A response page had no `records` container.
    #[error("Missing <records> container in result page {page}")]
    MissingRecords { page: u32 },

    /// A record on a result page had no service ID.
    #[error("Record {index} on result page {page} has no ostiId")]
    MissingRecordId { page: u32, index: usize },

    /// A raw record payload was not well-formed XML.
    #[error("Malformed XML in record {doc_id}: {source}")]
    RecordParse {
        doc_id: String,
        #[source]
        source: roxmltree::Error,
    },

    /// A required field was absent from a record.
    #[error("Record {doc_id} is missing required field '{field}'")]
    MissingField { doc_id: String, field: String },

    /// A normalized document lost its provenance key.
    #[error("Record {doc_id} normalized with service_id '{service_id}'")]
    ProvenanceMismatch { doc_id: String, service_id: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl HarvesterError {
    /// Whether this error was raised while fetching result pages.
    #[must_use]
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            Self::Http(_)
                | Self::PageDownload { .. }
                | Self::XmlParse { .. }
                | Self::MissingRecords { .. }
                | Self::MissingRecordId { .. }
        )
    }
}

/// Result type alias for harvester operations.
pub type Result<T> = std::result::Result<T, HarvesterError>;
