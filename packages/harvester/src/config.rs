//! Configuration constants and validation functions for the harvester.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

use crate::error::{HarvesterError, Result};

/// Search endpoint of the SciTech Connect XML service.
pub const SCITECH_SEARCH_URL: &str = "http://www.osti.gov/scitech/scitechxml";

/// Source name stamped on every raw and normalized document.
pub const SOURCE_NAME: &str = "SciTech";

/// File type of the raw record payload.
pub const RAW_FILETYPE: &str = "xml";

/// Dublin Core elements vocabulary.
pub const DC_ELEMENTS_NS: &str = "http://purl.org/dc/elements/1.1/";

/// Dublin Core terms vocabulary.
pub const DC_TERMS_NS: &str = "http://purl.org/dc/terms/";

/// HTTP timeout in seconds.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Query parameter carrying the lower bound of the entry date window.
pub const PARAM_DATE_FROM: &str = "EntryDateFrom";

/// Query parameter carrying the upper bound of the entry date window.
pub const PARAM_DATE_TO: &str = "EntryDateTo";

/// Query parameter carrying the zero-based page index.
pub const PARAM_PAGE: &str = "page";

/// Date format the provider expects in query parameters.
pub const PROVIDER_DATE_FORMAT: &str = "%m/%d/%Y";

/// Fallback for absent properties and identifiers.
pub const NOT_PROVIDED: &str = "Not provided";

/// Fallback for an absent description.
pub const NO_DESCRIPTION: &str = "No description provided";

/// Contributor used when the creator field is present but empty.
pub const DEFAULT_CONTRIBUTOR: &str = "DoE";

/// ISO date pattern: YYYY-MM-DD.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static ISO_DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex"));

/// Provider date pattern: MM/DD/YYYY.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static PROVIDER_DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}/\d{2}/\d{4}$").expect("valid regex"));

/// Parse a date given as `YYYY-MM-DD` or `MM/DD/YYYY`.
///
/// # Examples
/// ```
/// use scitech_harvester::config::parse_date;
///
/// assert!(parse_date("2025-01-01").is_ok());
/// assert!(parse_date("01/31/2025").is_ok());
/// assert!(parse_date("2025-13-01").is_err()); // Invalid month
/// ```
pub fn parse_date(date_str: &str) -> Result<NaiveDate> {
    let format = if ISO_DATE_PATTERN.is_match(date_str) {
        "%Y-%m-%d"
    } else if PROVIDER_DATE_PATTERN.is_match(date_str) {
        PROVIDER_DATE_FORMAT
    } else {
        return Err(HarvesterError::InvalidDate(date_str.to_string()));
    };

    NaiveDate::parse_from_str(date_str, format)
        .map_err(|_| HarvesterError::InvalidDate(date_str.to_string()))
}

/// Render a date the way the provider expects it in query parameters.
#[must_use]
pub fn provider_date(date: NaiveDate) -> String {
    date.format(PROVIDER_DATE_FORMAT).to_string()
}

/// Settings for talking to the search endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetcherConfig {
    /// Search endpoint URL.
    pub base_url: String,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            base_url: SCITECH_SEARCH_URL.to_string(),
            timeout_secs: HTTP_TIMEOUT_SECS,
        }
    }
}

impl FetcherConfig {
    /// Point the fetcher at a different endpoint (mirrors, mock servers).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}
