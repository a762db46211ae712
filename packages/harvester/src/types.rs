//! Core data types for the harvester.
//!
//! `RawDocument` is what the fetcher hands out, `NormalizedDocument` is the
//! schema the downstream indexer consumes. Field names of the normalized
//! document are part of that contract and serialize verbatim.

use std::collections::BTreeMap;

use chrono::{Days, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::{parse_date, provider_date, RAW_FILETYPE, SOURCE_NAME};
use crate::error::{HarvesterError, Result};

/// One unprocessed record as returned by the search endpoint.
///
/// Immutable once constructed: the payload and its provenance key travel
/// together into the normalizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    doc: Vec<u8>,
    source: String,
    doc_id: String,
    filetype: String,
}

impl RawDocument {
    /// Wrap a SciTech record payload.
    #[must_use]
    pub fn new(doc: impl Into<Vec<u8>>, doc_id: impl Into<String>) -> Self {
        Self {
            doc: doc.into(),
            source: SOURCE_NAME.to_string(),
            doc_id: doc_id.into(),
            filetype: RAW_FILETYPE.to_string(),
        }
    }

    /// Standalone XML payload of the record.
    #[must_use]
    pub fn doc(&self) -> &[u8] {
        &self.doc
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Provider-assigned service ID (`ostiId`).
    #[must_use]
    pub fn doc_id(&self) -> &str {
        &self.doc_id
    }

    #[must_use]
    pub fn filetype(&self) -> &str {
        &self.filetype
    }
}

/// A person credited on a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    pub full_name: String,

    /// Always empty: the source does not publish email addresses.
    pub email: String,
}

impl Contributor {
    #[must_use]
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            email: String::new(),
        }
    }
}

/// Value of a structured property: plain text or a nested string map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Text(String),
    Map(BTreeMap<String, String>),
}

impl PropertyValue {
    /// Text content, if this is a plain value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Map(_) => None,
        }
    }
}

/// Identifiers of a normalized document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentIds {
    pub service_id: String,
    pub doi: String,
    pub url: String,
}

/// Canonical document handed to the downstream indexer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedDocument {
    pub title: String,
    pub contributors: Vec<Contributor>,
    pub properties: BTreeMap<String, PropertyValue>,
    pub meta: BTreeMap<String, serde_json::Value>,
    pub id: DocumentIds,
    pub source: String,
    pub timestamp: String,
    pub date_created: String,
    pub description: String,
    pub tags: Vec<String>,
}

impl NormalizedDocument {
    /// Look up a top-level property.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }
}

/// Entry date window of one harvest cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HarvestWindow {
    /// Lower bound, inclusive.
    pub from: NaiveDate,

    /// Upper bound; `None` leaves the window open.
    pub to: Option<NaiveDate>,
}

impl HarvestWindow {
    /// Build a window reaching `days_back` days before `today`.
    ///
    /// # Examples
    /// ```
    /// use chrono::NaiveDate;
    /// use scitech_harvester::types::HarvestWindow;
    ///
    /// let today = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();
    /// let window = HarvestWindow::new(today, 1, None).unwrap();
    /// assert_eq!(window.from, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
    /// assert!(window.to.is_none());
    /// ```
    pub fn new(today: NaiveDate, days_back: u32, end_date: Option<&str>) -> Result<Self> {
        let from = today
            .checked_sub_days(Days::new(u64::from(days_back)))
            .ok_or_else(|| HarvesterError::InvalidDate(format!("{days_back} days before {today}")))?;

        let to = end_date.map(parse_date).transpose()?;
        if let Some(to) = to {
            if to < from {
                return Err(HarvesterError::InvalidDateWindow {
                    from: from.to_string(),
                    to: to.to_string(),
                });
            }
        }

        Ok(Self { from, to })
    }

    /// Build a window relative to the local calendar date.
    pub fn ending_today(days_back: u32, end_date: Option<&str>) -> Result<Self> {
        Self::new(Local::now().date_naive(), days_back, end_date)
    }

    /// Lower bound in provider format.
    #[must_use]
    pub fn start_param(&self) -> String {
        provider_date(self.from)
    }

    /// Upper bound in provider format, if bounded.
    #[must_use]
    pub fn end_param(&self) -> Option<String> {
        self.to.map(provider_date)
    }
}

/// Outcome of one harvest cycle.
#[derive(Debug, Clone, Default)]
pub struct Harvest {
    /// Normalized documents, in fetch order.
    pub documents: Vec<NormalizedDocument>,

    /// Records skipped under the skip policy, as `"<doc_id>: <error>"`.
    pub warnings: Vec<String>,
}

impl Harvest {
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }
}
