//! Main harvester service that ties all components together.

use std::fmt::Display;

use chrono::Utc;

use crate::config::FetcherConfig;
use crate::error::{HarvesterError, Result};
use crate::fetcher::Fetcher;
use crate::normalizer::normalize;
use crate::types::{Harvest, HarvestWindow, NormalizedDocument, RawDocument};

/// How a harvest treats records that fail normalization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Abort on the first bad record.
    #[default]
    FailFast,
    /// Record a warning for the bad record and continue.
    Skip,
}

/// Run one harvest cycle: fetch every record in `window`, then normalize it.
///
/// # Arguments
/// * `fetcher` - Client for the search endpoint
/// * `window` - Entry date window
/// * `extra_params` - Additional query parameters forwarded to the endpoint
/// * `timestamp` - Harvest timestamp stamped on every document
/// * `policy` - Treatment of records that fail normalization
///
/// # Returns
/// A `Harvest` with the normalized documents and, under `ErrorPolicy::Skip`,
/// one warning per skipped record. Fetch errors always abort.
pub fn harvest(
    fetcher: &Fetcher,
    window: &HarvestWindow,
    extra_params: &[(String, String)],
    timestamp: impl Display,
    policy: ErrorPolicy,
) -> Result<Harvest> {
    let raw_documents = fetcher.fetch(window, extra_params)?;
    normalize_all(&raw_documents, timestamp, policy)
}

/// Harvest the last `days_back` days from the public endpoint, stamped with
/// the current UTC time.
pub fn harvest_recent(
    days_back: u32,
    end_date: Option<&str>,
    extra_params: &[(String, String)],
    policy: ErrorPolicy,
) -> Result<Harvest> {
    // Validate inputs before making HTTP requests
    let window = HarvestWindow::ending_today(days_back, end_date)?;
    let fetcher = Fetcher::new(&FetcherConfig::default())?;
    harvest(&fetcher, &window, extra_params, Utc::now().to_rfc3339(), policy)
}

/// Normalize a batch of raw records under the given policy.
pub fn normalize_all(
    raw_documents: &[RawDocument],
    timestamp: impl Display,
    policy: ErrorPolicy,
) -> Result<Harvest> {
    let timestamp = timestamp.to_string();
    let mut harvest = Harvest::default();

    for raw in raw_documents {
        match normalize_checked(raw, &timestamp) {
            Ok(document) => harvest.documents.push(document),
            Err(e) if policy == ErrorPolicy::Skip => {
                tracing::warn!(doc_id = raw.doc_id(), error = %e, "Skipping record");
                harvest.warnings.push(format!("{}: {e}", raw.doc_id()));
            }
            Err(e) => return Err(e),
        }
    }

    tracing::info!(
        documents = harvest.documents.len(),
        skipped = harvest.warning_count(),
        "Normalization complete"
    );
    Ok(harvest)
}

/// Normalize a record and verify it kept its provenance key.
fn normalize_checked(raw: &RawDocument, timestamp: &str) -> Result<NormalizedDocument> {
    let document = normalize(raw, timestamp)?;
    if document.id.service_id != raw.doc_id() {
        return Err(HarvesterError::ProvenanceMismatch {
            doc_id: raw.doc_id().to_string(),
            service_id: document.id.service_id,
        });
    }
    Ok(document)
}
