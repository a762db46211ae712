//! SciTech Harvester - Fetch SciTech Connect records and normalize them.
//!
//! This crate queries the OSTI SciTech Connect XML search endpoint for records
//! entered within a date window, pages through the results, and converts each
//! record into a normalized metadata document for downstream indexing.
//!
//! # Example
//!
//! ```
//! use scitech_harvester::normalizer::{parse_contributors, parse_tags};
//!
//! let contributors = parse_contributors("A. Smith; B. Jones [Affiliation X]");
//! assert_eq!(contributors[1].full_name, "B. Jones");
//! assert_eq!(parse_tags("Physics, & Chemistry; Nuclear").len(), 2);
//! ```
//!
//! # Architecture
//!
//! The harvester is organized into several modules:
//!
//! - [`config`]: Configuration constants, fetcher settings and date parsing
//! - [`types`]: Core data types (RawDocument, NormalizedDocument, HarvestWindow)
//! - [`error`]: Error types and Result alias
//! - [`http`]: HTTP client for the search endpoint
//! - [`xml`]: XML utilities
//! - [`fields`]: Field extraction table
//! - [`fetcher`]: Paginated record retrieval
//! - [`normalizer`]: Record normalization
//! - [`lint`]: Conformance checks for normalized documents
//! - [`cli`]: Command-line interface
//! - [`harvester`]: Main harvester service

pub mod cli;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod fields;
pub mod harvester;
pub mod http;
pub mod lint;
pub mod normalizer;
pub mod types;
pub mod xml;

// Re-export main functions
pub use fetcher::{fetch, Fetcher};
pub use harvester::{harvest, harvest_recent, ErrorPolicy};
pub use normalizer::normalize;

// Re-export commonly used items
pub use config::FetcherConfig;
pub use error::{HarvesterError, Result};
pub use types::{Contributor, Harvest, HarvestWindow, NormalizedDocument, RawDocument};
