//! Command-line interface for the harvester.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::config::{FetcherConfig, HTTP_TIMEOUT_SECS, SCITECH_SEARCH_URL};
use crate::error::{HarvesterError, Result};
use crate::fetcher::Fetcher;
use crate::fields::SERVICE_ID;
use crate::harvester::{normalize_all, ErrorPolicy};
use crate::lint::lint;
use crate::normalizer::normalize;
use crate::xml::parse_document;
use crate::types::{HarvestWindow, RawDocument};

/// SciTech Harvester - Fetch SciTech Connect records and normalize them.
#[derive(Parser)]
#[command(name = "scitech-harvester")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Harvest records entered in a date window and print them as JSON.
    Harvest {
        /// Start the window this many days before today
        #[arg(long, default_value_t = 1)]
        days_back: u32,

        /// End of the window, YYYY-MM-DD or MM/DD/YYYY (default: open)
        #[arg(long)]
        end_date: Option<String>,

        /// Extra query parameter forwarded to the endpoint (repeatable)
        #[arg(short, long = "param", value_name = "KEY=VALUE", value_parser = parse_key_val)]
        params: Vec<(String, String)>,

        /// Skip records that fail normalization instead of aborting
        #[arg(long)]
        skip_invalid: bool,

        /// Write JSON to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Search endpoint URL
        #[arg(long, default_value = SCITECH_SEARCH_URL)]
        base_url: String,

        /// Request timeout in seconds
        #[arg(long, default_value_t = HTTP_TIMEOUT_SECS)]
        timeout: u64,
    },

    /// Normalize a single raw record XML file and print it as JSON.
    Normalize {
        /// Path to the record XML
        file: PathBuf,

        /// Timestamp to stamp on the document (default: now, RFC 3339)
        #[arg(long)]
        timestamp: Option<String>,
    },
}

/// Parse a `KEY=VALUE` pair.
fn parse_key_val(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{s}'")),
    }
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Harvest {
            days_back,
            end_date,
            params,
            skip_invalid,
            output,
            base_url,
            timeout,
        } => {
            let config = FetcherConfig::default()
                .with_base_url(base_url)
                .with_timeout_secs(timeout);
            let policy = if skip_invalid {
                ErrorPolicy::Skip
            } else {
                ErrorPolicy::FailFast
            };
            harvest_command(
                &config,
                days_back,
                end_date.as_deref(),
                &params,
                policy,
                output.as_deref(),
            )
        }
        Commands::Normalize { file, timestamp } => normalize_command(&file, timestamp),
    }
}

/// Execute the harvest command.
fn harvest_command(
    config: &FetcherConfig,
    days_back: u32,
    end_date: Option<&str>,
    params: &[(String, String)],
    policy: ErrorPolicy,
    output: Option<&Path>,
) -> Result<()> {
    // Validate inputs before making HTTP requests
    let window = HarvestWindow::ending_today(days_back, end_date)?;
    let fetcher = Fetcher::new(config)?;

    eprintln!(
        "{} records entered since {}{}",
        style("Harvesting").bold(),
        style(window.from).green(),
        window
            .to
            .map(|to| format!(" until {}", style(to).green()))
            .unwrap_or_default()
    );

    // Create progress spinner
    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );

    pb.set_message("Fetching result pages...");
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let raw_documents = match fetcher.fetch(&window, params) {
        Ok(docs) => docs,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };

    pb.set_message("Normalizing records...");
    let harvest = match normalize_all(&raw_documents, Utc::now().to_rfc3339(), policy) {
        Ok(harvest) => harvest,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };

    pb.finish_and_clear();

    eprintln!("  Records: {}", raw_documents.len());
    eprintln!("  Normalized: {}", style(harvest.documents.len()).green());
    if !harvest.warnings.is_empty() {
        eprintln!("  Skipped: {}", style(harvest.warning_count()).yellow().bold());
        for warning in &harvest.warnings {
            eprintln!("    {}", style(warning).yellow());
        }
    }

    write_json(&harvest.documents, output)?;

    if let Some(path) = output {
        eprintln!();
        eprintln!("{} {}", style("Saved to:").green().bold(), path.display());
    }

    Ok(())
}

/// Execute the normalize command.
fn normalize_command(file: &Path, timestamp: Option<String>) -> Result<()> {
    let bytes = fs::read(file)?;
    let raw = raw_document_from_file(bytes)?;

    let timestamp = timestamp.unwrap_or_else(|| Utc::now().to_rfc3339());
    let document = normalize(&raw, &timestamp)?;

    for issue in lint(&raw, &document) {
        tracing::warn!(doc_id = raw.doc_id(), %issue, "Lint issue");
    }

    write_json(&document, None)
}

/// Placeholder record ID for errors raised before a file's ID is known.
const FILE_DOC_ID: &str = "<file>";

/// Wrap a record file, reading its service ID from the payload.
fn raw_document_from_file(bytes: Vec<u8>) -> Result<RawDocument> {
    let doc_id = {
        let xml = String::from_utf8_lossy(&bytes);
        let doc = parse_document(&xml).map_err(|source| HarvesterError::RecordParse {
            doc_id: FILE_DOC_ID.to_string(),
            source,
        })?;
        SERVICE_ID
            .text(doc.root_element())
            .ok_or_else(|| SERVICE_ID.missing(FILE_DOC_ID))?
    };
    Ok(RawDocument::new(bytes, doc_id))
}

/// Write a value as pretty JSON to a file or stdout.
fn write_json<T: Serialize + ?Sized>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                if !parent.is_dir() {
                    return Err(HarvesterError::Io(std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        format!("Output directory does not exist: {}", parent.display()),
                    )));
                }
            }
            fs::write(path, json + "\n")?;
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}")?;
        }
    }

    Ok(())
}
