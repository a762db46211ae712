//! Paginated retrieval of raw records from the SciTech search endpoint.
//!
//! The endpoint answers with an XML envelope whose `records` child holds one
//! element per result and a `morepages` attribute saying whether another page
//! follows. Pages are requested strictly in order, starting at page 0.

use reqwest::blocking::Client;
use reqwest::Url;

use crate::config::{
    FetcherConfig, DC_ELEMENTS_NS, PARAM_DATE_FROM, PARAM_DATE_TO, PARAM_PAGE,
};
use crate::error::{HarvesterError, Result};
use crate::http::{bytes_to_string, create_client, download_bytes};
use crate::types::{HarvestWindow, RawDocument};
use crate::xml::{element_children, find_child, ns_text, parse_document, standalone_xml};

/// Local name of the container element holding the records of a page.
const RECORDS_TAG: &str = "records";

/// Attribute on the records container announcing a further page.
const MORE_PAGES_ATTR: &str = "morepages";

/// Local name of the element carrying a record's service ID.
pub const RECORD_ID_TAG: &str = "ostiId";

/// One parsed result page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Records on this page, in document order.
    pub records: Vec<RawDocument>,

    /// Whether the provider announced a further page.
    pub more_pages: bool,
}

/// Parse one result page.
///
/// # Arguments
/// * `xml` - Response body of the page
/// * `page` - Zero-based page index, used for error context
///
/// # Returns
/// The page's records and its continuation flag. A page without records is
/// valid; only the `records` container itself is mandatory.
pub fn parse_page(xml: &str, page: u32) -> Result<Page> {
    let doc =
        parse_document(xml).map_err(|source| HarvesterError::XmlParse { page, source })?;
    let records_node =
        find_child(doc.root_element(), RECORDS_TAG).ok_or(HarvesterError::MissingRecords { page })?;

    let records = element_children(records_node)
        .enumerate()
        .map(|(index, record)| -> Result<RawDocument> {
            let doc_id = ns_text(record, DC_ELEMENTS_NS, RECORD_ID_TAG)
                .ok_or(HarvesterError::MissingRecordId { page, index })?;
            Ok(RawDocument::new(standalone_xml(record).into_bytes(), doc_id))
        })
        .collect::<Result<Vec<_>>>()?;

    let more_pages = records_node.attribute(MORE_PAGES_ATTR) == Some("true");

    Ok(Page {
        records,
        more_pages,
    })
}

/// Build the query parameters for one page request.
///
/// Caller-supplied parameters come first. Parameters owned by the harvester
/// (date window and page index) replace caller entries with the same name.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use scitech_harvester::fetcher::build_query;
/// use scitech_harvester::types::HarvestWindow;
///
/// let today = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
/// let window = HarvestWindow::new(today, 1, None).unwrap();
/// let extra = vec![("SubjectCategory".to_string(), "73".to_string())];
///
/// let query = build_query(&window, &extra, 0);
/// assert_eq!(query[0], ("SubjectCategory".to_string(), "73".to_string()));
/// assert!(query.contains(&("EntryDateFrom".to_string(), "01/01/2025".to_string())));
/// assert!(query.contains(&("page".to_string(), "0".to_string())));
/// ```
#[must_use]
pub fn build_query(
    window: &HarvestWindow,
    extra_params: &[(String, String)],
    page: u32,
) -> Vec<(String, String)> {
    let owned = [PARAM_DATE_FROM, PARAM_DATE_TO, PARAM_PAGE];

    let mut query: Vec<(String, String)> = extra_params
        .iter()
        .filter(|(key, _)| !owned.contains(&key.as_str()))
        .cloned()
        .collect();

    query.push((PARAM_DATE_FROM.to_string(), window.start_param()));
    if let Some(end) = window.end_param() {
        query.push((PARAM_DATE_TO.to_string(), end));
    }
    query.push((PARAM_PAGE.to_string(), page.to_string()));

    query
}

/// Client for the SciTech search endpoint.
#[derive(Debug)]
pub struct Fetcher {
    client: Client,
    base_url: Url,
}

impl Fetcher {
    /// Create a fetcher from configuration.
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        let base_url =
            Url::parse(&config.base_url).map_err(|source| HarvesterError::InvalidBaseUrl {
                url: config.base_url.clone(),
                source,
            })?;

        Ok(Self {
            client: create_client(config)?,
            base_url,
        })
    }

    /// Fetch every record entered within `window`.
    ///
    /// Each call starts a fresh pagination sequence at page 0 and stops at the
    /// first page whose `morepages` flag is not `"true"`.
    ///
    /// # Arguments
    /// * `window` - Entry date window
    /// * `extra_params` - Additional query parameters forwarded to the endpoint
    pub fn fetch(
        &self,
        window: &HarvestWindow,
        extra_params: &[(String, String)],
    ) -> Result<Vec<RawDocument>> {
        let mut documents = Vec::new();
        let mut page = 0;

        loop {
            let result = self.fetch_page(window, extra_params, page)?;
            tracing::debug!(
                page,
                records = result.records.len(),
                more_pages = result.more_pages,
                "Parsed result page"
            );
            documents.extend(result.records);

            if !result.more_pages {
                break;
            }
            page += 1;
        }

        tracing::info!(pages = page + 1, records = documents.len(), "Fetch complete");
        Ok(documents)
    }

    /// Request and parse a single page.
    pub fn fetch_page(
        &self,
        window: &HarvestWindow,
        extra_params: &[(String, String)],
        page: u32,
    ) -> Result<Page> {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .extend_pairs(build_query(window, extra_params, page));

        tracing::debug!(page, url = %url, "Requesting result page");
        let bytes = download_bytes(&self.client, url)
            .map_err(|source| HarvesterError::PageDownload { page, source })?;

        let xml = bytes_to_string(&bytes, &format!("result page {page}"));
        parse_page(&xml, page)
    }
}

/// Fetch records entered within the last `days_back` days from the public
/// endpoint.
///
/// # Arguments
/// * `days_back` - Days before today where the window starts
/// * `end_date` - Optional upper bound (`YYYY-MM-DD` or `MM/DD/YYYY`)
/// * `extra_params` - Additional query parameters forwarded to the endpoint
pub fn fetch(
    days_back: u32,
    end_date: Option<&str>,
    extra_params: &[(String, String)],
) -> Result<Vec<RawDocument>> {
    // Validate the window before touching the network
    let window = HarvestWindow::ending_today(days_back, end_date)?;
    let fetcher = Fetcher::new(&FetcherConfig::default())?;
    fetcher.fetch(&window, extra_params)
}
