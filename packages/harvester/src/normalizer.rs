//! Conversion of raw SciTech records into normalized documents.
//!
//! Normalization is a pure function of the raw record and the harvest
//! timestamp. Field lookups go through the tables in [`crate::fields`].

use std::collections::BTreeMap;
use std::fmt::Display;

use crate::config::{DEFAULT_CONTRIBUTOR, SOURCE_NAME};
use crate::error::{HarvesterError, Result};
use crate::fields::{
    CREATOR, DATE_CREATED, DESCRIPTION, DOI, IDENTIFIER_FIELDS, IDENTIFIER_INFO_KEY,
    PROPERTY_FIELDS, SERVICE_ID, SUBJECT, TITLE, URL,
};
use crate::http::bytes_to_string;
use crate::types::{Contributor, DocumentIds, NormalizedDocument, PropertyValue, RawDocument};
use crate::xml::{get_text, parse_document};

/// Creator fragments starting with one of these are separators, not names.
const NON_NAME_PREFIXES: [&str; 3] = ["/", ",", "et. al"];

/// Normalize one raw record.
///
/// # Arguments
/// * `raw` - Record as produced by the fetcher
/// * `timestamp` - Harvest timestamp, stored in its display form
///
/// # Errors
/// `RecordParse` for a malformed payload, `MissingField` when title,
/// creator, date or service ID is absent.
pub fn normalize(raw: &RawDocument, timestamp: impl Display) -> Result<NormalizedDocument> {
    let doc_id = raw.doc_id();
    let xml = bytes_to_string(raw.doc(), &format!("record {doc_id}"));
    let doc = parse_document(&xml).map_err(|source| HarvesterError::RecordParse {
        doc_id: doc_id.to_string(),
        source,
    })?;
    let record = doc.root_element();

    let creator = CREATOR
        .element(record)
        .map(get_text)
        .ok_or_else(|| CREATOR.missing(doc_id))?;

    let mut properties: BTreeMap<String, PropertyValue> = BTreeMap::new();
    for field in PROPERTY_FIELDS {
        properties.insert(
            field.key.to_string(),
            PropertyValue::Text(field.extract(record, doc_id)?),
        );
    }
    let identifier_info = IDENTIFIER_FIELDS
        .iter()
        .map(|field| -> Result<(String, String)> {
            Ok((field.key.to_string(), field.extract(record, doc_id)?))
        })
        .collect::<Result<BTreeMap<_, _>>>()?;
    properties.insert(
        IDENTIFIER_INFO_KEY.to_string(),
        PropertyValue::Map(identifier_info),
    );

    Ok(NormalizedDocument {
        title: TITLE.extract(record, doc_id)?,
        contributors: parse_contributors(&creator),
        properties,
        meta: BTreeMap::new(),
        id: DocumentIds {
            service_id: SERVICE_ID.extract(record, doc_id)?,
            doi: DOI.extract(record, doc_id)?,
            url: URL.extract(record, doc_id)?,
        },
        source: SOURCE_NAME.to_string(),
        timestamp: timestamp.to_string(),
        date_created: DATE_CREATED.extract(record, doc_id)?,
        description: DESCRIPTION.extract(record, doc_id)?,
        tags: SUBJECT
            .text(record)
            .map(|subject| parse_tags(&subject))
            .unwrap_or_default(),
    })
}

/// Split a creator field into contributors.
///
/// Names are separated by `;`. Fragments that are empty or start with `/`,
/// `,` or `et. al` are dropped, and bracketed annotations are cut off. An
/// empty field yields the single placeholder contributor `DoE`.
///
/// # Examples
/// ```
/// use scitech_harvester::normalizer::parse_contributors;
///
/// let names: Vec<_> = parse_contributors("A. Smith; B. Jones [Affiliation X]")
///     .into_iter()
///     .map(|c| c.full_name)
///     .collect();
/// assert_eq!(names, ["A. Smith", "B. Jones"]);
/// ```
#[must_use]
pub fn parse_contributors(creator: &str) -> Vec<Contributor> {
    if creator.trim().is_empty() {
        return vec![Contributor::new(DEFAULT_CONTRIBUTOR)];
    }

    creator
        .split(';')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .filter(|name| !NON_NAME_PREFIXES.iter().any(|p| name.starts_with(p)))
        .map(|name| match name.find('[') {
            Some(bracket) => name[..bracket].trim(),
            None => name,
        })
        .filter(|name| !name.is_empty())
        .map(Contributor::new)
        .collect()
}

/// Split a subject field into tags.
///
/// Tags are separated by `;` or `,`, except that a comma directly followed by
/// one whitespace character and `&` joins its neighbours ("A, & B"). Each
/// tag is trimmed; empty tags between adjacent separators are kept.
///
/// # Examples
/// ```
/// use scitech_harvester::normalizer::parse_tags;
///
/// assert_eq!(
///     parse_tags("Physics, & Chemistry; Nuclear"),
///     ["Physics, & Chemistry", "Nuclear"]
/// );
/// ```
#[must_use]
pub fn parse_tags(subject: &str) -> Vec<String> {
    let mut tags = Vec::new();
    let mut start = 0;

    for (i, c) in subject.char_indices() {
        let split = match c {
            ';' => true,
            ',' => !joins_conjunction(&subject[i + 1..]),
            _ => false,
        };
        if split {
            tags.push(&subject[start..i]);
            start = i + 1;
        }
    }
    tags.push(&subject[start..]);

    tags.into_iter()
        .map(|tag| tag.trim().to_string())
        .collect()
}

/// Whether the text after a comma reads "<whitespace>&".
fn joins_conjunction(rest: &str) -> bool {
    let mut chars = rest.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(space), Some('&')) if space.is_whitespace()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names(contributors: &[Contributor]) -> Vec<&str> {
        contributors.iter().map(|c| c.full_name.as_str()).collect()
    }

    fn record(body: &str) -> RawDocument {
        let xml = format!(
            r#"<record xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcq="http://purl.org/dc/terms/"><dc:ostiId>1096372</dc:ostiId>{body}</record>"#
        );
        RawDocument::new(xml.into_bytes(), "1096372")
    }

    const REQUIRED: &str = "<dc:title>Neutron cross sections</dc:title>\
        <dc:creator>Doe, J.</dc:creator>\
        <dc:date>2013-10-01</dc:date>";

    #[test]
    fn test_parse_contributors_affiliation() {
        let contributors = parse_contributors("A. Smith; B. Jones [Affiliation X]");
        assert_eq!(names(&contributors), ["A. Smith", "B. Jones"]);
        assert!(contributors.iter().all(|c| c.email.is_empty()));
    }

    #[test]
    fn test_parse_contributors_drops_markers() {
        let contributors =
            parse_contributors("Smith, A.; et. al; / Lab staff; , Jr.;  ; Jones, B. [ORNL]");
        assert_eq!(names(&contributors), ["Smith, A.", "Jones, B."]);
    }

    #[test]
    fn test_parse_contributors_annotation_only() {
        let contributors = parse_contributors("[National Lab]; Lee, C.");
        assert_eq!(names(&contributors), ["Lee, C."]);
    }

    #[test]
    fn test_parse_contributors_empty_defaults() {
        assert_eq!(names(&parse_contributors("")), ["DoE"]);
        assert_eq!(names(&parse_contributors("   ")), ["DoE"]);
    }

    #[test]
    fn test_parse_tags_conjunction() {
        assert_eq!(
            parse_tags("Physics, & Chemistry; Nuclear"),
            ["Physics, & Chemistry", "Nuclear"]
        );
    }

    #[test]
    fn test_parse_tags_commas_and_semicolons() {
        assert_eq!(
            parse_tags("fission; neutrons,reactors , fuel cycle"),
            ["fission", "neutrons", "reactors", "fuel cycle"]
        );
    }

    #[test]
    fn test_parse_tags_ampersand_without_space_splits() {
        assert_eq!(parse_tags("A,& B"), ["A", "& B"]);
        assert_eq!(parse_tags("A,  & B"), ["A", "& B"]);
    }

    #[test]
    fn test_parse_tags_keeps_empty_tags() {
        assert_eq!(parse_tags("alpha;beta;"), ["alpha", "beta", ""]);
        assert_eq!(parse_tags("x, ;y"), ["x", "", "y"]);
    }

    #[test]
    fn test_normalize_minimal_record_fallbacks() {
        let doc = normalize(&record(REQUIRED), "2025-01-02T00:00:00Z").unwrap();

        assert_eq!(doc.title, "Neutron cross sections");
        assert_eq!(names(&doc.contributors), ["Doe, J."]);
        assert_eq!(doc.date_created, "2013-10-01");
        assert_eq!(doc.description, "No description provided");
        assert!(doc.tags.is_empty());
        assert_eq!(doc.id.service_id, "1096372");
        assert_eq!(doc.id.doi, "Not provided");
        assert_eq!(doc.id.url, "Not provided");
        assert_eq!(doc.source, "SciTech");
        assert_eq!(doc.timestamp, "2025-01-02T00:00:00Z");
        assert!(doc.meta.is_empty());

        for key in ["article_type", "research_org", "language"] {
            assert_eq!(doc.property(key).and_then(PropertyValue::as_text), Some("Not provided"));
        }
        let Some(PropertyValue::Map(info)) = doc.property("identifier_info") else {
            panic!("identifier_info should be a map");
        };
        assert_eq!(info.len(), 5);
        assert!(info.values().all(|v| v == "Not provided"));
    }

    #[test]
    fn test_normalize_empty_creator_defaults() {
        let body = "<dc:title>T</dc:title><dc:creator></dc:creator><dc:date>2013</dc:date>";
        let doc = normalize(&record(body), "ts").unwrap();
        assert_eq!(names(&doc.contributors), ["DoE"]);
    }

    #[test]
    fn test_normalize_missing_creator_fails() {
        let body = "<dc:title>T</dc:title><dc:date>2013</dc:date>";
        let err = normalize(&record(body), "ts").unwrap_err();
        assert!(matches!(
            err,
            HarvesterError::MissingField { ref doc_id, ref field } if doc_id == "1096372" && field == "creator"
        ));
    }

    #[test]
    fn test_normalize_missing_title_fails() {
        let body = "<dc:creator>A</dc:creator><dc:date>2013</dc:date>";
        let err = normalize(&record(body), "ts").unwrap_err();
        assert!(matches!(err, HarvesterError::MissingField { ref field, .. } if field == "title"));
    }

    #[test]
    fn test_normalize_missing_date_fails() {
        let body = "<dc:title>T</dc:title><dc:creator>A</dc:creator><dc:date>  </dc:date>";
        let err = normalize(&record(body), "ts").unwrap_err();
        assert!(matches!(err, HarvesterError::MissingField { ref field, .. } if field == "date_created"));
    }

    #[test]
    fn test_normalize_record_with_doctype() {
        let xml = format!(
            r#"<!DOCTYPE record><record xmlns:dc="http://purl.org/dc/elements/1.1/"><dc:ostiId>1096372</dc:ostiId>{REQUIRED}</record>"#
        );
        let doc = normalize(&RawDocument::new(xml.into_bytes(), "1096372"), "ts").unwrap();
        assert_eq!(doc.title, "Neutron cross sections");
    }

    #[test]
    fn test_normalize_malformed_xml() {
        let raw = RawDocument::new(b"<record><unclosed></record>".to_vec(), "77");
        let err = normalize(&raw, "ts").unwrap_err();
        assert!(matches!(err, HarvesterError::RecordParse { ref doc_id, .. } if doc_id == "77"));
    }

    #[test]
    fn test_normalize_unqualified_elements_are_ignored() {
        let body = format!("{REQUIRED}<subject>not dublin core</subject>");
        let doc = normalize(&record(&body), "ts").unwrap();
        assert!(doc.tags.is_empty());
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let body = format!(
            "{REQUIRED}<dc:subject>b; a</dc:subject><dcq:identifierDOEcontract>AC05</dcq:identifierDOEcontract>"
        );
        let raw = record(&body);
        let first = serde_json::to_string(&normalize(&raw, "ts").unwrap()).unwrap();
        let second = serde_json::to_string(&normalize(&raw, "ts").unwrap()).unwrap();
        assert_eq!(first, second);
    }
}
