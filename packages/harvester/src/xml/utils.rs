//! XML utility functions for navigating and extracting data from DOM trees.

use roxmltree::{Document, Node, ParsingOptions};

/// Reserved prefix, bound implicitly and never redeclared.
const XML_NS_PREFIX: &str = "xml";

/// Parse an XML document, accepting a DOCTYPE declaration.
///
/// Entity declarations in the DTD are honoured; external subsets are never
/// fetched.
pub fn parse_document(xml: &str) -> Result<Document<'_>, roxmltree::Error> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    Document::parse_with_options(xml, options)
}

/// Get the tag name without namespace prefix.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use scitech_harvester::xml::get_tag_name;
///
/// let xml = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"/>"#;
/// let doc = Document::parse(xml).unwrap();
/// assert_eq!(get_tag_name(doc.root_element()), "RDF");
/// ```
pub fn get_tag_name<'a>(node: Node<'a, '_>) -> &'a str {
    node.tag_name().name()
}

/// Find the first child element with the given local name, in any namespace.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use scitech_harvester::xml::find_child;
///
/// let xml = r#"<root><records/><other/></root>"#;
/// let doc = Document::parse(xml).unwrap();
/// let root = doc.root_element();
///
/// assert!(find_child(root, "records").is_some());
/// assert!(find_child(root, "missing").is_none());
/// ```
pub fn find_child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|child| child.is_element() && get_tag_name(*child) == tag)
}

/// Find the first child element with the given namespace URI and local name.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use scitech_harvester::xml::find_ns_child;
///
/// let xml = r#"<record xmlns:dc="http://purl.org/dc/elements/1.1/">
///   <dc:title>Neutron yields</dc:title>
///   <title>unqualified</title>
/// </record>"#;
/// let doc = Document::parse(xml).unwrap();
/// let title = find_ns_child(doc.root_element(), "http://purl.org/dc/elements/1.1/", "title");
/// assert_eq!(title.and_then(|n| n.text()), Some("Neutron yields"));
/// ```
pub fn find_ns_child<'a, 'input>(
    node: Node<'a, 'input>,
    namespace: &str,
    local_name: &str,
) -> Option<Node<'a, 'input>> {
    node.children().find(|child| {
        child.is_element()
            && child.tag_name().namespace() == Some(namespace)
            && child.tag_name().name() == local_name
    })
}

/// Get the text content of a node, trimmed.
///
/// Returns an empty string for elements without text.
pub fn get_text(node: Node<'_, '_>) -> String {
    node.text()
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// Get the trimmed text of a namespaced child, or `None` when the child is
/// missing or its text is blank.
pub fn ns_text(node: Node<'_, '_>, namespace: &str, local_name: &str) -> Option<String> {
    find_ns_child(node, namespace, local_name)
        .map(get_text)
        .filter(|text| !text.is_empty())
}

/// Get all element children of a node.
///
/// Text nodes, comments and processing instructions are skipped.
pub fn element_children<'a, 'input>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|child| child.is_element())
}

/// Serialize an element as a standalone XML document.
///
/// The element's source text is copied verbatim; every namespace in scope on
/// the element that its own start tag does not declare is re-declared there,
/// so prefixes bound on an ancestor keep resolving once the element is cut
/// out of its envelope.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use scitech_harvester::xml::{find_child, standalone_xml};
///
/// let xml = r#"<root xmlns:dc="urn:dc"><record><dc:title>T</dc:title></record></root>"#;
/// let doc = Document::parse(xml).unwrap();
/// let record = find_child(doc.root_element(), "record").unwrap();
///
/// let standalone = standalone_xml(record);
/// assert_eq!(standalone, r#"<record xmlns:dc="urn:dc"><dc:title>T</dc:title></record>"#);
/// assert!(Document::parse(&standalone).is_ok());
/// ```
pub fn standalone_xml(node: Node<'_, '_>) -> String {
    let source = &node.document().input_text()[node.range()];

    // `source` starts with '<' followed by the qualified tag name.
    let name_end = source
        .char_indices()
        .skip(1)
        .find(|&(_, c)| c.is_whitespace() || c == '>' || c == '/')
        .map_or(source.len(), |(i, _)| i);
    let start_tag = source.find('>').map_or(source, |i| &source[..i]);

    let mut declarations = String::new();
    for namespace in node.namespaces() {
        let attribute = match namespace.name() {
            Some(XML_NS_PREFIX) => continue,
            Some(prefix) => format!("xmlns:{prefix}"),
            None => "xmlns".to_string(),
        };
        if declares(start_tag, &attribute) {
            continue;
        }
        declarations.push(' ');
        declarations.push_str(&attribute);
        declarations.push_str("=\"");
        declarations.push_str(&escape_attribute(namespace.uri()));
        declarations.push('"');
    }

    let mut standalone = String::with_capacity(source.len() + declarations.len());
    standalone.push_str(&source[..name_end]);
    standalone.push_str(&declarations);
    standalone.push_str(&source[name_end..]);
    standalone
}

/// Whether a start tag carries the given attribute name.
fn declares(start_tag: &str, attribute: &str) -> bool {
    start_tag.match_indices(attribute).any(|(i, _)| {
        let preceded_by_space = start_tag[..i]
            .chars()
            .next_back()
            .is_some_and(char::is_whitespace);
        let followed_by_eq = start_tag[i + attribute.len()..]
            .trim_start()
            .starts_with('=');
        preceded_by_space && followed_by_eq
    })
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use roxmltree::Document;

    const DC: &str = "http://purl.org/dc/elements/1.1/";
    const DCQ: &str = "http://purl.org/dc/terms/";

    #[test]
    fn test_get_tag_name() {
        let xml = r#"<root><child/></root>"#;
        let doc = Document::parse(xml).unwrap();
        assert_eq!(get_tag_name(doc.root_element()), "root");
    }

    #[test]
    fn test_get_tag_name_with_namespace() {
        let xml = r#"<ns:root xmlns:ns="http://example.com"><ns:child/></ns:root>"#;
        let doc = Document::parse(xml).unwrap();
        assert_eq!(get_tag_name(doc.root_element()), "root");
    }

    #[test]
    fn test_find_ns_child_distinguishes_vocabularies() {
        let xml = format!(
            r#"<record xmlns:dc="{DC}" xmlns:dcq="{DCQ}">
                <dcq:identifier-purl>purl</dcq:identifier-purl>
                <dc:identifier>ident</dc:identifier>
            </record>"#
        );
        let doc = Document::parse(&xml).unwrap();
        let root = doc.root_element();

        assert!(find_ns_child(root, DC, "identifier-purl").is_none());
        assert_eq!(
            find_ns_child(root, DCQ, "identifier-purl").map(get_text),
            Some("purl".to_string())
        );
        assert_eq!(
            find_ns_child(root, DC, "identifier").map(get_text),
            Some("ident".to_string())
        );
    }

    #[test]
    fn test_get_text() {
        let xml = r#"<root>  trimmed text  </root>"#;
        let doc = Document::parse(xml).unwrap();
        assert_eq!(get_text(doc.root_element()), "trimmed text");
    }

    #[test]
    fn test_ns_text_blank_is_none() {
        let xml = format!(r#"<record xmlns:dc="{DC}"><dc:type>   </dc:type><dc:format/></record>"#);
        let doc = Document::parse(&xml).unwrap();
        let root = doc.root_element();

        assert_eq!(ns_text(root, DC, "type"), None);
        assert_eq!(ns_text(root, DC, "format"), None);
        assert_eq!(ns_text(root, DC, "language"), None);
    }

    #[test]
    fn test_element_children() {
        let xml = r#"<root>text<child1/>more<!-- note --><child2/></root>"#;
        let doc = Document::parse(xml).unwrap();
        let root = doc.root_element();

        let children: Vec<_> = element_children(root).collect();
        assert_eq!(children.len(), 2);
    }

    #[test]
    fn test_standalone_xml_redeclares_ancestor_namespaces() {
        let xml = format!(
            r#"<rdf:RDF xmlns:rdf="urn:rdf" xmlns:dc="{DC}" xmlns:dcq="{DCQ}"><records morepages="false"><record rownumber="1"><dc:title>T</dc:title><dcq:publisherCountry>US</dcq:publisherCountry></record></records></rdf:RDF>"#
        );
        let doc = Document::parse(&xml).unwrap();
        let records = find_child(doc.root_element(), "records").unwrap();
        let record = element_children(records).next().unwrap();

        let standalone = standalone_xml(record);
        assert!(standalone.starts_with("<record xmlns:"));
        assert!(standalone.ends_with(r#"rownumber="1"><dc:title>T</dc:title><dcq:publisherCountry>US</dcq:publisherCountry></record>"#));

        let reparsed = Document::parse(&standalone).unwrap();
        let root = reparsed.root_element();
        assert_eq!(ns_text(root, DC, "title"), Some("T".to_string()));
        assert_eq!(ns_text(root, DCQ, "publisherCountry"), Some("US".to_string()));
    }

    #[test]
    fn test_standalone_xml_keeps_own_declarations() {
        let xml = format!(
            r#"<root xmlns:dc="{DC}"><record xmlns:dc="{DC}"><dc:title>T</dc:title></record></root>"#
        );
        let doc = Document::parse(&xml).unwrap();
        let record = find_child(doc.root_element(), "record").unwrap();

        let standalone = standalone_xml(record);
        assert_eq!(standalone.matches("xmlns:dc=").count(), 1);
        assert!(Document::parse(&standalone).is_ok());
    }

    #[test]
    fn test_standalone_xml_self_closing() {
        let xml = format!(r#"<root xmlns:dc="{DC}"><dc:record/></root>"#);
        let doc = Document::parse(&xml).unwrap();
        let record = element_children(doc.root_element()).next().unwrap();

        let standalone = standalone_xml(record);
        assert_eq!(standalone, format!(r#"<dc:record xmlns:dc="{DC}"/>"#));
    }

    #[test]
    fn test_declares() {
        assert!(declares(r#"<record xmlns:dc="urn:dc""#, "xmlns:dc"));
        assert!(declares(r#"<record xmlns = "urn:x""#, "xmlns"));
        assert!(!declares(r#"<record xmlns:dc="urn:dc""#, "xmlns"));
        assert!(!declares(r#"<record dc="xmlns:dc""#, "xmlns:dc"));
    }
}
