//! XML helpers shared by the SOAP, description and DIDL-Lite code.

use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

// ─────────────────────────────────────────────────────────────────────────────
// XML Parsing Utilities
// ─────────────────────────────────────────────────────────────────────────────

/// Extracts text content from the first occurrence of an XML element.
///
/// Searches for an element by its local name (ignoring namespace prefixes)
/// and returns its decoded text content. An empty element (`<Result/>`)
/// yields an empty string.
///
/// # Example
/// ```ignore
/// let xml = r#"<u:TotalMatches>42</u:TotalMatches>"#;
/// assert_eq!(extract_xml_text(xml, "TotalMatches"), Some("42".to_string()));
/// ```
pub fn extract_xml_text(xml: &str, element_name: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    let target_bytes = element_name.as_bytes();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == target_bytes => {
                return reader
                    .read_text(e.name())
                    .ok()
                    .map(|raw| decode_text(&raw).into_owned());
            }
            Ok(Event::Empty(e)) if e.local_name().as_ref() == target_bytes => {
                return Some(String::new());
            }
            Ok(Event::Eof) | Err(_) => return None,
            _ => {}
        }
    }
}

/// Returns true if an element with the given local name occurs in `xml`.
pub fn contains_element(xml: &str, element_name: &str) -> bool {
    let mut reader = Reader::from_str(xml);
    let target_bytes = element_name.as_bytes();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e))
                if e.local_name().as_ref() == target_bytes =>
            {
                return true;
            }
            Ok(Event::Eof) | Err(_) => return false,
            _ => {}
        }
    }
}

/// Gets an attribute value from an XML element by local name.
///
/// Entity references in the value (`&amp;` in URLs) are decoded.
pub fn get_xml_attr(elem: &BytesStart, attr_name: &[u8]) -> Option<String> {
    elem.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == attr_name)
        .map(|a| {
            let raw = String::from_utf8_lossy(&a.value);
            html_escape::decode_html_entities(&raw).into_owned()
        })
}

/// Decodes raw element content returned by `Reader::read_text`.
///
/// CDATA sections are returned verbatim; everything else has its entity
/// references decoded.
pub fn decode_text(raw: &str) -> Cow<'_, str> {
    let trimmed = raw.trim();
    if let Some(inner) = trimmed
        .strip_prefix("<![CDATA[")
        .and_then(|rest| rest.strip_suffix("]]>"))
    {
        return Cow::Borrowed(inner);
    }
    html_escape::decode_html_entities(raw)
}

// ─────────────────────────────────────────────────────────────────────────────
// XML Encoding
// ─────────────────────────────────────────────────────────────────────────────

/// Escapes text for embedding as XML element content.
///
/// Only `&`, `<` and `>` are replaced. Quotes stay verbatim: they are legal in
/// element text and UPnP search criteria (`dc:title contains "x"`) must reach
/// the server unchanged.
///
/// # Example
/// ```ignore
/// assert_eq!(escape_xml("Tom & Jerry"), "Tom &amp; Jerry");
/// assert_eq!(escape_xml("<title>"), "&lt;title&gt;");
/// ```
pub fn escape_xml(s: &str) -> Cow<'_, str> {
    html_escape::encode_text(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_xml_text_ignores_namespace_prefix() {
        let xml = r#"<s:Body><u:TotalMatches>42</u:TotalMatches></s:Body>"#;
        assert_eq!(extract_xml_text(xml, "TotalMatches"), Some("42".to_string()));
    }

    #[test]
    fn extract_xml_text_decodes_entities() {
        let xml = "<Result>&lt;DIDL-Lite&gt;&amp;&lt;/DIDL-Lite&gt;</Result>";
        assert_eq!(
            extract_xml_text(xml, "Result"),
            Some("<DIDL-Lite>&</DIDL-Lite>".to_string())
        );
    }

    #[test]
    fn extract_xml_text_returns_cdata_verbatim() {
        let xml = "<Result><![CDATA[<DIDL-Lite>a &amp; b</DIDL-Lite>]]></Result>";
        assert_eq!(
            extract_xml_text(xml, "Result"),
            Some("<DIDL-Lite>a &amp; b</DIDL-Lite>".to_string())
        );
    }

    #[test]
    fn extract_xml_text_handles_empty_element() {
        assert_eq!(extract_xml_text("<a><Result/></a>", "Result"), Some(String::new()));
        assert_eq!(extract_xml_text("<a></a>", "Result"), None);
    }

    #[test]
    fn contains_element_matches_local_name() {
        assert!(contains_element("<s:Body><s:Fault/></s:Body>", "Fault"));
        assert!(!contains_element("<s:Body></s:Body>", "Fault"));
    }

    #[test]
    fn escape_xml_keeps_quotes() {
        assert_eq!(
            escape_xml(r#"dc:title contains "a&b""#),
            r#"dc:title contains "a&amp;b""#
        );
        assert_eq!(escape_xml("<x>"), "&lt;x&gt;");
    }
}
