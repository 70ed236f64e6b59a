//! DIDL-Lite metadata parsing.
//!
//! A ContentDirectory Search returns its matches as a DIDL-Lite document
//! embedded in the SOAP `Result` field. This module turns that document into
//! typed [`Item`]s with their [`Resource`]s, preserving document order.
//!
//! Elements are matched by local name, so servers using other namespace
//! prefixes (or none) parse the same way. `<container>` entries are skipped.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use thiserror::Error;

use super::utils::{decode_text, get_xml_attr};

/// Errors that can occur while parsing a DIDL-Lite document.
#[derive(Debug, Error)]
pub enum DidlError {
    /// The document is not well-formed XML.
    #[error("malformed DIDL-Lite document: {0}")]
    Malformed(String),

    /// The document parsed but has no `DIDL-Lite` root element.
    #[error("document has no DIDL-Lite root element")]
    MissingRoot,
}

/// Convenient Result alias for DIDL-Lite parsing.
pub type DidlResult<T> = Result<T, DidlError>;

/// A parsed DIDL-Lite document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DidlDocument {
    pub items: Vec<Item>,
}

/// A media item (`<item>` element).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Item {
    pub id: String,
    pub parent_id: String,
    pub restricted: bool,
    pub title: String,
    pub creator: String,
    /// UPnP class, e.g. `object.item.videoItem`.
    pub class: String,
    pub date: String,
    pub resources: Vec<Resource>,
}

/// A playable representation of an item (`<res>` element).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resource {
    pub resolution: Option<String>,
    pub size_bytes: Option<u64>,
    pub protocol_info: String,
    pub duration: Option<String>,
    pub bitrate: Option<String>,
    pub sample_frequency: Option<u64>,
    pub channel_count: Option<u64>,
    pub uri: String,
}

impl Item {
    fn from_element(e: &BytesStart) -> Self {
        Self {
            id: get_xml_attr(e, b"id").unwrap_or_default(),
            parent_id: get_xml_attr(e, b"parentID").unwrap_or_default(),
            restricted: get_xml_attr(e, b"restricted")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            ..Default::default()
        }
    }

    /// Returns the resource used for playback: the first one listed.
    ///
    /// Servers list the original file first; later entries are usually
    /// transcoded or thumbnail variants.
    #[must_use]
    pub fn preferred_resource(&self) -> Option<&Resource> {
        self.resources.first()
    }

    /// Returns the URI of the preferred resource, if the item has one.
    #[must_use]
    pub fn playable_uri(&self) -> Option<&str> {
        self.preferred_resource()
            .map(|r| r.uri.as_str())
            .filter(|uri| !uri.is_empty())
    }

    fn set_text_field(&mut self, local_name: &[u8], text: String) {
        let field = match local_name {
            b"title" => &mut self.title,
            b"creator" => &mut self.creator,
            b"class" => &mut self.class,
            b"date" => &mut self.date,
            _ => return,
        };
        // DIDL-Lite allows repeated properties; the first one wins.
        if field.is_empty() {
            *field = text;
        }
    }
}

impl Resource {
    fn from_element(e: &BytesStart) -> Self {
        Self {
            resolution: get_xml_attr(e, b"resolution"),
            size_bytes: get_xml_attr(e, b"size").and_then(|v| v.trim().parse().ok()),
            protocol_info: get_xml_attr(e, b"protocolInfo").unwrap_or_default(),
            duration: get_xml_attr(e, b"duration"),
            bitrate: get_xml_attr(e, b"bitrate"),
            sample_frequency: get_xml_attr(e, b"sampleFrequency")
                .and_then(|v| v.trim().parse().ok()),
            channel_count: get_xml_attr(e, b"nrAudioChannels").and_then(|v| v.trim().parse().ok()),
            uri: String::new(),
        }
    }
}

impl DidlDocument {
    /// Returns the preferred-resource URIs of all items, in document order.
    ///
    /// Items without resources contribute nothing.
    #[must_use]
    pub fn playable_uris(&self) -> Vec<&str> {
        self.items.iter().filter_map(Item::playable_uri).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

const ITEM_TEXT_FIELDS: [&[u8]; 4] = [b"title", b"creator", b"class", b"date"];

/// Parses a DIDL-Lite fragment into a [`DidlDocument`].
///
/// An empty (or whitespace-only) fragment is an empty document; some servers
/// send that instead of an empty `DIDL-Lite` element when nothing matched.
///
/// # Errors
/// Returns [`DidlError::Malformed`] for XML that is not well-formed and
/// [`DidlError::MissingRoot`] when no `DIDL-Lite` element is present.
pub fn parse_didl(fragment: &str) -> DidlResult<DidlDocument> {
    let fragment = fragment.trim();
    if fragment.is_empty() {
        return Ok(DidlDocument::default());
    }

    let mut reader = Reader::from_str(fragment);
    let mut items = Vec::new();
    let mut current: Option<Item> = None;
    let mut depth = 0usize;
    let mut saw_root = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let local = e.local_name();
                let local = local.as_ref();
                match (local, current.as_mut()) {
                    (b"DIDL-Lite", _) => {
                        saw_root = true;
                        depth += 1;
                    }
                    (b"item", None) => {
                        current = Some(Item::from_element(&e));
                        depth += 1;
                    }
                    (b"res", Some(item)) => {
                        let mut res = Resource::from_element(&e);
                        let raw = reader
                            .read_text(e.name())
                            .map_err(|err| DidlError::Malformed(err.to_string()))?;
                        res.uri = decode_text(&raw).trim().to_string();
                        item.resources.push(res);
                    }
                    (name, Some(item)) if ITEM_TEXT_FIELDS.contains(&name) => {
                        let raw = reader
                            .read_text(e.name())
                            .map_err(|err| DidlError::Malformed(err.to_string()))?;
                        item.set_text_field(name, decode_text(&raw).trim().to_string());
                    }
                    _ => depth += 1,
                }
            }
            Ok(Event::Empty(e)) => match (e.local_name().as_ref(), current.as_mut()) {
                (b"DIDL-Lite", _) => saw_root = true,
                (b"item", None) => items.push(Item::from_element(&e)),
                (b"res", Some(item)) => item.resources.push(Resource::from_element(&e)),
                _ => {}
            },
            Ok(Event::End(e)) => {
                depth = depth.saturating_sub(1);
                if e.local_name().as_ref() == b"item" {
                    if let Some(item) = current.take() {
                        items.push(item);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(DidlError::Malformed(format!(
                    "{} at byte {}",
                    e,
                    reader.buffer_position()
                )));
            }
            _ => {}
        }
    }

    if depth != 0 || current.is_some() {
        return Err(DidlError::Malformed(
            "unexpected end of document".to_string(),
        ));
    }
    if !saw_root {
        return Err(DidlError::MissingRoot);
    }

    log::debug!("[DIDL] Parsed {} items", items.len());
    Ok(DidlDocument { items })
}
