//! ContentDirectory `Search` action.
//!
//! Builds the Search request, posts it through the SOAP transport and decodes
//! the four `SearchResponse` fields. The `Result` field is returned as the raw
//! DIDL-Lite string; see [`crate::upnp::didl`] for parsing it.

use std::time::Duration;

use reqwest::Client;

use super::services::UpnpService;
use super::soap::{SoapError, SoapRequestBuilder, SoapResult};
use super::utils::{contains_element, extract_xml_text};
use crate::protocol_constants::{FILTER_ALL, REQUEST_ALL, ROOT_CONTAINER_ID};

/// Arguments of a ContentDirectory `Search` call.
///
/// All fields are protocol strings passed through as-is; the search criteria
/// are caller-supplied and not validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub container_id: String,
    pub search_criteria: String,
    pub filter: String,
    pub starting_index: String,
    pub requested_count: String,
    pub sort_criteria: String,
}

impl SearchRequest {
    /// Searches the whole tree with `criteria`, returning every property of
    /// every match.
    pub fn new(criteria: impl Into<String>) -> Self {
        Self {
            container_id: ROOT_CONTAINER_ID.to_string(),
            search_criteria: criteria.into(),
            filter: FILTER_ALL.to_string(),
            starting_index: "0".to_string(),
            requested_count: REQUEST_ALL.to_string(),
            sort_criteria: String::new(),
        }
    }

    fn args(&self) -> [(&'static str, &str); 6] {
        [
            ("ContainerID", self.container_id.as_str()),
            ("SearchCriteria", self.search_criteria.as_str()),
            ("Filter", self.filter.as_str()),
            ("StartingIndex", self.starting_index.as_str()),
            ("RequestedCount", self.requested_count.as_str()),
            ("SortCriteria", self.sort_criteria.as_str()),
        ]
    }
}

/// Decoded `SearchResponse`.
///
/// `number_returned` is what the server claims; it is not guaranteed to match
/// the number of items in `result`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResponse {
    /// DIDL-Lite document, unescaped.
    pub result: String,
    pub number_returned: u32,
    pub total_matches: u32,
    pub update_id: u32,
}

fn parse_counter(xml: &str, name: &str) -> SoapResult<u32> {
    let raw = extract_xml_text(xml, name)
        .ok_or_else(|| SoapError::Parse(format!("missing {name} in SearchResponse")))?;
    raw.trim()
        .parse()
        .map_err(|_| SoapError::Parse(format!("{name} is not a number: '{}'", raw.trim())))
}

/// Decodes a successful Search response envelope.
///
/// # Errors
/// Returns [`SoapError::Parse`] if the body has no `SearchResponse` element
/// or a counter is missing or non-numeric.
pub fn parse_search_response(xml: &str) -> SoapResult<SearchResponse> {
    if !contains_element(xml, "SearchResponse") {
        return Err(SoapError::Parse("no SearchResponse element in body".into()));
    }

    Ok(SearchResponse {
        result: extract_xml_text(xml, "Result").unwrap_or_default(),
        number_returned: parse_counter(xml, "NumberReturned")?,
        total_matches: parse_counter(xml, "TotalMatches")?,
        update_id: parse_counter(xml, "UpdateID")?,
    })
}

/// Search client bound to one server's ContentDirectory control URL.
#[derive(Debug, Clone)]
pub struct SearchClient {
    client: Client,
    control_url: String,
    timeout: Duration,
}

impl SearchClient {
    pub fn new(client: Client, control_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            control_url: control_url.into(),
            timeout,
        }
    }

    /// Runs a `Search` and decodes the response.
    ///
    /// # Errors
    /// Transport failures, non-200 statuses and SOAP faults are returned as
    /// the corresponding [`SoapError`] variant.
    pub async fn search(&self, request: &SearchRequest) -> SoapResult<SearchResponse> {
        let mut builder = SoapRequestBuilder::new(&self.client, &self.control_url)
            .service(UpnpService::ContentDirectory)
            .action("Search")
            .timeout(self.timeout);
        for (key, value) in request.args() {
            builder = builder.arg(key, value);
        }

        let body = builder.send().await?;
        let response = parse_search_response(&body)?;

        log::info!(
            "[ContentDirectory] {} returned {} of {} matches",
            self.control_url,
            response.number_returned,
            response.total_matches
        );
        Ok(response)
    }
}
