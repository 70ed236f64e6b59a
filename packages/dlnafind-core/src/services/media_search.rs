//! Search across every discovered media server.
//!
//! Each server goes through description lookup, `Search` and DIDL-Lite
//! parsing. Servers are queried concurrently up to a configured limit and
//! their results are gathered in discovery order, so output does not depend
//! on which server answers first.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use reqwest::Client;
use thiserror::Error;

use crate::config::Config;
use crate::error::ErrorCode;
use crate::upnp::description::{fetch_service_control_url, DescriptionError};
use crate::upnp::didl::{parse_didl, DidlDocument, DidlError, Item};
use crate::upnp::soap::SoapError;
use crate::upnp::{DeviceKind, DiscoveredDevice, SearchClient, SearchRequest, SearchResponse};

// ─────────────────────────────────────────────────────────────────────────────
// Criteria
// ─────────────────────────────────────────────────────────────────────────────

/// Media type filter for searches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MediaType {
    Video,
    Audio,
    Image,
    #[default]
    Any,
}

impl MediaType {
    /// UPnP class the search is restricted to.
    pub fn upnp_class(&self) -> &'static str {
        match self {
            Self::Video => "object.item.videoItem",
            Self::Audio => "object.item.audioItem",
            Self::Image => "object.item.imageItem",
            Self::Any => "object.item",
        }
    }
}

impl FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "video" => Ok(Self::Video),
            "audio" => Ok(Self::Audio),
            "image" => Ok(Self::Image),
            "any" | "all" => Ok(Self::Any),
            other => Err(format!(
                "unknown media type '{other}' (expected video, audio, image or any)"
            )),
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Image => "image",
            Self::Any => "any",
        };
        f.write_str(name)
    }
}

/// Builds a title search restricted to `media_type`.
///
/// Backslashes and double quotes in `pattern` are escaped as the UPnP search
/// grammar requires inside quoted strings.
pub fn build_criteria(pattern: &str, media_type: MediaType) -> String {
    let mut escaped = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        if c == '\\' || c == '"' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    format!(
        r#"dc:title contains "{}" and upnp:class derivedfrom "{}""#,
        escaped,
        media_type.upnp_class()
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Report
// ─────────────────────────────────────────────────────────────────────────────

/// Why a single server dropped out of a search.
#[derive(Debug, Error)]
pub enum ServerSearchError {
    #[error(transparent)]
    Description(#[from] DescriptionError),

    #[error(transparent)]
    Soap(#[from] SoapError),

    #[error(transparent)]
    Didl(#[from] DidlError),
}

impl ErrorCode for ServerSearchError {
    fn code(&self) -> &'static str {
        match self {
            Self::Description(e) => e.code(),
            Self::Soap(e) => e.code(),
            Self::Didl(e) => e.code(),
        }
    }
}

/// An item together with the server it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub server: DiscoveredDevice,
    pub item: Item,
}

/// Counters a server reported alongside its results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSummary {
    pub server: DiscoveredDevice,
    pub number_returned: u32,
    pub total_matches: u32,
    pub update_id: u32,
}

#[derive(Debug)]
pub struct ServerFailure {
    pub server: DiscoveredDevice,
    pub error: ServerSearchError,
}

/// Aggregated result of a search across servers.
#[derive(Debug, Default)]
pub struct SearchReport {
    /// Hits in server discovery order, then document order.
    pub hits: Vec<SearchHit>,
    /// One entry per server that answered, in discovery order.
    pub summaries: Vec<ServerSummary>,
    pub failures: Vec<ServerFailure>,
}

impl SearchReport {
    /// Preferred-resource URIs of all hits; items without one are skipped.
    pub fn playable_uris(&self) -> Vec<String> {
        self.hits
            .iter()
            .filter_map(|hit| hit.item.playable_uri())
            .map(str::to_string)
            .collect()
    }

    /// Hits that came from `server`.
    pub fn hits_from<'a>(
        &'a self,
        server: &'a DiscoveredDevice,
    ) -> impl Iterator<Item = &'a SearchHit> {
        self.hits
            .iter()
            .filter(move |hit| hit.server.location == server.location)
    }

    fn push(&mut self, server: DiscoveredDevice, outcome: Result<ServerAnswer, ServerSearchError>) {
        match outcome {
            Ok(ServerAnswer { response, document }) => {
                self.summaries.push(ServerSummary {
                    server: server.clone(),
                    number_returned: response.number_returned,
                    total_matches: response.total_matches,
                    update_id: response.update_id,
                });
                self.hits
                    .extend(document.items.into_iter().map(|item| SearchHit {
                        server: server.clone(),
                        item,
                    }));
            }
            Err(error) => {
                log::warn!(
                    "[Search] {} ({}) failed [{}]: {}",
                    server.name,
                    server.location,
                    error.code(),
                    error
                );
                self.failures.push(ServerFailure { server, error });
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Fan-out
// ─────────────────────────────────────────────────────────────────────────────

struct ServerAnswer {
    response: SearchResponse,
    document: DidlDocument,
}

/// Runs ContentDirectory searches over a set of servers.
#[derive(Debug, Clone)]
pub struct MediaSearch {
    client: Client,
    timeout: Duration,
    max_concurrency: usize,
}

impl MediaSearch {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            timeout: config.search_timeout(),
            max_concurrency: config.max_concurrency.max(1),
        }
    }

    async fn search_server(
        &self,
        server: &DiscoveredDevice,
        request: &SearchRequest,
    ) -> Result<ServerAnswer, ServerSearchError> {
        let control_url = fetch_service_control_url(
            &self.client,
            &server.location,
            DeviceKind::MediaServer.required_service(),
            self.timeout,
        )
        .await?;

        let response = SearchClient::new(self.client.clone(), control_url.to_string(), self.timeout)
            .search(request)
            .await?;
        let document = parse_didl(&response.result)?;

        if document.len() != response.number_returned as usize {
            log::debug!(
                "[Search] {} reported {} result(s) but sent {}",
                server.name,
                response.number_returned,
                document.len()
            );
        }
        Ok(ServerAnswer { response, document })
    }

    /// Searches every server with `criteria`.
    ///
    /// A failing server is logged and recorded in the report; the others
    /// still run.
    pub async fn search_all(&self, servers: &[DiscoveredDevice], criteria: &str) -> SearchReport {
        let request = SearchRequest::new(criteria);
        let request = &request;

        log::info!(
            "[Search] Querying {} server(s), {} at a time: {}",
            servers.len(),
            self.max_concurrency,
            criteria
        );

        let outcomes: Vec<_> = stream::iter(servers.iter().cloned())
            .map(|server| async move {
                let outcome = self.search_server(&server, request).await;
                (server, outcome)
            })
            .buffered(self.max_concurrency)
            .collect()
            .await;

        let mut report = SearchReport::default();
        for (server, outcome) in outcomes {
            report.push(server, outcome);
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upnp::test_fixtures::{MEDIA_SERVER_DESCRIPTION, SEARCH_RESPONSE_TWO_ITEMS};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn criteria_per_media_type() {
        assert_eq!(
            build_criteria("starwars", MediaType::Video),
            r#"dc:title contains "starwars" and upnp:class derivedfrom "object.item.videoItem""#
        );
        assert_eq!(
            build_criteria("abba", MediaType::Audio),
            r#"dc:title contains "abba" and upnp:class derivedfrom "object.item.audioItem""#
        );
        assert!(build_criteria("x", MediaType::Image).ends_with(r#""object.item.imageItem""#));
        assert!(build_criteria("x", MediaType::Any).ends_with(r#"derivedfrom "object.item""#));
    }

    #[test]
    fn criteria_escapes_quotes_and_backslashes() {
        assert_eq!(
            build_criteria(r#"say "hi" \o/"#, MediaType::Any),
            r#"dc:title contains "say \"hi\" \\o/" and upnp:class derivedfrom "object.item""#
        );
    }

    #[test]
    fn media_type_parsing() {
        assert_eq!("Video".parse::<MediaType>().unwrap(), MediaType::Video);
        assert_eq!("any".parse::<MediaType>().unwrap(), MediaType::Any);
        assert!("movie".parse::<MediaType>().is_err());
    }

    async fn mount_media_server(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/rootDesc.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(MEDIA_SERVER_DESCRIPTION))
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path("/ctl/ContentDir"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SEARCH_RESPONSE_TWO_ITEMS))
            .mount(server)
            .await;
    }

    fn device(name: &str, server: &MockServer) -> DiscoveredDevice {
        DiscoveredDevice {
            name: name.to_string(),
            location: format!("{}/rootDesc.xml", server.uri()),
        }
    }

    #[tokio::test]
    async fn failing_server_does_not_stop_the_pass() {
        let good = MockServer::start().await;
        mount_media_server(&good).await;

        let broken = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&broken)
            .await;

        let second = MockServer::start().await;
        mount_media_server(&second).await;

        let servers = vec![
            device("NAS", &good),
            device("Broken", &broken),
            device("Laptop", &second),
        ];
        let search = MediaSearch::new(Client::new(), &Config::default());
        let report = search
            .search_all(&servers, &build_criteria("starwars", MediaType::Video))
            .await;

        assert_eq!(report.hits.len(), 4);
        assert_eq!(report.hits[0].server.name, "NAS");
        assert_eq!(report.hits[1].server.name, "NAS");
        assert_eq!(report.hits[2].server.name, "Laptop");
        assert_eq!(report.hits[0].item.title, "starwars episode 1");

        let answered: Vec<_> = report
            .summaries
            .iter()
            .map(|s| (s.server.name.as_str(), s.number_returned, s.total_matches, s.update_id))
            .collect();
        assert_eq!(answered, vec![("NAS", 2, 2, 17), ("Laptop", 2, 2, 17)]);
        assert_eq!(report.hits_from(&servers[2]).count(), 2);
        assert_eq!(report.hits_from(&servers[1]).count(), 0);

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].server.name, "Broken");
        assert_eq!(report.failures[0].error.code(), "http_error_status");
        assert!(matches!(
            report.failures[0].error,
            ServerSearchError::Description(DescriptionError::HttpStatus(500))
        ));

        // Item 2 has no resource on either server.
        assert_eq!(
            report.playable_uris(),
            vec![
                "http://192.168.1.10:8200/MediaItems/1.mp4".to_string(),
                "http://192.168.1.10:8200/MediaItems/1.mp4".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn no_servers_is_an_empty_report() {
        let search = MediaSearch::new(Client::new(), &Config::default());
        let report = search.search_all(&[], "*").await;
        assert!(report.hits.is_empty());
        assert!(report.summaries.is_empty());
        assert!(report.failures.is_empty());
    }
}
