//! Service capability lookup from a UPnP device description.
//!
//! This is not a general description parser: it answers one question, "where
//! is the control URL of service X on this device?", with zero or one answer.
//! When a device lists the same service type more than once, the first entry
//! in document order wins.

use std::time::Duration;

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use reqwest::{Client, Url};
use thiserror::Error;

use super::services::UpnpService;
use super::utils::decode_text;

/// Errors that can occur while resolving a service control URL.
#[derive(Debug, Error)]
pub enum DescriptionError {
    /// The device location is not a valid absolute URL.
    #[error("invalid device location '{location}': {reason}")]
    InvalidLocation { location: String, reason: String },

    /// Fetching the device description failed.
    #[error("failed to fetch device description: {0}")]
    Http(#[from] reqwest::Error),

    /// The device answered the description request with an error status.
    #[error("device description request returned HTTP {0}")]
    HttpStatus(u16),

    /// The device does not expose the requested service.
    #[error("device at {location} does not expose the {service} service")]
    ServiceNotFound {
        location: String,
        service: &'static str,
    },
}

/// Convenient Result alias for description lookups.
pub type DescriptionResult<T> = Result<T, DescriptionError>;

/// Returns the service type without its trailing `:<version>`.
fn unversioned(service_type: &str) -> &str {
    match service_type.rsplit_once(':') {
        Some((head, version)) if version.chars().all(|c| c.is_ascii_digit()) => head,
        _ => service_type,
    }
}

/// Finds the control URL of `service` in a device description document.
///
/// Any version of the service type matches (UPnP service versions are
/// backward compatible). Relative control URLs are resolved against
/// `URLBase` when present, otherwise against `location`.
///
/// Returns `None` if the device does not list the service or the document
/// cannot be read.
pub fn find_service_control_url(
    description: &str,
    location: &Url,
    service: UpnpService,
) -> Option<Url> {
    let wanted = unversioned(service.urn());
    let mut reader = Reader::from_str(description);

    let mut url_base: Option<String> = None;
    let mut in_service = false;
    let mut service_type: Option<String> = None;
    let mut control_url: Option<String> = None;
    let mut found: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"service" => {
                    in_service = true;
                    service_type = None;
                    control_url = None;
                }
                b"URLBase" => {
                    url_base = reader
                        .read_text(e.name())
                        .ok()
                        .map(|t| decode_text(&t).trim().to_string());
                }
                b"serviceType" if in_service => {
                    service_type = reader
                        .read_text(e.name())
                        .ok()
                        .map(|t| decode_text(&t).trim().to_string());
                }
                b"controlURL" if in_service => {
                    control_url = reader
                        .read_text(e.name())
                        .ok()
                        .map(|t| decode_text(&t).trim().to_string());
                }
                _ => {}
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"service" => {
                in_service = false;
                let matches = service_type
                    .as_deref()
                    .is_some_and(|t| unversioned(t) == wanted);
                if matches && found.is_none() {
                    found = control_url.take().filter(|u| !u.is_empty());
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                log::warn!("[Description] XML parse error: {}", e);
                break;
            }
            _ => {}
        }
    }

    let control = found?;
    let base = url_base
        .as_deref()
        .and_then(|b| Url::parse(b).ok())
        .unwrap_or_else(|| location.clone());
    base.join(&control).ok()
}

/// Fetches the device description at `location` and resolves the control URL
/// of `service`.
///
/// # Errors
/// Fails if the location is invalid, the description cannot be fetched, or
/// the device does not expose the service.
pub async fn fetch_service_control_url(
    client: &Client,
    location: &str,
    service: UpnpService,
    timeout: Duration,
) -> DescriptionResult<Url> {
    let url = Url::parse(location).map_err(|e| DescriptionError::InvalidLocation {
        location: location.to_string(),
        reason: e.to_string(),
    })?;

    log::debug!("[Description] Fetching {} for {}", url, service.name());

    let res = client.get(url.clone()).timeout(timeout).send().await?;
    let status = res.status();
    if !status.is_success() {
        return Err(DescriptionError::HttpStatus(status.as_u16()));
    }
    let body = res.text().await?;

    find_service_control_url(&body, &url, service).ok_or_else(|| {
        DescriptionError::ServiceNotFound {
            location: location.to_string(),
            service: service.name(),
        }
    })
}
