//! Low-level SOAP protocol implementation for UPnP communication.
//!
//! This module handles the raw SOAP envelope building, HTTP transport,
//! and fault detection. For ContentDirectory searches see
//! `content_directory.rs`; for AVTransport commands see `transport.rs`.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use thiserror::Error;

use super::services::UpnpService;
use super::utils::{contains_element, escape_xml, extract_xml_text};
use crate::protocol_constants::{
    SOAP_CONTENT_TYPE, SOAP_ENCODING_STYLE, SOAP_ENVELOPE_NS, SOAP_TIMEOUT_SECS,
};

// ─────────────────────────────────────────────────────────────────────────────
// Error Types
// ─────────────────────────────────────────────────────────────────────────────

/// Contents of a SOAP `Fault` element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SoapFault {
    /// `faultstring` (usually "UPnPError").
    pub fault_string: String,
    /// Raw text content of the `detail` element.
    pub detail: String,
    /// `UPnPError/errorCode`, when the device supplied one.
    pub upnp_error_code: Option<u32>,
    /// `UPnPError/errorDescription`, when the device supplied one.
    pub upnp_error_description: Option<String>,
}

impl std::fmt::Display for SoapFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.fault_string)?;
        match (self.upnp_error_code, &self.upnp_error_description) {
            (Some(code), Some(desc)) => write!(f, " ({code}: {desc})"),
            (Some(code), None) => write!(f, " ({code})"),
            (None, Some(desc)) => write!(f, " ({desc})"),
            (None, None) if !self.detail.is_empty() => write!(f, " ({})", self.detail),
            (None, None) => Ok(()),
        }
    }
}

/// Errors that can occur during SOAP operations with UPnP devices.
#[derive(Debug, Error)]
pub enum SoapError {
    /// HTTP request to the device failed (connection refused, timeout, ...).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Device answered with a status other than 200.
    #[error("HTTP error {status} {reason}{}", fault_suffix(.fault))]
    HttpStatus {
        status: u16,
        reason: String,
        fault: Option<SoapFault>,
    },

    /// Device answered 200 but the body carried a SOAP fault.
    #[error("SOAP fault: {0}")]
    Fault(SoapFault),

    /// Failed to parse the SOAP response XML.
    #[error("Failed to parse SOAP response: {0}")]
    Parse(String),
}

fn fault_suffix(fault: &Option<SoapFault>) -> String {
    fault
        .as_ref()
        .map(|f| format!(" - SOAP fault: {f}"))
        .unwrap_or_default()
}

/// Convenient Result alias for SOAP operations.
pub type SoapResult<T> = Result<T, SoapError>;

impl SoapError {
    /// Returns the UPnP error code carried by a fault, if any.
    #[must_use]
    pub fn upnp_error_code(&self) -> Option<u32> {
        match self {
            SoapError::Fault(fault) => fault.upnp_error_code,
            SoapError::HttpStatus { fault, .. } => fault.as_ref().and_then(|f| f.upnp_error_code),
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Envelope
// ─────────────────────────────────────────────────────────────────────────────

/// Builds a SOAP 1.1 request envelope for `action` on `service`.
///
/// The envelope is a single line with no leading whitespace; some devices
/// reject XML with whitespace before the root element. Argument values are
/// escaped for element content, in the order given.
pub fn build_envelope(service: UpnpService, action: &str, args: &[(&str, &str)]) -> String {
    let mut body = format!(
        r#"<?xml version="1.0" encoding="utf-8"?><s:Envelope xmlns:s="{}" s:encodingStyle="{}"><s:Body><u:{} xmlns:u="{}">"#,
        SOAP_ENVELOPE_NS,
        SOAP_ENCODING_STYLE,
        action,
        service.urn()
    );

    for (k, v) in args {
        body.push_str(&format!("<{k}>{}</{k}>", escape_xml(v)));
    }

    body.push_str(&format!(r#"</u:{}></s:Body></s:Envelope>"#, action));
    body
}

/// Extracts the fault from a SOAP response body, if it contains one.
pub fn parse_fault(xml: &str) -> Option<SoapFault> {
    if !contains_element(xml, "Fault") {
        return None;
    }

    Some(SoapFault {
        fault_string: extract_xml_text(xml, "faultstring")
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| "Unknown SOAP fault".to_string()),
        detail: extract_xml_text(xml, "detail")
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
        upnp_error_code: extract_xml_text(xml, "errorCode").and_then(|s| s.trim().parse().ok()),
        upnp_error_description: extract_xml_text(xml, "errorDescription")
            .map(|s| s.trim().to_string()),
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// SOAP Request/Response
// ─────────────────────────────────────────────────────────────────────────────

/// Sends a SOAP request to a UPnP service control URL.
///
/// This is the core transport function for all SOAP operations. It builds
/// the envelope, sends the HTTP request and classifies the answer:
/// - status other than 200: [`SoapError::HttpStatus`] (with the fault, if any)
/// - 200 carrying a `Fault`: [`SoapError::Fault`]
/// - otherwise the response body
pub async fn send_soap_request(
    client: &Client,
    control_url: &str,
    service: UpnpService,
    action: &str,
    args: &[(&str, &str)],
    timeout: Duration,
) -> SoapResult<String> {
    let body = build_envelope(service, action, args);

    log::info!("[SOAP] {} -> {} (body: {} bytes)", action, control_url, body.len());
    log::debug!("[SOAP] Request body: {}", body);

    let start = std::time::Instant::now();
    let res = client
        .post(control_url)
        .header("Content-Type", SOAP_CONTENT_TYPE)
        .header("SOAPACTION", service.soap_action(action))
        .body(body)
        .timeout(timeout)
        .send()
        .await;

    log::info!(
        "[SOAP] {} completed in {:?}: {:?}",
        action,
        start.elapsed(),
        res.as_ref().map(|r| r.status())
    );

    let res = res?;
    let status = res.status();

    if status != StatusCode::OK {
        // The body only matters for the fault it may carry.
        let body = res.text().await.unwrap_or_default();
        return Err(SoapError::HttpStatus {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            fault: parse_fault(&body),
        });
    }

    let response_text = res.text().await?;

    if let Some(fault) = parse_fault(&response_text) {
        return Err(SoapError::Fault(fault));
    }

    Ok(response_text)
}

// ─────────────────────────────────────────────────────────────────────────────
// SOAP Request Builder
// ─────────────────────────────────────────────────────────────────────────────

/// Builder for constructing and sending SOAP requests.
///
/// # Example
/// ```ignore
/// let response = SoapRequestBuilder::new(&client, &control_url)
///     .service(UpnpService::AVTransport)
///     .action("Play")
///     .instance_id(0)
///     .arg("Speed", "1")
///     .send()
///     .await?;
/// ```
pub struct SoapRequestBuilder<'a> {
    client: &'a Client,
    control_url: &'a str,
    service: Option<UpnpService>,
    action: Option<&'a str>,
    args: Vec<(&'a str, String)>,
    timeout: Duration,
}

impl<'a> SoapRequestBuilder<'a> {
    #[must_use]
    pub fn new(client: &'a Client, control_url: &'a str) -> Self {
        Self {
            client,
            control_url,
            service: None,
            action: None,
            args: Vec::new(),
            timeout: Duration::from_secs(SOAP_TIMEOUT_SECS),
        }
    }

    #[must_use]
    pub fn service(mut self, service: UpnpService) -> Self {
        self.service = Some(service);
        self
    }

    #[must_use]
    pub fn action(mut self, action: &'a str) -> Self {
        self.action = Some(action);
        self
    }

    /// Adds an argument to the SOAP request.
    ///
    /// Arguments are included in the SOAP body in the order they are added.
    #[must_use]
    pub fn arg(mut self, key: &'a str, value: impl Into<String>) -> Self {
        self.args.push((key, value.into()));
        self
    }

    /// Adds the `InstanceID` argument used by every AVTransport action.
    #[must_use]
    pub fn instance_id(self, instance: u32) -> Self {
        self.arg("InstanceID", instance.to_string())
    }

    /// Overrides the per-request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sends the SOAP request and returns the response body.
    ///
    /// # Errors
    /// Returns `SoapError::Parse` if the service or action is not set, or
    /// the transport error if the request fails.
    pub async fn send(self) -> SoapResult<String> {
        let service = self
            .service
            .ok_or_else(|| SoapError::Parse("SoapRequestBuilder: service not set".into()))?;
        let action = self
            .action
            .ok_or_else(|| SoapError::Parse("SoapRequestBuilder: action not set".into()))?;

        let args: Vec<(&str, &str)> = self.args.iter().map(|(k, v)| (*k, v.as_str())).collect();

        send_soap_request(
            self.client,
            self.control_url,
            service,
            action,
            &args,
            self.timeout,
        )
        .await
    }

    /// Returns the request parts without sending (for testing).
    #[cfg(test)]
    pub fn into_parts(self) -> Option<(UpnpService, &'a str, Vec<(&'a str, String)>)> {
        let service = self.service?;
        let action = self.action?;
        Some((service, action, self.args))
    }
}
