//! UPnP service and device type definitions.
//!
//! Single source of truth for the service URNs used by SOAP commands and the
//! device types used by discovery.


use crate::protocol_constants::{MEDIA_RENDERER_URN, MEDIA_SERVER_URN};

/// UPnP services this control point talks to.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum UpnpService {
    /// Searchable media catalog exposed by media servers.
    ContentDirectory,
    /// Audio/Video transport control (play, pause, stop, queue).
    AVTransport,
}

impl UpnpService {
    /// Returns the UPnP service URN for SOAP requests.
    #[must_use]
    pub fn urn(&self) -> &'static str {
        match self {
            Self::ContentDirectory => "urn:schemas-upnp-org:service:ContentDirectory:1",
            Self::AVTransport => "urn:schemas-upnp-org:service:AVTransport:1",
        }
    }

    /// Returns the value of the `SOAPACTION` header for `action`.
    ///
    /// The header value is quoted, as required by SOAP 1.1.
    #[must_use]
    pub fn soap_action(&self, action: &str) -> String {
        format!("\"{}#{}\"", self.urn(), action)
    }

    /// Returns a human-readable name for this service.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::ContentDirectory => "ContentDirectory",
            Self::AVTransport => "AVTransport",
        }
    }
}

/// UPnP device types searched during discovery.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum DeviceKind {
    MediaServer,
    MediaRenderer,
}

impl DeviceKind {
    /// Returns the device type URN used as SSDP search target.
    #[must_use]
    pub fn urn(&self) -> &'static str {
        match self {
            Self::MediaServer => MEDIA_SERVER_URN,
            Self::MediaRenderer => MEDIA_RENDERER_URN,
        }
    }

    /// Returns the service a device of this kind must expose to be usable.
    #[must_use]
    pub fn required_service(&self) -> UpnpService {
        match self {
            Self::MediaServer => UpnpService::ContentDirectory,
            Self::MediaRenderer => UpnpService::AVTransport,
        }
    }
}

impl std::fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MediaServer => write!(f, "media server"),
            Self::MediaRenderer => write!(f, "media renderer"),
        }
    }
}
