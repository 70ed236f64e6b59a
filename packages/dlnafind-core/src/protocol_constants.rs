//! Fixed protocol constants that should NOT be changed.
//!
//! These values are defined by external specifications (UPnP, SOAP, DIDL-Lite)
//! and changing them would break interoperability with real DLNA devices.

// ─────────────────────────────────────────────────────────────────────────────
// SOAP
// ─────────────────────────────────────────────────────────────────────────────

/// SOAP 1.1 envelope namespace.
pub const SOAP_ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// SOAP 1.1 encoding style declared on every request envelope.
pub const SOAP_ENCODING_STYLE: &str = "http://schemas.xmlsoap.org/soap/encoding/";

/// Content-Type header value for SOAP requests.
pub const SOAP_CONTENT_TYPE: &str = "text/xml; charset=\"utf-8\"";

// ─────────────────────────────────────────────────────────────────────────────
// UPnP Device Types
// ─────────────────────────────────────────────────────────────────────────────

/// Device type advertised by DLNA media servers.
pub const MEDIA_SERVER_URN: &str = "urn:schemas-upnp-org:device:MediaServer:1";

/// Device type advertised by DLNA media renderers.
pub const MEDIA_RENDERER_URN: &str = "urn:schemas-upnp-org:device:MediaRenderer:1";

// ─────────────────────────────────────────────────────────────────────────────
// AVTransport
// ─────────────────────────────────────────────────────────────────────────────

/// AVTransport instance used for every transport call.
pub const DEFAULT_INSTANCE_ID: u32 = 0;

/// Normal playback speed for the Play action.
pub const NORMAL_PLAY_SPEED: &str = "1";

// ─────────────────────────────────────────────────────────────────────────────
// ContentDirectory Search
// ─────────────────────────────────────────────────────────────────────────────

/// Root container, searched recursively by most servers.
pub const ROOT_CONTAINER_ID: &str = "*";

/// Filter requesting every metadata property.
pub const FILTER_ALL: &str = "*";

/// RequestedCount value meaning "return all matches".
pub const REQUEST_ALL: &str = "0";

// ─────────────────────────────────────────────────────────────────────────────
// Timeouts
// ─────────────────────────────────────────────────────────────────────────────

/// Default timeout for SOAP HTTP requests (seconds).
///
/// 10 seconds is reasonable for LAN operations.
pub const SOAP_TIMEOUT_SECS: u64 = 10;

/// Default SSDP search window (seconds).
pub const DISCOVERY_TIMEOUT_SECS: u64 = 3;

/// Default number of servers searched concurrently.
pub const DEFAULT_SEARCH_CONCURRENCY: usize = 4;
