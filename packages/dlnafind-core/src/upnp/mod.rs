//! UPnP/DLNA protocol layer.
//!
//! # Module Structure
//!
//! - `services` - Service and device type definitions (URNs, SOAP actions)
//! - `traits` - Trait abstractions for discovery and transport control
//! - `discovery` - SSDP discovery over `rupnp`
//! - `description` - Control URL lookup from a device description
//! - `soap` - Low-level SOAP protocol implementation
//! - `content_directory` - ContentDirectory `Search`
//! - `didl` - DIDL-Lite metadata parsing
//! - `transport` - AVTransport commands
//! - `utils` - Shared XML helpers

pub mod content_directory;
pub mod description;
pub mod didl;
pub mod discovery;
pub mod services;
pub mod soap;
pub mod traits;
pub mod transport;
pub(crate) mod utils;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use content_directory::{SearchClient, SearchRequest, SearchResponse};
pub use didl::{parse_didl, DidlDocument, Item, Resource};
pub use discovery::SsdpDiscovery;
pub use services::{DeviceKind, UpnpService};
pub use traits::{DiscoveredDevice, Discovery, TransportConnector, TransportControl};
pub use transport::{AvTransportClient, AvTransportConnector};
