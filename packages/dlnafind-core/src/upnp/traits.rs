//! Trait abstractions for the UPnP collaborators.
//!
//! Services depend on these traits rather than on the concrete network
//! implementations, so the dispatcher and search fan-out can be tested
//! against in-memory doubles.

use async_trait::async_trait;

use crate::upnp::description::DescriptionResult;
use crate::upnp::discovery::DiscoveryResult;
use crate::upnp::services::DeviceKind;
use crate::upnp::soap::SoapResult;

/// A device found on the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredDevice {
    /// Friendly name from the device description.
    pub name: String,
    /// URL of the device description document.
    pub location: String,
}

/// Trait for UPnP device discovery.
#[async_trait]
pub trait Discovery: Send + Sync {
    /// Finds devices of the given kind.
    ///
    /// Devices are returned in arrival order, without duplicate locations.
    async fn discover(&self, kind: DeviceKind) -> DiscoveryResult<Vec<DiscoveredDevice>>;
}

/// Transport-control session with one renderer (AVTransport service).
#[async_trait]
pub trait TransportControl: Send + Sync {
    async fn play(&self, instance: u32, speed: &str) -> SoapResult<()>;

    async fn pause(&self, instance: u32) -> SoapResult<()>;

    async fn stop(&self, instance: u32) -> SoapResult<()>;

    async fn next(&self, instance: u32) -> SoapResult<()>;

    async fn previous(&self, instance: u32) -> SoapResult<()>;

    /// Replaces the current media with `uri`.
    async fn set_av_transport_uri(&self, instance: u32, uri: &str, metadata: &str)
        -> SoapResult<()>;

    /// Queues `uri` to play after the current media.
    async fn set_next_av_transport_uri(
        &self,
        instance: u32,
        uri: &str,
        metadata: &str,
    ) -> SoapResult<()>;
}

/// Opens transport-control sessions from a device location.
#[async_trait]
pub trait TransportConnector: Send + Sync {
    /// Resolves the renderer's AVTransport service.
    ///
    /// Fails when the device cannot be reached or does not expose the
    /// service; callers never get a handle they would have to check for
    /// emptiness.
    async fn connect(&self, location: &str) -> DescriptionResult<Box<dyn TransportControl>>;
}
