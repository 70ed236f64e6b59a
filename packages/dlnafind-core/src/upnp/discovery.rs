//! SSDP device discovery.
//!
//! The SSDP exchange and device description download are delegated to
//! `rupnp`; this module bounds the search window, drops duplicate answers and
//! keeps devices in arrival order so numbering is reproducible.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use rupnp::ssdp::{SearchTarget, URN};
use thiserror::Error;
use tokio::time::{timeout_at, Instant};

use super::services::DeviceKind;
use super::traits::{DiscoveredDevice, Discovery};

/// Extra time granted after the SSDP window for description downloads.
const DESCRIPTION_GRACE: Duration = Duration::from_secs(2);

/// Errors that can occur during discovery.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The SSDP search could not be started (socket or network failure).
    #[error("SSDP search failed: {0}")]
    Search(#[from] rupnp::Error),
}

/// Convenient Result alias for discovery operations.
pub type DiscoveryResult<T> = Result<T, DiscoveryError>;

fn search_target(kind: DeviceKind) -> SearchTarget {
    match kind {
        DeviceKind::MediaServer => {
            SearchTarget::URN(URN::device("schemas-upnp-org", "MediaServer", 1))
        }
        DeviceKind::MediaRenderer => {
            SearchTarget::URN(URN::device("schemas-upnp-org", "MediaRenderer", 1))
        }
    }
}

/// Discovers devices with an SSDP M-SEARCH.
#[derive(Debug, Clone)]
pub struct SsdpDiscovery {
    timeout: Duration,
}

impl SsdpDiscovery {
    /// Creates a discovery that listens for answers during `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl Discovery for SsdpDiscovery {
    async fn discover(&self, kind: DeviceKind) -> DiscoveryResult<Vec<DiscoveredDevice>> {
        log::info!("[Discovery] Searching for {} ({:?})", kind.urn(), self.timeout);

        let devices = rupnp::discover(&search_target(kind), self.timeout, None).await?;
        let mut devices = std::pin::pin!(devices);

        let deadline = Instant::now() + self.timeout + DESCRIPTION_GRACE;
        let mut seen = HashSet::new();
        let mut found = Vec::new();

        loop {
            match timeout_at(deadline, devices.next()).await {
                Ok(Some(Ok(device))) => {
                    let location = device.url().to_string();
                    if !seen.insert(location.clone()) {
                        continue;
                    }
                    log::info!(
                        "[Discovery] Found {} '{}' at {}",
                        kind,
                        device.friendly_name(),
                        location
                    );
                    found.push(DiscoveredDevice {
                        name: device.friendly_name().to_string(),
                        location,
                    });
                }
                Ok(Some(Err(e))) => {
                    log::warn!("[Discovery] Skipping unreachable device: {}", e);
                }
                Ok(None) => break,
                Err(_) => {
                    log::warn!("[Discovery] Deadline reached, keeping {} devices", found.len());
                    break;
                }
            }
        }

        log::info!("[Discovery] {} {} device(s) found", found.len(), kind);
        Ok(found)
    }
}
