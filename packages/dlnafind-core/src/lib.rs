//! dlnafind core - UPnP/DLNA control point library.
//!
//! This crate finds media on DLNA media servers and plays it on media
//! renderers. It is used by the `dlnafind` command-line tool.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`upnp`]: Protocol layer (discovery, SOAP, ContentDirectory Search,
//!   DIDL-Lite, AVTransport)
//! - [`services`]: Renderer registry, action dispatcher and multi-server search
//! - [`config`]: Timeouts, concurrency and file locations
//! - [`error`]: Centralized error types
//!
//! # Abstraction Traits
//!
//! Network collaborators sit behind traits so the services can be tested
//! without devices:
//!
//! - [`Discovery`](upnp::Discovery): Finding servers and renderers
//! - [`TransportConnector`](upnp::TransportConnector): Opening an AVTransport
//!   session on a renderer
//! - [`TransportControl`](upnp::TransportControl): Issuing transport commands

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod protocol_constants;
pub mod services;
pub mod upnp;

// Re-export commonly used types at the crate root
pub use config::Config;
pub use error::{DlnaError, DlnaResult, ErrorCode};

pub use services::{
    build_criteria, ActionDispatcher, LinePrompt, MediaSearch, MediaType, PlayOutcome,
    QueueReport, Renderer, RendererAction, RendererRegistry, RendererStore, SearchHit,
    SearchReport, ServerSummary,
};
pub use upnp::{
    AvTransportConnector, DeviceKind, DiscoveredDevice, Discovery, SsdpDiscovery,
    TransportConnector,
};
