//! Centralized error types for the dlnafind core library.
//!
//! Each module defines its own `thiserror` enum; this module provides:
//! - Machine-readable codes for device-level errors via [`ErrorCode`]
//! - The [`DlnaError`] taxonomy they converge into
//! - The process exit status the command-line tool reports for each kind

use thiserror::Error;

use crate::services::action_dispatcher::PlaybackError;
use crate::services::media_search::ServerSearchError;
use crate::services::renderer_registry::RegistryError;
use crate::upnp::description::DescriptionError;
use crate::upnp::didl::DidlError;
use crate::upnp::discovery::DiscoveryError;
use crate::upnp::soap::SoapError;

/// Trait for error types that provide machine-readable error codes.
///
/// Implement this trait to provide consistent error codes across different
/// error conversion paths.
pub trait ErrorCode {
    /// Returns a machine-readable error code.
    fn code(&self) -> &'static str;
}

impl ErrorCode for SoapError {
    fn code(&self) -> &'static str {
        match self {
            Self::Http(_) => "http_request_failed",
            Self::HttpStatus { .. } => "http_error_status",
            Self::Fault(_) => "soap_fault",
            Self::Parse(_) => "soap_parse_error",
        }
    }
}

impl ErrorCode for DescriptionError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidLocation { .. } => "invalid_device_location",
            Self::Http(_) => "http_request_failed",
            Self::HttpStatus(_) => "http_error_status",
            Self::ServiceNotFound { .. } => "service_not_found",
        }
    }
}

impl ErrorCode for DidlError {
    fn code(&self) -> &'static str {
        match self {
            Self::Malformed(_) => "didl_malformed",
            Self::MissingRoot => "didl_missing_root",
        }
    }
}

/// Application-wide error type for dlnafind.
#[derive(Debug, Error)]
pub enum DlnaError {
    /// The configuration or registry file could not be read or written.
    #[error("Configuration I/O error: {0}")]
    ConfigIo(String),

    /// The configuration or registry file is not valid.
    #[error("Configuration decode error: {0}")]
    ConfigDecode(String),

    /// SSDP discovery could not run.
    #[error("Discovery failed: {0}")]
    Discovery(String),

    /// A device could not be reached.
    #[error("Network error: {0}")]
    Network(String),

    /// A device answered with an error or with something unreadable.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Several renderers are configured and none was named.
    #[error("{0}")]
    AmbiguousRenderer(String),

    /// No renderer is configured, or none was discovered.
    #[error("No renderer found")]
    NoRendererFound,

    /// The named renderer is not configured.
    #[error("Unknown renderer: {0}")]
    UnknownRenderer(String),

    /// The operator's choice was not usable.
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    /// The renderer rejected a transport command.
    #[error("Playback command failed: {0}")]
    PlaybackCommand(String),
}

impl DlnaError {
    /// Returns a machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigIo(_) => "config_io_error",
            Self::ConfigDecode(_) => "config_decode_error",
            Self::Discovery(_) => "discovery_failed",
            Self::Network(_) => "network_error",
            Self::Protocol(_) => "protocol_error",
            Self::AmbiguousRenderer(_) => "ambiguous_renderer",
            Self::NoRendererFound => "no_renderer_found",
            Self::UnknownRenderer(_) => "unknown_renderer",
            Self::InvalidSelection(_) => "invalid_selection",
            Self::PlaybackCommand(_) => "playback_command_failed",
        }
    }

    /// Process exit status for the command-line tool.
    ///
    /// - 1: configuration error
    /// - 2: discovery, network, protocol or playback error
    /// - 3: usage error (the command cannot tell which renderer is meant)
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConfigIo(_) | Self::ConfigDecode(_) | Self::NoRendererFound => 1,
            Self::Discovery(_) | Self::Network(_) | Self::Protocol(_) | Self::PlaybackCommand(_) => {
                2
            }
            Self::AmbiguousRenderer(_) | Self::UnknownRenderer(_) | Self::InvalidSelection(_) => 3,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Result Type Aliases
// ─────────────────────────────────────────────────────────────────────────────

// Re-export Result type aliases from their defining modules
pub use crate::services::action_dispatcher::PlaybackResult;
pub use crate::services::renderer_registry::RegistryResult;
pub use crate::upnp::description::DescriptionResult;
pub use crate::upnp::didl::DidlResult;
pub use crate::upnp::discovery::DiscoveryResult;
pub use crate::upnp::soap::SoapResult;

/// Convenient Result alias for application-wide operations.
pub type DlnaResult<T> = Result<T, DlnaError>;

impl From<DiscoveryError> for DlnaError {
    fn from(err: DiscoveryError) -> Self {
        Self::Discovery(err.to_string())
    }
}

impl From<SoapError> for DlnaError {
    fn from(err: SoapError) -> Self {
        match err {
            SoapError::Http(_) => Self::Network(err.to_string()),
            _ => Self::Protocol(err.to_string()),
        }
    }
}

impl From<DescriptionError> for DlnaError {
    fn from(err: DescriptionError) -> Self {
        match err {
            DescriptionError::Http(_) => Self::Network(err.to_string()),
            _ => Self::Protocol(err.to_string()),
        }
    }
}

impl From<DidlError> for DlnaError {
    fn from(err: DidlError) -> Self {
        Self::Protocol(err.to_string())
    }
}

impl From<ServerSearchError> for DlnaError {
    fn from(err: ServerSearchError) -> Self {
        match err {
            ServerSearchError::Description(e) => e.into(),
            ServerSearchError::Soap(e) => e.into(),
            ServerSearchError::Didl(e) => e.into(),
        }
    }
}

impl From<RegistryError> for DlnaError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::Io { .. } | RegistryError::Encode { .. } => {
                Self::ConfigIo(err.to_string())
            }
            RegistryError::Decode { .. } => Self::ConfigDecode(err.to_string()),
            RegistryError::NoRendererFound => Self::NoRendererFound,
            RegistryError::AmbiguousRenderer(_) => Self::AmbiguousRenderer(err.to_string()),
            RegistryError::UnknownRenderer(name) => Self::UnknownRenderer(name),
            RegistryError::InvalidSelection(_) | RegistryError::Prompt(_) => {
                Self::InvalidSelection(err.to_string())
            }
        }
    }
}

impl From<PlaybackError> for DlnaError {
    fn from(err: PlaybackError) -> Self {
        match err {
            PlaybackError::Connect { .. } => Self::Network(err.to_string()),
            PlaybackError::Command { .. } => Self::PlaybackCommand(err.to_string()),
        }
    }
}
