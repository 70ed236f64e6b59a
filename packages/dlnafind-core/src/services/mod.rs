//! Application services layer.
//!
//! This module contains the logic that sits between the command-line
//! orchestrator and the UPnP protocol layer (upnp/).

pub mod action_dispatcher;
pub mod media_search;
pub mod renderer_registry;

pub use action_dispatcher::{
    ActionDispatcher, PlayOutcome, PlaybackError, QueueReport, RendererAction,
};
pub use media_search::{
    build_criteria, MediaSearch, MediaType, SearchHit, SearchReport, ServerFailure, ServerSummary,
};
pub use renderer_registry::{
    LinePrompt, Prompt, RegistryError, Renderer, RendererRegistry, RendererStore,
};
