//! Command orchestration.
//!
//! Each command is a short sequence over the core services: registry lookup,
//! discovery, search and renderer control. Results are written to the given
//! output; diagnostics go through the logger.

use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use dlnafind_core::{
    build_criteria, ActionDispatcher, AvTransportConnector, Config, DeviceKind, Discovery,
    DlnaError, ErrorCode, LinePrompt, MediaSearch, MediaType, PlayOutcome, RendererAction, RendererStore,
    SearchReport, SsdpDiscovery, TransportConnector,
};
use reqwest::Client;

/// What the invocation asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    DisplayConfiguration,
    LastDevice,
    Transport(RendererAction),
    ConfigureRenderer,
    RemoveRenderer(String),
    Search {
        pattern: String,
        media_type: MediaType,
    },
}

/// Terminal streams a command reads from and writes to.
pub struct Console<'a> {
    pub input: &'a mut dyn BufRead,
    pub output: &'a mut dyn Write,
}

/// Core services wired together for one invocation.
pub struct App {
    store: RendererStore,
    discovery: Box<dyn Discovery>,
    search: MediaSearch,
    dispatcher: ActionDispatcher,
}

impl App {
    /// Builds the network-backed services from `config`.
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to create HTTP client")?;
        let connector: Arc<dyn TransportConnector> = Arc::new(AvTransportConnector::new(
            client.clone(),
            config.control_timeout(),
        ));

        Ok(Self::with_collaborators(
            config,
            client,
            Box::new(SsdpDiscovery::new(config.discovery_timeout())),
            connector,
        ))
    }

    pub fn with_collaborators(
        config: &Config,
        client: Client,
        discovery: Box<dyn Discovery>,
        connector: Arc<dyn TransportConnector>,
    ) -> Self {
        Self {
            store: RendererStore::new(&config.registry_path),
            discovery,
            search: MediaSearch::new(client, config),
            dispatcher: ActionDispatcher::new(connector),
        }
    }

    /// Runs `command`, targeting the renderer named `device` when it needs one.
    pub async fn run(
        &self,
        command: Command,
        device: Option<&str>,
        console: Console<'_>,
    ) -> Result<()> {
        log::debug!("[Command] {:?} (device: {:?})", command, device);
        match command {
            Command::DisplayConfiguration => self.display_configuration(console.output),
            Command::LastDevice => self.last_device(console.output),
            Command::Transport(action) => self.transport(action, device, console.output).await,
            Command::ConfigureRenderer => self.configure_renderer(console).await,
            Command::RemoveRenderer(name) => self.remove_renderer(&name, console.output),
            Command::Search {
                pattern,
                media_type,
            } => {
                self.search_and_play(&pattern, media_type, device, console.output)
                    .await
            }
        }
    }

    fn display_configuration(&self, out: &mut dyn Write) -> Result<()> {
        let registry = self.store.load().map_err(DlnaError::from)?;
        for line in registry.display_lines() {
            writeln!(out, "{line}")?;
        }
        Ok(())
    }

    fn last_device(&self, out: &mut dyn Write) -> Result<()> {
        let registry = self.store.load().map_err(DlnaError::from)?;
        let last = registry.last_used().ok_or(DlnaError::NoRendererFound)?;
        writeln!(out, "{last}")?;
        Ok(())
    }

    async fn transport(
        &self,
        action: RendererAction,
        device: Option<&str>,
        out: &mut dyn Write,
    ) -> Result<()> {
        let renderer = self.store.select(device).map_err(DlnaError::from)?;
        writeln!(out, "renderer device selected {}", renderer.name)?;

        self.dispatcher
            .perform_action(&renderer, action)
            .await
            .map_err(DlnaError::from)?;
        writeln!(out, "{} sent to {}", action, renderer.name)?;
        Ok(())
    }

    async fn configure_renderer(&self, console: Console<'_>) -> Result<()> {
        let candidates = self
            .discovery
            .discover(DeviceKind::MediaRenderer)
            .await
            .map_err(DlnaError::from)?;
        for device in &candidates {
            log::info!("[Command] Found renderer {}", device.name);
        }

        let mut prompt = LinePrompt::new(console.input, console.output);
        self.store
            .configure(&candidates, &mut prompt)
            .map_err(DlnaError::from)?;
        Ok(())
    }

    fn remove_renderer(&self, name: &str, out: &mut dyn Write) -> Result<()> {
        let removed = self.store.remove(name).map_err(DlnaError::from)?;
        writeln!(out, "removed {} ({} - {})", name, removed.name, removed.location)?;
        Ok(())
    }

    async fn search_and_play(
        &self,
        pattern: &str,
        media_type: MediaType,
        device: Option<&str>,
        out: &mut dyn Write,
    ) -> Result<()> {
        // Resolve the renderer first so a bad --device fails before the network pass.
        let renderer = self.store.select(device).map_err(DlnaError::from)?;
        writeln!(out, "renderer device selected {}", renderer.name)?;

        let servers = self
            .discovery
            .discover(DeviceKind::MediaServer)
            .await
            .map_err(DlnaError::from)?;
        if servers.is_empty() {
            log::warn!("[Command] No media server answered");
        }

        let report = self
            .search
            .search_all(&servers, &build_criteria(pattern, media_type))
            .await;
        print_report(&report, out)?;

        if report.hits.is_empty() {
            // Nothing answered at all: surface the first failure.
            if !servers.is_empty() && report.failures.len() == servers.len() {
                if let Some(failure) = report.failures.into_iter().next() {
                    return Err(DlnaError::from(failure.error).into());
                }
            }
            writeln!(out, "no media found for '{pattern}'")?;
            return Ok(());
        }

        let files = report.playable_uris();
        if files.is_empty() {
            writeln!(out, "no playable media found for '{pattern}'")?;
            return Ok(());
        }

        let queue = self
            .dispatcher
            .play_queue(&renderer, &files)
            .await
            .map_err(DlnaError::from)?;

        for failure in &queue.failures {
            writeln!(
                out,
                "cannot send media {} [{}]: {}",
                failure.uri,
                failure.reason.code(),
                failure.reason
            )?;
        }
        writeln!(
            out,
            "queued {}/{} media on {}",
            queue.enqueued,
            files.len(),
            renderer.name
        )?;

        match queue.play {
            PlayOutcome::Started | PlayOutcome::NotSent => Ok(()),
            PlayOutcome::Failed(e) => Err(DlnaError::PlaybackCommand(format!(
                "Play failed on renderer '{}': {}",
                renderer.name, e
            ))
            .into()),
        }
    }
}

fn print_report(report: &SearchReport, out: &mut dyn Write) -> Result<()> {
    for summary in &report.summaries {
        writeln!(
            out,
            "result {}, {}, {} for server {} ({})",
            summary.number_returned,
            summary.total_matches,
            summary.update_id,
            summary.server.name,
            summary.server.location
        )?;
        for hit in report.hits_from(&summary.server) {
            writeln!(
                out,
                "{}, {}, {}",
                hit.item.title,
                hit.item.class,
                hit.item.playable_uri().unwrap_or("nothing to display")
            )?;
        }
    }
    Ok(())
}
