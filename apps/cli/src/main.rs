//! dlnafind - search DLNA media servers and play the results on a renderer.
//!
//! Results go to stdout; logs and errors go to stderr. The exit status tells
//! scripts what went wrong: 1 for configuration, 2 for network or device
//! errors, 3 for usage errors.

mod commands;
mod config;

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgGroup, CommandFactory, Parser};
use dlnafind_core::{DlnaError, MediaType, RendererAction};

use crate::commands::{App, Command, Console};
use crate::config::CliConfig;

const EXIT_CONFIG: u8 = 1;
const EXIT_RUNTIME: u8 = 2;
const EXIT_USAGE: u8 = 3;

/// dlnafind - find media on DLNA servers and play it on a renderer.
#[derive(Parser, Debug)]
#[command(name = "dlnafind")]
#[command(author, version, about, long_about = None)]
#[command(group(
    ArgGroup::new("transport")
        .args(["play", "pause", "stop", "next", "previous"])
        .multiple(false)
))]
struct Args {
    /// Title pattern to search for on every media server.
    #[arg(long, value_name = "TEXT")]
    pattern: Option<String>,

    /// Media type to search for (video, audio, image, any).
    #[arg(long, value_name = "TYPE", default_value = "any")]
    media_type: MediaType,

    /// Short name of the renderer to use.
    #[arg(long, value_name = "SHORT_NAME")]
    device: Option<String>,

    /// Resume playback on the renderer.
    #[arg(long)]
    play: bool,

    /// Pause the renderer.
    #[arg(long)]
    pause: bool,

    /// Stop the renderer.
    #[arg(long)]
    stop: bool,

    /// Skip to the next media.
    #[arg(long)]
    next: bool,

    /// Go back to the previous media.
    #[arg(long)]
    previous: bool,

    /// Discover renderers and register one under a short name.
    #[arg(long)]
    configure_renderer: bool,

    /// Show the registered renderers.
    #[arg(long, visible_alias = "configure-display")]
    display_configuration: bool,

    /// Print the short name of the last renderer used.
    #[arg(long)]
    last_device: bool,

    /// Remove a registered renderer.
    #[arg(long, value_name = "SHORT_NAME")]
    remove_renderer: Option<String>,

    /// Path to the configuration file (YAML).
    #[arg(short, long, value_name = "FILE", env = "DLNAFIND_CONFIG")]
    config: Option<PathBuf>,

    /// Renderer registry file (overrides config file).
    #[arg(long, value_name = "FILE", env = "DLNAFIND_REGISTRY")]
    registry: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(short, long, default_value = "warn", env = "DLNAFIND_LOG_LEVEL")]
    log_level: log::LevelFilter,

    /// Timeout in seconds for each search and renderer request (overrides config file).
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,
}

impl Args {
    /// Picks the command to run. The first matching flag wins, in this order.
    fn to_command(&self) -> Option<Command> {
        let transport = [
            (self.play, RendererAction::Play),
            (self.pause, RendererAction::Pause),
            (self.stop, RendererAction::Stop),
            (self.next, RendererAction::Next),
            (self.previous, RendererAction::Previous),
        ]
        .into_iter()
        .find_map(|(set, action)| set.then_some(action));

        if self.display_configuration {
            Some(Command::DisplayConfiguration)
        } else if self.last_device {
            Some(Command::LastDevice)
        } else if let Some(action) = transport {
            Some(Command::Transport(action))
        } else if self.configure_renderer {
            Some(Command::ConfigureRenderer)
        } else if let Some(name) = &self.remove_renderer {
            Some(Command::RemoveRenderer(name.clone()))
        } else {
            self.pattern
                .as_ref()
                .filter(|p| !p.is_empty())
                .map(|pattern| Command::Search {
                    pattern: pattern.clone(),
                    media_type: self.media_type,
                })
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(EXIT_USAGE)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    // Initialize logging
    env_logger::Builder::new()
        .filter_level(args.log_level)
        .format_timestamp_millis()
        .init();

    log::debug!("dlnafind v{}", env!("CARGO_PKG_VERSION"));

    let Some(command) = args.to_command() else {
        eprintln!("{}", <Args as CommandFactory>::command().render_usage());
        eprintln!("Nothing to do: give --pattern or a renderer command (see --help).");
        return ExitCode::from(EXIT_USAGE);
    };

    let core_config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    match run(command, args.device.as_deref(), &core_config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let (message, code) = describe_error(&e);
            eprintln!("{message}");
            ExitCode::from(code)
        }
    }
}

/// Error line for stderr and the exit status for a failed command.
fn describe_error(err: &anyhow::Error) -> (String, u8) {
    match err.downcast_ref::<DlnaError>() {
        Some(dlna) => (
            format!("Error [{}]: {err:#}", dlna.code()),
            dlna.exit_code() as u8,
        ),
        None => (format!("Error: {err:#}"), EXIT_RUNTIME),
    }
}

fn load_config(args: &Args) -> Result<dlnafind_core::Config> {
    let mut config =
        CliConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    // Apply CLI overrides
    if let Some(registry) = &args.registry {
        config.registry = Some(registry.clone());
    }
    if let Some(secs) = args.timeout {
        config.search_timeout = secs;
        config.control_timeout = secs;
    }

    let core_config = config.to_core_config();
    core_config
        .validate()
        .map_err(anyhow::Error::msg)
        .context("Invalid configuration")?;

    log::info!(
        "Configuration: registry={}, discovery={}s, search={}s, control={}s, concurrency={}",
        core_config.registry_path.display(),
        core_config.discovery_timeout_secs,
        core_config.search_timeout_secs,
        core_config.control_timeout_secs,
        core_config.max_concurrency
    );
    Ok(core_config)
}

async fn run(command: Command, device: Option<&str>, config: &dlnafind_core::Config) -> Result<()> {
    let app = App::new(config)?;

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout().lock();
    let result = app
        .run(
            command,
            device,
            Console {
                input: &mut input,
                output: &mut output,
            },
        )
        .await;
    output.flush()?;
    result
}
