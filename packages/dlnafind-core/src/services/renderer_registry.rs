//! Persisted renderer selection.
//!
//! The registry maps an operator-chosen short name to a renderer endpoint and
//! remembers which renderer the previous command used. It is stored as JSON:
//!
//! ```json
//! { "renderers": { "tv": { "name": "Living Room TV", "location": "http://...", "used": true } } }
//! ```
//!
//! Every load-modify-save cycle goes through [`RendererStore::update`], which
//! holds an exclusive lock on `<file>.lock` so concurrent invocations cannot
//! interleave their writes. Plain reads take the lock shared. Operator input
//! is never awaited while the lock is held.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::upnp::DiscoveredDevice;

// ─────────────────────────────────────────────────────────────────────────────
// Error Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum RegistryError {
    /// The registry file or its lock could not be read or written.
    #[error("registry file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The registry file is not valid JSON.
    #[error("cannot decode registry file {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The registry could not be serialized for writing.
    #[error("cannot encode registry file {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// No renderer is configured, or discovery found none to configure.
    #[error("no renderer found")]
    NoRendererFound,

    /// Several renderers are configured and none was named.
    #[error("{} renderers configured ({}), choose one by short name", .0.len(), .0.join(", "))]
    AmbiguousRenderer(Vec<String>),

    /// The named renderer is not in the registry.
    #[error("unknown renderer '{0}'")]
    UnknownRenderer(String),

    /// The operator's answer during configuration was not usable.
    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    /// Reading the operator's answer failed.
    #[error("prompt failed: {0}")]
    Prompt(#[source] io::Error),
}

pub type RegistryResult<T> = Result<T, RegistryError>;

// ─────────────────────────────────────────────────────────────────────────────
// Registry
// ─────────────────────────────────────────────────────────────────────────────

/// A playback device known by a short name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Renderer {
    /// Friendly name reported by the device.
    pub name: String,
    /// URL of the device description.
    pub location: String,
    /// Whether this renderer was selected by the current command.
    #[serde(default)]
    pub used: bool,
}

impl From<&DiscoveredDevice> for Renderer {
    fn from(device: &DiscoveredDevice) -> Self {
        Self {
            name: device.name.clone(),
            location: device.location.clone(),
            used: false,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    renderers: BTreeMap<String, Renderer>,
}

/// In-memory renderer registry, iterated in short-name order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RendererRegistry {
    renderers: BTreeMap<String, Renderer>,
    last_used: Option<String>,
}

impl RendererRegistry {
    fn from_file(file: RegistryFile) -> Self {
        let mut renderers = file.renderers;
        let last_used = renderers
            .iter()
            .find(|(_, r)| r.used)
            .map(|(short, _)| short.clone());
        for renderer in renderers.values_mut() {
            renderer.used = false;
        }
        Self {
            renderers,
            last_used,
        }
    }

    /// Snapshot to persist: only the last used renderer carries the marker.
    fn to_file(&self) -> RegistryFile {
        let renderers = self
            .renderers
            .iter()
            .map(|(short, r)| {
                let mut r = r.clone();
                r.used = self.last_used.as_deref() == Some(short.as_str());
                (short.clone(), r)
            })
            .collect();
        RegistryFile { renderers }
    }

    pub fn len(&self) -> usize {
        self.renderers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renderers.is_empty()
    }

    pub fn get(&self, short_name: &str) -> Option<&Renderer> {
        self.renderers.get(short_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Renderer)> {
        self.renderers.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Short name of the renderer used by the last command that selected one.
    pub fn last_used(&self) -> Option<&str> {
        self.last_used.as_deref()
    }

    /// Stores `renderer` under `short_name`, replacing any previous entry.
    pub fn insert(&mut self, short_name: impl Into<String>, renderer: Renderer) {
        self.renderers.insert(short_name.into(), renderer);
    }

    /// Removes a renderer.
    ///
    /// # Errors
    /// [`RegistryError::UnknownRenderer`] if no entry has that short name.
    pub fn remove(&mut self, short_name: &str) -> RegistryResult<Renderer> {
        let removed = self
            .renderers
            .remove(short_name)
            .ok_or_else(|| RegistryError::UnknownRenderer(short_name.to_string()))?;
        if self.last_used.as_deref() == Some(short_name) {
            self.last_used = None;
        }
        Ok(removed)
    }

    /// Resolves the renderer a command targets and marks it used.
    ///
    /// With a name, that entry is chosen. Without one, the registry must hold
    /// exactly one entry.
    ///
    /// # Errors
    /// - [`RegistryError::NoRendererFound`] if the registry is empty
    /// - [`RegistryError::UnknownRenderer`] if `name` matches no entry
    /// - [`RegistryError::AmbiguousRenderer`] if no name was given and several
    ///   entries exist
    pub fn select(&mut self, name: Option<&str>) -> RegistryResult<Renderer> {
        if self.renderers.is_empty() {
            return Err(RegistryError::NoRendererFound);
        }

        let short = match name {
            Some(name) if self.renderers.contains_key(name) => name.to_string(),
            Some(name) => return Err(RegistryError::UnknownRenderer(name.to_string())),
            None if self.renderers.len() == 1 => self
                .renderers
                .keys()
                .next()
                .cloned()
                .ok_or(RegistryError::NoRendererFound)?,
            None => {
                return Err(RegistryError::AmbiguousRenderer(
                    self.renderers.keys().cloned().collect(),
                ))
            }
        };

        let mut selected = None;
        for (key, renderer) in self.renderers.iter_mut() {
            renderer.used = *key == short;
            if renderer.used {
                selected = Some(renderer.clone());
            }
        }
        self.last_used = Some(short);

        let selected = selected.ok_or(RegistryError::NoRendererFound)?;
        log::info!("[Registry] Renderer selected: {}", selected.name);
        Ok(selected)
    }

    /// Interactive configuration: lists `candidates`, asks for an index and a
    /// short name, and stores the chosen renderer under that name.
    ///
    /// Returns the short name that was stored.
    ///
    /// # Errors
    /// - [`RegistryError::NoRendererFound`] if `candidates` is empty
    /// - [`RegistryError::InvalidSelection`] for an out-of-range index or an
    ///   empty short name
    pub fn configure(
        &mut self,
        candidates: &[DiscoveredDevice],
        prompt: &mut dyn Prompt,
    ) -> RegistryResult<String> {
        let (short_name, renderer) = Self::choose(candidates, prompt)?;
        self.insert(short_name.clone(), renderer);
        Ok(short_name)
    }

    /// Asks the operator to pick one of `candidates` and name it.
    ///
    /// Nothing is stored; the caller decides where the choice goes.
    ///
    /// # Errors
    /// Same as [`RendererRegistry::configure`].
    pub fn choose(
        candidates: &[DiscoveredDevice],
        prompt: &mut dyn Prompt,
    ) -> RegistryResult<(String, Renderer)> {
        if candidates.is_empty() {
            return Err(RegistryError::NoRendererFound);
        }

        for (i, device) in candidates.iter().enumerate() {
            prompt
                .show(&format!("[{}] - {} : {}", i, device.name, device.location))
                .map_err(RegistryError::Prompt)?;
        }

        let answer = prompt
            .ask("please enter the number of the device to set ? ")
            .map_err(RegistryError::Prompt)?;
        let index: usize = answer
            .trim()
            .parse()
            .map_err(|_| RegistryError::InvalidSelection(format!("'{}' is not a number", answer.trim())))?;
        let device = candidates.get(index).ok_or_else(|| {
            RegistryError::InvalidSelection(format!(
                "{} is out of range (0..{})",
                index,
                candidates.len()
            ))
        })?;

        let short_name = prompt
            .ask("please enter the short name associated to this device (tv, box for instance) ? ")
            .map_err(RegistryError::Prompt)?
            .trim()
            .to_string();
        if short_name.is_empty() || short_name.contains(char::is_whitespace) {
            return Err(RegistryError::InvalidSelection(format!(
                "'{short_name}' is not a valid short name"
            )));
        }

        prompt
            .show(&format!(
                "you set {} ({} - {}) as new device renderer",
                short_name, device.name, device.location
            ))
            .map_err(RegistryError::Prompt)?;
        Ok((short_name, Renderer::from(device)))
    }

    /// Renders the registry as a numbered listing.
    pub fn display_lines(&self) -> Vec<String> {
        let mut lines = vec!["[Num]\t-\tShort name (renderer's name)\t:\tRenderer's location".to_string()];
        lines.extend(self.iter().enumerate().map(|(i, (short, r))| {
            format!("[{}]\t-\t{} ({})\t:\t{}", i, short, r.name, r.location)
        }));
        lines
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Operator prompt
// ─────────────────────────────────────────────────────────────────────────────

/// Line-oriented operator interaction used by [`RendererRegistry::configure`].
pub trait Prompt {
    /// Prints an informational line.
    fn show(&mut self, line: &str) -> io::Result<()>;

    /// Prints `question` and reads one answer line.
    fn ask(&mut self, question: &str) -> io::Result<String>;
}

/// [`Prompt`] over any buffered reader and writer (stdin/stdout in the CLI).
pub struct LinePrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Prompt for LinePrompt<R, W> {
    fn show(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.output, "{line}")
    }

    fn ask(&mut self, question: &str) -> io::Result<String> {
        write!(self.output, "{question}")?;
        self.output.flush()?;
        let mut answer = String::new();
        if self.input.read_line(&mut answer)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "no answer on input",
            ));
        }
        Ok(answer.trim_end_matches(['\r', '\n']).to_string())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File store
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LockMode {
    Shared,
    Exclusive,
}

/// Advisory lock on `<registry>.lock`, released on drop.
struct StoreLock {
    file: File,
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

/// JSON file backing a [`RendererRegistry`].
#[derive(Debug, Clone)]
pub struct RendererStore {
    path: PathBuf,
}

impl RendererStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> RegistryError {
        RegistryError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn lock(&self, mode: LockMode) -> RegistryResult<StoreLock> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|e| self.io_error(e))?;
        }
        let mut lock_path = self.path.clone().into_os_string();
        lock_path.push(".lock");

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| self.io_error(e))?;
        match mode {
            LockMode::Shared => FileExt::lock_shared(&file),
            LockMode::Exclusive => FileExt::lock_exclusive(&file),
        }
        .map_err(|e| self.io_error(e))?;
        Ok(StoreLock { file })
    }

    /// Reads the registry, creating an empty file on first use.
    ///
    /// # Errors
    /// Fails if the file cannot be read, created, or decoded.
    pub fn load(&self) -> RegistryResult<RendererRegistry> {
        {
            let _lock = self.lock(LockMode::Shared)?;
            if let Some(registry) = self.read_unlocked()? {
                return Ok(registry);
            }
        }
        // First use: creating the file needs the writer's lock.
        let _lock = self.lock(LockMode::Exclusive)?;
        self.load_unlocked()
    }

    fn load_unlocked(&self) -> RegistryResult<RendererRegistry> {
        if let Some(registry) = self.read_unlocked()? {
            return Ok(registry);
        }
        log::info!("[Registry] Creating {}", self.path.display());
        let registry = RendererRegistry::default();
        self.save_unlocked(&registry)?;
        Ok(registry)
    }

    /// Reads and decodes the file; `None` if it does not exist yet.
    fn read_unlocked(&self) -> RegistryResult<Option<RendererRegistry>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };

        let file: RegistryFile =
            serde_json::from_str(&contents).map_err(|source| RegistryError::Decode {
                path: self.path.clone(),
                source,
            })?;
        Ok(Some(RendererRegistry::from_file(file)))
    }

    /// Persists the registry atomically (temp file, fsync, rename).
    ///
    /// # Errors
    /// Fails if the file cannot be written.
    pub fn save(&self, registry: &RendererRegistry) -> RegistryResult<()> {
        let _lock = self.lock(LockMode::Exclusive)?;
        self.save_unlocked(registry)
    }

    fn save_unlocked(&self, registry: &RendererRegistry) -> RegistryResult<()> {
        let contents = serde_json::to_string_pretty(&registry.to_file()).map_err(|source| {
            RegistryError::Encode {
                path: self.path.clone(),
                source,
            }
        })?;

        let mut temp_path = self.path.clone().into_os_string();
        temp_path.push(".tmp");
        let temp_path = PathBuf::from(temp_path);

        let write = || -> io::Result<()> {
            let mut file = File::create(&temp_path)?;
            file.write_all(contents.as_bytes())?;
            file.sync_all()?;
            fs::rename(&temp_path, &self.path)
        };
        write().map_err(|e| self.io_error(e))?;

        log::debug!("[Registry] Saved {} renderer(s)", registry.len());
        Ok(())
    }

    /// Runs `f` on the registry under the store lock and persists the result
    /// if `f` succeeds.
    ///
    /// # Errors
    /// Returns the error of `f`, or the load/save failure.
    pub fn update<T, F>(&self, f: F) -> RegistryResult<T>
    where
        F: FnOnce(&mut RendererRegistry) -> RegistryResult<T>,
    {
        let _lock = self.lock(LockMode::Exclusive)?;
        let mut registry = self.load_unlocked()?;
        let value = f(&mut registry)?;
        self.save_unlocked(&registry)?;
        Ok(value)
    }

    /// Convenience for `update(|r| r.select(name))`.
    pub fn select(&self, name: Option<&str>) -> RegistryResult<Renderer> {
        self.update(|registry| registry.select(name))
    }

    /// Convenience for `update(|r| r.remove(short_name))`.
    pub fn remove(&self, short_name: &str) -> RegistryResult<Renderer> {
        self.update(|registry| registry.remove(short_name))
    }

    /// Runs interactive configuration and persists the new entry.
    ///
    /// The operator is prompted before the store is locked; only the insert
    /// runs under the lock, against the file as it is at that point.
    pub fn configure(
        &self,
        candidates: &[DiscoveredDevice],
        prompt: &mut dyn Prompt,
    ) -> RegistryResult<String> {
        let (short_name, renderer) = RendererRegistry::choose(candidates, prompt)?;
        self.update(|registry| {
            registry.insert(short_name.clone(), renderer);
            Ok(())
        })?;
        Ok(short_name)
    }
}
