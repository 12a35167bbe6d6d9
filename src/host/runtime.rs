//! Host runtime: the event loop between activation sources and the dispatcher.

use super::events::{parse_input_line, HostEvent};
use super::loader::load_config_file;
use crate::config::{HostSettings, SettingsLoader, WatchSettings};
use crate::dispatch::{DispatchOutcome, Dispatcher, Transport};
use crate::error::ApiError;
use crate::state::ResolverState;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Runtime configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeOptions {
    /// Configuration document to load and watch
    pub config_path: PathBuf,
    /// Log every activation at info level
    pub verbose: bool,
    pub watch: WatchSettings,
    /// Settings file re-read on `:settings`; None means the default location
    pub settings_path: Option<PathBuf>,
}

impl RuntimeOptions {
    /// Derive options from host settings; a document path is required
    pub fn from_settings(
        settings: &HostSettings,
        settings_path: Option<PathBuf>,
    ) -> Result<Self, ApiError> {
        let config_path = settings.config_path.clone().ok_or_else(|| {
            ApiError::ConfigError(
                "No configuration document set (use --config or config_path in settings)"
                    .to_string(),
            )
        })?;
        Ok(Self {
            config_path,
            verbose: settings.verbose,
            watch: settings.watch.clone(),
            settings_path,
        })
    }
}

/// Counters reported when the runtime stops
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeStats {
    pub activations: usize,
    pub sent: usize,
    pub send_failures: usize,
    pub reloads: usize,
}

pub struct HostRuntime {
    state: Arc<ResolverState>,
    transport: Arc<dyn Transport>,
    options: RuntimeOptions,
    events_tx: mpsc::Sender<HostEvent>,
    events_rx: mpsc::Receiver<HostEvent>,
    stats: RuntimeStats,
}

impl HostRuntime {
    pub fn new(
        state: Arc<ResolverState>,
        transport: Arc<dyn Transport>,
        options: RuntimeOptions,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::channel();
        Self {
            state,
            transport,
            options,
            events_tx,
            events_rx,
            stats: RuntimeStats::default(),
        }
    }

    /// Handle for posting events from other threads
    pub fn sender(&self) -> mpsc::Sender<HostEvent> {
        self.events_tx.clone()
    }

    /// Feed stdin lines into the event channel from a background thread
    pub fn spawn_stdin_reader(&self) -> thread::JoinHandle<()> {
        let tx = self.sender();
        thread::spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        warn!("Failed to read input: {}", e);
                        break;
                    }
                };
                if let Some(event) = parse_input_line(&line) {
                    if tx.send(event).is_err() {
                        return;
                    }
                }
            }
            // End of input stops the runtime
            let _ = tx.send(HostEvent::Shutdown);
        })
    }

    /// Run until `Shutdown` or until every sender is gone.
    ///
    /// Starts from a clean state, loads the document, optionally watches it,
    /// and tears the state down on exit.
    pub fn run(mut self) -> Result<RuntimeStats, ApiError> {
        info!(config = %self.options.config_path.display(), "Runtime starting");
        self.state.teardown();
        self.reload();

        let mut _watcher = self.start_watcher();
        let mut pending_change: Option<Instant> = None;

        loop {
            let event = match pending_change {
                Some(since) => {
                    let debounce = Duration::from_millis(self.options.watch.debounce_ms);
                    let timeout = debounce.saturating_sub(since.elapsed());
                    match self.events_rx.recv_timeout(timeout) {
                        Ok(event) => event,
                        Err(mpsc::RecvTimeoutError::Timeout) => {
                            pending_change = None;
                            info!("Config file changed, reloading");
                            self.reload();
                            continue;
                        }
                        Err(mpsc::RecvTimeoutError::Disconnected) => break,
                    }
                }
                None => match self.events_rx.recv() {
                    Ok(event) => event,
                    Err(_) => break,
                },
            };

            match event {
                HostEvent::Activated(name) => self.activate(&name),
                HostEvent::ReloadRequested => {
                    info!("Reload requested");
                    self.reload();
                }
                HostEvent::ConfigChanged => {
                    // Restart the quiet period on every change in a burst
                    pending_change = Some(Instant::now());
                }
                HostEvent::SettingsReloadRequested => match self.read_settings() {
                    Ok(settings) => {
                        if self.apply_settings(&settings) {
                            _watcher = self.start_watcher();
                        }
                    }
                    Err(e) => warn!("Failed to read settings: {}", e),
                },
                HostEvent::SettingsUpdated(settings) => {
                    if self.apply_settings(&settings) {
                        _watcher = self.start_watcher();
                    }
                }
                HostEvent::Shutdown => break,
            }
        }

        info!(
            activations = self.stats.activations,
            sent = self.stats.sent,
            reloads = self.stats.reloads,
            "Runtime stopping"
        );
        self.state.teardown();
        Ok(self.stats)
    }

    fn reload(&mut self) {
        self.stats.reloads += 1;
        load_config_file(&self.state, &self.options.config_path);
    }

    fn activate(&mut self, name: &str) {
        self.stats.activations += 1;
        if self.options.verbose {
            info!(source = name, "Source activated");
        } else {
            debug!(source = name, "Source activated");
        }

        let dispatcher = Dispatcher::new(&self.state, self.transport.as_ref());
        match dispatcher.dispatch(name) {
            Ok(DispatchOutcome::Sent { .. }) => self.stats.sent += 1,
            Ok(_) => {}
            Err(e) => {
                self.stats.send_failures += 1;
                error!(source = name, "Failed to send: {}", e);
            }
        }
    }

    fn read_settings(&self) -> Result<HostSettings, ApiError> {
        let settings = match &self.options.settings_path {
            Some(path) => SettingsLoader::load_from_file(path)?,
            None => SettingsLoader::load()?,
        };
        Ok(settings)
    }

    /// Apply new settings; returns true when the watcher must be restarted.
    ///
    /// The document is reloaded only when the path changed or the current
    /// configuration is not valid.
    fn apply_settings(&mut self, settings: &HostSettings) -> bool {
        if self.options.verbose {
            info!("Settings updating");
        }
        let path_changed = settings
            .config_path
            .as_ref()
            .is_some_and(|p| *p != self.options.config_path);
        let watch_changed = settings.watch != self.options.watch;
        if let Some(path) = &settings.config_path {
            self.options.config_path = path.clone();
        }
        self.options.verbose = settings.verbose;
        self.options.watch = settings.watch.clone();

        if path_changed || !self.state.is_valid() {
            if self.options.verbose {
                info!("Current config not valid or moved, reloading");
            }
            self.reload();
        } else if self.options.verbose {
            info!("Current config valid, no need to reload");
        }
        path_changed || watch_changed
    }

    fn start_watcher(&self) -> Option<RecommendedWatcher> {
        if !self.options.watch.enabled {
            return None;
        }
        match watch_config_file(&self.options.config_path, self.sender()) {
            Ok(watcher) => Some(watcher),
            Err(e) => {
                warn!("Not watching config file: {}", e);
                None
            }
        }
    }
}

/// Post `ConfigChanged` whenever the file at `path` is written, created, or replaced.
///
/// Watches the parent directory so that editors replacing the file
/// atomically are still noticed.
fn watch_config_file(
    path: &Path,
    tx: mpsc::Sender<HostEvent>,
) -> Result<RecommendedWatcher, ApiError> {
    let file_name = path
        .file_name()
        .map(|n| n.to_os_string())
        .ok_or_else(|| ApiError::ConfigError(format!("{} is not a file path", path.display())))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
        Ok(event) => {
            let relevant = matches!(
                event.kind,
                EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
            ) && event
                .paths
                .iter()
                .any(|p| p.file_name() == Some(file_name.as_os_str()));
            if relevant {
                if let Err(e) = tx.send(HostEvent::ConfigChanged) {
                    debug!("Runtime gone, dropping change event: {}", e);
                }
            }
        }
        Err(e) => warn!("Watch error: {}", e),
    })?;
    watcher.watch(&dir, RecursiveMode::NonRecursive)?;
    info!(dir = %dir.display(), "Watching config file");
    Ok(watcher)
}
