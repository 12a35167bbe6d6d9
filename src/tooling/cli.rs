//! CLI Tooling
//!
//! Command-line interface: validate and inspect a configuration document,
//! fire a single source, or run the host runtime.

use crate::config::{HostSettings, SettingsLoader};
use crate::dispatch::{DispatchOutcome, Dispatcher, Transport, UdpTransport};
use crate::error::ApiError;
use crate::host::{load_config_file, HostRuntime, RuntimeOptions};
use crate::logging::LoggingConfig;
use crate::osc::decode_packet;
use crate::resolver::{Destination, PayloadKind, Snapshot, MAX_DATAGRAM_SIZE};
use crate::state::{LoadOutcome, ResolverState};
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// OSC Sender - fire pre-resolved OSC messages and bundles by source name
#[derive(Parser)]
#[command(name = "osc-sender")]
#[command(about = "Resolve OSC message/bundle configurations and send them over UDP")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration document (overrides config_path from settings)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Settings file (overrides the default settings location)
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// Log every source activation
    #[arg(long, global = true, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, both)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Apply logging flags over the settings file's logging section
    pub fn logging_config(&self, base: &LoggingConfig) -> LoggingConfig {
        let mut config = base.clone();
        if let Some(level) = &self.log_level {
            config.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            config.output = output.clone();
        }
        if let Some(file) = &self.log_file {
            config.file = Some(file.clone());
        }
        config
    }
}

/// Rendering for `check` and `inspect`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve the configuration and report problems
    Check {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Show every resolved message and bundle
    Inspect {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Send the payload configured for one source
    Fire {
        /// Source name
        source: String,
    },
    /// Read source names from stdin and send their payloads
    Run {
        /// Do not reload when the configuration file changes
        #[arg(long)]
        no_watch: bool,
    },
    /// Print the effective host settings
    Settings,
}

/// CLI context for command execution
pub struct CliContext {
    settings: HostSettings,
    settings_path: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct CheckReport {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    port: Option<u16>,
    messages: usize,
    bundles: usize,
    sources: usize,
    /// Payloads too large for one UDP datagram
    #[serde(skip_serializing_if = "Vec::is_empty")]
    oversized: Vec<String>,
    errors: Vec<DiagnosticRow>,
}

#[derive(Debug, Serialize)]
struct DiagnosticRow {
    kind: &'static str,
    message: String,
}

#[derive(Debug, Serialize)]
struct InspectRow {
    name: String,
    kind: PayloadKind,
    size: usize,
    triggers: Vec<String>,
    hex: String,
    decoded: String,
}

impl CliContext {
    /// Create a new CLI context
    ///
    /// Settings come from `settings_path` when given, otherwise from the
    /// default settings file and environment; `config_path` and `verbose`
    /// override them.
    pub fn new(
        config_path: Option<PathBuf>,
        settings_path: Option<PathBuf>,
        verbose: bool,
    ) -> Result<Self, ApiError> {
        let mut settings = match &settings_path {
            Some(path) => SettingsLoader::load_from_file(path)?,
            None => SettingsLoader::load()?,
        };
        if config_path.is_some() {
            settings.config_path = config_path;
        }
        settings.verbose |= verbose;
        Ok(Self {
            settings,
            settings_path,
        })
    }

    pub fn from_settings(settings: HostSettings) -> Self {
        Self {
            settings,
            settings_path: None,
        }
    }

    pub fn settings(&self) -> &HostSettings {
        &self.settings
    }

    /// Execute a CLI command
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Check { format } => self.check(*format),
            Commands::Inspect { format } => self.inspect(*format),
            Commands::Fire { source } => self.fire(source),
            Commands::Run { no_watch } => self.run(*no_watch),
            Commands::Settings => self.settings.to_toml(),
        }
    }

    fn config_path(&self) -> Result<&Path, ApiError> {
        self.settings.config_path.as_deref().ok_or_else(|| {
            ApiError::ConfigError(
                "No configuration document set (use --config or config_path in settings)"
                    .to_string(),
            )
        })
    }

    fn load(&self) -> Result<Arc<Snapshot>, ApiError> {
        let state = ResolverState::new();
        Ok(load_config_file(&state, self.config_path()?).into_result()?)
    }

    fn check(&self, format: OutputFormat) -> Result<String, ApiError> {
        let state = ResolverState::new();
        let outcome = load_config_file(&state, self.config_path()?);
        let report = match &outcome {
            LoadOutcome::Valid(snapshot) => CheckReport {
                valid: true,
                host: Some(snapshot.destination().host.clone()),
                port: Some(snapshot.destination().port),
                messages: snapshot.registry().count_kind(PayloadKind::Message),
                bundles: snapshot.registry().count_kind(PayloadKind::Bundle),
                sources: snapshot.triggers().len(),
                oversized: snapshot
                    .registry()
                    .oversized(MAX_DATAGRAM_SIZE)
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
                errors: Vec::new(),
            },
            LoadOutcome::Invalid(failure) => CheckReport {
                valid: false,
                host: None,
                port: None,
                messages: 0,
                bundles: 0,
                sources: 0,
                oversized: Vec::new(),
                errors: failure
                    .diagnostics()
                    .iter()
                    .map(|d| DiagnosticRow {
                        kind: d.kind().as_str(),
                        message: d.to_string(),
                    })
                    .collect(),
            },
        };

        let rendered = match format {
            OutputFormat::Json => serde_json::to_string_pretty(&report)?,
            OutputFormat::Text => format_check_text(&report),
        };
        if report.valid {
            Ok(rendered)
        } else {
            Err(ApiError::InvalidConfiguration { report: rendered })
        }
    }

    fn inspect(&self, format: OutputFormat) -> Result<String, ApiError> {
        let snapshot = self.load()?;
        let mut rows = Vec::with_capacity(snapshot.registry().len());
        for (name, payload) in snapshot.registry().iter() {
            let decoded = decode_packet(payload.bytes())?;
            rows.push(InspectRow {
                name: name.to_string(),
                kind: payload.kind(),
                size: payload.bytes().len(),
                triggers: snapshot
                    .triggers()
                    .triggers_for(name)
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
                hex: hex::encode(payload.bytes()),
                decoded: decoded.to_string(),
            });
        }

        if format == OutputFormat::Json {
            return Ok(serde_json::to_string_pretty(&rows)?);
        }

        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_header(vec!["Name", "Kind", "Size", "Sources", "Decoded", "Hex"]);
        for row in &rows {
            table.add_row(vec![
                row.name.clone(),
                row.kind.to_string(),
                row.size.to_string(),
                if row.triggers.is_empty() {
                    "-".to_string()
                } else {
                    row.triggers.join(", ")
                },
                row.decoded.clone(),
                row.hex.clone(),
            ]);
        }
        Ok(format!(
            "{}\nDestination: {}\n\n{}",
            "Resolved payloads".bold().underline(),
            snapshot.destination(),
            table
        ))
    }

    fn fire(&self, source: &str) -> Result<String, ApiError> {
        let state = ResolverState::new();
        load_config_file(&state, self.config_path()?).into_result()?;
        let transport = UdpTransport::bind()?;
        let dispatcher = Dispatcher::new(&state, &transport);
        match dispatcher.dispatch(source)? {
            DispatchOutcome::Sent { target, bytes } => {
                let destination = state
                    .current()
                    .map(|s| s.destination().to_string())
                    .unwrap_or_default();
                Ok(format!(
                    "Sent \"{}\" ({} bytes) to {}",
                    target, bytes, destination
                ))
            }
            DispatchOutcome::NoTrigger => Ok(format!(
                "No message or bundle configured for source \"{}\"",
                source
            )),
            DispatchOutcome::NotLoaded => Ok("No configuration loaded".to_string()),
        }
    }

    fn run(&self, no_watch: bool) -> Result<String, ApiError> {
        let mut options =
            RuntimeOptions::from_settings(&self.settings, self.settings_path.clone())?;
        if no_watch {
            options.watch.enabled = false;
        }
        let transport: Arc<dyn Transport> = Arc::new(UdpTransport::bind()?);
        let runtime = HostRuntime::new(Arc::new(ResolverState::new()), transport, options);
        let _stdin = runtime.spawn_stdin_reader();
        info!("Reading source names from stdin (:reload, :settings, :quit)");
        let stats = runtime.run()?;
        Ok(format!(
            "Stopped after {} activations ({} sent, {} failed sends, {} loads)",
            stats.activations, stats.sent, stats.send_failures, stats.reloads
        ))
    }
}

fn format_check_text(report: &CheckReport) -> String {
    let mut out = String::new();
    if report.valid {
        out.push_str(&format!("{}\n", "Configuration is valid".green()));
        if let (Some(host), Some(port)) = (&report.host, report.port) {
            let destination = Destination {
                host: host.clone(),
                port,
            };
            out.push_str(&format!("  Destination: {}\n", destination));
        }
        out.push_str(&format!("  Messages: {}\n", report.messages));
        out.push_str(&format!("  Bundles: {}\n", report.bundles));
        out.push_str(&format!("  Sources: {}", report.sources));
        for name in &report.oversized {
            out.push_str(&format!(
                "\n  {} \"{}\" exceeds {} bytes and cannot be sent",
                "warning:".yellow(),
                name,
                MAX_DATAGRAM_SIZE
            ));
        }
    } else {
        out.push_str(&format!(
            "{} ({} errors)\n",
            "Configuration is invalid".red(),
            report.errors.len()
        ));
        let lines: Vec<String> = report
            .errors
            .iter()
            .map(|e| format!("  [{}] {}", e.kind, e.message))
            .collect();
        out.push_str(&lines.join("\n"));
    }
    out
}
