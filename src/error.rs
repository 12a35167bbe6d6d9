//! Error types for configuration resolution, transport, and the tooling layer.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Machine-readable classification of a resolution diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnknownAddress,
    InvalidArgument,
    NameClash,
    DuplicateName,
    UnresolvedMember,
    Cycle,
    UnknownTarget,
    MalformedConfiguration,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::UnknownAddress => "unknown_address",
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::NameClash => "name_clash",
            ErrorKind::DuplicateName => "duplicate_name",
            ErrorKind::UnresolvedMember => "unresolved_member",
            ErrorKind::Cycle => "cycle",
            ErrorKind::UnknownTarget => "unknown_target",
            ErrorKind::MalformedConfiguration => "malformed_configuration",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while resolving a configuration document into a snapshot
///
/// Every variant aborts the current load attempt only.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    #[error("message \"{message}\" references unknown address \"{address}\"")]
    UnknownAddress { message: String, address: String },

    #[error("message \"{message}\" argument {index} is invalid: {reason}")]
    InvalidArgument {
        message: String,
        index: usize,
        reason: String,
    },

    #[error("name \"{name}\" is defined both as a message and as a bundle")]
    NameClash { name: String },

    #[error("{section} name \"{name}\" is defined more than once")]
    DuplicateName { section: &'static str, name: String },

    #[error("bundle \"{group}\" references \"{member}\", which is neither a message nor a bundle")]
    UnresolvedMember { group: String, member: String },

    #[error("bundle \"{name}\" contains itself: {}", .path.join(" -> "))]
    Cycle { name: String, path: Vec<String> },

    #[error("source \"{trigger}\" references unknown message or bundle \"{target}\"")]
    UnknownTarget { trigger: String, target: String },

    #[error("malformed configuration: {0}")]
    MalformedConfiguration(String),
}

impl ResolveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ResolveError::UnknownAddress { .. } => ErrorKind::UnknownAddress,
            ResolveError::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            ResolveError::NameClash { .. } => ErrorKind::NameClash,
            ResolveError::DuplicateName { .. } => ErrorKind::DuplicateName,
            ResolveError::UnresolvedMember { .. } => ErrorKind::UnresolvedMember,
            ResolveError::Cycle { .. } => ErrorKind::Cycle,
            ResolveError::UnknownTarget { .. } => ErrorKind::UnknownTarget,
            ResolveError::MalformedConfiguration(_) => ErrorKind::MalformedConfiguration,
        }
    }

    /// The definition the diagnostic is about, when there is one
    pub fn subject(&self) -> Option<&str> {
        match self {
            ResolveError::UnknownAddress { message, .. } => Some(message),
            ResolveError::InvalidArgument { message, .. } => Some(message),
            ResolveError::NameClash { name } => Some(name),
            ResolveError::DuplicateName { name, .. } => Some(name),
            ResolveError::UnresolvedMember { group, .. } => Some(group),
            ResolveError::Cycle { name, .. } => Some(name),
            ResolveError::UnknownTarget { trigger, .. } => Some(trigger),
            ResolveError::MalformedConfiguration(_) => None,
        }
    }
}

/// A failed load attempt: one or more diagnostics, never empty
#[derive(Debug, Clone, PartialEq)]
pub struct LoadFailure {
    diagnostics: Vec<ResolveError>,
}

impl LoadFailure {
    pub fn new(diagnostics: Vec<ResolveError>) -> Self {
        debug_assert!(!diagnostics.is_empty());
        Self { diagnostics }
    }

    pub fn diagnostics(&self) -> &[ResolveError] {
        &self.diagnostics
    }

    /// Kind of the first diagnostic
    pub fn kind(&self) -> Option<ErrorKind> {
        self.diagnostics.first().map(ResolveError::kind)
    }

    pub fn has_kind(&self, kind: ErrorKind) -> bool {
        self.diagnostics.iter().any(|d| d.kind() == kind)
    }
}

impl From<ResolveError> for LoadFailure {
    fn from(err: ResolveError) -> Self {
        Self::new(vec![err])
    }
}

impl fmt::Display for LoadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.diagnostics.as_slice() {
            [single] => write!(f, "{}", single),
            many => {
                write!(f, "{} errors", many.len())?;
                for d in many {
                    write!(f, "; {}", d)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for LoadFailure {}

/// Errors from the UDP send primitive
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to open UDP socket: {0}")]
    Socket(#[source] std::io::Error),

    #[error("could not resolve {host}:{port}: {source}")]
    Resolve {
        host: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("no address found for {host}:{port}")]
    NoAddress { host: String, port: u16 },

    #[error("send to {destination} failed: {source}")]
    Send {
        destination: String,
        #[source]
        source: std::io::Error,
    },

    #[error("short send to {destination}: {sent} of {expected} bytes")]
    ShortSend {
        destination: String,
        sent: usize,
        expected: usize,
    },
}

/// Errors from decoding OSC packets
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("packet truncated at offset {0}")]
    Truncated(usize),

    #[error("string at offset {0} is not NUL-terminated")]
    UnterminatedString(usize),

    #[error("string at offset {0} is not valid UTF-8")]
    InvalidUtf8(usize),

    #[error("type tag string must start with ','")]
    MissingTypeTags,

    #[error("unsupported type tag '{0}'")]
    UnsupportedTag(char),

    #[error("bundle element size {size} at offset {offset} is invalid")]
    InvalidElementSize { offset: usize, size: i32 },

    #[error("packet is neither a message nor a bundle")]
    UnknownPacket,
}

/// Top-level error for the host integration and CLI
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Load failed: {0}")]
    Load(#[from] LoadFailure),

    /// `check` found problems; `report` is the rendered result
    #[error("configuration is invalid")]
    InvalidConfiguration { report: String },

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Serialization(err.to_string())
    }
}
