//! OSC Sender: Configuration-Driven OSC Dispatch
//!
//! Resolves a JSON configuration of OSC addresses, messages, nested bundles,
//! and trigger sources into immutable, pre-encoded payloads, and sends the
//! payload configured for a source over UDP when that source becomes active.
//!
//! Resolution is all-or-nothing: a configuration with any error installs
//! nothing, and a previously installed snapshot keeps serving dispatches.

pub mod config;
pub mod dispatch;
pub mod document;
pub mod error;
pub mod host;
pub mod logging;
pub mod osc;
pub mod resolver;
pub mod state;
pub mod tooling;

pub use dispatch::{DispatchOutcome, Dispatcher, Transport, UdpTransport};
pub use document::ConfigDocument;
pub use error::{ApiError, ErrorKind, LoadFailure, ResolveError};
pub use resolver::{resolve, Snapshot};
pub use state::{LoadOutcome, LoadStatus, ResolverState};
