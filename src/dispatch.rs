//! Dispatch: trigger name to payload to transport.

use crate::error::TransportError;
use crate::resolver::Destination;
use crate::state::ResolverState;
use parking_lot::Mutex;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::sync::Arc;
use tracing::{debug, info};

/// Fire-and-forget send primitive
pub trait Transport: Send + Sync {
    fn send(&self, destination: &Destination, payload: &[u8]) -> Result<(), TransportError>;
}

/// One UDP datagram per payload, no retries
///
/// IPv4 destinations go out through a socket bound at construction; the
/// IPv6 socket is bound on first use.
pub struct UdpTransport {
    v4: UdpSocket,
    v6: Mutex<Option<Arc<UdpSocket>>>,
}

impl UdpTransport {
    /// Bind an ephemeral local socket
    pub fn bind() -> Result<Self, TransportError> {
        let v4 = UdpSocket::bind(("0.0.0.0", 0)).map_err(TransportError::Socket)?;
        Ok(Self {
            v4,
            v6: Mutex::new(None),
        })
    }

    fn v6_socket(&self) -> Result<Arc<UdpSocket>, TransportError> {
        let mut slot = self.v6.lock();
        if let Some(socket) = slot.as_ref() {
            return Ok(Arc::clone(socket));
        }
        let socket = Arc::new(UdpSocket::bind(("::", 0)).map_err(TransportError::Socket)?);
        *slot = Some(Arc::clone(&socket));
        Ok(socket)
    }

    fn send_to(
        &self,
        destination: &Destination,
        addr: SocketAddr,
        payload: &[u8],
    ) -> Result<(), TransportError> {
        let sent = match addr {
            SocketAddr::V4(_) => self.v4.send_to(payload, addr),
            SocketAddr::V6(_) => self.v6_socket()?.send_to(payload, addr),
        }
        .map_err(|source| TransportError::Send {
            destination: destination.to_string(),
            source,
        })?;
        if sent != payload.len() {
            return Err(TransportError::ShortSend {
                destination: destination.to_string(),
                sent,
                expected: payload.len(),
            });
        }
        Ok(())
    }
}

impl Transport for UdpTransport {
    /// Tries each resolved address in order until one accepts the datagram
    fn send(&self, destination: &Destination, payload: &[u8]) -> Result<(), TransportError> {
        let addrs = (destination.host.as_str(), destination.port)
            .to_socket_addrs()
            .map_err(|source| TransportError::Resolve {
                host: destination.host.clone(),
                port: destination.port,
                source,
            })?;

        let mut last_error = None;
        for addr in addrs {
            match self.send_to(destination, addr, payload) {
                Ok(()) => return Ok(()),
                Err(err) => {
                    debug!(%addr, error = %err, "Send failed, trying next address");
                    last_error = Some(err);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| TransportError::NoAddress {
            host: destination.host.clone(),
            port: destination.port,
        }))
    }
}

/// What a dispatch did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Payload for `target` handed to the transport
    Sent { target: String, bytes: usize },
    /// No snapshot installed
    NotLoaded,
    /// Trigger has no configured reaction
    NoTrigger,
}

impl DispatchOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, DispatchOutcome::Sent { .. })
    }
}

/// Looks triggers up in the installed snapshot and sends their payloads
pub struct Dispatcher<'a> {
    state: &'a ResolverState,
    transport: &'a dyn Transport,
}

impl<'a> Dispatcher<'a> {
    pub fn new(state: &'a ResolverState, transport: &'a dyn Transport) -> Self {
        Self { state, transport }
    }

    /// Send the payload configured for `trigger`, if any.
    ///
    /// Reads the snapshot installed at call time; a reload that completes
    /// meanwhile does not affect this dispatch. A failed reload installs
    /// nothing, so dispatch keeps sending from the last valid snapshot even
    /// while [`ResolverState::is_valid`] reports `false`.
    pub fn dispatch(&self, trigger: &str) -> Result<DispatchOutcome, TransportError> {
        let Some(snapshot) = self.state.current() else {
            debug!(trigger, "No configuration loaded, ignoring activation");
            return Ok(DispatchOutcome::NotLoaded);
        };
        let Some((target, payload)) = snapshot.payload_for_trigger(trigger) else {
            debug!(trigger, "No message or bundle configured for source");
            return Ok(DispatchOutcome::NoTrigger);
        };

        self.transport.send(snapshot.destination(), payload.bytes())?;
        info!(
            trigger,
            name = target,
            kind = %payload.kind(),
            bytes = payload.bytes().len(),
            destination = %snapshot.destination(),
            "Payload sent"
        );
        Ok(DispatchOutcome::Sent {
            target: target.to_string(),
            bytes: payload.bytes().len(),
        })
    }
}
