use osc_sender::error::TransportError;
use osc_sender::resolver::Destination;
use osc_sender::Transport;
use parking_lot::Mutex;

/// Keeps every payload instead of sending it
#[derive(Default)]
pub struct RecordingTransport {
    pub sent: Mutex<Vec<(Destination, Vec<u8>)>>,
}

impl RecordingTransport {
    pub fn payloads(&self) -> Vec<Vec<u8>> {
        self.sent
            .lock()
            .iter()
            .map(|(_, bytes)| bytes.clone())
            .collect()
    }
}

impl Transport for RecordingTransport {
    fn send(&self, destination: &Destination, payload: &[u8]) -> Result<(), TransportError> {
        self.sent
            .lock()
            .push((destination.clone(), payload.to_vec()));
        Ok(())
    }
}

/// Build a document from section bodies; host and port are fixed
pub fn document(addresses: &str, messages: &str, bundles: &str, sources: &str) -> String {
    format!(
        r#"{{"HOST": "127.0.0.1", "PORT": 9000,
            "ADDRESSES": {{{}}}, "MESSAGES": {{{}}},
            "BUNDLES": {{{}}}, "SOURCES": {{{}}}}}"#,
        addresses, messages, bundles, sources
    )
}
