use std::fs;
use std::sync::Arc;
use std::thread;

use osc_sender::config::WatchSettings;
use osc_sender::host::{HostEvent, HostRuntime, RuntimeOptions};
use osc_sender::osc::decode_packet;
use osc_sender::{DispatchOutcome, Dispatcher, ErrorKind, LoadStatus, ResolverState};
use tempfile::TempDir;

use crate::integration::support::{document, RecordingTransport};

fn show(sources: &str) -> String {
    document(
        r#""a": "/x""#,
        r#""m1": {"ADDRESS": "a", "ARGUMENTS": [1, "hi"]}"#,
        r#""b1": ["m1"]"#,
        sources,
    )
}

#[test]
fn removed_trigger_misses_after_reload() {
    let state = ResolverState::new();
    let transport = RecordingTransport::default();
    let dispatcher = Dispatcher::new(&state, &transport);

    assert!(state.load_json(&show(r#""src1": "b1""#)).is_valid());
    assert!(dispatcher.dispatch("src1").unwrap().is_sent());

    assert!(state.load_json(&show(r#""src2": "m1""#)).is_valid());
    assert_eq!(
        dispatcher.dispatch("src1").unwrap(),
        DispatchOutcome::NoTrigger
    );
    assert!(dispatcher.dispatch("src2").unwrap().is_sent());
    assert_eq!(transport.payloads().len(), 2);
}

#[test]
fn failed_reload_keeps_serving_previous_snapshot() {
    let state = ResolverState::new();
    let transport = RecordingTransport::default();
    let dispatcher = Dispatcher::new(&state, &transport);

    state.load_json(&show(r#""src1": "b1""#));
    let outcome = state.load_json(&document("", "", r#""b1": ["b2"], "b2": ["b1"]"#, ""));
    assert_eq!(outcome.failure().unwrap().kind(), Some(ErrorKind::Cycle));
    assert_eq!(state.status(), LoadStatus::Invalid);
    assert!(!state.is_valid());

    assert!(dispatcher.dispatch("src1").unwrap().is_sent());
    let packet = decode_packet(&transport.payloads()[0]).unwrap();
    assert_eq!(packet.to_string(), "[/x 1 \"hi\"]");
}

#[test]
fn first_load_failure_installs_nothing() {
    let state = ResolverState::new();
    let transport = RecordingTransport::default();
    state.load_json(&document("", "", r#""b1": ["b2"], "b2": ["b1"]"#, ""));

    assert!(state.current().is_none());
    assert_eq!(
        Dispatcher::new(&state, &transport).dispatch("anything").unwrap(),
        DispatchOutcome::NotLoaded
    );
    assert!(transport.payloads().is_empty());
}

#[test]
fn runtime_serves_activations_from_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("show.json");
    fs::write(&path, show(r#""src1": "b1", "direct": "m1""#)).unwrap();

    let state = Arc::new(ResolverState::new());
    let transport = Arc::new(RecordingTransport::default());
    let runtime = HostRuntime::new(
        Arc::clone(&state),
        transport.clone(),
        RuntimeOptions {
            config_path: path,
            verbose: false,
            watch: WatchSettings {
                enabled: false,
                debounce_ms: 50,
            },
            settings_path: None,
        },
    );
    let tx = runtime.sender();
    let handle = thread::spawn(move || runtime.run().unwrap());

    for name in ["src1", "nobody", "direct"] {
        tx.send(HostEvent::Activated(name.to_string())).unwrap();
    }
    tx.send(HostEvent::Shutdown).unwrap();
    let stats = handle.join().unwrap();

    assert_eq!(stats.activations, 3);
    assert_eq!(stats.sent, 2);
    let rendered: Vec<String> = transport
        .payloads()
        .iter()
        .map(|bytes| decode_packet(bytes).unwrap().to_string())
        .collect();
    assert_eq!(rendered, vec!["[/x 1 \"hi\"]", "/x 1 \"hi\""]);
    assert_eq!(state.status(), LoadStatus::Unloaded);
}
