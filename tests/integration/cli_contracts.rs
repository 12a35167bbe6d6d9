use std::fs;
use std::net::UdpSocket;
use std::time::Duration;

use osc_sender::config::HostSettings;
use osc_sender::osc::decode_packet;
use osc_sender::tooling::cli::{CliContext, Commands, OutputFormat};
use osc_sender::ApiError;
use tempfile::TempDir;

use crate::integration::support::document;

fn context_with(temp_dir: &TempDir, text: &str) -> CliContext {
    let path = temp_dir.path().join("show.json");
    fs::write(&path, text).unwrap();
    CliContext::from_settings(HostSettings {
        config_path: Some(path),
        ..HostSettings::default()
    })
}

fn check_json() -> Commands {
    Commands::Check {
        format: OutputFormat::Json,
    }
}

#[test]
fn check_json_contract_for_valid_document() {
    let temp_dir = TempDir::new().unwrap();
    let cli = context_with(
        &temp_dir,
        &document(
            r#""a": "/x""#,
            r#""m1": {"ADDRESS": "a", "ARGUMENTS": [1, "hi"]}"#,
            r#""b1": ["m1"], "b2": ["b1", "m1"]"#,
            r#""src1": "b1""#,
        ),
    );

    let output = cli.execute(&check_json()).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(parsed["valid"], true);
    assert_eq!(parsed["host"], "127.0.0.1");
    assert_eq!(parsed["port"], 9000);
    assert_eq!(parsed["messages"], 1);
    assert_eq!(parsed["bundles"], 2);
    assert_eq!(parsed["sources"], 1);
    assert!(parsed["errors"].as_array().unwrap().is_empty());
}

#[test]
fn check_json_contract_for_invalid_document() {
    let temp_dir = TempDir::new().unwrap();
    let cli = context_with(
        &temp_dir,
        &document(
            r#""a": "/x""#,
            r#""m1": {"ADDRESS": "a", "ARGUMENTS": []}"#,
            "",
            r#""s1": "nope", "s2": "m1", "s3": "gone""#,
        ),
    );

    let report = match cli.execute(&check_json()) {
        Err(ApiError::InvalidConfiguration { report }) => report,
        other => panic!("expected invalid configuration, got {:?}", other),
    };
    let parsed: serde_json::Value = serde_json::from_str(&report).unwrap();
    assert_eq!(parsed["valid"], false);
    let errors = parsed["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0]["kind"], "unknown_target");
    assert!(errors[0]["message"].as_str().unwrap().contains("s1"));
}

#[test]
fn check_reports_unparseable_file_as_malformed() {
    let temp_dir = TempDir::new().unwrap();
    let cli = context_with(&temp_dir, "{ \"HOST\": ");

    let Err(ApiError::InvalidConfiguration { report }) = cli.execute(&check_json()) else {
        panic!("expected invalid configuration");
    };
    let parsed: serde_json::Value = serde_json::from_str(&report).unwrap();
    assert_eq!(parsed["errors"][0]["kind"], "malformed_configuration");
}

#[test]
fn fire_sends_one_datagram() {
    let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
    receiver
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();
    let port = receiver.local_addr().unwrap().port();

    let temp_dir = TempDir::new().unwrap();
    let text = document(
        r#""a": "/x""#,
        r#""m1": {"ADDRESS": "a", "ARGUMENTS": [1, "hi"]}"#,
        r#""b1": ["m1"]"#,
        r#""src1": "b1""#,
    )
    .replace("9000", &port.to_string());
    let cli = context_with(&temp_dir, &text);

    let output = cli
        .execute(&Commands::Fire {
            source: "src1".to_string(),
        })
        .unwrap();
    assert!(output.contains("b1"));

    let mut buf = [0u8; 1024];
    let (len, _) = receiver.recv_from(&mut buf).unwrap();
    let packet = decode_packet(&buf[..len]).unwrap();
    assert_eq!(packet.to_string(), "[/x 1 \"hi\"]");
}

#[test]
fn settings_command_renders_toml() {
    let temp_dir = TempDir::new().unwrap();
    let cli = context_with(&temp_dir, "{}");
    let output = cli.execute(&Commands::Settings).unwrap();
    let parsed: HostSettings = toml::from_str(&output).unwrap();
    assert_eq!(&parsed, cli.settings());
}
