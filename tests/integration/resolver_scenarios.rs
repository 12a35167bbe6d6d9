use osc_sender::osc::{decode_packet, Argument, Packet, IMMEDIATELY};
use osc_sender::resolver::PayloadKind;
use osc_sender::{resolve, ConfigDocument, ErrorKind, ResolveError};

use crate::integration::support::document;

fn resolve_text(text: &str) -> Result<osc_sender::Snapshot, osc_sender::LoadFailure> {
    let document = ConfigDocument::from_json_str(text).unwrap();
    resolve(&document)
}

#[test]
fn single_message_bundle_resolves_end_to_end() {
    let snapshot = resolve_text(&document(
        r#""a": "/x""#,
        r#""m1": {"ADDRESS": "a", "ARGUMENTS": [1, "hi"]}"#,
        r#""b1": ["m1"]"#,
        r#""src1": "b1""#,
    ))
    .unwrap();

    let (target, payload) = snapshot.payload_for_trigger("src1").unwrap();
    assert_eq!(target, "b1");
    assert_eq!(payload.kind(), PayloadKind::Bundle);

    match decode_packet(payload.bytes()).unwrap() {
        Packet::Bundle { timetag, elements } => {
            assert_eq!(timetag, IMMEDIATELY);
            assert_eq!(
                elements,
                vec![Packet::Message {
                    path: "/x".to_string(),
                    args: vec![Argument::Int(1), Argument::Str("hi".to_string())],
                }]
            );
        }
        other => panic!("expected bundle, got {:?}", other),
    }
}

#[test]
fn nested_bundles_concatenate_members_in_declared_order() {
    let snapshot = resolve_text(&document(
        r#""a": "/a", "b": "/b""#,
        r#""m1": {"ADDRESS": "a", "ARGUMENTS": [1]},
           "m2": {"ADDRESS": "b", "ARGUMENTS": [2.5, true]},
           "m3": {"ADDRESS": "a", "ARGUMENTS": []}"#,
        r#""outer": ["m3", "inner", "m1"], "inner": ["m2", "m1"]"#,
        r#""go": "outer""#,
    ))
    .unwrap();

    let payload = snapshot.registry().get("outer").unwrap();
    let packet = decode_packet(payload.bytes()).unwrap();
    let paths: Vec<&str> = packet.messages().into_iter().map(|(p, _)| p).collect();
    assert_eq!(paths, vec!["/a", "/b", "/a", "/a"]);
    assert_eq!(packet.to_string(), "[/a, [/b 2.5 true, /a 1], /a 1]");

    // The nested element is byte-identical to the standalone bundle
    let inner = snapshot.registry().get("inner").unwrap().bytes();
    assert!(payload
        .bytes()
        .windows(inner.len())
        .any(|window| window == inner));
}

#[test]
fn mutual_bundle_reference_is_cycle() {
    let failure = resolve_text(&document(
        "",
        "",
        r#""b1": ["b2"], "b2": ["b1"]"#,
        "",
    ))
    .unwrap_err();

    assert_eq!(failure.kind(), Some(ErrorKind::Cycle));
    match &failure.diagnostics()[0] {
        ResolveError::Cycle { path, .. } => {
            assert_eq!(path.first(), path.last());
            assert_eq!(path.len(), 3);
        }
        other => panic!("expected cycle, got {:?}", other),
    }
}

#[test]
fn message_and_bundle_sharing_a_name_clash_even_when_unreferenced() {
    let failure = resolve_text(&document(
        r#""a": "/x""#,
        r#""x": {"ADDRESS": "a", "ARGUMENTS": []}"#,
        r#""x": [], "other": []"#,
        "",
    ))
    .unwrap_err();
    assert_eq!(failure.kind(), Some(ErrorKind::NameClash));
    assert_eq!(failure.diagnostics()[0].subject(), Some("x"));
}

#[test]
fn unknown_targets_are_reported_per_entry() {
    let failure = resolve_text(&document(
        r#""a": "/x""#,
        r#""m1": {"ADDRESS": "a", "ARGUMENTS": []}"#,
        "",
        r#""good": "m1", "bad1": "ghost", "bad2": "phantom""#,
    ))
    .unwrap_err();

    let subjects: Vec<_> = failure
        .diagnostics()
        .iter()
        .map(|d| (d.kind(), d.subject()))
        .collect();
    assert_eq!(
        subjects,
        vec![
            (ErrorKind::UnknownTarget, Some("bad1")),
            (ErrorKind::UnknownTarget, Some("bad2")),
        ]
    );
}

#[test]
fn message_errors_name_the_offender() {
    let unknown_address = resolve_text(&document(
        r#""a": "/x""#,
        r#""m1": {"ADDRESS": "nowhere", "ARGUMENTS": []}"#,
        "",
        "",
    ))
    .unwrap_err();
    assert_eq!(unknown_address.kind(), Some(ErrorKind::UnknownAddress));
    assert_eq!(unknown_address.diagnostics()[0].subject(), Some("m1"));

    let invalid_argument = resolve_text(&document(
        r#""a": "/x""#,
        r#""m1": {"ADDRESS": "a", "ARGUMENTS": [1, null]}"#,
        "",
        "",
    ))
    .unwrap_err();
    assert!(matches!(
        &invalid_argument.diagnostics()[0],
        ResolveError::InvalidArgument { message, index: 1, .. } if message == "m1"
    ));
}

#[test]
fn integer_arguments_wider_than_64_bits_are_invalid() {
    for literal in ["100000000000000000000", "-9223372036854775809"] {
        let failure = resolve_text(&document(
            r#""a": "/x""#,
            &format!(r#""m1": {{"ADDRESS": "a", "ARGUMENTS": ["s", {literal}]}}"#),
            "",
            "",
        ))
        .unwrap_err();
        assert_eq!(failure.kind(), Some(ErrorKind::InvalidArgument));
        assert!(matches!(
            &failure.diagnostics()[0],
            ResolveError::InvalidArgument { message, index: 1, .. } if message == "m1"
        ));
    }
}

#[test]
fn bundle_member_that_names_nothing_is_unresolved() {
    let failure = resolve_text(&document("", "", r#""b1": ["missing"]"#, "")).unwrap_err();
    assert_eq!(
        failure.diagnostics(),
        &[ResolveError::UnresolvedMember {
            group: "b1".to_string(),
            member: "missing".to_string(),
        }]
    );
}

#[test]
fn missing_section_is_malformed() {
    let err = ConfigDocument::from_json_str(
        r#"{"HOST": "127.0.0.1", "PORT": 9000, "ADDRESSES": {}, "MESSAGES": {}, "BUNDLES": {}}"#,
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedConfiguration);
}

#[test]
fn large_integers_encode_as_64_bit() {
    let snapshot = resolve_text(&document(
        r#""a": "/big""#,
        r#""m1": {"ADDRESS": "a", "ARGUMENTS": [2147483648]}"#,
        "",
        "",
    ))
    .unwrap();
    let packet = decode_packet(snapshot.registry().get("m1").unwrap().bytes()).unwrap();
    assert_eq!(
        packet,
        Packet::Message {
            path: "/big".to_string(),
            args: vec![Argument::Long(2_147_483_648)],
        }
    );
}
