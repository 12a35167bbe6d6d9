use osc_sender::osc::decode_packet;
use osc_sender::{resolve, ConfigDocument, ErrorKind};
use proptest::prelude::*;

const MESSAGES: usize = 4;

/// Bundle `g{i}` lists members that are messages `m*` or earlier bundles
fn dag_strategy() -> impl Strategy<Value = Vec<Vec<String>>> {
    prop::collection::vec(prop::collection::vec((any::<bool>(), 0usize..8), 0..6), 1..8)
        .prop_map(|raw| {
            raw.into_iter()
                .enumerate()
                .map(|(i, members)| {
                    members
                        .into_iter()
                        .map(|(nested, n)| {
                            if nested && i > 0 {
                                format!("g{}", n % i)
                            } else {
                                format!("m{}", n % MESSAGES)
                            }
                        })
                        .collect()
                })
                .collect()
        })
}

fn document_for(bundles: &[Vec<String>], sources: &str) -> ConfigDocument {
    let addresses: Vec<String> = (0..MESSAGES)
        .map(|i| format!(r#""a{i}": "/m/{i}""#))
        .collect();
    let messages: Vec<String> = (0..MESSAGES)
        .map(|i| format!(r#""m{i}": {{"ADDRESS": "a{i}", "ARGUMENTS": [{i}]}}"#))
        .collect();
    // Declare bundles in reverse so every nested reference is a forward one
    let groups: Vec<String> = bundles
        .iter()
        .enumerate()
        .rev()
        .map(|(i, members)| {
            let quoted: Vec<String> = members.iter().map(|m| format!("\"{m}\"")).collect();
            format!(r#""g{i}": [{}]"#, quoted.join(", "))
        })
        .collect();
    let text = format!(
        r#"{{"HOST": "localhost", "PORT": 8000, "ADDRESSES": {{{}}}, "MESSAGES": {{{}}},
            "BUNDLES": {{{}}}, "SOURCES": {{{}}}}}"#,
        addresses.join(", "),
        messages.join(", "),
        groups.join(", "),
        sources
    );
    ConfigDocument::from_json_str(&text).unwrap()
}

fn expand(name: &str, bundles: &[Vec<String>], out: &mut Vec<String>) {
    match name.strip_prefix('g') {
        Some(index) => {
            let index: usize = index.parse().unwrap();
            for member in &bundles[index] {
                expand(member, bundles, out);
            }
        }
        None => out.push(format!("/m/{}", &name[1..])),
    }
}

proptest! {
    #[test]
    fn bundles_flatten_in_declared_order(bundles in dag_strategy()) {
        let snapshot = resolve(&document_for(&bundles, "")).unwrap();
        prop_assert_eq!(snapshot.registry().len(), MESSAGES + bundles.len());

        for i in 0..bundles.len() {
            let name = format!("g{i}");
            let packet = decode_packet(snapshot.registry().get(&name).unwrap().bytes()).unwrap();
            let paths: Vec<String> = packet
                .messages()
                .into_iter()
                .map(|(path, _)| path.to_string())
                .collect();
            let mut expected = Vec::new();
            expand(&name, &bundles, &mut expected);
            prop_assert_eq!(paths, expected);
        }
    }

    #[test]
    fn resolving_twice_is_bit_identical(bundles in dag_strategy()) {
        let document = document_for(&bundles, r#""go": "g0""#);
        let first = resolve(&document).unwrap();
        let second = resolve(&document).unwrap();
        let first: Vec<_> = first.registry().iter().map(|(n, p)| (n.to_string(), p.bytes().to_vec())).collect();
        let second: Vec<_> = second.registry().iter().map(|(n, p)| (n.to_string(), p.bytes().to_vec())).collect();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn closing_a_chain_is_always_a_cycle(depth in 1usize..40) {
        let bundles: Vec<Vec<String>> = (0..depth)
            .map(|i| vec!["m0".to_string(), format!("g{}", (i + 1) % depth)])
            .collect();
        let failure = resolve(&document_for(&bundles, "")).unwrap_err();
        prop_assert_eq!(failure.kind(), Some(ErrorKind::Cycle));
    }
}
