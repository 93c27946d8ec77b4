//! Property tests for the path grammar and index algebra.

use pathbind::{CollectionKind, Path};
use proptest::prelude::*;

/// One segment expression: a name plus an optional collection suffix.
fn segment() -> impl Strategy<Value = String> {
    let name = "[a-zA-Z][a-zA-Z0-9]{0,6}";
    let suffix = prop_oneof![
        Just(String::new()),
        Just("[]".to_string()),
        Just("<>".to_string()),
        Just("{}".to_string()),
        (0u16..500).prop_map(|i| format!("[{i}]")),
        (0u16..500).prop_map(|i| format!("<{i}>")),
        "[a-z0-9]{1,5}".prop_map(|k| format!("{{{k}}}")),
        "0[0-9]{1,3}".prop_map(|i| format!("[{i}]")),
        "0[0-9]{1,3}".prop_map(|i| format!("<{i}>")),
        (0u16..500).prop_map(|i| format!("[+{i}]")),
    ];
    (name, suffix).prop_map(|(n, s)| format!("{n}{s}"))
}

fn path_expr() -> impl Strategy<Value = String> {
    let root = prop_oneof![
        Just(None),
        Just(Some("[]".to_string())),
        (0u16..50).prop_map(|i| Some(format!("<{i}>"))),
    ];
    (root, prop::collection::vec(segment(), 1..6)).prop_map(|(root, segs)| {
        let mut parts: Vec<String> = root.into_iter().collect();
        parts.extend(segs);
        format!("/{}", parts.join("/"))
    })
}

proptest! {
    #[test]
    fn prop_display_round_trip(expr in path_expr()) {
        let path = Path::parse(&expr).unwrap();
        prop_assert_eq!(path.to_string(), expr.clone());
        prop_assert_eq!(expr.parse::<Path>().unwrap(), path);
    }

    #[test]
    fn prop_serde_round_trip(expr in path_expr()) {
        let path = Path::parse(&expr).unwrap();
        let json = serde_json::to_string(&path).unwrap();
        prop_assert_eq!(serde_json::from_str::<Path>(&json).unwrap(), path);
    }

    #[test]
    fn prop_set_index_is_idempotent(segs in prop::collection::vec(segment(), 1..5), n in 0i64..1000) {
        let expr = format!("/{}/lineItems<>", segs.join("/"));
        let mut path = Path::parse(&expr).unwrap();
        path.set_collection_index("lineItems<>", n).unwrap();

        let last = path.last_segment();
        prop_assert_eq!(last.kind(), CollectionKind::List);
        prop_assert_eq!(last.index(), Some(n as usize));

        let again = path.with_collection_index("lineItems", n).unwrap();
        prop_assert_eq!(again, path);
    }

    #[test]
    fn prop_de_collectionify_all_removes_collections(expr in path_expr()) {
        let path = Path::parse(&expr).unwrap();
        let plain = path.de_collectionify_all();
        prop_assert_eq!(plain.len(), path.len());
        prop_assert_eq!(plain.collection_segment_count(), usize::from(path.has_collection_root()));
    }
}
