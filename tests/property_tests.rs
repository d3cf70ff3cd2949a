//! Property-based tests for the round-trip guarantees of both grammars.

use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use serde_xdl::{
    decode_json, decode_xdl, encode_json, encode_xdl, from_str, to_string, Dict, Var,
};

/// Largest magnitude at which every integer is exactly representable.
const MAX_SAFE: i64 = 1 << 53;

fn roundtrip<T: Serialize + for<'de> Deserialize<'de> + PartialEq + std::fmt::Debug>(
    value: &T,
) -> bool {
    match to_string(value) {
        Ok(serialized) => match from_str::<T>(&serialized) {
            Ok(deserialized) => *value == deserialized,
            Err(e) => {
                eprintln!("Deserialize failed: {}", e);
                eprintln!("Serialized was: {}", serialized);
                false
            }
        },
        Err(e) => {
            eprintln!("Serialize failed: {}", e);
            false
        }
    }
}

fn tag() -> impl Strategy<Value = Option<String>> {
    proptest::option::of("[A-Z][A-Za-z0-9_]{0,6}")
}

fn key() -> impl Strategy<Value = String> {
    prop_oneof!["[a-z_][a-z0-9_]{0,8}", ".{0,6}"]
}

/// Acyclic trees without NONE or NaN, the constructs that do not survive
/// a text round trip unchanged.
fn var_tree() -> impl Strategy<Value = Var> {
    let leaf = prop_oneof![
        Just(Var::Nul),
        any::<bool>().prop_map(Var::Bool),
        (-MAX_SAFE..MAX_SAFE).prop_map(|n| Var::Number(n as f64)),
        any::<f64>()
            .prop_filter("finite", |n| n.is_finite())
            .prop_map(Var::Number),
        Just(Var::Number(f64::INFINITY)),
        ".{0,12}".prop_map(Var::String),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Var::from),
            (tag(), prop::collection::vec((key(), inner), 0..6)).prop_map(|(tag, fields)| {
                let mut dict: Dict = fields.into_iter().collect();
                dict.set_tag(tag);
                Var::from(dict)
            }),
        ]
    })
}

fn strip_for_json(v: &Var) -> bool {
    match v {
        Var::Number(n) => n.is_finite(),
        Var::Array(a) => a.borrow().iter().all(strip_for_json),
        Var::Object(o) => o.borrow().values().all(strip_for_json),
        _ => true,
    }
}

proptest! {
    #[test]
    fn prop_xdl_round_trip(v in var_tree()) {
        let text = encode_xdl(&v).unwrap();
        let back = decode_xdl(&text);
        prop_assert!(back.strict_eq(&v), "{} reparsed differently", text);
        prop_assert_eq!(encode_xdl(&back).unwrap(), text);
    }

    #[test]
    fn prop_json_round_trip(v in var_tree().prop_filter("finite numbers", strip_for_json)) {
        let text = encode_json(&v).unwrap();
        let back = decode_json(&text);
        prop_assert_eq!(&back, &v);
        prop_assert_eq!(encode_json(&back).unwrap(), text.clone());

        prop_assert!(serde_json::from_str::<serde_json::Value>(&text).is_ok());
    }

    #[test]
    fn prop_deep_clone_is_equal_and_detached(v in var_tree()) {
        let copy = v.deep_clone();
        prop_assert!(copy.strict_eq(&v));
        let mut copy = copy;
        if copy.push(Var::from("extra")).is_ok() {
            prop_assert!(copy != v);
        }
    }

    #[test]
    fn prop_pretty_parses_to_same_tree(v in var_tree()) {
        let pretty = serde_xdl::encode_with_options(&v, &serde_xdl::XdlOptions::pretty()).unwrap();
        prop_assert!(decode_xdl(&pretty).strict_eq(&v));
    }

    #[test]
    fn prop_base64_round_trip(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let encoded = serde_xdl::codec::encode_base64(&bytes);
        prop_assert_eq!(serde_xdl::codec::decode_base64(&encoded).unwrap(), bytes.clone());
        let hex = serde_xdl::codec::encode_hex(&bytes);
        prop_assert_eq!(serde_xdl::codec::decode_hex(&hex).unwrap(), bytes);
    }

    #[test]
    fn prop_never_panics_on_garbage(text in ".{0,40}") {
        let _ = decode_xdl(&text);
        let _ = decode_json(&text);
    }

    #[test]
    fn prop_i32(n in any::<i32>()) {
        prop_assert!(roundtrip(&n));
    }

    #[test]
    fn prop_i64_safe_range(n in -MAX_SAFE..MAX_SAFE) {
        prop_assert!(roundtrip(&n));
    }

    #[test]
    fn prop_u32(n in any::<u32>()) {
        prop_assert!(roundtrip(&n));
    }

    #[test]
    fn prop_bool(b in any::<bool>()) {
        prop_assert!(roundtrip(&b));
    }

    #[test]
    fn prop_string(s in ".{0,20}") {
        prop_assert!(roundtrip(&s));
    }

    #[test]
    fn prop_vec_i32(v in prop::collection::vec(any::<i32>(), 0..20)) {
        prop_assert!(roundtrip(&v));
    }

    #[test]
    fn prop_option_i32(opt in proptest::option::of(any::<i32>())) {
        prop_assert!(roundtrip(&opt));
    }

    #[test]
    fn prop_tuple_i32_bool(t in (any::<i32>(), any::<bool>())) {
        prop_assert!(roundtrip(&t));
    }
}
