// Property tests for canonicalization, DataUpdate framing, signing and
// token unit conversion.

use dagsign_crypto::{
    canonicalize, decode_data_update, encode_data_update, generate_key_pair, kryo_serialize,
    sign, token_to_units, units_to_token, verify_signature,
};
use proptest::prelude::*;
use serde_json::Value;

/// JSON values without floats. Integers stay inside the exactly
/// representable double range and keys stay ASCII.
fn json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-(1i64 << 53) + 1..(1i64 << 53)).prop_map(|n| serde_json::json!(n)),
        "\\PC{0,24}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map("[a-zA-Z_]{1,10}", inner, 0..6).prop_map(|m| {
                let map: serde_json::Map<String, Value> = m.into_iter().collect();
                Value::Object(map)
            }),
        ]
    })
}

proptest! {
    #[test]
    fn canonicalization_is_idempotent(value in json_value()) {
        let first = canonicalize(&value).unwrap();
        let reparsed: Value = serde_json::from_str(&first).unwrap();
        let second = canonicalize(&reparsed).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn canonical_output_has_no_insignificant_whitespace(
        keys in prop::collection::btree_set("[a-z]{1,8}", 1..6)
    ) {
        let object: serde_json::Map<String, Value> = keys
            .iter()
            .map(|k| (k.clone(), Value::from(1)))
            .collect();
        let canonical = canonicalize(&Value::Object(object)).unwrap();
        prop_assert!(!canonical.contains(' '));
        prop_assert!(!canonical.contains('\n'));
    }

    #[test]
    fn data_update_roundtrip(value in json_value()) {
        let bytes = encode_data_update(&value).unwrap();
        let decoded: Value = decode_data_update(&bytes).unwrap();
        prop_assert_eq!(decoded, value);
    }

    #[test]
    fn kryo_frame_wraps_message(message in "[ -~]{0,300}") {
        let framed = kryo_serialize(&message, false);
        prop_assert_eq!(framed[0], 0x03);
        prop_assert!(framed.ends_with(message.as_bytes()));
        prop_assert!(framed.len() <= message.len() + 3);
    }

    #[test]
    fn units_roundtrip_within_one_unit(units in 0i64..1_000_000_000_000_000) {
        let back = token_to_units(units_to_token(units));
        prop_assert!((back - units).abs() <= 1, "{} -> {}", units, back);
    }

    #[test]
    fn tokens_roundtrip_within_epsilon(tokens in 0.0f64..1_000_000.0) {
        let back = units_to_token(token_to_units(tokens));
        prop_assert!(back <= tokens + tokens * 1e-12);
        prop_assert!(tokens - back <= 1e-8 + tokens * 1e-12);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn sign_verify_roundtrip(value in json_value()) {
        let key_pair = generate_key_pair();
        let proof = sign(&value, &key_pair.private_key).unwrap();
        prop_assert!(verify_signature(&value, &proof, false));
        prop_assert!(!verify_signature(&value, &proof, true));
    }
}
