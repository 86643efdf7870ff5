mod common;

use proptest::prelude::*;
use secure_envelope::api::{Any, ErrorCode, Payload};
use secure_envelope::crypto::{Cipher, Signer};
use secure_envelope::{
    open_payload, seal_payload, signature, status, EnvelopeError, EnvelopeOptions, State,
};

use common::{payload, public_key, sealing, unsealing};

#[test]
fn test_seal_and_open() {
    let msg = seal_payload(payload(), sealing()).unwrap();

    // Survives the wire.
    let data = serde_json::to_vec(&msg).unwrap();
    let incoming = serde_json::from_slice(&data).unwrap();

    let opened = open_payload(incoming, unsealing()).unwrap();
    assert_eq!(opened, payload());
}

#[test]
fn test_sealed_envelope_fields() {
    let msg = seal_payload(payload(), sealing()).unwrap();

    assert!(msg.sealed);
    assert!(!msg.id.is_empty());
    assert!(!msg.timestamp.is_empty());
    assert!(!msg.payload.is_empty());
    assert!(!msg.hmac.is_empty());
    assert!(msg.error.is_none());
    assert_eq!(msg.encryption_algorithm, "AES256-GCM");
    assert_eq!(msg.hmac_algorithm, "HMAC-SHA256");

    // Wrapped with a 2048-bit key.
    assert_eq!(msg.encryption_key.len(), 256);
    assert_eq!(msg.hmac_secret.len(), 256);

    assert!(msg.public_key_signature.starts_with("SHA256:"));
    assert_eq!(msg.public_key_signature.len(), 50);
    assert!(signature::matches(&msg.public_key_signature, &public_key()));

    assert_eq!(status(&msg), State::SEALED);
}

#[test]
fn test_seal_requires_valid_payload_and_key() {
    let mut incomplete = payload();
    incomplete.transaction = None;
    let err = seal_payload(incomplete, sealing()).unwrap_err();
    assert!(matches!(err.fault(), Some(EnvelopeError::NoTransactionPayload)));

    let unsent = Payload {
        sent_at: String::new(),
        ..payload()
    };
    let err = seal_payload(unsent, sealing()).unwrap_err();
    assert!(matches!(err.fault(), Some(EnvelopeError::NoSentAtPayload)));

    let err = seal_payload(payload(), EnvelopeOptions::new()).unwrap_err();
    assert!(matches!(err.fault(), Some(EnvelopeError::CannotSeal)));
}

#[test]
fn test_envelope_id_and_timestamp_options() {
    let ts = chrono::DateTime::parse_from_rfc3339("2022-03-29T14:16:27.453444Z")
        .unwrap()
        .with_timezone(&chrono::Utc);

    let msg = seal_payload(
        payload(),
        sealing().envelope_id("transfer-42").timestamp(ts),
    )
    .unwrap();

    assert_eq!(msg.id, "transfer-42");
    assert_eq!(msg.timestamp, "2022-03-29T14:16:27.453444Z");
    assert_eq!(secure_envelope::timestamp(&msg).unwrap(), ts);
}

#[test]
fn test_undecodable_payload_is_rejected() {
    // A well formed envelope whose plaintext is not a payload.
    let options = EnvelopeOptions::new().aes_gcm(&[], &[]);
    let mut env = secure_envelope::Envelope::new(payload(), options).unwrap();
    env.encrypt().unwrap();

    let crypto = env.crypto().unwrap();
    let ciphertext = crypto.encrypt(b"not protobuf").unwrap();
    let hmac = crypto.sign(&ciphertext).unwrap();

    let mut msg = env.into_proto();
    msg.payload = ciphertext;
    msg.hmac = hmac;

    let failure = open_payload(msg, EnvelopeOptions::new()).unwrap_err();
    let err = failure.rejection().unwrap();
    assert_eq!(err.code, ErrorCode::ENVELOPE_DECODE_FAIL);
    assert!(!err.retry);
}

#[test]
fn test_encrypted_payload_is_protobuf() {
    let mut env = secure_envelope::Envelope::new(payload(), EnvelopeOptions::new()).unwrap();
    env.encrypt().unwrap();

    let plaintext = env.crypto().unwrap().decrypt(&env.proto().payload).unwrap();
    assert_eq!(plaintext[0], 0x0a, "identity is field 1");
    assert_eq!(Payload::from_protobuf(&plaintext).unwrap(), payload());
}

fn arb_any() -> impl Strategy<Value = Option<Any>> {
    proptest::option::of(
        ("[a-z./]{1,40}", proptest::collection::vec(any::<u8>(), 0..512))
            .prop_map(|(type_url, value)| Any::new(type_url, value)),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_round_trip(identity in arb_any(), transaction in arb_any(), note in ".{0,64}") {
        // Validation needs both halves; the step-wise API encrypts anything.
        let payload = Payload {
            identity,
            transaction,
            sent_at: String::new(),
            received_at: note,
        };

        let mut env = secure_envelope::Envelope::new(payload.clone(), sealing()).unwrap();
        env.encrypt().unwrap();
        env.seal().unwrap();

        let opened = open_payload(env.into_proto(), unsealing()).unwrap();
        prop_assert_eq!(opened, payload);
    }

    #[test]
    fn prop_bit_flip_detected(
        byte in any::<prop::sample::Index>(),
        bit in 0u8..8,
        in_hmac in any::<bool>()
    ) {
        let mut msg = seal_payload(payload(), sealing()).unwrap();

        let target = if in_hmac { &mut msg.hmac } else { &mut msg.payload };
        let idx = byte.index(target.len());
        target[idx] ^= 1 << bit;

        let failure = open_payload(msg, unsealing()).unwrap_err();
        let err = failure.rejection().unwrap();
        prop_assert_eq!(err.code, ErrorCode::INVALID_SIGNATURE);
        prop_assert!(!err.retry);
    }
}
