#![allow(dead_code)]

use std::sync::OnceLock;

use rand::rngs::OsRng;
use rsa::pkcs8::{EncodePrivateKey, LineEnding};
use rsa::RsaPrivateKey;
use secure_envelope::api::{Any, Payload, SecureEnvelope};
use secure_envelope::{CertificateKey, EnvelopeOptions, PrivateKey, PublicKey};

/// Two unrelated 2048-bit RSA keys, generated once per test binary.
pub fn rsa_keys() -> &'static (RsaPrivateKey, RsaPrivateKey) {
    static KEYS: OnceLock<(RsaPrivateKey, RsaPrivateKey)> = OnceLock::new();
    KEYS.get_or_init(|| {
        let generate = || RsaPrivateKey::new(&mut OsRng, 2048).unwrap();
        (generate(), generate())
    })
}

pub fn private_key() -> PrivateKey {
    PrivateKey::Rsa(rsa_keys().0.clone())
}

pub fn public_key() -> PublicKey {
    PublicKey::Rsa(rsa_keys().0.to_public_key())
}

pub fn other_private_key() -> PrivateKey {
    PrivateKey::Rsa(rsa_keys().1.clone())
}

pub fn sealing() -> EnvelopeOptions {
    EnvelopeOptions::new().sealing_key(public_key())
}

pub fn unsealing() -> EnvelopeOptions {
    EnvelopeOptions::new().unsealing_key(private_key())
}

/// Self-signed certificate over the first key, with its private key.
pub fn certificate_key() -> CertificateKey {
    let pkcs8 = rsa_keys().0.to_pkcs8_pem(LineEnding::LF).unwrap();
    let key_pair = rcgen::KeyPair::from_pem(&pkcs8).unwrap();
    let cert = rcgen::CertificateParams::new(vec!["beneficiary.example".to_string()])
        .unwrap()
        .self_signed(&key_pair)
        .unwrap();
    CertificateKey::from_x509_key_pair(cert.der(), private_key()).unwrap()
}

pub fn payload() -> Payload {
    Payload {
        identity: Some(Any::new(
            "type.googleapis.com/ivms101.IdentityPayload",
            br#"{"originator":{"name":"Alice"}}"#.to_vec(),
        )),
        transaction: Some(Any::new(
            "type.googleapis.com/trisa.data.generic.v1beta1.Transaction",
            br#"{"txid":"1234","amount":0.25,"network":"BTC"}"#.to_vec(),
        )),
        sent_at: "2022-03-29T14:16:27Z".to_string(),
        received_at: String::new(),
    }
}

pub fn load_fixture(name: &str) -> SecureEnvelope {
    let path = format!("{}/tests/testdata/{name}", env!("CARGO_MANIFEST_DIR"));
    let data = std::fs::read_to_string(&path).unwrap();
    serde_json::from_str(&data).unwrap()
}
