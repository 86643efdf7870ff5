//! Key material shared by unit tests. RSA generation is slow, so keys are
//! made once per test binary.

use std::sync::OnceLock;

use rand::rngs::OsRng;
use rsa::pkcs8::{EncodePrivateKey, LineEnding};
use rsa::RsaPrivateKey;

fn generate() -> RsaPrivateKey {
    RsaPrivateKey::new(&mut OsRng, 2048).expect("rsa key generation")
}

/// Two unrelated 2048-bit keys.
pub(crate) fn rsa_keys() -> &'static (RsaPrivateKey, RsaPrivateKey) {
    static KEYS: OnceLock<(RsaPrivateKey, RsaPrivateKey)> = OnceLock::new();
    KEYS.get_or_init(|| (generate(), generate()))
}

/// A self-signed certificate for the first key, as DER and as PEM.
pub(crate) fn rsa_certificate() -> (&'static [u8], &'static str) {
    static CERT: OnceLock<(Vec<u8>, String)> = OnceLock::new();
    let (der, pem) = CERT.get_or_init(|| {
        let pkcs8 = rsa_keys().0.to_pkcs8_pem(LineEnding::LF).expect("pkcs8 encoding");
        let key_pair = rcgen::KeyPair::from_pem(&pkcs8).expect("rcgen key pair");
        let cert = rcgen::CertificateParams::new(vec!["localhost".to_string()])
            .and_then(|params| params.self_signed(&key_pair))
            .expect("self-signed certificate");
        (cert.der().to_vec(), cert.pem())
    });
    (der, pem)
}
