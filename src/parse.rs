//! Decoding of key exchange data and stored key material.
//!
//! Counterparties send their sealing key in whatever serialization their stack
//! produces. [`parse_key_exchange_data`] accepts the known ones, in order:
//!
//! 1. DER SubjectPublicKeyInfo
//! 2. PEM blocks: certificates, `PUBLIC KEY` and legacy `RSA PUBLIC KEY`
//! 3. A single DER certificate
//!
//! PEM input that mixes certificates and standalone keys, or carries more than
//! one standalone key, is refused rather than guessed at.

use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, PrivateKeyInfo};
use rsa::{RsaPrivateKey, RsaPublicKey};
use tracing::trace;
use x509_cert::der::{Decode, Encode};
use x509_cert::spki::{ObjectIdentifier, SubjectPublicKeyInfoRef};
use x509_cert::Certificate;

use crate::error::{EnvelopeError, Result};
use crate::keys::{PrivateKey, PublicKey, RSA};

pub const BLOCK_CERTIFICATE: &str = "CERTIFICATE";
pub const BLOCK_PUBLIC_KEY: &str = "PUBLIC KEY";
pub const BLOCK_RSA_PUBLIC_KEY: &str = "RSA PUBLIC KEY";
pub const BLOCK_PRIVATE_KEY: &str = "PRIVATE KEY";
pub const BLOCK_RSA_PRIVATE_KEY: &str = "RSA PRIVATE KEY";
pub const BLOCK_EC_PRIVATE_KEY: &str = "EC PRIVATE KEY";

const OID_RSA_ENCRYPTION: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");
const OID_EC_PUBLIC_KEY: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");
const OID_ED25519: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.101.112");

/// Name of a public key algorithm identified by `oid`.
pub fn public_key_algorithm(oid: &ObjectIdentifier) -> String {
    if *oid == OID_RSA_ENCRYPTION {
        RSA.to_string()
    } else if *oid == OID_EC_PUBLIC_KEY {
        "ECDSA".to_string()
    } else if *oid == OID_ED25519 {
        "Ed25519".to_string()
    } else {
        oid.to_string()
    }
}

/// Parse a DER SubjectPublicKeyInfo into a public key.
pub fn public_key_from_spki(der: &[u8]) -> Result<PublicKey> {
    let spki = SubjectPublicKeyInfoRef::from_der(der)
        .map_err(|err| EnvelopeError::KeyEncoding(err.to_string()))?;

    if spki.algorithm.oid == OID_RSA_ENCRYPTION {
        let key = RsaPublicKey::from_public_key_der(der)
            .map_err(|err| EnvelopeError::KeyEncoding(err.to_string()))?;
        return Ok(PublicKey::Rsa(key));
    }

    Ok(PublicKey::Other {
        algorithm: public_key_algorithm(&spki.algorithm.oid),
        spki_der: der.to_vec(),
    })
}

/// Parse a DER x509 certificate.
pub fn parse_certificate(der: &[u8]) -> Result<Certificate> {
    Certificate::from_der(der).map_err(|err| EnvelopeError::Certificate(err.to_string()))
}

/// The subject public key of a certificate.
pub fn certificate_public_key(cert: &Certificate) -> Result<PublicKey> {
    let der = cert
        .tbs_certificate
        .subject_public_key_info
        .to_der()
        .map_err(|err| EnvelopeError::Certificate(err.to_string()))?;
    public_key_from_spki(&der)
}

/// Parse the contents of a private key PEM block.
pub fn parse_private_key(tag: &str, der: &[u8]) -> Result<PrivateKey> {
    let encoding =
        |err: &dyn std::fmt::Display| EnvelopeError::KeyEncoding(format!("{tag}: {err}"));

    match tag {
        BLOCK_RSA_PRIVATE_KEY => RsaPrivateKey::from_pkcs1_der(der)
            .map(PrivateKey::Rsa)
            .map_err(|err| encoding(&err)),
        BLOCK_EC_PRIVATE_KEY => Ok(PrivateKey::Other {
            algorithm: "ECDSA".to_string(),
            pem_tag: tag.to_string(),
            der: der.to_vec(),
        }),
        BLOCK_PRIVATE_KEY => {
            let info = PrivateKeyInfo::try_from(der).map_err(|err| encoding(&err))?;
            if info.algorithm.oid == OID_RSA_ENCRYPTION {
                RsaPrivateKey::from_pkcs8_der(der)
                    .map(PrivateKey::Rsa)
                    .map_err(|err| encoding(&err))
            } else {
                Ok(PrivateKey::Other {
                    algorithm: public_key_algorithm(&info.algorithm.oid),
                    pem_tag: tag.to_string(),
                    der: der.to_vec(),
                })
            }
        }
        other => Err(EnvelopeError::UnsupportedKeyType(other.to_string())),
    }
}

/// Encode a DER blob as a PEM block with LF line endings.
pub fn encode_pem(tag: &str, der: &[u8]) -> String {
    let block = pem::Pem::new(tag, der);
    pem::encode_config(
        &block,
        pem::EncodeConfig::new().set_line_ending(pem::LineEnding::LF),
    )
}

/// Parse public key data received in a key exchange.
pub fn parse_key_exchange_data(data: &[u8]) -> Result<PublicKey> {
    if let Ok(key) = public_key_from_spki(data) {
        trace!(format = "spki", algorithm = key.algorithm(), "parsed key exchange data");
        return Ok(key);
    }

    if let Ok(blocks) = pem::parse_many(data) {
        if !blocks.is_empty() {
            return parse_pem_blocks(&blocks);
        }
    }

    if let Ok(cert) = Certificate::from_der(data) {
        let key = certificate_public_key(&cert)?;
        trace!(format = "certificate", algorithm = key.algorithm(), "parsed key exchange data");
        return Ok(key);
    }

    Err(EnvelopeError::UnparsableKeyExchange)
}

fn parse_pem_blocks(blocks: &[pem::Pem]) -> Result<PublicKey> {
    let mut chain = Vec::new();
    let mut keys = Vec::new();

    for block in blocks {
        match block.tag() {
            BLOCK_CERTIFICATE => {
                let cert = parse_certificate(block.contents()).map_err(malformed)?;
                chain.push(cert);
            }
            BLOCK_PUBLIC_KEY => {
                keys.push(public_key_from_spki(block.contents()).map_err(malformed)?);
            }
            BLOCK_RSA_PUBLIC_KEY => {
                let key = match public_key_from_spki(block.contents()) {
                    Ok(key) => key,
                    Err(_) => RsaPublicKey::from_pkcs1_der(block.contents())
                        .map(PublicKey::Rsa)
                        .map_err(|err| malformed(EnvelopeError::KeyEncoding(err.to_string())))?,
                };
                keys.push(key);
            }
            tag => trace!(tag, "ignoring pem block"),
        }
    }

    match (chain.first(), keys.len()) {
        (Some(_), n) if n > 0 => Err(EnvelopeError::AmbiguousKeyExchange),
        (None, n) if n > 1 => Err(EnvelopeError::TooManyBlocks),
        (None, 1) => {
            trace!(format = "pem public key", "parsed key exchange data");
            Ok(keys.remove(0))
        }
        (Some(leaf), _) => {
            trace!(format = "pem certificate", certs = chain.len(), "parsed key exchange data");
            certificate_public_key(leaf)
        }
        (None, _) => Err(EnvelopeError::UnparsableKeyExchange),
    }
}

fn malformed(err: EnvelopeError) -> EnvelopeError {
    trace!(error = %err, "malformed pem block in key exchange data");
    EnvelopeError::UnparsableKeyExchange
}
