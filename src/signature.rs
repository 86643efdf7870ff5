//! Public key signatures.
//!
//! A public key signature is a fingerprint of the form `ALG:base64` where `ALG`
//! is one of `MD5`, `SHA256` or `SHA512` and the data is the unpadded standard
//! base64 hash of the key's DER SubjectPublicKeyInfo. The sender writes it to
//! the envelope so the receiver can pick the matching private key.

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use md5::Md5;
use sha2::{Digest, Sha256, Sha512};

use crate::error::{EnvelopeError, Result};
use crate::keys::PublicKey;

/// Hash algorithm used to compute a public key signature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Md5,
    #[default]
    Sha256,
    Sha512,
}

impl Algorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Md5 => "MD5",
            Self::Sha256 => "SHA256",
            Self::Sha512 => "SHA512",
        }
    }

    fn digest(self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::Md5 => Md5::digest(data).to_vec(),
            Self::Sha256 => Sha256::digest(data).to_vec(),
            Self::Sha512 => Sha512::digest(data).to_vec(),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = EnvelopeError;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MD5" => Ok(Self::Md5),
            "SHA256" => Ok(Self::Sha256),
            "SHA512" => Ok(Self::Sha512),
            _ => Err(EnvelopeError::UnknownSignatureAlgorithm),
        }
    }
}

/// The default (SHA256) signature of a public key.
pub fn new(key: &PublicKey) -> Result<String> {
    sign(key, Algorithm::default())
}

/// Sign a public key with the given hash algorithm.
pub fn sign(key: &PublicKey, algorithm: Algorithm) -> Result<String> {
    let sum = hash(key, algorithm)?;
    Ok(format!("{algorithm}:{}", STANDARD_NO_PAD.encode(sum)))
}

/// Hash of the key's DER SubjectPublicKeyInfo.
pub fn hash(key: &PublicKey, algorithm: Algorithm) -> Result<Vec<u8>> {
    let der = key.to_spki_der()?;
    Ok(algorithm.digest(&der))
}

/// Split a signature into its algorithm and hash sum.
pub fn parse(signature: &str) -> Result<(Algorithm, Vec<u8>)> {
    let parts: Vec<&str> = signature.split(':').collect();
    if parts.len() != 2 {
        return Err(EnvelopeError::MalformedSignature(
            "expected ALG:base64".to_string(),
        ));
    }

    let algorithm = parts[0].parse::<Algorithm>()?;
    let sum = STANDARD_NO_PAD
        .decode(parts[1])
        .map_err(|_| EnvelopeError::MalformedSignature("invalid base64 hash sum".to_string()))?;

    Ok((algorithm, sum))
}

/// True if `signature` identifies `key`. Any parse error is a mismatch.
pub fn matches(signature: &str, key: &PublicKey) -> bool {
    let Ok((algorithm, expected)) = parse(signature) else {
        return false;
    };

    match hash(key, algorithm) {
        Ok(sum) => sum == expected,
        Err(_) => false,
    }
}
