//! Public/private key pairs used to seal and unseal envelopes.
//!
//! This module owns two responsibilities:
//! 1. Holding asymmetric key material in types that know their algorithm and
//!    canonical DER encoding ([`PublicKey`], [`PrivateKey`]).
//! 2. The [`Key`] capability shared by the two key sources: a locally held
//!    certificate ([`CertificateKey`]) and a counterparty's key exchange
//!    message ([`ExchangeKey`]). [`AnyKey`] is the closed sum over the two.
//!
//! Symmetric payload keys never pass through here; see [`crate::aesgcm`].

use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey};
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};

use crate::api::SigningKey;
use crate::error::{EnvelopeError, Result};
use crate::signature;

pub use crate::certs::{CertificateKey, TrustProvider};
pub use crate::exchange::ExchangeKey;

/// Name of the RSA public key algorithm.
pub const RSA: &str = "RSA";

// ---------------------------------------------------------------------------
// Key material
// ---------------------------------------------------------------------------

/// A parsed public key.
///
/// Only RSA keys can seal envelopes. Other algorithms are still parsed so they
/// can be fingerprinted and reported, and are refused by the ciphers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicKey {
    Rsa(RsaPublicKey),
    Other {
        /// Algorithm name, e.g. `ECDSA` or `Ed25519`.
        algorithm: String,
        /// DER encoded SubjectPublicKeyInfo.
        spki_der: Vec<u8>,
    },
}

impl PublicKey {
    /// The public key algorithm, e.g. `RSA`.
    pub fn algorithm(&self) -> &str {
        match self {
            Self::Rsa(_) => RSA,
            Self::Other { algorithm, .. } => algorithm,
        }
    }

    /// Canonical DER SubjectPublicKeyInfo encoding.
    pub fn to_spki_der(&self) -> Result<Vec<u8>> {
        match self {
            Self::Rsa(key) => key
                .to_public_key_der()
                .map(|doc| doc.into_vec())
                .map_err(|err| EnvelopeError::KeyEncoding(err.to_string())),
            Self::Other { spki_der, .. } => Ok(spki_der.clone()),
        }
    }

    /// Parse a DER SubjectPublicKeyInfo.
    pub fn from_spki_der(der: &[u8]) -> Result<Self> {
        crate::parse::public_key_from_spki(der)
    }
}

impl From<RsaPublicKey> for PublicKey {
    fn from(key: RsaPublicKey) -> Self {
        Self::Rsa(key)
    }
}

/// A parsed private key.
#[derive(Clone)]
pub enum PrivateKey {
    Rsa(RsaPrivateKey),
    Other {
        algorithm: String,
        /// PEM block type the key was read from, used when writing it back.
        pem_tag: String,
        der: Vec<u8>,
    },
}

impl PrivateKey {
    pub fn algorithm(&self) -> &str {
        match self {
            Self::Rsa(_) => RSA,
            Self::Other { algorithm, .. } => algorithm,
        }
    }

    /// The public half. Only available for RSA keys.
    pub fn public_key(&self) -> Result<PublicKey> {
        match self {
            Self::Rsa(key) => Ok(PublicKey::Rsa(key.to_public_key())),
            Self::Other { algorithm, .. } => {
                Err(EnvelopeError::UnsupportedKeyType(algorithm.clone()))
            }
        }
    }

    /// The PEM block type and DER contents used to store this key.
    pub(crate) fn to_pem_parts(&self) -> Result<(String, Vec<u8>)> {
        match self {
            Self::Rsa(key) => {
                let doc = key
                    .to_pkcs8_der()
                    .map_err(|err| EnvelopeError::KeyEncoding(err.to_string()))?;
                Ok((crate::parse::BLOCK_PRIVATE_KEY.to_string(), doc.as_bytes().to_vec()))
            }
            Self::Other { pem_tag, der, .. } => Ok((pem_tag.clone(), der.clone())),
        }
    }
}

impl From<RsaPrivateKey> for PrivateKey {
    fn from(key: RsaPrivateKey) -> Self {
        Self::Rsa(key)
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("algorithm", &self.algorithm())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Key capability
// ---------------------------------------------------------------------------

/// A public key that can seal envelopes, optionally paired with the private
/// key that unseals them.
pub trait Key: Send + Sync {
    /// True if [`Key::unsealing_key`] will succeed.
    fn is_private(&self) -> bool;

    /// The public key used to seal envelopes for the key's owner.
    fn sealing_key(&self) -> &PublicKey;

    /// The private key used to unseal envelopes, if this key holds one.
    fn unsealing_key(&self) -> Result<&PrivateKey>;

    /// The key exchange message to send to a counterparty.
    fn proto(&self) -> Result<SigningKey>;

    /// The sealing public key algorithm, typically `RSA`.
    fn public_key_algorithm(&self) -> String;

    /// Fingerprint of the sealing key (see [`crate::signature`]).
    fn public_key_signature(&self) -> Result<String> {
        signature::new(self.sealing_key())
    }

    /// Compact serialization for storage; not meant for transfer.
    fn marshal(&self) -> Result<Vec<u8>>;

    /// Inverse of [`Key::marshal`].
    fn unmarshal(data: &[u8]) -> Result<Self>
    where
        Self: Sized;
}

/// Either kind of key, resolved by exhaustive match instead of type inspection.
#[derive(Debug, Clone)]
pub enum AnyKey {
    Certificate(CertificateKey),
    Exchange(ExchangeKey),
}

#[derive(Serialize, Deserialize)]
enum StoredKey {
    Certificate(Vec<u8>),
    Exchange(Vec<u8>),
}

impl AnyKey {
    fn inner(&self) -> &dyn Key {
        match self {
            Self::Certificate(key) => key,
            Self::Exchange(key) => key,
        }
    }
}

impl Key for AnyKey {
    fn is_private(&self) -> bool {
        self.inner().is_private()
    }

    fn sealing_key(&self) -> &PublicKey {
        self.inner().sealing_key()
    }

    fn unsealing_key(&self) -> Result<&PrivateKey> {
        self.inner().unsealing_key()
    }

    fn proto(&self) -> Result<SigningKey> {
        self.inner().proto()
    }

    fn public_key_algorithm(&self) -> String {
        self.inner().public_key_algorithm()
    }

    fn public_key_signature(&self) -> Result<String> {
        self.inner().public_key_signature()
    }

    fn marshal(&self) -> Result<Vec<u8>> {
        let stored = match self {
            Self::Certificate(key) => StoredKey::Certificate(key.marshal()?),
            Self::Exchange(key) => StoredKey::Exchange(key.marshal()?),
        };
        Ok(bincode::serialize(&stored)?)
    }

    fn unmarshal(data: &[u8]) -> Result<Self> {
        let stored: StoredKey = bincode::deserialize(data)?;
        match stored {
            StoredKey::Certificate(data) => {
                Ok(Self::Certificate(CertificateKey::unmarshal(&data)?))
            }
            StoredKey::Exchange(data) => Ok(Self::Exchange(ExchangeKey::unmarshal(&data)?)),
        }
    }
}

impl From<CertificateKey> for AnyKey {
    fn from(key: CertificateKey) -> Self {
        Self::Certificate(key)
    }
}

impl From<ExchangeKey> for AnyKey {
    fn from(key: ExchangeKey) -> Self {
        Self::Exchange(key)
    }
}
