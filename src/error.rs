//! Error types for secure envelopes.
//!
//! Two disjoint channels come out of every envelope operation:
//!
//! - [`EnvelopeError`] is a *local fault*: bad input shape, unsupported key
//!   material, a marshaling failure. It is never sent to a counterparty.
//! - [`crate::api::Error`] is a *protocol rejection*: a structured error that is
//!   meaningful to transmit back to the sender.
//!
//! [`Failure`] joins the two so that [`Outcome`] is a three-way result:
//! `Ok(value)`, `Err(Failure::Rejected(..))` or `Err(Failure::Fault(..))`.
//!
//! Error messages are intentionally minimal. They signal *what* failed without
//! revealing key material or plaintext.

use thiserror::Error;

use crate::api;
use crate::state::State;

/// Local faults raised by the envelope core.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    // --- symmetric and asymmetric ciphers ---
    /// HMAC signatures cannot be computed over empty data.
    #[error("cannot sign empty data")]
    CannotSignEmpty,

    /// Ciphertext is empty or shorter than the appended nonce.
    #[error("empty cipher text")]
    MissingCiphertext,

    /// The HMAC tag did not match the data.
    #[error("hmac signature mismatch")]
    HmacSignatureMismatch,

    /// An asymmetric signature did not verify.
    #[error("signature verification failed")]
    SignatureMismatch,

    /// Decryption or signing needs a private key that was not supplied.
    #[error("private key required for decryption")]
    PrivateKeyRequired,

    /// A key was the wrong length or could not be loaded by the cipher.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// The key algorithm is not one the ciphers can use.
    #[error("unsupported key type: {0}")]
    UnsupportedKeyType(String),

    /// Encryption failed inside the cipher.
    #[error("encryption failed")]
    EncryptionFailure,

    /// Decryption failed: wrong key, tampered ciphertext or bad tag.
    #[error("decryption failed")]
    DecryptionFailure,

    /// Signing failed inside the cipher.
    #[error("signing failed")]
    SigningFailure,

    /// The system random number generator failed to produce bytes.
    #[error("randomness source failed")]
    RandomnessFailure,

    // --- key material ---
    /// The key has no private half.
    #[error("no private unsealing key available")]
    NoPrivateKey,

    /// PEM data held no certificate.
    #[error("no certificates found in PEM encoded data")]
    NoCertificate,

    /// PEM data held more than one private key.
    #[error("too many private keys found in PEM encoded data")]
    MultipleKeys,

    /// PEM data held more than one standalone public key.
    #[error("too many public key blocks found in PEM encoded data")]
    TooManyBlocks,

    /// PEM data held both certificates and standalone public keys.
    #[error("ambiguous key exchange data: both certificates and public keys found")]
    AmbiguousKeyExchange,

    /// None of the known serializations matched.
    #[error("could not parse key exchange data with known key serialization methods")]
    UnparsableKeyExchange,

    /// An x509 certificate could not be decoded.
    #[error("could not parse certificate: {0}")]
    Certificate(String),

    /// A public or private key could not be decoded or encoded.
    #[error("could not parse key: {0}")]
    KeyEncoding(String),

    // --- public key signatures ---
    /// The fingerprint named an unknown hash algorithm.
    #[error("unknown signature hash algorithm")]
    UnknownSignatureAlgorithm,

    /// The fingerprint string was not of the form `ALG:base64`.
    #[error("could not parse public key signature: {0}")]
    MalformedSignature(String),

    // --- secure envelope structure ---
    #[error("invalid envelope: no envelope id")]
    NoEnvelopeId,

    #[error("invalid envelope: no ordering timestamp")]
    NoTimestamp,

    #[error("invalid envelope: must contain either error or payload")]
    NoMessageData,

    #[error("invalid envelope: missing encryption key or algorithm")]
    NoEncryptionInfo,

    #[error("invalid envelope: missing hmac signature, secret, or algorithm")]
    NoHmacInfo,

    #[error("invalid payload: payload has not been decrypted or is missing")]
    NoPayload,

    #[error("invalid payload: payload does not contain identity data")]
    NoIdentityPayload,

    #[error("invalid payload: payload does not contain transaction data")]
    NoTransactionPayload,

    #[error("invalid payload: sent at timestamp is missing")]
    NoSentAtPayload,

    #[error("invalid payload: could not parse sent at timestamp in RFC3339 format")]
    InvalidSentAtPayload,

    #[error("invalid payload: could not parse received at timestamp in RFC3339 format")]
    InvalidReceivedAtPayload,

    /// A rejection with neither a code nor a message has nothing to report.
    #[error("invalid rejection: missing error code and message")]
    NoError,

    #[error("cannot seal envelope: no public key cryptographic handler available")]
    CannotSeal,

    #[error("cannot unseal envelope: no private key cryptographic handler available")]
    CannotUnseal,

    /// A transition was attempted from a state that does not allow it.
    #[error("envelope is in the {actual} state, expected {expected}")]
    InvalidState {
        /// State the transition requires.
        expected: State,
        /// State the envelope was actually in.
        actual: State,
    },

    /// Marshaling or unmarshaling failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<prost::DecodeError> for EnvelopeError {
    fn from(err: prost::DecodeError) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<bincode::Error> for EnvelopeError {
    fn from(err: bincode::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result alias for operations that can only fail locally.
pub type Result<T> = std::result::Result<T, EnvelopeError>;

/// The failure half of an [`Outcome`].
#[derive(Debug, Error)]
pub enum Failure {
    /// A protocol rejection to return to the counterparty.
    #[error("rejected: {0}")]
    Rejected(api::Error),

    /// A local fault; the rejection channel carries nothing meaningful.
    #[error(transparent)]
    Fault(#[from] EnvelopeError),
}

impl Failure {
    /// The rejection, if this failure is one.
    pub fn rejection(&self) -> Option<&api::Error> {
        match self {
            Self::Rejected(err) => Some(err),
            Self::Fault(_) => None,
        }
    }

    /// The local fault, if this failure is one.
    pub fn fault(&self) -> Option<&EnvelopeError> {
        match self {
            Self::Rejected(_) => None,
            Self::Fault(err) => Some(err),
        }
    }
}

impl From<api::Error> for Failure {
    fn from(err: api::Error) -> Self {
        Self::Rejected(err)
    }
}

/// Three-way result of seal and open operations.
pub type Outcome<T> = std::result::Result<T, Failure>;
