//! Wire messages exchanged between counterparties.
//!
//! Field names and algorithm strings on these types are contract surfaces
//! shared with independent implementations. Byte fields serialize as padded
//! standard base64 strings so the JSON form matches the protobuf JSON mapping.
//! The encrypted payload itself is protobuf on the wire.

use std::fmt;

use prost::Message;
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

use crate::error::Result as EnvelopeResult;

// ---------------------------------------------------------------------------
// Secure envelope
// ---------------------------------------------------------------------------

/// The unit of transfer: an encrypted payload (or a rejection) plus the
/// wrapped secrets needed to open it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecureEnvelope {
    /// Transaction identifier, stable across a request/response pair.
    pub id: String,
    /// Encrypted payload.
    #[serde(with = "b64")]
    pub payload: Vec<u8>,
    /// Symmetric encryption key, wrapped with the recipient's public key once sealed.
    #[serde(with = "b64")]
    pub encryption_key: Vec<u8>,
    pub encryption_algorithm: String,
    /// Integrity tag over the encrypted payload.
    #[serde(with = "b64")]
    pub hmac: Vec<u8>,
    /// HMAC secret, wrapped with the recipient's public key once sealed.
    #[serde(with = "b64")]
    pub hmac_secret: Vec<u8>,
    pub hmac_algorithm: String,
    /// Rejection of this or a previous transfer.
    pub error: Option<Error>,
    /// RFC3339 ordering timestamp.
    pub timestamp: String,
    /// True once the key and secret are asymmetrically wrapped.
    pub sealed: bool,
    /// Fingerprint of the public key used to seal the envelope.
    pub public_key_signature: String,
}

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// A schema-tagged opaque blob.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Any {
    pub type_url: String,
    #[serde(with = "b64")]
    pub value: Vec<u8>,
}

impl Any {
    pub fn new(type_url: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            type_url: type_url.into(),
            value: value.into(),
        }
    }
}

/// Decrypted content of a secure envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Payload {
    /// Identity information, usually an IVMS101 identity payload.
    pub identity: Option<Any>,
    /// Network specific transaction details.
    pub transaction: Option<Any>,
    /// RFC3339 timestamp of when the payload was sent.
    pub sent_at: String,
    /// RFC3339 timestamp of when the payload was received, if it has been.
    pub received_at: String,
}

impl Payload {
    /// Protobuf encoding; this is the plaintext that gets encrypted.
    pub fn to_protobuf(&self) -> Vec<u8> {
        PayloadProto::from(self).encode_to_vec()
    }

    pub fn from_protobuf(data: &[u8]) -> EnvelopeResult<Self> {
        Ok(PayloadProto::decode(data)?.into())
    }
}

#[derive(Clone, PartialEq, Message)]
struct AnyProto {
    #[prost(string, tag = "1")]
    type_url: String,
    #[prost(bytes = "vec", tag = "2")]
    value: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
struct PayloadProto {
    #[prost(message, optional, tag = "1")]
    identity: Option<AnyProto>,
    #[prost(message, optional, tag = "2")]
    transaction: Option<AnyProto>,
    #[prost(string, tag = "3")]
    sent_at: String,
    #[prost(string, tag = "4")]
    received_at: String,
}

impl From<&Any> for AnyProto {
    fn from(any: &Any) -> Self {
        Self {
            type_url: any.type_url.clone(),
            value: any.value.clone(),
        }
    }
}

impl From<&Payload> for PayloadProto {
    fn from(payload: &Payload) -> Self {
        Self {
            identity: payload.identity.as_ref().map(AnyProto::from),
            transaction: payload.transaction.as_ref().map(AnyProto::from),
            sent_at: payload.sent_at.clone(),
            received_at: payload.received_at.clone(),
        }
    }
}

impl From<PayloadProto> for Payload {
    fn from(proto: PayloadProto) -> Self {
        let any = |proto: AnyProto| Any::new(proto.type_url, proto.value);
        Self {
            identity: proto.identity.map(any),
            transaction: proto.transaction.map(any),
            sent_at: proto.sent_at,
            received_at: proto.received_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Signing key
// ---------------------------------------------------------------------------

/// Public key metadata sent to a counterparty during a key exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SigningKey {
    pub version: i64,
    #[serde(with = "b64")]
    pub signature: Vec<u8>,
    pub signature_algorithm: String,
    pub public_key_algorithm: String,
    pub not_before: String,
    pub not_after: String,
    pub revoked: bool,
    /// The public key in one of the accepted exchange formats; DER SPKI when
    /// produced by this crate.
    #[serde(with = "b64")]
    pub data: Vec<u8>,
}

// ---------------------------------------------------------------------------
// Rejection errors
// ---------------------------------------------------------------------------

/// A protocol error code. Codes outside the named set are preserved as-is.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorCode(pub i32);

macro_rules! error_codes {
    ($($name:ident = $value:literal),* $(,)?) => {
        impl ErrorCode {
            $(pub const $name: ErrorCode = ErrorCode($value);)*

            /// The canonical name of a known code.
            pub fn name(self) -> Option<&'static str> {
                match self.0 {
                    $($value => Some(stringify!($name)),)*
                    _ => None,
                }
            }
        }
    };
}

error_codes! {
    UNHANDLED = 0,
    UNAVAILABLE = 1,
    SERVICE_DOWN_TIME = 2,
    MAINTENANCE = 3,
    UNIMPLEMENTED = 4,
    INTERNAL_ERROR = 49,
    REJECTED = 50,
    UNKNOWN_WALLET_ADDRESS = 51,
    UNKNOWN_IDENTITY = 52,
    UNKNOWN_ORIGINATOR = 53,
    UNKNOWN_BENEFICIARY = 54,
    BENEFICIARY_NAME_UNMATCHED = 55,
    UNSUPPORTED_CURRENCY = 56,
    EXCEEDED_TRADING_VOLUME = 60,
    COMPLIANCE_CHECK_FAIL = 90,
    NO_COMPLIANCE = 91,
    HIGH_RISK = 92,
    OUT_OF_NETWORK = 99,
    FORBIDDEN = 100,
    NO_SIGNING_KEY = 101,
    CERTIFICATE_REVOKED = 102,
    UNVERIFIED = 103,
    UNTRUSTED = 104,
    INVALID_SIGNATURE = 105,
    INVALID_KEY = 106,
    ENVELOPE_DECODE_FAIL = 107,
    PRIVATE_INFO_DECODE_FAIL = 108,
    UNHANDLED_ALGORITHM = 109,
    BAD_REQUEST = 110,
    UNPARSEABLE_IDENTITY = 111,
    PRIVATE_INFO_WRONG_FORMAT = 112,
    UNPARSEABLE_TRANSACTION = 113,
    MISSING_FIELDS = 114,
    INCOMPLETE_IDENTITY = 115,
    VALIDATION_ERROR = 116,
}

/// Transport status class a rejection code maps onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusClass {
    /// Transient; the service is unavailable.
    Unavailable,
    /// Internal fault, never retryable.
    Internal,
    /// Business rejection of the transfer.
    Aborted,
    /// Verification or compliance failure.
    FailedPrecondition,
    /// Malformed request, unsupported algorithm or bad key.
    InvalidArgument,
}

impl ErrorCode {
    pub fn status_class(self) -> StatusClass {
        match self.0 {
            i32::MIN..=48 => StatusClass::Unavailable,
            49 => StatusClass::Internal,
            50..=99 => StatusClass::Aborted,
            100..=105 => StatusClass::FailedPrecondition,
            _ => StatusClass::InvalidArgument,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{}", self.0),
        }
    }
}

impl fmt::Debug for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ErrorCode({self})")
    }
}

/// A rejection, transmissible back to the sender.
///
/// `retry` is set by the raising site and is independent of the code: a
/// payload sealed with a stale public key is retryable after a fresh key
/// exchange, whatever range its code falls in.
#[derive(Debug, Clone, Default, PartialEq, Eq, ThisError, Serialize, Deserialize)]
#[serde(default)]
#[error("rejection [{code}]: {message}")]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    pub retry: bool,
    pub details: Option<Any>,
}

impl Error {
    /// A non-retryable rejection.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            retry: false,
            details: None,
        }
    }

    /// Returns a copy of this error with the retry flag set.
    pub fn with_retry(self) -> Self {
        Self {
            retry: true,
            ..self
        }
    }

    /// Returns a copy of this error carrying the given details.
    pub fn with_details(self, details: Any) -> Self {
        Self {
            details: Some(details),
            ..self
        }
    }

    /// True if the error has a zero code and no message; such an error
    /// carries nothing to report.
    pub fn is_zero(&self) -> bool {
        self.code == ErrorCode::UNHANDLED && self.message.is_empty()
    }

    pub fn status_class(&self) -> StatusClass {
        self.code.status_class()
    }
}

// ---------------------------------------------------------------------------
// Base64 byte fields
// ---------------------------------------------------------------------------

mod b64 {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
