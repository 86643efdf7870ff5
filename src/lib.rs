//! # secure-envelope
//!
//! Hybrid-encrypted secure envelopes for exchanging compliance payloads
//! between counterparties.
//!
//! A payload is encrypted and signed with a fresh AES-GCM key and HMAC secret;
//! the key and secret are then sealed with the recipient's RSA public key. The
//! recipient unseals them with its private key, verifies the HMAC and decrypts.
//!
//! ## Public API
//!
//! The one-line helpers below cover the common flows. [`Envelope`] exposes the
//! individual transitions for callers that need intermediate states.
//!
//! Operations that can be refused by the counterparty return an [`Outcome`]:
//! `Ok`, a [`Failure::Rejected`] carrying an [`api::Error`] to send back, or a
//! [`Failure::Fault`] that stays local.

pub mod aesgcm;
pub mod api;
pub mod certs;
pub mod crypto;
pub mod envelope;
pub mod error;
pub mod exchange;
pub mod keys;
pub mod options;
pub mod parse;
pub mod rsaoeap;
pub mod signature;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

use chrono::{DateTime, Utc};
use tracing::debug;

pub use envelope::Envelope;
pub use error::{EnvelopeError, Failure, Outcome};
pub use keys::{AnyKey, CertificateKey, ExchangeKey, Key, PrivateKey, PublicKey};
pub use options::EnvelopeOptions;
pub use state::State;

use api::{Payload, SecureEnvelope};

/// Validate, encrypt and seal a payload. The options must supply a sealing
/// key or cipher.
pub fn seal_payload(payload: Payload, options: EnvelopeOptions) -> Outcome<SecureEnvelope> {
    let mut env = Envelope::new(payload, options)?;
    env.validate_payload()?;
    env.encrypt()?;
    env.seal()?;

    debug!(id = env.id(), "sealed payload");
    Ok(env.into_proto())
}

/// Unseal (if sealed) and decrypt an envelope. An error-only envelope comes
/// back as its own rejection.
pub fn open_payload(msg: SecureEnvelope, options: EnvelopeOptions) -> Outcome<Payload> {
    let mut env = Envelope::wrap(msg, options)?;

    if env.state() == State::ERROR {
        if let Some(err) = env.error() {
            return Err(Failure::Rejected(err.clone()));
        }
    }

    if env.state().payload == state::PayloadState::Sealed {
        env.unseal()?;
    }
    env.decrypt()?;

    debug!(id = env.id(), "opened payload");
    env.into_payload()
        .ok_or_else(|| EnvelopeError::NoPayload.into())
}

/// An error-only envelope. The id comes from the options, or is random.
pub fn reject(error: api::Error, options: EnvelopeOptions) -> error::Result<SecureEnvelope> {
    envelope::rejection(String::new(), error, options)
}

/// The rejection carried by an envelope, and whether it is in an error state.
pub fn check(msg: &SecureEnvelope) -> (Option<&api::Error>, bool) {
    let error = msg.error.as_ref().filter(|err| !err.is_zero());
    (error, envelope::status(msg).has_error)
}

/// Classify an envelope by the fields it populates.
pub fn status(msg: &SecureEnvelope) -> State {
    envelope::status(msg)
}

/// The ordering timestamp of an envelope.
pub fn timestamp(msg: &SecureEnvelope) -> Result<DateTime<Utc>, api::Error> {
    envelope::timestamp(msg)
}

/// Structural validation of a wire message.
pub fn validate(msg: &SecureEnvelope) -> error::Result<()> {
    envelope::validate(msg)
}
