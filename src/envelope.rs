//! The envelope wrapper and its state transitions.
//!
//! Envelopes are protected by two layers. The payload is *encrypted* and
//! *signed* with symmetric cryptography whose key and secret travel on the
//! envelope. Those secrets are then *sealed* with the recipient's public key so
//! only the recipient can recover them.
//!
//! Sending walks the states forward:
//!
//! ```text
//! clear --encrypt--> unsealed --seal--> sealed
//! ```
//!
//! and receiving walks them back:
//!
//! ```text
//! sealed --unseal--> unsealed --decrypt--> clear
//! ```
//!
//! Failures on the receiving side that the sender can act on come back as
//! rejections; everything else is a local fault.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::aesgcm::{AesGcm, AES128_GCM, AES192_GCM, AES256_GCM, AES_GCM, HMAC_SHA256};
use crate::api::{self, ErrorCode, Payload, SecureEnvelope};
use crate::crypto::{Cipher, Crypto, SealingCipher, Signer};
use crate::error::{EnvelopeError, Failure, Outcome, Result};
use crate::options::{self, EnvelopeOptions};
use crate::state::{PayloadState, State};

/// An in-memory secure envelope with the cryptography needed to move it
/// between states. Built per operation and never shared.
pub struct Envelope {
    pub(crate) msg: SecureEnvelope,
    pub(crate) payload: Option<Payload>,
    pub(crate) crypto: Option<Arc<dyn Crypto>>,
    pub(crate) seal: Option<Arc<dyn SealingCipher>>,
}

impl Envelope {
    /// A clear envelope holding `payload`, with a random id and the current
    /// time unless the options set them.
    pub fn new(payload: Payload, options: EnvelopeOptions) -> Result<Self> {
        let msg = SecureEnvelope {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: options::format_timestamp(Utc::now()),
            ..Default::default()
        };

        let mut env = Self {
            msg,
            payload: Some(payload),
            crypto: None,
            seal: None,
        };
        options.apply(&mut env)?;
        Ok(env)
    }

    /// Wrap a received or stored message.
    pub fn wrap(msg: SecureEnvelope, options: EnvelopeOptions) -> Result<Self> {
        let mut env = Self {
            msg,
            payload: None,
            crypto: None,
            seal: None,
        };
        options.apply(&mut env)?;
        Ok(env)
    }

    /// An error-only envelope in reply to this one. The id is kept unless the
    /// options replace it.
    pub fn reject(&self, error: api::Error, options: EnvelopeOptions) -> Result<SecureEnvelope> {
        rejection(self.msg.id.clone(), error, options)
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// Clear to unsealed: marshal, encrypt and sign the payload. A fresh
    /// 256-bit AES-GCM cipher is generated unless one was configured.
    pub fn encrypt(&mut self) -> Outcome<()> {
        self.expect_state(PayloadState::Clear)?;
        let payload = self.payload.as_ref().ok_or(EnvelopeError::NoPayload)?;

        let crypto = match &self.crypto {
            Some(crypto) => Arc::clone(crypto),
            None => {
                let crypto: Arc<dyn Crypto> = Arc::new(AesGcm::generate()?);
                self.crypto = Some(Arc::clone(&crypto));
                crypto
            }
        };

        let plaintext = payload.to_protobuf();
        let ciphertext = crypto.encrypt(&plaintext)?;
        let hmac = crypto.sign(&ciphertext)?;

        self.msg.payload = ciphertext;
        self.msg.encryption_key = crypto.encryption_key().to_vec();
        self.msg.encryption_algorithm = crypto.encryption_algorithm().to_string();
        self.msg.hmac = hmac;
        self.msg.hmac_secret = crypto.hmac_secret().to_vec();
        self.msg.hmac_algorithm = crypto.signature_algorithm().to_string();
        self.msg.sealed = false;
        self.msg.public_key_signature.clear();
        self.payload = None;
        Ok(())
    }

    /// Unsealed to sealed: wrap the key and secret with the sealing cipher.
    pub fn seal(&mut self) -> Outcome<()> {
        self.expect_state(PayloadState::Unsealed)?;
        let seal = self.seal.as_ref().ok_or(EnvelopeError::CannotSeal)?;

        let encryption_key = seal.encrypt(&self.msg.encryption_key)?;
        let hmac_secret = seal.encrypt(&self.msg.hmac_secret)?;
        let public_key_signature = seal.public_key_signature()?;

        self.msg.encryption_key = encryption_key;
        self.msg.hmac_secret = hmac_secret;
        self.msg.sealed = true;
        self.msg.public_key_signature = public_key_signature;

        debug!(
            id = %self.msg.id,
            algorithm = seal.encryption_algorithm(),
            "sealed secure envelope"
        );
        Ok(())
    }

    /// Sealed to unsealed: unwrap the key and secret with the private key.
    ///
    /// A key or secret that does not unwrap is a retryable rejection: the
    /// sender most likely used a stale public key.
    pub fn unseal(&mut self) -> Outcome<()> {
        self.expect_state(PayloadState::Sealed)?;
        check_algorithms(&self.msg)?;
        let seal = self.seal.as_ref().ok_or(EnvelopeError::CannotUnseal)?;

        let encryption_key = seal
            .decrypt(&self.msg.encryption_key)
            .map_err(|err| unwrap_failure(err, "encryption key signed incorrectly"))?;
        let hmac_secret = seal
            .decrypt(&self.msg.hmac_secret)
            .map_err(|err| unwrap_failure(err, "hmac secret signed incorrectly"))?;

        self.msg.encryption_key = encryption_key;
        self.msg.hmac_secret = hmac_secret;
        self.msg.sealed = false;
        self.msg.public_key_signature.clear();

        debug!(
            id = %self.msg.id,
            algorithm = seal.encryption_algorithm(),
            "unsealed secure envelope"
        );
        Ok(())
    }

    /// Unsealed to clear: verify the HMAC, decrypt and unmarshal the payload.
    pub fn decrypt(&mut self) -> Outcome<()> {
        self.expect_state(PayloadState::Unsealed)?;
        check_algorithms(&self.msg)?;
        check_key_length(&self.msg)?;

        let crypto = AesGcm::new(&self.msg.encryption_key, &self.msg.hmac_secret)?;

        crypto.verify(&self.msg.payload, &self.msg.hmac).map_err(|_| {
            rejected(api::Error::new(
                ErrorCode::INVALID_SIGNATURE,
                "could not verify hmac signature",
            ))
        })?;

        let plaintext = crypto.decrypt(&self.msg.payload).map_err(|_| {
            rejected(api::Error::new(
                ErrorCode::INVALID_KEY,
                "could not decrypt payload with the encryption key",
            ))
        })?;

        let payload = Payload::from_protobuf(&plaintext).map_err(|_| {
            rejected(api::Error::new(
                ErrorCode::ENVELOPE_DECODE_FAIL,
                "could not unmarshal payload",
            ))
        })?;

        debug!(
            id = %self.msg.id,
            encryption = %self.msg.encryption_algorithm,
            hmac = %self.msg.hmac_algorithm,
            "decrypted secure envelope"
        );

        self.payload = Some(payload);
        self.crypto = Some(Arc::new(crypto));
        Ok(())
    }

    fn expect_state(&self, expected: PayloadState) -> Outcome<()> {
        let actual = self.state();
        if actual.is_corrupted() {
            let reason = validate(&self.msg)
                .err()
                .map(|err| err.to_string())
                .unwrap_or_else(|| "invalid secure envelope".to_string());
            return Err(rejected(api::Error::new(ErrorCode::BAD_REQUEST, reason)));
        }

        if actual.payload != expected {
            return Err(EnvelopeError::InvalidState {
                expected: State::new(expected, actual.has_error),
                actual,
            }
            .into());
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Validation and inspection
    // -----------------------------------------------------------------------

    /// Structural checks on the wrapped message.
    pub fn validate_message(&self) -> Result<()> {
        validate(&self.msg)
    }

    /// Checks on the clear payload before it is encrypted.
    pub fn validate_payload(&self) -> Result<()> {
        let payload = self.payload.as_ref().ok_or(EnvelopeError::NoPayload)?;

        if payload.identity.is_none() {
            return Err(EnvelopeError::NoIdentityPayload);
        }
        if payload.transaction.is_none() {
            return Err(EnvelopeError::NoTransactionPayload);
        }
        if payload.sent_at.is_empty() {
            return Err(EnvelopeError::NoSentAtPayload);
        }
        if DateTime::parse_from_rfc3339(&payload.sent_at).is_err() {
            return Err(EnvelopeError::InvalidSentAtPayload);
        }
        if !payload.received_at.is_empty()
            && DateTime::parse_from_rfc3339(&payload.received_at).is_err()
        {
            return Err(EnvelopeError::InvalidReceivedAtPayload);
        }
        Ok(())
    }

    pub fn state(&self) -> State {
        if self.payload.is_some() {
            let state = State::CLEAR;
            return if has_error(&self.msg) { state.with_error() } else { state };
        }
        status(&self.msg)
    }

    /// The ordering timestamp. A missing or unparsable timestamp is a bad
    /// request.
    pub fn timestamp(&self) -> std::result::Result<DateTime<Utc>, api::Error> {
        timestamp(&self.msg)
    }

    /// The rejection carried by the envelope, unless it is empty.
    pub fn error(&self) -> Option<&api::Error> {
        self.msg.error.as_ref().filter(|err| !err.is_zero())
    }

    pub fn is_error(&self) -> bool {
        self.state().has_error
    }

    pub fn id(&self) -> &str {
        &self.msg.id
    }

    pub fn proto(&self) -> &SecureEnvelope {
        &self.msg
    }

    pub fn into_proto(self) -> SecureEnvelope {
        self.msg
    }

    /// The clear payload, once decrypted (or before encryption).
    pub fn payload(&self) -> Option<&Payload> {
        self.payload.as_ref()
    }

    pub fn into_payload(self) -> Option<Payload> {
        self.payload
    }

    /// The symmetric cryptography used for the payload, if known.
    pub fn crypto(&self) -> Option<&dyn Crypto> {
        self.crypto.as_deref()
    }

    pub(crate) fn crypto_handler(&self) -> Option<Arc<dyn Crypto>> {
        self.crypto.clone()
    }
}

impl std::fmt::Debug for Envelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Envelope")
            .field("id", &self.msg.id)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Message helpers
// ---------------------------------------------------------------------------

pub(crate) fn rejection(
    id: String,
    error: api::Error,
    options: EnvelopeOptions,
) -> Result<SecureEnvelope> {
    if error.is_zero() {
        return Err(EnvelopeError::NoError);
    }

    let mut env = Envelope::wrap(
        SecureEnvelope {
            id,
            timestamp: options::format_timestamp(Utc::now()),
            error: Some(error),
            ..Default::default()
        },
        options,
    )?;
    if env.msg.id.is_empty() {
        env.msg.id = uuid::Uuid::new_v4().to_string();
    }

    env.validate_message()?;
    Ok(env.into_proto())
}

pub(crate) fn validate(msg: &SecureEnvelope) -> Result<()> {
    if msg.id.is_empty() {
        return Err(EnvelopeError::NoEnvelopeId);
    }

    if msg.payload.is_empty() {
        return if has_error(msg) {
            Ok(())
        } else {
            Err(EnvelopeError::NoMessageData)
        };
    }

    if msg.timestamp.is_empty() {
        return Err(EnvelopeError::NoTimestamp);
    }
    if msg.encryption_key.is_empty() || msg.encryption_algorithm.is_empty() {
        return Err(EnvelopeError::NoEncryptionInfo);
    }
    if msg.hmac.is_empty() || msg.hmac_secret.is_empty() || msg.hmac_algorithm.is_empty() {
        return Err(EnvelopeError::NoHmacInfo);
    }
    Ok(())
}

pub(crate) fn status(msg: &SecureEnvelope) -> State {
    if *msg == SecureEnvelope::default() {
        return State::UNKNOWN;
    }

    if validate(msg).is_err() {
        return State::CORRUPTED;
    }

    let state = if msg.payload.is_empty() {
        State::UNKNOWN
    } else if msg.sealed {
        State::SEALED
    } else {
        State::UNSEALED
    };

    if has_error(msg) {
        state.with_error()
    } else {
        state
    }
}

pub(crate) fn timestamp(msg: &SecureEnvelope) -> std::result::Result<DateTime<Utc>, api::Error> {
    if msg.timestamp.is_empty() {
        return Err(api::Error::new(
            ErrorCode::BAD_REQUEST,
            "missing ordering timestamp on secure envelope",
        ));
    }

    DateTime::parse_from_rfc3339(&msg.timestamp)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| {
            api::Error::new(
                ErrorCode::BAD_REQUEST,
                "could not parse ordering timestamp on secure envelope as RFC3339 timestamp",
            )
        })
}

fn has_error(msg: &SecureEnvelope) -> bool {
    msg.error.as_ref().is_some_and(|err| !err.is_zero())
}

fn rejected(err: api::Error) -> Failure {
    warn!(
        code = %err.code,
        retry = err.retry,
        message = %err.message,
        "secure envelope rejected"
    );
    Failure::Rejected(err)
}

/// A private key the cipher cannot use is a local fault; anything else means
/// the envelope was sealed for a different key.
fn unwrap_failure(err: EnvelopeError, message: &str) -> Failure {
    match err {
        EnvelopeError::PrivateKeyRequired => Failure::Fault(err),
        _ => rejected(api::Error::new(ErrorCode::INVALID_KEY, message).with_retry()),
    }
}

fn check_algorithms(msg: &SecureEnvelope) -> Outcome<()> {
    match msg.encryption_algorithm.as_str() {
        AES256_GCM | AES192_GCM | AES128_GCM | AES_GCM => {}
        other => {
            return Err(rejected(api::Error::new(
                ErrorCode::UNHANDLED_ALGORITHM,
                format!("unsupported encryption algorithm {other:?}"),
            )))
        }
    }

    if msg.hmac_algorithm != HMAC_SHA256 {
        return Err(rejected(api::Error::new(
            ErrorCode::UNHANDLED_ALGORITHM,
            format!("unsupported hmac algorithm {:?}", msg.hmac_algorithm),
        )));
    }
    Ok(())
}

fn check_key_length(msg: &SecureEnvelope) -> Outcome<()> {
    let expected = match msg.encryption_algorithm.as_str() {
        AES256_GCM => Some(32),
        AES192_GCM => Some(24),
        AES128_GCM => Some(16),
        _ => None,
    };

    match expected {
        Some(len) if msg.encryption_key.len() != len => Err(rejected(api::Error::new(
            ErrorCode::INVALID_KEY,
            format!(
                "{} byte encryption key does not match {}",
                msg.encryption_key.len(),
                msg.encryption_algorithm
            ),
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Any;
    use crate::keys::PrivateKey;
    use crate::testing::rsa_keys;

    fn payload() -> Payload {
        Payload {
            identity: Some(Any::new("type.example/Identity", b"alice".to_vec())),
            transaction: Some(Any::new("type.example/Transaction", b"0.5 BTC".to_vec())),
            sent_at: "2022-03-29T14:16:27Z".into(),
            received_at: String::new(),
        }
    }

    fn key_options() -> (EnvelopeOptions, EnvelopeOptions) {
        let private = PrivateKey::Rsa(rsa_keys().0.clone());
        let public = private.public_key().unwrap();
        (
            EnvelopeOptions::new().sealing_key(public),
            EnvelopeOptions::new().unsealing_key(private),
        )
    }

    #[test]
    fn send_and_receive_workflow() {
        let (sending, receiving) = key_options();

        let mut env = Envelope::new(payload(), sending).unwrap();
        assert_eq!(env.state(), State::CLEAR);
        assert!(uuid::Uuid::parse_str(env.id()).is_ok());
        env.timestamp().unwrap();

        env.encrypt().unwrap();
        assert_eq!(env.state(), State::UNSEALED);
        assert!(env.payload().is_none());
        assert_eq!(env.proto().encryption_algorithm, AES256_GCM);
        assert_eq!(env.proto().hmac_algorithm, HMAC_SHA256);

        env.seal().unwrap();
        assert_eq!(env.state(), State::SEALED);
        assert!(env.proto().public_key_signature.starts_with("SHA256:"));

        let mut recv = Envelope::wrap(env.into_proto(), receiving).unwrap();
        assert_eq!(recv.state(), State::SEALED);

        recv.unseal().unwrap();
        assert_eq!(recv.state(), State::UNSEALED);
        assert_eq!(recv.proto().encryption_key.len(), 32);
        assert!(recv.proto().public_key_signature.is_empty());

        recv.decrypt().unwrap();
        assert_eq!(recv.state(), State::CLEAR);
        assert_eq!(recv.payload(), Some(&payload()));
    }

    #[test]
    fn transitions_from_wrong_state_are_faults() {
        let (sending, _) = key_options();
        let mut env = Envelope::new(payload(), sending).unwrap();

        let err = env.seal().unwrap_err();
        assert!(matches!(
            err.fault(),
            Some(EnvelopeError::InvalidState { expected, actual })
                if *expected == State::UNSEALED && *actual == State::CLEAR
        ));
        assert!(env.decrypt().unwrap_err().fault().is_some());
    }

    #[test]
    fn seal_and_unseal_need_a_cipher() {
        let mut env = Envelope::new(payload(), EnvelopeOptions::new()).unwrap();
        env.encrypt().unwrap();
        assert!(matches!(env.seal().unwrap_err().fault(), Some(EnvelopeError::CannotSeal)));

        let (sending, _) = key_options();
        let mut env = Envelope::new(payload(), sending).unwrap();
        env.encrypt().unwrap();
        env.seal().unwrap();

        // A public key cannot unwrap the secrets.
        let (public_only, _) = key_options();
        let mut recv = Envelope::wrap(env.proto().clone(), public_only).unwrap();
        assert!(matches!(
            recv.unseal().unwrap_err().fault(),
            Some(EnvelopeError::PrivateKeyRequired)
        ));

        let mut recv = Envelope::wrap(env.into_proto(), EnvelopeOptions::new()).unwrap();
        assert!(matches!(recv.unseal().unwrap_err().fault(), Some(EnvelopeError::CannotUnseal)));
    }

    #[test]
    fn configured_crypto_is_used() {
        let options = EnvelopeOptions::new().aes_gcm(&[7u8; 24], b"hmac secret");
        let mut env = Envelope::new(payload(), options).unwrap();
        env.encrypt().unwrap();

        assert_eq!(env.proto().encryption_algorithm, AES192_GCM);
        assert_eq!(env.proto().encryption_key, vec![7u8; 24]);
        assert_eq!(env.proto().hmac_secret, b"hmac secret".to_vec());

        // Unsealed envelopes decrypt without any key.
        let mut recv = Envelope::wrap(env.into_proto(), EnvelopeOptions::new()).unwrap();
        recv.decrypt().unwrap();
        assert_eq!(recv.into_payload(), Some(payload()));
    }

    #[test]
    fn reply_reuses_id_and_crypto() {
        let mut env = Envelope::new(payload(), EnvelopeOptions::new()).unwrap();
        env.encrypt().unwrap();

        let reply = Envelope::new(payload(), EnvelopeOptions::new().in_reply_to(&env)).unwrap();
        assert_eq!(reply.id(), env.id());
        assert_eq!(
            reply.crypto().unwrap().encryption_key(),
            env.crypto().unwrap().encryption_key()
        );
    }

    #[test]
    fn payload_validation() {
        let check = |payload: Payload| {
            Envelope::new(payload, EnvelopeOptions::new())
                .unwrap()
                .validate_payload()
        };

        check(payload()).unwrap();
        assert!(matches!(
            check(Payload { identity: None, ..payload() }),
            Err(EnvelopeError::NoIdentityPayload)
        ));
        assert!(matches!(
            check(Payload { transaction: None, ..payload() }),
            Err(EnvelopeError::NoTransactionPayload)
        ));
        assert!(matches!(
            check(Payload { sent_at: String::new(), ..payload() }),
            Err(EnvelopeError::NoSentAtPayload)
        ));
        assert!(matches!(
            check(Payload { sent_at: "yesterday".into(), ..payload() }),
            Err(EnvelopeError::InvalidSentAtPayload)
        ));
        assert!(matches!(
            check(Payload { received_at: "2022-13-01".into(), ..payload() }),
            Err(EnvelopeError::InvalidReceivedAtPayload)
        ));

        let env = Envelope::wrap(SecureEnvelope::default(), EnvelopeOptions::new()).unwrap();
        assert!(matches!(env.validate_payload(), Err(EnvelopeError::NoPayload)));
    }

    #[test]
    fn message_validation() {
        let mut env = Envelope::new(payload(), EnvelopeOptions::new()).unwrap();
        env.encrypt().unwrap();
        let valid = env.into_proto();
        validate(&valid).unwrap();

        let cases: [(fn(&mut SecureEnvelope), &str); 8] = [
            (|m| m.id.clear(), "no envelope id"),
            (|m| m.timestamp.clear(), "no ordering timestamp"),
            (|m| m.encryption_key.clear(), "missing encryption key"),
            (|m| m.encryption_algorithm.clear(), "missing encryption key"),
            (|m| m.hmac.clear(), "missing hmac"),
            (|m| m.hmac_secret.clear(), "missing hmac"),
            (|m| m.hmac_algorithm.clear(), "missing hmac"),
            (|m| m.payload.clear(), "either error or payload"),
        ];

        for (mutate, expected) in cases {
            let mut msg = valid.clone();
            mutate(&mut msg);
            let err = validate(&msg).unwrap_err();
            assert!(err.to_string().contains(expected), "{err} should mention {expected}");
            assert_eq!(status(&msg), State::CORRUPTED);
        }
    }

    #[test]
    fn corrupted_envelopes_are_bad_requests() {
        let mut env = Envelope::new(payload(), EnvelopeOptions::new()).unwrap();
        env.encrypt().unwrap();
        let mut msg = env.into_proto();
        msg.hmac.clear();

        let mut recv = Envelope::wrap(msg, EnvelopeOptions::new()).unwrap();
        let err = recv.decrypt().unwrap_err();
        let rejection = err.rejection().unwrap();
        assert_eq!(rejection.code, ErrorCode::BAD_REQUEST);
        assert!(!rejection.retry);
    }

    #[test]
    fn reject_keeps_the_envelope_id() {
        let env = Envelope::new(payload(), EnvelopeOptions::new()).unwrap();
        let msg = env
            .reject(
                api::Error::new(ErrorCode::UNKNOWN_BENEFICIARY, "no such account"),
                EnvelopeOptions::new(),
            )
            .unwrap();

        assert_eq!(msg.id, env.id());
        assert!(msg.payload.is_empty());
        assert_eq!(status(&msg), State::ERROR);

        let err = env.reject(api::Error::default(), EnvelopeOptions::new()).unwrap_err();
        assert!(matches!(err, EnvelopeError::NoError));
    }

    #[test]
    fn error_alongside_payload() {
        let mut env = Envelope::new(payload(), EnvelopeOptions::new()).unwrap();
        env.msg.error = Some(api::Error::new(ErrorCode::HIGH_RISK, "previous transfer"));
        assert_eq!(env.state(), State::CLEAR_ERROR);
        assert!(env.is_error());

        env.encrypt().unwrap();
        assert_eq!(env.state(), State::UNSEALED_ERROR);
        assert_eq!(env.error().unwrap().code, ErrorCode::HIGH_RISK);
    }

    #[test]
    fn timestamps() {
        let mut msg = SecureEnvelope {
            timestamp: "2022-03-29T14:16:27.453444Z".into(),
            ..Default::default()
        };
        let ts = timestamp(&msg).unwrap();
        assert_eq!(ts.timestamp_subsec_micros(), 453_444);

        msg.timestamp = "2022-01-27T08:21:43-05:00".into();
        assert_eq!(timestamp(&msg).unwrap().to_rfc3339(), "2022-01-27T13:21:43+00:00");

        for bad in ["", "27 Jan 2022"] {
            msg.timestamp = bad.into();
            let err = timestamp(&msg).unwrap_err();
            assert_eq!(err.code, ErrorCode::BAD_REQUEST);
            assert!(!err.retry);
        }
    }

    #[test]
    fn unknown_envelope() {
        assert_eq!(status(&SecureEnvelope::default()), State::UNKNOWN);
        let env = Envelope::wrap(SecureEnvelope::default(), EnvelopeOptions::new()).unwrap();
        assert_eq!(env.state(), State::UNKNOWN);
        assert!(env.error().is_none());
    }
}
