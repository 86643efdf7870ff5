//! Options for creating and opening envelopes.
//!
//! Options are collected first and applied when the envelope is built, so key
//! material that cannot be used surfaces as a fault from the constructor.

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use zeroize::Zeroizing;

use crate::aesgcm::AesGcm;
use crate::crypto::{Crypto, SealingCipher};
use crate::envelope::Envelope;
use crate::error::Result;
use crate::keys::{Key, PrivateKey, PublicKey};
use crate::rsaoeap::RsaOaep;

enum CryptoSource {
    Handler(Arc<dyn Crypto>),
    AesGcm {
        key: Zeroizing<Vec<u8>>,
        secret: Zeroizing<Vec<u8>>,
    },
}

enum SealSource {
    Handler(Arc<dyn SealingCipher>),
    Public(PublicKey),
    Private(PrivateKey),
}

/// Builder for envelope options. Setting the same option twice keeps the
/// last value; the three sealing options replace one another.
#[derive(Default)]
pub struct EnvelopeOptions {
    id: Option<String>,
    timestamp: Option<DateTime<Utc>>,
    crypto: Option<CryptoSource>,
    seal: Option<SealSource>,
}

impl EnvelopeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn envelope_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn timestamp(mut self, ts: DateTime<Utc>) -> Self {
        self.timestamp = Some(ts);
        self
    }

    /// Reuse the id and symmetric cryptography of another envelope, e.g. to
    /// reply within the same transaction.
    pub fn in_reply_to(mut self, env: &Envelope) -> Self {
        self.id = Some(env.id().to_string());
        if let Some(crypto) = env.crypto_handler() {
            self.crypto = Some(CryptoSource::Handler(crypto));
        }
        self
    }

    pub fn crypto(mut self, crypto: impl Crypto + 'static) -> Self {
        self.crypto = Some(CryptoSource::Handler(Arc::new(crypto)));
        self
    }

    /// AES-GCM with the given key and HMAC secret (see [`AesGcm::new`]).
    pub fn aes_gcm(mut self, key: &[u8], secret: &[u8]) -> Self {
        self.crypto = Some(CryptoSource::AesGcm {
            key: Zeroizing::new(key.to_vec()),
            secret: Zeroizing::new(secret.to_vec()),
        });
        self
    }

    pub fn seal_cipher(mut self, seal: impl SealingCipher + 'static) -> Self {
        self.seal = Some(SealSource::Handler(Arc::new(seal)));
        self
    }

    /// Seal for the owner of this public key.
    pub fn sealing_key(mut self, key: PublicKey) -> Self {
        self.seal = Some(SealSource::Public(key));
        self
    }

    /// Unseal with this private key.
    pub fn unsealing_key(mut self, key: PrivateKey) -> Self {
        self.seal = Some(SealSource::Private(key));
        self
    }

    /// Unseal with the private half of `key` if it has one, otherwise seal
    /// for its public half.
    pub fn key(self, key: &impl Key) -> Self {
        match key.unsealing_key() {
            Ok(private) => self.unsealing_key(private.clone()),
            Err(_) => self.sealing_key(key.sealing_key().clone()),
        }
    }

    pub(crate) fn apply(self, env: &mut Envelope) -> Result<()> {
        if let Some(id) = self.id {
            env.msg.id = id;
        }

        if let Some(ts) = self.timestamp {
            env.msg.timestamp = format_timestamp(ts);
        }

        match self.crypto {
            Some(CryptoSource::Handler(crypto)) => env.crypto = Some(crypto),
            Some(CryptoSource::AesGcm { key, secret }) => {
                env.crypto = Some(Arc::new(AesGcm::new(&key, &secret)?));
            }
            None => {}
        }

        match self.seal {
            Some(SealSource::Handler(seal)) => env.seal = Some(seal),
            Some(SealSource::Public(key)) => env.seal = Some(Arc::new(RsaOaep::from_public(&key)?)),
            Some(SealSource::Private(key)) => {
                env.seal = Some(Arc::new(RsaOaep::from_private(&key)?));
            }
            None => {}
        }

        Ok(())
    }
}

/// RFC3339 with as much sub-second precision as the time carries.
pub(crate) fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Cipher;
    use chrono::TimeZone;

    #[test]
    fn timestamps_use_zulu_and_trim_precision() {
        let ts = Utc.with_ymd_and_hms(2022, 1, 27, 8, 21, 43).unwrap();
        assert_eq!(format_timestamp(ts), "2022-01-27T08:21:43Z");

        let ts = ts + chrono::Duration::microseconds(453_444);
        assert_eq!(format_timestamp(ts), "2022-01-27T08:21:43.453444Z");
    }

    #[test]
    fn unsupported_sealing_key_fails_on_apply() {
        let options = EnvelopeOptions::new().sealing_key(PublicKey::Other {
            algorithm: "ECDSA".into(),
            spki_der: vec![],
        });

        let result = Envelope::wrap(Default::default(), options);
        assert!(result.is_err());
    }

    #[test]
    fn later_options_win() {
        let options = EnvelopeOptions::new()
            .envelope_id("first")
            .envelope_id("second")
            .aes_gcm(&[1u8; 16], b"secret");

        let env = Envelope::wrap(Default::default(), options).unwrap();
        assert_eq!(env.id(), "second");
        assert_eq!(env.crypto().unwrap().encryption_algorithm(), "AES128-GCM");
    }
}
