//! AES-GCM payload encryption with an HMAC-SHA256 integrity tag.
//!
//! Primitive choices:
//! - **Cipher**: AES-GCM, key size selected by key length (16, 24 or 32 bytes)
//! - **Nonce**: 96-bit (12 bytes), generated fresh per operation
//! - **Tag**: HMAC-SHA256 over the ciphertext, keyed by a separate secret
//!
//! AES-128 and AES-256 go through `ring`; `ring` has no AES-192, so 24 byte
//! keys use the `aes-gcm` crate. Both produce the same layout.
//!
//! # Layout of encrypted bytes
//! ```text
//! [ ciphertext + GCM tag ][ nonce (12 bytes) ]
//! ```
//! The nonce is appended, not prepended. Other implementations depend on this.

use aes_gcm::aead::consts::U12;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::aes::Aes192;
use ring::aead::{self, LessSafeKey, Nonce, UnboundKey, AES_128_GCM, AES_256_GCM};
use ring::hmac;
use zeroize::Zeroizing;

use crate::crypto::{self, Cipher, Crypto, Signer};
use crate::error::{EnvelopeError, Result};

/// Size of the nonce in bytes (96 bits).
pub const NONCE_LEN: usize = 12;

/// Size of a generated key in bytes (256 bits).
pub const KEY_LEN: usize = 32;

pub const AES256_GCM: &str = "AES256-GCM";
pub const AES192_GCM: &str = "AES192-GCM";
pub const AES128_GCM: &str = "AES128-GCM";
pub const AES_GCM: &str = "AES-GCM";
pub const HMAC_SHA256: &str = "HMAC-SHA256";

type Aes192Gcm = aes_gcm::AesGcm<Aes192, U12>;

/// Symmetric cipher holding an AES key and an HMAC secret.
///
/// Both are zeroised on drop.
pub struct AesGcm {
    key: Zeroizing<Vec<u8>>,
    secret: Zeroizing<Vec<u8>>,
}

impl AesGcm {
    /// Create a cipher from an existing key and secret.
    ///
    /// An empty `key` generates 32 random bytes; an empty `secret` reuses the
    /// key. Lengths other than 16, 24 or 32 are accepted here and reported
    /// as `AES-GCM`, but encryption with them fails.
    pub fn new(key: &[u8], secret: &[u8]) -> Result<Self> {
        let key = if key.is_empty() {
            crypto::random(KEY_LEN)?
        } else {
            key.to_vec()
        };

        let secret = if secret.is_empty() {
            key.clone()
        } else {
            secret.to_vec()
        };

        Ok(Self {
            key: Zeroizing::new(key),
            secret: Zeroizing::new(secret),
        })
    }

    /// Create a cipher with a fresh random 256-bit key, reused as the HMAC secret.
    pub fn generate() -> Result<Self> {
        Self::new(&[], &[])
    }

    fn ring_algorithm(&self) -> Option<&'static aead::Algorithm> {
        match self.key.len() {
            16 => Some(&AES_128_GCM),
            32 => Some(&AES_256_GCM),
            _ => None,
        }
    }

    fn invalid_length(&self) -> EnvelopeError {
        EnvelopeError::InvalidKey(format!("{} byte AES key", self.key.len()))
    }
}

impl Cipher for AesGcm {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let nonce = crypto::random(NONCE_LEN)?;

        let mut output = if let Some(algorithm) = self.ring_algorithm() {
            let unbound =
                UnboundKey::new(algorithm, &self.key).map_err(|_| self.invalid_length())?;
            let key = LessSafeKey::new(unbound);
            let nonce = Nonce::try_assume_unique_for_key(&nonce)
                .map_err(|_| EnvelopeError::EncryptionFailure)?;

            let mut output = Vec::with_capacity(plaintext.len() + algorithm.tag_len() + NONCE_LEN);
            output.extend_from_slice(plaintext);
            key.seal_in_place_append_tag(nonce, aead::Aad::empty(), &mut output)
                .map_err(|_| EnvelopeError::EncryptionFailure)?;
            output
        } else if self.key.len() == 24 {
            let cipher =
                Aes192Gcm::new_from_slice(&self.key).map_err(|_| self.invalid_length())?;
            cipher
                .encrypt(aes_gcm::Nonce::<U12>::from_slice(&nonce), plaintext)
                .map_err(|_| EnvelopeError::EncryptionFailure)?
        } else {
            return Err(self.invalid_length());
        };

        output.extend_from_slice(&nonce);
        Ok(output)
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        if ciphertext.len() < NONCE_LEN {
            return Err(EnvelopeError::MissingCiphertext);
        }

        let (data, nonce) = ciphertext.split_at(ciphertext.len() - NONCE_LEN);

        if let Some(algorithm) = self.ring_algorithm() {
            let unbound =
                UnboundKey::new(algorithm, &self.key).map_err(|_| self.invalid_length())?;
            let key = LessSafeKey::new(unbound);
            let nonce = Nonce::try_assume_unique_for_key(nonce)
                .map_err(|_| EnvelopeError::DecryptionFailure)?;

            let mut buffer = data.to_vec();
            let plaintext = key
                .open_in_place(nonce, aead::Aad::empty(), &mut buffer)
                .map_err(|_| EnvelopeError::DecryptionFailure)?;
            Ok(plaintext.to_vec())
        } else if self.key.len() == 24 {
            let cipher =
                Aes192Gcm::new_from_slice(&self.key).map_err(|_| self.invalid_length())?;
            cipher
                .decrypt(aes_gcm::Nonce::<U12>::from_slice(nonce), data)
                .map_err(|_| EnvelopeError::DecryptionFailure)
        } else {
            Err(self.invalid_length())
        }
    }

    fn encryption_algorithm(&self) -> &'static str {
        match self.key.len() {
            32 => AES256_GCM,
            24 => AES192_GCM,
            16 => AES128_GCM,
            _ => AES_GCM,
        }
    }
}

impl Signer for AesGcm {
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        if data.is_empty() {
            return Err(EnvelopeError::CannotSignEmpty);
        }

        let key = hmac::Key::new(hmac::HMAC_SHA256, &self.secret);
        Ok(hmac::sign(&key, data).as_ref().to_vec())
    }

    fn verify(&self, data: &[u8], signature: &[u8]) -> Result<()> {
        // Constant-time comparison.
        let key = hmac::Key::new(hmac::HMAC_SHA256, &self.secret);
        hmac::verify(&key, data, signature).map_err(|_| EnvelopeError::HmacSignatureMismatch)
    }

    fn signature_algorithm(&self) -> &'static str {
        HMAC_SHA256
    }
}

impl Crypto for AesGcm {
    fn encryption_key(&self) -> &[u8] {
        &self.key
    }

    fn hmac_secret(&self) -> &[u8] {
        &self.secret
    }
}

impl std::fmt::Debug for AesGcm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AesGcm")
            .field("algorithm", &self.encryption_algorithm())
            .finish_non_exhaustive()
    }
}
