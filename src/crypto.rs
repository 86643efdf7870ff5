//! Cipher and signer abstractions.
//!
//! Envelopes are protected by two kinds of cryptography, each identified on
//! the wire by name so that a receiver can pick a compatible implementation
//! without out-of-band negotiation:
//!
//! - **Symmetric** ([`Crypto`]): encrypts and signs the payload. The key and
//!   secret travel on the envelope. Implemented by [`crate::aesgcm::AesGcm`].
//! - **Asymmetric** ([`SealingCipher`]): wraps the symmetric key and secret for
//!   a single recipient. Implemented by [`crate::rsaoeap::RsaOaep`].
//!
//! Randomness for keys, secrets and nonces comes from [`random`], which is
//! the only place the crate draws from `ring::rand::SystemRandom`.

use ring::rand::{SecureRandom, SystemRandom};

use crate::error::{EnvelopeError, Result};

/// A device that encrypts and decrypts, identified by its algorithm name.
pub trait Cipher: Send + Sync {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>>;
    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>>;
    fn encryption_algorithm(&self) -> &'static str;
}

/// A device that creates and verifies signatures, identified by its algorithm name.
pub trait Signer: Send + Sync {
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>>;
    fn verify(&self, data: &[u8], signature: &[u8]) -> Result<()>;
    fn signature_algorithm(&self) -> &'static str;
}

/// Symmetric payload cryptography. The raw key and secret are exposed so the
/// envelope can carry them (wrapped or, when unsealed, in the clear).
pub trait Crypto: Cipher + Signer {
    fn encryption_key(&self) -> &[u8];
    fn hmac_secret(&self) -> &[u8];
}

/// Asymmetric cryptography used to seal and unseal the symmetric secrets.
pub trait SealingCipher: Cipher + Signer {
    /// Fingerprint of the public half, written to `public_key_signature`.
    fn public_key_signature(&self) -> Result<String>;
}

/// Generate `n` cryptographically secure random bytes.
pub fn random(n: usize) -> Result<Vec<u8>> {
    let rng = SystemRandom::new();
    let mut buf = vec![0u8; n];
    rng.fill(&mut buf)
        .map_err(|_| EnvelopeError::RandomnessFailure)?;
    Ok(buf)
}
