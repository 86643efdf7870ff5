//! RSA-OAEP key wrapping and RSA-PSS signatures, both over SHA-512.
//!
//! Used to seal the symmetric key and HMAC secret of an envelope for a single
//! recipient. A cipher built from a public key can encrypt and verify; one
//! built from a private key can also decrypt and sign.

use rand::rngs::OsRng;
use rsa::traits::PublicKeyParts;
use rsa::{Oaep, Pss, RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha512};

use crate::crypto::{Cipher, SealingCipher, Signer};
use crate::error::{EnvelopeError, Result};
use crate::keys::{PrivateKey, PublicKey};
use crate::signature;

pub const RSA_OAEP_SHA512: &str = "RSA-OAEP-SHA512";
pub const RSA_PSS_SHA512: &str = "RSA-PSS-SHA512";

#[derive(Clone)]
pub struct RsaOaep {
    public: RsaPublicKey,
    private: Option<RsaPrivateKey>,
}

impl RsaOaep {
    /// Encrypt and verify only.
    pub fn from_public(key: &PublicKey) -> Result<Self> {
        match key {
            PublicKey::Rsa(public) => Ok(Self {
                public: public.clone(),
                private: None,
            }),
            other => Err(EnvelopeError::UnsupportedKeyType(other.algorithm().to_string())),
        }
    }

    /// Full cipher; the public half is derived from the private key.
    pub fn from_private(key: &PrivateKey) -> Result<Self> {
        match key {
            PrivateKey::Rsa(private) => Ok(Self {
                public: private.to_public_key(),
                private: Some(private.clone()),
            }),
            other => Err(EnvelopeError::UnsupportedKeyType(other.algorithm().to_string())),
        }
    }

    fn private(&self) -> Result<&RsaPrivateKey> {
        self.private.as_ref().ok_or(EnvelopeError::PrivateKeyRequired)
    }

    /// Largest PSS salt that fits the modulus with a SHA-512 digest.
    fn max_salt_len(&self) -> usize {
        let em_len = (self.public.n().bits() - 1).div_ceil(8);
        em_len.saturating_sub(SHA512_LEN + 2)
    }
}

const SHA512_LEN: usize = 64;

impl Cipher for RsaOaep {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        self.public
            .encrypt(&mut OsRng, Oaep::new::<Sha512>(), plaintext)
            .map_err(|_| EnvelopeError::EncryptionFailure)
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        self.private()?
            .decrypt(Oaep::new::<Sha512>(), ciphertext)
            .map_err(|_| EnvelopeError::DecryptionFailure)
    }

    fn encryption_algorithm(&self) -> &'static str {
        RSA_OAEP_SHA512
    }
}

impl Signer for RsaOaep {
    /// Signs with the largest salt the key allows.
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        let private = self.private()?;
        let digest = Sha512::digest(data);
        let salt_len = self.max_salt_len();
        private
            .sign_with_rng(&mut OsRng, Pss::new_with_salt::<Sha512>(salt_len), &digest)
            .map_err(|_| EnvelopeError::SigningFailure)
    }

    /// Accepts any salt length. The maximum and digest-sized salts are tried
    /// first since those are what signers produce in practice.
    fn verify(&self, data: &[u8], signature: &[u8]) -> Result<()> {
        let digest = Sha512::digest(data);
        let max = self.max_salt_len();
        let preferred = [max, SHA512_LEN];

        let verified = preferred
            .into_iter()
            .chain((0..max).filter(|salt_len| !preferred.contains(salt_len)))
            .any(|salt_len| {
                self.public
                    .verify(Pss::new_with_salt::<Sha512>(salt_len), &digest, signature)
                    .is_ok()
            });

        if verified {
            Ok(())
        } else {
            Err(EnvelopeError::SignatureMismatch)
        }
    }

    fn signature_algorithm(&self) -> &'static str {
        RSA_PSS_SHA512
    }
}

impl SealingCipher for RsaOaep {
    fn public_key_signature(&self) -> Result<String> {
        signature::new(&PublicKey::Rsa(self.public.clone()))
    }
}

impl std::fmt::Debug for RsaOaep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsaOaep")
            .field("private", &self.private.is_some())
            .finish_non_exhaustive()
    }
}
