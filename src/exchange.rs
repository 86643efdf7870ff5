//! Keys received from a counterparty during a key exchange.

use crate::api::SigningKey;
use crate::error::{EnvelopeError, Result};
use crate::keys::{Key, PrivateKey, PublicKey};
use crate::parse;

/// A counterparty's sealing key. Never holds a private key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeKey {
    msg: SigningKey,
    public: PublicKey,
}

impl ExchangeKey {
    /// Parse the key data of a signing key message. Fails if no known
    /// serialization matches.
    pub fn from_signing_key(msg: SigningKey) -> Result<Self> {
        let public = parse::parse_key_exchange_data(&msg.data)?;
        Ok(Self { msg, public })
    }
}

impl TryFrom<SigningKey> for ExchangeKey {
    type Error = EnvelopeError;

    fn try_from(msg: SigningKey) -> Result<Self> {
        Self::from_signing_key(msg)
    }
}

impl Key for ExchangeKey {
    fn is_private(&self) -> bool {
        false
    }

    fn sealing_key(&self) -> &PublicKey {
        &self.public
    }

    fn unsealing_key(&self) -> Result<&PrivateKey> {
        Err(EnvelopeError::NoPrivateKey)
    }

    fn proto(&self) -> Result<SigningKey> {
        Ok(self.msg.clone())
    }

    fn public_key_algorithm(&self) -> String {
        if self.msg.public_key_algorithm.is_empty() {
            self.public.algorithm().to_string()
        } else {
            self.msg.public_key_algorithm.clone()
        }
    }

    fn marshal(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(&self.msg)?)
    }

    fn unmarshal(data: &[u8]) -> Result<Self> {
        let msg: SigningKey = bincode::deserialize(data)?;
        Self::from_signing_key(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certs::CertificateKey;
    use crate::signature;
    use crate::testing::rsa_certificate;

    fn exchanged() -> (CertificateKey, ExchangeKey) {
        let (der, _) = rsa_certificate();
        let local = CertificateKey::from_certificate_der(der).unwrap();
        let remote = ExchangeKey::from_signing_key(local.proto().unwrap()).unwrap();
        (local, remote)
    }

    #[test]
    fn exchange_preserves_identity() {
        let (local, remote) = exchanged();

        assert!(!remote.is_private());
        assert!(matches!(remote.unsealing_key(), Err(EnvelopeError::NoPrivateKey)));
        assert_eq!(remote.sealing_key(), local.sealing_key());
        assert_eq!(remote.public_key_algorithm(), "RSA");
        assert_eq!(remote.proto().unwrap(), local.proto().unwrap());

        let pks = local.public_key_signature().unwrap();
        assert_eq!(remote.public_key_signature().unwrap(), pks);
        assert!(signature::matches(&pks, remote.sealing_key()));
    }

    #[test]
    fn accepts_pem_certificate_data() {
        let (_, pem) = rsa_certificate();
        let msg = SigningKey {
            data: pem.as_bytes().to_vec(),
            ..Default::default()
        };

        let (local, _) = exchanged();
        let remote = ExchangeKey::try_from(msg).unwrap();
        assert_eq!(remote.sealing_key(), local.sealing_key());
        assert_eq!(remote.public_key_algorithm(), "RSA");
    }

    #[test]
    fn unparsable_data_is_refused() {
        let msg = SigningKey {
            data: b"not a key".to_vec(),
            ..Default::default()
        };
        assert!(matches!(
            ExchangeKey::from_signing_key(msg),
            Err(EnvelopeError::UnparsableKeyExchange)
        ));
    }

    #[test]
    fn marshal_round_trip() {
        let (_, remote) = exchanged();
        let restored = ExchangeKey::unmarshal(&remote.marshal().unwrap()).unwrap();
        assert_eq!(restored, remote);

        let broken = bincode::serialize(&SigningKey::default()).unwrap();
        assert!(ExchangeKey::unmarshal(&broken).is_err());
    }
}
