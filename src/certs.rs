//! Keys backed by a locally held x509 certificate.

use chrono::{DateTime, SecondsFormat, Utc};
use rsa::pkcs1::RsaPssParams;
use x509_cert::der::{Decode, Encode};
use x509_cert::spki::{AlgorithmIdentifierOwned, ObjectIdentifier};
use x509_cert::time::Time;
use x509_cert::Certificate;

use crate::api::SigningKey;
use crate::error::{EnvelopeError, Result};
use crate::keys::{Key, PrivateKey, PublicKey};
use crate::parse::{
    self, BLOCK_CERTIFICATE, BLOCK_EC_PRIVATE_KEY, BLOCK_PRIVATE_KEY, BLOCK_RSA_PRIVATE_KEY,
};

/// Source of a local identity: the leaf certificate and, when this node is
/// the one unsealing, its private key.
pub trait TrustProvider {
    /// DER encoding of the leaf certificate.
    fn leaf_certificate(&self) -> Result<Vec<u8>>;

    fn private_key(&self) -> Option<PrivateKey>;
}

/// A certificate and an optional private key.
#[derive(Debug, Clone)]
pub struct CertificateKey {
    cert: Certificate,
    der: Vec<u8>,
    public: PublicKey,
    private: Option<PrivateKey>,
}

impl CertificateKey {
    /// A public-only key from a DER certificate.
    pub fn from_certificate_der(der: &[u8]) -> Result<Self> {
        let cert = parse::parse_certificate(der)?;
        let public = parse::certificate_public_key(&cert)?;
        Ok(Self {
            cert,
            der: der.to_vec(),
            public,
            private: None,
        })
    }

    /// A key pair. An RSA private key must belong to the certificate.
    pub fn from_x509_key_pair(der: &[u8], private: PrivateKey) -> Result<Self> {
        let mut key = Self::from_certificate_der(der)?;
        if let PrivateKey::Rsa(_) = private {
            if private.public_key()? != key.public {
                return Err(EnvelopeError::InvalidKey(
                    "private key does not match certificate".to_string(),
                ));
            }
        }
        key.private = Some(private);
        Ok(key)
    }

    pub fn from_provider(provider: &impl TrustProvider) -> Result<Self> {
        let der = provider.leaf_certificate()?;
        match provider.private_key() {
            Some(private) => Self::from_x509_key_pair(&der, private),
            None => Self::from_certificate_der(&der),
        }
    }

    pub fn certificate(&self) -> &Certificate {
        &self.cert
    }

    /// DER encoding of the certificate.
    pub fn certificate_der(&self) -> &[u8] {
        &self.der
    }

    pub fn not_before(&self) -> Result<DateTime<Utc>> {
        to_datetime(&self.cert.tbs_certificate.validity.not_before)
    }

    pub fn not_after(&self) -> Result<DateTime<Utc>> {
        to_datetime(&self.cert.tbs_certificate.validity.not_after)
    }
}

impl Key for CertificateKey {
    fn is_private(&self) -> bool {
        self.private.is_some()
    }

    fn sealing_key(&self) -> &PublicKey {
        &self.public
    }

    fn unsealing_key(&self) -> Result<&PrivateKey> {
        self.private.as_ref().ok_or(EnvelopeError::NoPrivateKey)
    }

    fn proto(&self) -> Result<SigningKey> {
        let rfc3339 = |t: DateTime<Utc>| t.to_rfc3339_opts(SecondsFormat::Secs, true);

        Ok(SigningKey {
            // x509 versions are zero-based on the wire.
            version: self.cert.tbs_certificate.version as i64 + 1,
            signature: self.cert.signature.raw_bytes().to_vec(),
            signature_algorithm: signature_algorithm(&self.cert.signature_algorithm),
            public_key_algorithm: self.public_key_algorithm(),
            not_before: rfc3339(self.not_before()?),
            not_after: rfc3339(self.not_after()?),
            revoked: false,
            data: self.public.to_spki_der()?,
        })
    }

    fn public_key_algorithm(&self) -> String {
        let spki = &self.cert.tbs_certificate.subject_public_key_info;
        parse::public_key_algorithm(&spki.algorithm.oid)
    }

    /// The certificate as PEM, followed by a blank line and the PKCS#8 private
    /// key when there is one.
    fn marshal(&self) -> Result<Vec<u8>> {
        let mut out = parse::encode_pem(BLOCK_CERTIFICATE, &self.der);
        if let Some(private) = &self.private {
            let (tag, der) = private.to_pem_parts()?;
            out.push('\n');
            out.push_str(&parse::encode_pem(&tag, &der));
        }
        Ok(out.into_bytes())
    }

    /// Accepts any PEM chain; the first certificate is the leaf.
    fn unmarshal(data: &[u8]) -> Result<Self> {
        let blocks =
            pem::parse_many(data).map_err(|err| EnvelopeError::Certificate(err.to_string()))?;

        let mut leaf = None;
        let mut keys = Vec::new();
        for block in &blocks {
            match block.tag() {
                BLOCK_CERTIFICATE => {
                    // Every certificate must parse, not only the leaf.
                    parse::parse_certificate(block.contents())?;
                    leaf.get_or_insert(block.contents());
                }
                tag @ (BLOCK_PRIVATE_KEY | BLOCK_RSA_PRIVATE_KEY | BLOCK_EC_PRIVATE_KEY) => {
                    keys.push(parse::parse_private_key(tag, block.contents())?);
                }
                _ => {}
            }
        }

        let leaf = leaf.ok_or(EnvelopeError::NoCertificate)?;
        if keys.len() > 1 {
            return Err(EnvelopeError::MultipleKeys);
        }

        match keys.pop() {
            Some(private) => Self::from_x509_key_pair(leaf, private),
            None => Self::from_certificate_der(leaf),
        }
    }
}

fn to_datetime(time: &Time) -> Result<DateTime<Utc>> {
    let since_epoch = time.to_unix_duration();
    i64::try_from(since_epoch.as_secs())
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .ok_or_else(|| EnvelopeError::Certificate("validity out of range".to_string()))
}

const SIGNATURE_ALGORITHMS: &[(&str, &str)] = &[
    ("1.2.840.113549.1.1.4", "MD5-RSA"),
    ("1.2.840.113549.1.1.5", "SHA1-RSA"),
    ("1.2.840.113549.1.1.11", "SHA256-RSA"),
    ("1.2.840.113549.1.1.12", "SHA384-RSA"),
    ("1.2.840.113549.1.1.13", "SHA512-RSA"),
    ("1.2.840.10045.4.1", "ECDSA-SHA1"),
    ("1.2.840.10045.4.3.2", "ECDSA-SHA256"),
    ("1.2.840.10045.4.3.3", "ECDSA-SHA384"),
    ("1.2.840.10045.4.3.4", "ECDSA-SHA512"),
    ("1.3.101.112", "Ed25519"),
];

const OID_RSASSA_PSS: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.10");

/// PSS names by digest OID, with the salt length each one requires.
const PSS_ALGORITHMS: &[(&str, &str, u8)] = &[
    ("2.16.840.1.101.3.4.2.1", "SHA256-RSAPSS", 32),
    ("2.16.840.1.101.3.4.2.2", "SHA384-RSAPSS", 48),
    ("2.16.840.1.101.3.4.2.3", "SHA512-RSAPSS", 64),
];

/// Display name of a certificate signature algorithm; unknown algorithms are
/// reported by OID.
fn signature_algorithm(algorithm: &AlgorithmIdentifierOwned) -> String {
    let oid = algorithm.oid.to_string();
    let name = if algorithm.oid == OID_RSASSA_PSS {
        pss_signature_algorithm(algorithm)
    } else {
        SIGNATURE_ALGORITHMS
            .iter()
            .find(|(known, _)| *known == oid)
            .map(|(_, name)| *name)
    };
    name.map(str::to_string).unwrap_or(oid)
}

/// PSS is only named when the digest, the MGF1 digest and the salt length
/// all agree.
fn pss_signature_algorithm(algorithm: &AlgorithmIdentifierOwned) -> Option<&'static str> {
    let der = algorithm.parameters.as_ref()?.to_der().ok()?;
    let params = RsaPssParams::from_der(&der).ok()?;

    let mgf_hash = params.mask_gen.parameters.map(|hash| hash.oid);
    if mgf_hash != Some(params.hash.oid) {
        return None;
    }

    let hash = params.hash.oid.to_string();
    PSS_ALGORITHMS
        .iter()
        .find(|(oid, _, salt_len)| *oid == hash && *salt_len == params.salt_len)
        .map(|(_, name, _)| *name)
}
