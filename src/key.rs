use der::Encode;
use rsa::{
    RsaPrivateKey, RsaPublicKey,
    pkcs1::{DecodeRsaPrivateKey, EncodeRsaPrivateKey},
    pkcs1v15::SigningKey,
    pkcs8::{DecodePrivateKey, DecodePublicKey},
    signature::{SignatureEncoding, Signer},
};
use sha1::Sha1;
use sha2::Sha256;
use x509_cert::spki::SubjectPublicKeyInfoOwned;

use crate::error::{CaError, Result};
use crate::pem_utils;

/// Modulus size of every key pair generated by the tool.
pub const RSA_KEY_BITS: usize = 2048;

/// PEM label of a PKCS#1 RSA private key.
pub const RSA_PRIVATE_KEY_LABEL: &str = "RSA PRIVATE KEY";

/// PEM label of a PKCS#8 private key.
pub const PKCS8_PRIVATE_KEY_LABEL: &str = "PRIVATE KEY";

/// An RSA key pair owned by a single issuance run.
#[derive(Clone, Debug)]
pub struct KeyPair {
    private: Box<RsaPrivateKey>,
    public: RsaPublicKey,
}

impl KeyPair {
    /// Generate an RSA key pair with the specified number of bits, using the OS RNG.
    pub fn generate_rsa(bits: usize) -> Result<Self> {
        let mut rng = rand_core::OsRng;
        let private = RsaPrivateKey::new(&mut rng, bits)
            .map_err(|e| CaError::CryptoError(format!("RSA key generation failed: {e}")))?;
        Ok(Self::from_private_key(private))
    }

    /// Wraps an existing private key, deriving the public half from it.
    pub fn from_private_key(private: RsaPrivateKey) -> Self {
        let public = RsaPublicKey::from(&private);
        KeyPair {
            private: Box::new(private),
            public,
        }
    }

    /// Imports a private key from PEM.
    ///
    /// The first block labelled `RSA PRIVATE KEY` (PKCS#1) or `PRIVATE KEY`
    /// (PKCS#8) is used; other blocks, such as certificates in a combined
    /// file, are skipped.
    pub fn from_pem(pem_str: &str) -> Result<Self> {
        let blocks = pem::parse_many(pem_str)?;
        let block = blocks
            .iter()
            .find(|block| block.tag().ends_with(PKCS8_PRIVATE_KEY_LABEL))
            .ok_or_else(|| CaError::DecodingError("no private key PEM block found".to_string()))?;

        let private = match block.tag() {
            RSA_PRIVATE_KEY_LABEL => RsaPrivateKey::from_pkcs1_der(block.contents())?,
            PKCS8_PRIVATE_KEY_LABEL => RsaPrivateKey::from_pkcs8_der(block.contents())?,
            other => {
                return Err(CaError::DecodingError(format!(
                    "unsupported private key type '{other}', only RSA keys are supported"
                )));
            }
        };
        private.validate()?;
        Ok(Self::from_private_key(private))
    }

    pub fn private_key(&self) -> &RsaPrivateKey {
        &self.private
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.public.clone())
    }

    /// Encodes the private key as PKCS#1 DER.
    pub fn to_pkcs1_der(&self) -> Result<Vec<u8>> {
        let document = self.private.to_pkcs1_der()?;
        Ok(document.as_bytes().to_vec())
    }

    /// Encodes the private key as a PEM `RSA PRIVATE KEY` block.
    pub fn to_pkcs1_pem(&self) -> Result<String> {
        Ok(pem_utils::der_to_pem(&self.to_pkcs1_der()?, RSA_PRIVATE_KEY_LABEL))
    }

    /// Signs `data` with RSASSA-PKCS1-v1_5 over SHA-256.
    pub fn sign_data(&self, data: &[u8]) -> Result<Vec<u8>> {
        let signing_key = SigningKey::<Sha256>::new(*self.private.clone());
        let signature = signing_key.try_sign(data)?;
        Ok(signature.to_vec())
    }
}

/// The public half of an RSA key pair, as embedded in a certificate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey(pub RsaPublicKey);

impl PublicKey {
    /// Decodes the public key from a certificate's SubjectPublicKeyInfo.
    ///
    /// Fails for anything other than an RSA key.
    pub fn from_x509spki(spki: &SubjectPublicKeyInfoOwned) -> Result<Self> {
        let der = spki.to_der()?;
        let public = RsaPublicKey::from_public_key_der(&der)
            .map_err(|e| CaError::DecodingError(format!("not an RSA public key: {e}")))?;
        Ok(PublicKey(public))
    }

    pub fn to_x509spki(&self) -> Result<SubjectPublicKeyInfoOwned> {
        Ok(SubjectPublicKeyInfoOwned::from_key(self.0.clone())?)
    }

    /// SHA-1 over the subjectPublicKey bits (RFC 5280 section 4.2.1.2, method 1).
    pub fn key_identifier(&self) -> Result<Vec<u8>> {
        let spki = self.to_x509spki()?;
        Ok(key_identifier_of(&spki))
    }
}

/// Computes the RFC 5280 key identifier of an encoded public key.
pub(crate) fn key_identifier_of(spki: &SubjectPublicKeyInfoOwned) -> Vec<u8> {
    <Sha1 as sha1::Digest>::digest(spki.subject_public_key.raw_bytes()).to_vec()
}
