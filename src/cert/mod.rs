pub mod extensions;
pub mod params;

use std::fs;
use std::path::Path;

use der::asn1::AnyRef;
use der::{Decode, Encode, EncodePem};
use extensions::{
    BasicConstraints, ExtendedKeyUsage, KeyUsage, SubjectKeyIdentifier, ToAndFromX509Extension,
};
use params::{CertificationRequestInfo, DistinguishedName, ExtensionParam, Validity};
use rsa::pkcs1v15::{Signature, VerifyingKey};
use rsa::signature::Verifier;
use sha2::Sha256;
use time::OffsetDateTime;
use x509_cert::certificate::CertificateInner;
use x509_cert::name::Name;

use crate::error::{CaError, Result};
use crate::issuer::Issuer;
use crate::key::{KeyPair, PublicKey, key_identifier_of};
use crate::pem_utils;
use crate::tbs_certificate::from_x509_time;

/// PEM label of an X.509 certificate.
pub const CERTIFICATE_LABEL: &str = "CERTIFICATE";

/// Represents the supported signature algorithms for certificates.
///
/// This enum provides a mapping to the corresponding OIDs for each algorithm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    /// SHA-256 with RSA encryption (RSASSA-PKCS1-v1_5).
    Sha256WithRSA,
}

impl From<SignatureAlgorithm> for x509_cert::spki::AlgorithmIdentifierOwned {
    /// Converts a `SignatureAlgorithm` into an `AlgorithmIdentifierOwned`.
    ///
    /// RFC 4055 requires explicit NULL parameters for the RSA PKCS#1 v1.5 family.
    fn from(value: SignatureAlgorithm) -> Self {
        match value {
            SignatureAlgorithm::Sha256WithRSA => x509_cert::spki::AlgorithmIdentifierOwned {
                oid: const_oid::db::rfc5912::SHA_256_WITH_RSA_ENCRYPTION,
                parameters: Some(AnyRef::NULL.into()),
            },
        }
    }
}

/// Represents an X.509 certificate.
///
/// This struct provides methods to encode the certificate into DER or PEM formats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    /// The inner representation of the certificate.
    pub inner: CertificateInner,
}

impl Certificate {
    /// Encodes the certificate into DER format.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        self.inner
            .to_der()
            .map_err(|e| CaError::EncodingError(e.to_string()))
    }

    /// Encodes the certificate into PEM format.
    pub fn to_pem(&self) -> Result<String> {
        self.inner
            .to_pem(pkcs8::LineEnding::LF)
            .map_err(|e| CaError::EncodingError(e.to_string()))
    }

    pub fn from_der(der: &[u8]) -> Result<Self> {
        let inner = CertificateInner::from_der(der)
            .map_err(|e| CaError::DecodingError(e.to_string()))?;
        Ok(Certificate { inner })
    }

    /// Decodes the first `CERTIFICATE` block of a PEM document.
    pub fn from_pem(pem_str: &str) -> Result<Self> {
        let der = pem_utils::first_block_with_label(pem_str, CERTIFICATE_LABEL)?;
        Self::from_der(&der)
    }

    pub fn subject_name(&self) -> &Name {
        &self.inner.tbs_certificate.subject
    }

    pub fn issuer_name(&self) -> &Name {
        &self.inner.tbs_certificate.issuer
    }

    pub fn serial_number(&self) -> &[u8] {
        self.inner.tbs_certificate.serial_number.as_bytes()
    }

    pub fn public_key(&self) -> Result<PublicKey> {
        PublicKey::from_x509spki(&self.inner.tbs_certificate.subject_public_key_info)
    }

    pub fn not_before(&self) -> Result<OffsetDateTime> {
        from_x509_time(&self.inner.tbs_certificate.validity.not_before)
    }

    pub fn not_after(&self) -> Result<OffsetDateTime> {
        from_x509_time(&self.inner.tbs_certificate.validity.not_after)
    }

    /// Returns the raw extensions of the certificate.
    pub fn extensions(&self) -> Vec<ExtensionParam> {
        self.inner
            .tbs_certificate
            .extensions
            .iter()
            .flatten()
            .map(|ext| ExtensionParam {
                oid: ext.extn_id,
                critical: ext.critical,
                value: ext.extn_value.as_bytes().to_vec(),
            })
            .collect()
    }

    /// Decodes the extension of type `E`, if the certificate carries one.
    pub fn extension<E: ToAndFromX509Extension>(&self) -> Result<Option<E>> {
        self.extensions()
            .iter()
            .find(|ext| ext.oid == E::OID)
            .map(|ext| ext.to_extension())
            .transpose()
    }

    /// Checks the certificate signature against `issuer_key`.
    pub fn verify_signed_by(&self, issuer_key: &PublicKey) -> Result<()> {
        let expected: x509_cert::spki::AlgorithmIdentifierOwned =
            SignatureAlgorithm::Sha256WithRSA.into();
        if self.inner.signature_algorithm.oid != expected.oid {
            return Err(CaError::CryptoError(format!(
                "unsupported signature algorithm {}",
                self.inner.signature_algorithm.oid
            )));
        }

        let tbs_der = self.inner.tbs_certificate.to_der()?;
        let signature = Signature::try_from(self.inner.signature.raw_bytes())?;
        VerifyingKey::<Sha256>::new(issuer_key.0.clone()).verify(&tbs_der, &signature)?;
        Ok(())
    }

    /// Extracts certificate information into a `CertificationRequestInfo` object.
    pub fn to_cert_info(&self) -> Result<CertificationRequestInfo> {
        let basic_constraints = self.extension::<BasicConstraints>()?;
        let key_usage = self.extension::<KeyUsage>()?.unwrap_or_default();
        let usages = self
            .extension::<ExtendedKeyUsage>()?
            .map(|eku| eku.usage)
            .unwrap_or_default();

        Ok(CertificationRequestInfo {
            serial_number: self.serial_number().to_vec(),
            subject: DistinguishedName::from_x509_name(self.subject_name())?,
            subject_public_key: self.public_key()?,
            validity: Validity {
                not_before: self.not_before()?,
                not_after: self.not_after()?,
            },
            is_ca: basic_constraints.is_some_and(|bc| bc.is_ca),
            basic_constraints_valid: basic_constraints.is_some(),
            key_usage,
            usages,
        })
    }

    /// Creates a new self-signed certificate.
    ///
    /// # Arguments
    /// * `cert_info` - The certification request information.
    /// * `key` - The key pair whose public half is in `cert_info`; it also signs.
    pub fn new_self_signed(cert_info: &CertificationRequestInfo, key: &KeyPair) -> Result<Self> {
        // For self-signed certificates, the issuer is the same as the subject
        let self_issuer = SelfIssuer {
            name: cert_info.subject.as_x509_name()?,
            key,
        };
        self_issuer.issue(cert_info)
    }
}

// Helper struct for self-signed certificates
struct SelfIssuer<'a> {
    name: Name,
    key: &'a KeyPair,
}

impl Issuer for SelfIssuer<'_> {
    fn issuer_name(&self) -> Name {
        self.name.clone()
    }

    fn signing_key(&self) -> &KeyPair {
        self.key
    }

    fn authority_key_identifier(&self) -> Result<Option<Vec<u8>>> {
        Ok(None)
    }
}

/// A parent CA: its certificate together with the matching private key.
#[derive(Debug, Clone)]
pub struct CertificateWithPrivateKey {
    pub cert: Certificate,
    pub key: KeyPair,
}

impl CertificateWithPrivateKey {
    /// Pairs a certificate with its key, rejecting a key that does not match.
    pub fn new(cert: Certificate, key: KeyPair) -> Result<Self> {
        let public_key = cert.public_key().map_err(|e| {
            CaError::AuthorityResolutionError(format!("unsupported CA certificate: {e}"))
        })?;
        if public_key != key.public_key() {
            return Err(CaError::AuthorityResolutionError(
                "private key does not match the certificate public key".to_string(),
            ));
        }
        Ok(Self { cert, key })
    }

    /// Loads a PEM certificate and PEM private key from disk.
    ///
    /// Both paths may point at the same combined file. Every failure is
    /// reported as [`CaError::AuthorityResolutionError`].
    pub fn load_pem_files(cert_path: &Path, key_path: &Path) -> Result<Self> {
        let cert_pem = read_authority_file(cert_path)?;
        let key_pem = read_authority_file(key_path)?;

        let cert = Certificate::from_pem(&cert_pem).map_err(|e| {
            CaError::AuthorityResolutionError(format!(
                "invalid CA certificate {}: {e}",
                cert_path.display()
            ))
        })?;
        let key = KeyPair::from_pem(&key_pem).map_err(|e| {
            CaError::AuthorityResolutionError(format!(
                "invalid CA private key {}: {e}",
                key_path.display()
            ))
        })?;

        Self::new(cert, key).map_err(|e| match e {
            CaError::AuthorityResolutionError(msg) => {
                let paths = format!(
                    "certificate {}, key {}",
                    cert_path.display(),
                    key_path.display()
                );
                CaError::AuthorityResolutionError(format!("{msg} ({paths})"))
            }
            other => other,
        })
    }
}

fn read_authority_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        CaError::AuthorityResolutionError(format!("cannot read {}: {e}", path.display()))
    })
}

impl Issuer for CertificateWithPrivateKey {
    fn issuer_name(&self) -> Name {
        // The name of the issuer is the subject of the certificate
        self.cert.subject_name().clone()
    }

    fn signing_key(&self) -> &KeyPair {
        &self.key
    }

    fn authority_key_identifier(&self) -> Result<Option<Vec<u8>>> {
        match self.cert.extension::<SubjectKeyIdentifier>()? {
            Some(ski) => Ok(Some(ski.0)),
            None => Ok(Some(key_identifier_of(
                &self.cert.inner.tbs_certificate.subject_public_key_info,
            ))),
        }
    }
}
