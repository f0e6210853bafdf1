use std::path::PathBuf;

use der::Encode;
use x509_cert::certificate::CertificateInner;
use x509_cert::name::Name;

use crate::cert::extensions::{
    AuthorityKeyIdentifier, BasicConstraints, ExtendedKeyUsage, SubjectKeyIdentifier,
};
use crate::cert::params::{CertificationRequestInfo, ExtensionParam};
use crate::cert::{Certificate, CertificateWithPrivateKey, SignatureAlgorithm};
use crate::error::{CaError, Result};
use crate::key::KeyPair;
use crate::tbs_certificate::TbsCertificate;

/// Represents an entity capable of issuing certificates.
///
/// Root and intermediate issuance differ only in the implementor: a
/// self-signed issuer names itself after the template subject and signs with
/// the new key, a parent CA uses its own subject and key.
pub trait Issuer {
    /// Returns the distinguished name written into the issuer field.
    fn issuer_name(&self) -> Name;

    /// Returns the signing key of the issuer.
    fn signing_key(&self) -> &KeyPair;

    /// Key identifier for the AuthorityKeyIdentifier extension, if one is emitted.
    fn authority_key_identifier(&self) -> Result<Option<Vec<u8>>>;

    /// Signs the certificate described by `cert_request`.
    ///
    /// The TBS certificate is DER-encoded and signed with
    /// RSASSA-PKCS1-v1_5/SHA-256. Nothing is returned unless every field
    /// encodes and the signature succeeds.
    fn issue(&self, cert_request: &CertificationRequestInfo) -> Result<Certificate> {
        let signature_algo = SignatureAlgorithm::Sha256WithRSA;

        let mut extensions: Vec<ExtensionParam> = Vec::new();

        if !cert_request.key_usage.0.is_empty() {
            extensions.push(ExtensionParam::from_extension(cert_request.key_usage, true)?);
        }

        if !cert_request.usages.is_empty() {
            let extended_key_usage = ExtendedKeyUsage {
                usage: cert_request.usages.clone(),
            };
            extensions.push(ExtensionParam::from_extension(extended_key_usage, false)?);
        }

        if cert_request.basic_constraints_valid {
            let basic_constraints = BasicConstraints {
                is_ca: cert_request.is_ca,
                max_path_length: None,
            };
            extensions.push(ExtensionParam::from_extension(basic_constraints, true)?);
        }

        let subject_key_id =
            SubjectKeyIdentifier(cert_request.subject_public_key.key_identifier()?);
        extensions.push(ExtensionParam::from_extension(subject_key_id, false)?);

        if let Some(key_identifier) = self.authority_key_identifier()? {
            let authority_key_id = AuthorityKeyIdentifier { key_identifier };
            extensions.push(ExtensionParam::from_extension(authority_key_id, false)?);
        }

        let tbs_cert = TbsCertificate {
            serial_number: cert_request.serial_number.clone(),
            signature_algorithm: signature_algo.clone(),
            issuer: self.issuer_name(),
            validity: cert_request.validity.clone(),
            subject: cert_request.subject.as_x509_name()?,
            subject_public_key: cert_request.subject_public_key.clone(),
            extensions,
        };

        let tbs_cert_inner = tbs_cert.to_tbs_certificate_inner()?;
        let signature = self.signing_key().sign_data(&tbs_cert_inner.to_der()?)?;

        let cert_inner = CertificateInner {
            tbs_certificate: tbs_cert_inner,
            signature_algorithm: signature_algo.into(),
            signature: der::asn1::BitString::from_bytes(&signature)?,
        };

        Ok(Certificate { inner: cert_inner })
    }
}

/// Which kind of CA is being issued.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IssuanceMode {
    /// Self-signed root CA.
    Root,
    /// CA signed by the parent certificate and key at the given paths.
    Intermediate {
        ca_cert_path: PathBuf,
        ca_key_path: PathBuf,
    },
}

impl IssuanceMode {
    /// Name of the configuration section holding this mode's subject fields.
    pub fn config_section(&self) -> &'static str {
        match self {
            IssuanceMode::Root => "CA",
            IssuanceMode::Intermediate { .. } => "INT",
        }
    }
}

/// The certificate and key that will sign a new CA certificate.
#[derive(Debug, Clone)]
pub enum SigningAuthority {
    /// The new certificate signs itself with its own key.
    SelfSigned,
    /// A parent CA loaded from disk.
    Parent(Box<CertificateWithPrivateKey>),
}

impl SigningAuthority {
    /// Resolves the signing authority for `mode`, loading the parent CA if needed.
    pub fn resolve(mode: &IssuanceMode) -> Result<Self> {
        match mode {
            IssuanceMode::Root => Ok(SigningAuthority::SelfSigned),
            IssuanceMode::Intermediate {
                ca_cert_path,
                ca_key_path,
            } => {
                let parent = CertificateWithPrivateKey::load_pem_files(ca_cert_path, ca_key_path)?;
                match parent.cert.extension::<BasicConstraints>() {
                    Ok(Some(bc)) if bc.is_ca => {}
                    _ => tracing::warn!(
                        path = %ca_cert_path.display(),
                        "parent certificate is not marked as a CA"
                    ),
                }
                Ok(SigningAuthority::Parent(Box::new(parent)))
            }
        }
    }

    /// Signs `cert_request`, whose public key must belong to `subject_key`.
    pub fn issue(
        &self,
        cert_request: &CertificationRequestInfo,
        subject_key: &KeyPair,
    ) -> Result<Certificate> {
        if cert_request.subject_public_key != subject_key.public_key() {
            return Err(CaError::CryptoError(
                "certificate template does not carry the subject key".to_string(),
            ));
        }
        match self {
            SigningAuthority::SelfSigned => Certificate::new_self_signed(cert_request, subject_key),
            SigningAuthority::Parent(parent) => parent.issue(cert_request),
        }
    }
}
