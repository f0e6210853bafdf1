use std::path::PathBuf;

use bon::Builder;

use crate::artifact::{IssuedArtifacts, write_artifacts};
use crate::cert::params::{CertificationRequestInfo, SerialNumberSource, Validity};
use crate::config::CaConfig;
use crate::error::{CaError, Result};
use crate::issuer::{IssuanceMode, SigningAuthority};
use crate::key::{KeyPair, RSA_KEY_BITS};

/// Validated inputs of one issuance run.
#[derive(Clone, Debug, Builder)]
pub struct IssueOptions {
    pub mode: IssuanceMode,
    pub out_dir: PathBuf,
    pub out_name: String,
    #[builder(default)]
    pub valid_years: i32,
    #[builder(default = 10)]
    pub expire_years: i32,
    #[builder(default)]
    pub serial: SerialNumberSource,
    #[builder(default = RSA_KEY_BITS)]
    pub key_bits: usize,
}

/// Issues a root or intermediate CA certificate and writes it to disk.
///
/// The parent CA (if any) is resolved before a key is generated, and files
/// are only written once the certificate is fully signed.
pub fn issue_ca(options: &IssueOptions, config: &CaConfig) -> Result<IssuedArtifacts> {
    if options.out_name.is_empty() {
        return Err(CaError::ConfigurationError(
            "output name is required".to_string(),
        ));
    }

    let section = options.mode.config_section();
    let subject = config.subject(section)?;
    let empty = subject.empty_fields();
    if !empty.is_empty() {
        tracing::warn!(section, fields = ?empty, "subject fields are empty and will be omitted");
    }

    let authority = SigningAuthority::resolve(&options.mode)?;
    tracing::debug!(section, "resolved signing authority");

    let key_pair = KeyPair::generate_rsa(options.key_bits)?;
    tracing::debug!(bits = options.key_bits, "generated key pair");

    let validity = Validity::from_year_offsets(options.valid_years, options.expire_years)?;
    if validity.is_inverted() {
        tracing::warn!(
            not_before = %validity.not_before,
            not_after = %validity.not_after,
            "validity window is empty; the certificate will never be valid"
        );
    }

    let template = CertificationRequestInfo::ca_template(
        subject,
        key_pair.public_key(),
        validity,
        options.serial.next_serial(),
    );
    let certificate = authority.issue(&template, &key_pair)?;
    tracing::debug!("signed certificate");

    write_artifacts(&certificate, &key_pair, &options.out_dir, &options.out_name)
}
