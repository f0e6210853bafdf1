//! # certkit-ca - Root and Intermediate CA Issuance in Pure Rust
//!
//! certkit-ca issues X.509 certification-authority certificates with RSA
//! keys, built entirely with rustcrypto libraries. It produces either a
//! self-signed root CA or an intermediate CA signed by an existing parent
//! certificate and key, and writes the result as two PEM files.
//!
//! It is a single-shot issuance tool: there is no revocation, no CRL or
//! OCSP, and no certificate database.
//!
//! ## Issued Certificates
//!
//! Every certificate carries the same CA profile, whether root or
//! intermediate:
//! - **BasicConstraints**: `cA = true`, critical
//! - **KeyUsage**: digitalSignature and keyCertSign, critical
//! - **ExtendedKeyUsage**: clientAuth and serverAuth
//! - **SubjectKeyIdentifier**, plus an **AuthorityKeyIdentifier** on intermediates
//!
//! Keys are 2048-bit RSA and signatures are RSASSA-PKCS1-v1_5 with SHA-256.
//!
//! ## Quick Start
//!
//! ### Issuing a Root CA
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//! use certkit_ca::{
//!     ca::{IssueOptions, issue_ca},
//!     config::CaConfig,
//!     issuer::IssuanceMode,
//! };
//!
//! # fn main() -> Result<(), certkit_ca::error::CaError> {
//! let config = CaConfig::parse("[CA]\nOrganization = Acme\nCountry = US\n")?;
//!
//! let options = IssueOptions::builder()
//!     .mode(IssuanceMode::Root)
//!     .out_dir(PathBuf::from("."))
//!     .out_name("rootca".to_string())
//!     .build();
//!
//! let artifacts = issue_ca(&options, &config)?;
//! println!("certificate: {}", artifacts.certificate_path.display());
//! # Ok(())
//! # }
//! ```
//!
//! ### Signing a Template Directly
//!
//! ```rust,no_run
//! use certkit_ca::{
//!     cert::params::{CertificationRequestInfo, DistinguishedName, SerialNumberSource, Validity},
//!     issuer::SigningAuthority,
//!     key::{KeyPair, RSA_KEY_BITS},
//! };
//!
//! # fn main() -> Result<(), certkit_ca::error::CaError> {
//! let key_pair = KeyPair::generate_rsa(RSA_KEY_BITS)?;
//!
//! let subject = DistinguishedName::builder()
//!     .organization("Acme".to_string())
//!     .country("US".to_string())
//!     .build();
//!
//! let template = CertificationRequestInfo::ca_template(
//!     subject,
//!     key_pair.public_key(),
//!     Validity::from_year_offsets(0, 10)?,
//!     SerialNumberSource::Random.next_serial(),
//! );
//!
//! let certificate = SigningAuthority::SelfSigned.issue(&template, &key_pair)?;
//! println!("{}", certificate.to_pem()?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Every failure is fatal for an issuance run and is reported as a
//! [`error::CaError`]:
//!
//! ```rust
//! use certkit_ca::{key::KeyPair, error::CaError};
//!
//! match KeyPair::from_pem("invalid pem data") {
//!     Ok(_) => println!("Key imported successfully"),
//!     Err(CaError::DecodingError(msg)) => println!("Failed to decode key: {}", msg),
//!     Err(e) => println!("Other error: {}", e),
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`key`]: RSA key generation, PEM import/export and signing
//! - [`cert`]: Certificate encoding/decoding, templates and extensions
//! - [`issuer`]: The `Issuer` trait and signing authority resolution
//! - [`tbs_certificate`]: Low-level certificate structure assembly
//! - [`artifact`]: Writing the certificate and key files
//! - [`config`]: Subject fields from the INI configuration
//! - [`ca`]: The end-to-end issuance pipeline
//! - [`cli`]: Command-line interface
//! - [`error`]: Error types

pub mod artifact;
pub mod ca;
pub mod cert;
pub mod cli;
pub mod config;
pub mod error;
pub mod issuer;
pub mod key;
pub mod pem_utils;
pub mod tbs_certificate;
