//! use certkit_ca::error::CaError;

use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CaError>;

/// Represents errors that can occur while issuing a CA certificate.
///
/// Every variant is fatal for the issuance run: nothing is retried and no
/// later stage runs after one of these is returned.
#[derive(Debug, Error)]
pub enum CaError {
    /// Missing or invalid options, or an unusable configuration file.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// The parent CA certificate or key could not be loaded.
    #[error("Failed to resolve signing authority: {0}")]
    AuthorityResolutionError(String),

    /// Key generation or signing failed.
    #[error("Cryptographic error: {0}")]
    CryptoError(String),

    /// Error during data encoding.
    #[error("Failed to encode data: {0}")]
    EncodingError(String),

    /// Error during data decoding.
    #[error("Failed to decode data: {0}")]
    DecodingError(String),

    /// An artifact could not be written.
    #[error("Failed to write {}: {source}", .path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The certificate was written but the private key was not.
    #[error(
        "Partial output: certificate written to {} but private key {} could not be written: {source}",
        .written.display(),
        .failed.display()
    )]
    PartialWrite {
        written: PathBuf,
        failed: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<der::Error> for CaError {
    /// Converts a `der::Error` into a `CaError`.
    fn from(err: der::Error) -> Self {
        CaError::EncodingError(err.to_string())
    }
}

impl From<rsa::Error> for CaError {
    fn from(err: rsa::Error) -> Self {
        CaError::CryptoError(err.to_string())
    }
}

impl From<rsa::pkcs1::Error> for CaError {
    fn from(err: rsa::pkcs1::Error) -> Self {
        CaError::DecodingError(err.to_string())
    }
}

impl From<pkcs8::Error> for CaError {
    fn from(err: pkcs8::Error) -> Self {
        CaError::DecodingError(err.to_string())
    }
}

impl From<x509_cert::spki::Error> for CaError {
    fn from(err: x509_cert::spki::Error) -> Self {
        CaError::EncodingError(err.to_string())
    }
}

impl From<pem::PemError> for CaError {
    fn from(err: pem::PemError) -> Self {
        CaError::DecodingError(err.to_string())
    }
}

impl From<rsa::signature::Error> for CaError {
    fn from(err: rsa::signature::Error) -> Self {
        CaError::CryptoError(err.to_string())
    }
}
