use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::cert::{CERTIFICATE_LABEL, Certificate};
use crate::error::{CaError, Result};
use crate::key::KeyPair;
use crate::pem_utils;

/// Extension of the certificate artifact.
pub const CERTIFICATE_EXTENSION: &str = "crt";

/// Extension of the private key artifact.
pub const KEY_EXTENSION: &str = "key";

/// Paths of the two files produced by a successful issuance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedArtifacts {
    pub certificate_path: PathBuf,
    pub key_path: PathBuf,
}

impl IssuedArtifacts {
    /// `<out_dir>/<name>.crt` and `<out_dir>/<name>.key`.
    pub fn paths(out_dir: &Path, name: &str) -> Self {
        Self {
            certificate_path: out_dir.join(format!("{name}.{CERTIFICATE_EXTENSION}")),
            key_path: out_dir.join(format!("{name}.{KEY_EXTENSION}")),
        }
    }
}

/// Writes the certificate and private key as PEM files.
///
/// The certificate is written first with default permissions; the key is
/// written second, readable by its owner only. Existing files are truncated.
/// Failing to write either file is an error; if only the key failed the
/// error is [`CaError::PartialWrite`].
pub fn write_artifacts(
    certificate: &Certificate,
    key_pair: &KeyPair,
    out_dir: &Path,
    name: &str,
) -> Result<IssuedArtifacts> {
    let artifacts = IssuedArtifacts::paths(out_dir, name);

    let certificate_pem = pem_utils::der_to_pem(&certificate.to_der()?, CERTIFICATE_LABEL);
    let key_pem = key_pair.to_pkcs1_pem()?;

    write_file(&artifacts.certificate_path, certificate_pem.as_bytes(), false).map_err(
        |source| CaError::IoError {
            path: artifacts.certificate_path.clone(),
            source,
        },
    )?;
    tracing::info!(path = %artifacts.certificate_path.display(), "wrote certificate");

    write_file(&artifacts.key_path, key_pem.as_bytes(), true).map_err(|source| {
        CaError::PartialWrite {
            written: artifacts.certificate_path.clone(),
            failed: artifacts.key_path.clone(),
            source,
        }
    })?;
    tracing::info!(path = %artifacts.key_path.display(), "wrote private key");

    Ok(artifacts)
}

fn write_file(path: &Path, contents: &[u8], private: bool) -> std::io::Result<()> {
    let mut file = open_truncated(path, private)?;
    file.write_all(contents)?;
    file.sync_all()
}

#[cfg(unix)]
fn open_truncated(path: &Path, private: bool) -> std::io::Result<File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    if !private {
        return options.open(path);
    }

    // mode() only applies when the file is created.
    let file = options.mode(0o600).open(path)?;
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn open_truncated(path: &Path, _private: bool) -> std::io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}
