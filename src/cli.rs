use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::artifact::IssuedArtifacts;
use crate::ca::{IssueOptions, issue_ca};
use crate::cert::params::{DEFAULT_SERIAL_NUMBER, SerialNumberSource};
use crate::config::{CaConfig, DEFAULT_CONFIG_FILE};
use crate::error::{CaError, Result};
use crate::issuer::IssuanceMode;
use crate::key::RSA_KEY_BITS;

/// Issue a self-signed root CA or an intermediate CA certificate.
#[derive(Debug, Clone, Parser)]
#[command(name = "certkit-ca", version, about)]
pub struct Cli {
    /// Create a certificate (the only supported action)
    #[arg(
        long,
        action = ArgAction::Set,
        default_value_t = true,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub create: bool,

    /// Issue a self-signed root CA
    #[arg(long, conflicts_with = "int")]
    pub root: bool,

    /// Issue an intermediate CA signed by --cacertpath/--cakeypath
    #[arg(long)]
    pub int: bool,

    /// Path to the certificate of the signing CA
    #[arg(long)]
    pub cacertpath: Option<PathBuf>,

    /// Path to the private key of the signing CA
    #[arg(long)]
    pub cakeypath: Option<PathBuf>,

    /// Directory the files are written to
    #[arg(long, default_value = ".")]
    pub outpath: PathBuf,

    /// Base name of the output files (<outname>.crt, <outname>.key)
    #[arg(long)]
    pub outname: Option<String>,

    /// Years from today for notAfter; may be negative
    #[arg(long = "expireYears", default_value_t = 10, allow_negative_numbers = true)]
    pub expire_years: i32,

    /// Years from today for notBefore; may be negative
    #[arg(long = "validyears", default_value_t = 0, allow_negative_numbers = true)]
    pub valid_years: i32,

    /// INI file holding the [CA] and [INT] subject sections
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Fixed serial number for the certificate
    #[arg(long, default_value_t = DEFAULT_SERIAL_NUMBER, conflicts_with = "random_serial")]
    pub serial: u64,

    /// Use a random 160-bit serial number instead of --serial
    #[arg(long)]
    pub random_serial: bool,
}

impl TryFrom<&Cli> for IssueOptions {
    type Error = CaError;

    fn try_from(cli: &Cli) -> Result<Self> {
        if !cli.create {
            return Err(CaError::ConfigurationError(
                "no action requested; --create is the only supported action".to_string(),
            ));
        }

        let out_name = match cli.outname.as_deref() {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => {
                return Err(CaError::ConfigurationError(
                    "--outname is required".to_string(),
                ));
            }
        };

        let mode = match (cli.root, cli.int) {
            (true, false) => IssuanceMode::Root,
            (false, true) => {
                let ca_cert_path = cli.cacertpath.clone().ok_or_else(|| {
                    CaError::ConfigurationError("--cacertpath is required with --int".to_string())
                })?;
                let ca_key_path = cli.cakeypath.clone().ok_or_else(|| {
                    CaError::ConfigurationError("--cakeypath is required with --int".to_string())
                })?;
                IssuanceMode::Intermediate {
                    ca_cert_path,
                    ca_key_path,
                }
            }
            _ => {
                return Err(CaError::ConfigurationError(
                    "exactly one of --root or --int is required".to_string(),
                ));
            }
        };

        let serial = if cli.random_serial {
            SerialNumberSource::Random
        } else {
            SerialNumberSource::Fixed(cli.serial)
        };

        Ok(IssueOptions::builder()
            .mode(mode)
            .out_dir(cli.outpath.clone())
            .out_name(out_name)
            .valid_years(cli.valid_years)
            .expire_years(cli.expire_years)
            .serial(serial)
            .key_bits(RSA_KEY_BITS)
            .build())
    }
}

impl Cli {
    /// Validates the options, loads the configuration and issues the certificate.
    pub fn run(&self) -> Result<IssuedArtifacts> {
        let options = IssueOptions::try_from(self)?;
        let config = CaConfig::load(&self.config)?;
        issue_ca(&options, &config)
    }
}
