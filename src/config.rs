//! Subject configuration.
//!
//! Subject fields live in an INI file with one section per kind of CA:
//!
//! ```ini
//! [CA]
//! Organization = Acme
//! Country = US
//!
//! [INT]
//! Organization = Acme Issuing
//! Country = US
//! ```

use std::path::Path;

use ini::Ini;

use crate::cert::params::DistinguishedName;
use crate::error::{CaError, Result};

/// File read when no configuration path is given.
pub const DEFAULT_CONFIG_FILE: &str = "ca.ini";

pub const ORGANIZATION_KEY: &str = "Organization";
pub const COUNTRY_KEY: &str = "Country";
pub const PROVINCE_KEY: &str = "Province";
pub const LOCALITY_KEY: &str = "Locality";
pub const STREET_ADDRESS_KEY: &str = "StreetAddress";
pub const POSTAL_CODE_KEY: &str = "PostalCode";

/// Parsed subject configuration, passed explicitly into template building.
#[derive(Debug, Clone)]
pub struct CaConfig {
    ini: Ini,
}

impl CaConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let ini = Ini::load_from_file(path).map_err(|e| {
            CaError::ConfigurationError(format!("failed to read {}: {e}", path.display()))
        })?;
        Ok(Self { ini })
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let ini = Ini::load_from_str(contents)
            .map_err(|e| CaError::ConfigurationError(format!("invalid configuration: {e}")))?;
        Ok(Self { ini })
    }

    /// Reads the subject fields of `section`.
    ///
    /// Missing keys yield empty fields; a missing section is an error.
    pub fn subject(&self, section: &str) -> Result<DistinguishedName> {
        let properties = self.ini.section(Some(section)).ok_or_else(|| {
            CaError::ConfigurationError(format!("configuration has no [{section}] section"))
        })?;
        let field = |key: &str| properties.get(key).unwrap_or_default().trim().to_string();

        Ok(DistinguishedName {
            organization: field(ORGANIZATION_KEY),
            country: field(COUNTRY_KEY),
            province: field(PROVINCE_KEY),
            locality: field(LOCALITY_KEY),
            street_address: field(STREET_ADDRESS_KEY),
            postal_code: field(POSTAL_CODE_KEY),
        })
    }
}
