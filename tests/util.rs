#![allow(dead_code)]

use std::path::{Path, PathBuf};

use certkit_ca::artifact::IssuedArtifacts;
use certkit_ca::ca::{IssueOptions, issue_ca};
use certkit_ca::cert::Certificate;
use certkit_ca::cert::params::SerialNumberSource;
use certkit_ca::config::CaConfig;
use certkit_ca::issuer::IssuanceMode;
use certkit_ca::key::KeyPair;
use time::{Date, Month, OffsetDateTime};

pub const CONFIG: &str = "\
[CA]
Organization = Acme
Country = US

[INT]
Organization = Acme Issuing
Country = US
Province = California
Locality = San Francisco
StreetAddress = 1 Market St
PostalCode = 94105
";

pub fn config() -> CaConfig {
    CaConfig::parse(CONFIG).unwrap()
}

pub fn write_config(dir: &Path) -> PathBuf {
    let path = dir.join("ca.ini");
    std::fs::write(&path, CONFIG).unwrap();
    path
}

pub fn root_options(dir: &Path, name: &str) -> IssueOptions {
    IssueOptions::builder()
        .mode(IssuanceMode::Root)
        .out_dir(dir.to_path_buf())
        .out_name(name.to_string())
        .build()
}

pub fn intermediate_options(dir: &Path, name: &str, parent: &IssuedArtifacts) -> IssueOptions {
    IssueOptions::builder()
        .mode(IssuanceMode::Intermediate {
            ca_cert_path: parent.certificate_path.clone(),
            ca_key_path: parent.key_path.clone(),
        })
        .out_dir(dir.to_path_buf())
        .out_name(name.to_string())
        .serial(SerialNumberSource::Fixed(2))
        .build()
}

/// Issues `rootca.crt`/`rootca.key` into `dir`.
pub fn issue_root(dir: &Path) -> IssuedArtifacts {
    issue_ca(&root_options(dir, "rootca"), &config()).unwrap()
}

pub fn read_certificate(path: &Path) -> Certificate {
    Certificate::from_pem(&std::fs::read_to_string(path).unwrap()).unwrap()
}

pub fn read_key(path: &Path) -> KeyPair {
    KeyPair::from_pem(&std::fs::read_to_string(path).unwrap()).unwrap()
}

/// Shifts a date by whole years, 29 February rolling to 1 March.
pub fn add_years(date: Date, years: i32) -> Date {
    let year = date.year() + years;
    Date::from_calendar_date(year, date.month(), date.day())
        .unwrap_or_else(|_| Date::from_calendar_date(year, Month::March, 1).unwrap())
}

/// Today's date (UTC) shifted by whole years.
pub fn years_from_today(years: i32) -> Date {
    add_years(OffsetDateTime::now_utc().date(), years)
}

/// Lists the file names in `dir`, sorted.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
