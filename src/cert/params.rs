use bon::Builder;
use const_oid::ObjectIdentifier;
use der::Tag;
use der::Tagged;
use der::asn1::{Any, PrintableStringRef, SetOfVec, Utf8StringRef};
use time::{Date, Month, OffsetDateTime, UtcOffset};
use x509_cert::attr::AttributeTypeAndValue;
use x509_cert::name::{RdnSequence, RelativeDistinguishedName};

pub use crate::cert::extensions::ExtendedKeyUsageOption;
use crate::cert::extensions::{KeyUsage, ToAndFromX509Extension};
use crate::error::{CaError, Result};
use crate::key::PublicKey;

/// Serial number given to every certificate when no other source is chosen.
pub const DEFAULT_SERIAL_NUMBER: u64 = 1653;

const COUNTRY: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.6");
const LOCALITY: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.7");
const PROVINCE: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.8");
const STREET_ADDRESS: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.9");
const ORGANIZATION: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.10");
const POSTAL_CODE: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.4.17");

/// Parameters of a CA certificate to be signed.
///
/// Build one with [`CertificationRequestInfo::ca_template`]; the builder is
/// available for callers that need to deviate from the CA defaults.
///
/// # Fields
/// * `serial_number` - Big-endian serial number bytes.
/// * `subject` - The distinguished name of the certificate subject.
/// * `subject_public_key` - The public key of the certificate subject.
/// * `validity` - The `notBefore`/`notAfter` window.
/// * `is_ca` - Value of the BasicConstraints `cA` flag.
/// * `basic_constraints_valid` - Whether the BasicConstraints extension is emitted.
/// * `key_usage` - Key usage bits.
/// * `usages` - A list of extended key usage options.
#[derive(Clone, Debug, Builder)]
pub struct CertificationRequestInfo {
    pub serial_number: Vec<u8>,
    pub subject: DistinguishedName,
    pub subject_public_key: PublicKey,
    pub validity: Validity,
    #[builder(default)]
    pub is_ca: bool,
    #[builder(default)]
    pub basic_constraints_valid: bool,
    #[builder(default)]
    pub key_usage: KeyUsage,
    #[builder(default)]
    pub usages: Vec<ExtendedKeyUsageOption>,
}

impl CertificationRequestInfo {
    /// Builds the template shared by root and intermediate CAs.
    ///
    /// Root and intermediate certificates only differ in who signs them, so
    /// the extension bits here are fixed.
    pub fn ca_template(
        subject: DistinguishedName,
        subject_public_key: PublicKey,
        validity: Validity,
        serial_number: Vec<u8>,
    ) -> Self {
        CertificationRequestInfo::builder()
            .serial_number(serial_number)
            .subject(subject)
            .subject_public_key(subject_public_key)
            .validity(validity)
            .is_ca(true)
            .basic_constraints_valid(true)
            .key_usage(KeyUsage::certificate_authority())
            .usages(vec![
                ExtendedKeyUsageOption::ClientAuth,
                ExtendedKeyUsageOption::ServerAuth,
            ])
            .build()
    }
}

/// Where certificate serial numbers come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SerialNumberSource {
    /// The same value for every certificate.
    Fixed(u64),
    /// A fresh positive 160-bit value per certificate.
    Random,
}

impl Default for SerialNumberSource {
    fn default() -> Self {
        SerialNumberSource::Fixed(DEFAULT_SERIAL_NUMBER)
    }
}

impl SerialNumberSource {
    /// Produces big-endian serial number bytes.
    pub fn next_serial(&self) -> Vec<u8> {
        match self {
            SerialNumberSource::Fixed(value) => {
                let bytes = value.to_be_bytes();
                let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len() - 1);
                bytes[first..].to_vec()
            }
            SerialNumberSource::Random => {
                let mut bytes: [u8; 20] = rand::random();
                // RFC 5280 serials are positive and at most 20 octets.
                bytes[0] &= 0x7f;
                bytes[0] |= 0x01;
                bytes.to_vec()
            }
        }
    }
}

/// Distinguished name of a CA, as configured per section.
///
/// Empty fields are left out of the encoded name.
///
/// # Fields
/// * `organization` - The organization (O).
/// * `country` - The country (C).
/// * `province` - The state or province (ST).
/// * `locality` - The locality or city (L).
/// * `street_address` - The street address (STREET).
/// * `postal_code` - The postal code.
#[derive(Clone, Debug, Builder, Default, PartialEq, Eq)]
pub struct DistinguishedName {
    #[builder(default)]
    pub organization: String,
    #[builder(default)]
    pub country: String,
    #[builder(default)]
    pub province: String,
    #[builder(default)]
    pub locality: String,
    #[builder(default)]
    pub street_address: String,
    #[builder(default)]
    pub postal_code: String,
}

impl DistinguishedName {
    fn attributes(&self) -> [(ObjectIdentifier, &str); 6] {
        [
            (COUNTRY, self.country.as_str()),
            (PROVINCE, self.province.as_str()),
            (LOCALITY, self.locality.as_str()),
            (STREET_ADDRESS, self.street_address.as_str()),
            (POSTAL_CODE, self.postal_code.as_str()),
            (ORGANIZATION, self.organization.as_str()),
        ]
    }

    /// Names of the fields that are empty.
    pub fn empty_fields(&self) -> Vec<&'static str> {
        let names = [
            "Country",
            "Province",
            "Locality",
            "StreetAddress",
            "PostalCode",
            "Organization",
        ];
        self.attributes()
            .iter()
            .zip(names)
            .filter(|((_, value), _)| value.is_empty())
            .map(|(_, name)| name)
            .collect()
    }

    /// Converts the distinguished name to an X.509 name, one attribute per RDN.
    ///
    /// Values are PrintableString when possible and UTF8String otherwise.
    /// The country must be a PrintableString.
    pub fn as_x509_name(&self) -> Result<x509_cert::name::DistinguishedName> {
        let mut rdns = Vec::new();
        for (oid, value) in self.attributes() {
            if value.is_empty() {
                continue;
            }
            let value = encode_attribute_value(oid, value)?;
            let atv = AttributeTypeAndValue { oid, value };
            rdns.push(RelativeDistinguishedName(SetOfVec::try_from(vec![atv])?));
        }
        Ok(RdnSequence(rdns))
    }

    /// Creates a `DistinguishedName` from an X.509 name.
    ///
    /// Attributes this type has no field for are ignored.
    pub fn from_x509_name(x509dn: &x509_cert::name::DistinguishedName) -> Result<Self> {
        let mut dn = DistinguishedName::default();

        for rdn in x509dn.0.iter() {
            for attr in rdn.0.iter() {
                let field = match attr.oid {
                    COUNTRY => &mut dn.country,
                    PROVINCE => &mut dn.province,
                    LOCALITY => &mut dn.locality,
                    STREET_ADDRESS => &mut dn.street_address,
                    POSTAL_CODE => &mut dn.postal_code,
                    ORGANIZATION => &mut dn.organization,
                    _ => continue,
                };
                *field = decode_attribute_value(&attr.value)?;
            }
        }

        Ok(dn)
    }
}

fn encode_attribute_value(oid: ObjectIdentifier, value: &str) -> Result<Any> {
    match PrintableStringRef::new(value) {
        Ok(printable) => Ok(Any::encode_from(&printable)?),
        Err(_) if oid == COUNTRY => Err(CaError::EncodingError(format!(
            "country '{value}' is not a printable string"
        ))),
        Err(_) => Ok(Any::encode_from(&Utf8StringRef::new(value)?)?),
    }
}

fn decode_attribute_value(value: &Any) -> Result<String> {
    match value.tag() {
        Tag::PrintableString => Ok(PrintableStringRef::try_from(value)?.to_string()),
        Tag::Utf8String => Ok(Utf8StringRef::try_from(value)?.to_string()),
        other => Err(CaError::DecodingError(format!(
            "unsupported name attribute encoding {other}"
        ))),
    }
}

/// Certificate validity period.
///
/// `not_before` may be later than `not_after`.
///
/// # Fields
/// * `not_before` - The start of the validity period.
/// * `not_after` - The end of the validity period.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Validity {
    pub not_before: OffsetDateTime,
    pub not_after: OffsetDateTime,
}

impl Validity {
    /// Creates a validity window of `now + valid_years` to `now + expire_years`.
    pub fn from_year_offsets(valid_years: i32, expire_years: i32) -> Result<Self> {
        Self::from_year_offsets_at(OffsetDateTime::now_utc(), valid_years, expire_years)
    }

    /// Same as [`Validity::from_year_offsets`] with an explicit reference time.
    pub fn from_year_offsets_at(
        now: OffsetDateTime,
        valid_years: i32,
        expire_years: i32,
    ) -> Result<Self> {
        let now = now.to_offset(UtcOffset::UTC);
        Ok(Self {
            not_before: add_years(now, valid_years)?,
            not_after: add_years(now, expire_years)?,
        })
    }

    pub fn is_inverted(&self) -> bool {
        self.not_before >= self.not_after
    }
}

/// Calendar year arithmetic; 29 February rolls over to 1 March in common years.
fn add_years(at: OffsetDateTime, years: i32) -> Result<OffsetDateTime> {
    let out_of_range =
        || CaError::ConfigurationError(format!("year offset {years} is out of range"));

    let year = at.year().checked_add(years).ok_or_else(out_of_range)?;
    let date = match Date::from_calendar_date(year, at.month(), at.day()) {
        Ok(date) => date,
        Err(_) => Date::from_calendar_date(year, Month::March, 1).map_err(|_| out_of_range())?,
    };
    Ok(at.replace_date(date))
}

/// Represents an X.509 extension.
///
/// # Fields
/// * `oid` - The object identifier of the extension.
/// * `critical` - Indicates if the extension is critical.
/// * `value` - The DER-encoded value of the extension.
#[derive(Clone, Debug)]
pub struct ExtensionParam {
    pub oid: ObjectIdentifier,
    pub critical: bool,
    /// DER-encoded extension value
    pub value: Vec<u8>,
}

impl ExtensionParam {
    /// Creates an `ExtensionParam` from a specific extension.
    pub fn from_extension<E: ToAndFromX509Extension>(extension: E, critical: bool) -> Result<Self> {
        Ok(Self {
            oid: E::OID,
            critical,
            value: extension.to_x509_extension_value()?,
        })
    }

    /// Decodes an `ExtensionParam` into a specific extension.
    pub fn to_extension<E: ToAndFromX509Extension>(&self) -> Result<E> {
        E::from_x509_extension_value(&self.value)
    }
}
