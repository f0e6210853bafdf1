use der::asn1::{GeneralizedTime, OctetString, UtcTime};
use der::DateTime;
use time::{OffsetDateTime, UtcOffset};
use x509_cert::Version;
use x509_cert::certificate::TbsCertificateInner;
use x509_cert::name::Name;
use x509_cert::serial_number::SerialNumber;

use crate::cert::SignatureAlgorithm;
use crate::cert::params::{ExtensionParam, Validity};
use crate::error::{CaError, Result};
use crate::key::PublicKey;

/// Represents the "To Be Signed" (TBS) portion of an X.509 certificate.
/// This struct contains all the fields required to generate a valid X.509 certificate.
///
/// # Fields
/// * `serial_number` - Big-endian serial number bytes.
/// * `signature_algorithm` - The algorithm used to sign the certificate.
/// * `issuer` - The encoded name of the certificate issuer.
/// * `validity` - The certificate's validity period.
/// * `subject` - The encoded name of the certificate subject.
/// * `subject_public_key` - The public key of the certificate subject.
/// * `extensions` - Additional X.509 extensions for the certificate.
pub struct TbsCertificate {
    pub serial_number: Vec<u8>,
    pub signature_algorithm: SignatureAlgorithm,
    pub issuer: Name,
    pub validity: Validity,
    pub subject: Name,
    pub subject_public_key: PublicKey,
    pub extensions: Vec<ExtensionParam>,
}

impl TbsCertificate {
    /// Converts the `TbsCertificate` into a `TbsCertificateInner` for DER encoding.
    pub fn to_tbs_certificate_inner(&self) -> Result<TbsCertificateInner> {
        let extensions = self
            .extensions
            .iter()
            .map(|ext| -> Result<x509_cert::ext::Extension> {
                Ok(x509_cert::ext::Extension {
                    extn_id: ext.oid,
                    critical: ext.critical,
                    extn_value: OctetString::new(ext.value.clone())?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let validity = x509_cert::time::Validity {
            not_before: to_x509_time(self.validity.not_before)?,
            not_after: to_x509_time(self.validity.not_after)?,
        };

        let serial_number = SerialNumber::new(self.serial_number.as_slice())?;

        Ok(TbsCertificateInner {
            version: Version::V3,
            serial_number,
            signature: self.signature_algorithm.clone().into(),
            issuer: self.issuer.clone(),
            validity,
            subject: self.subject.clone(),
            subject_public_key_info: self.subject_public_key.to_x509spki()?,
            issuer_unique_id: None,
            subject_unique_id: None,
            extensions: Some(extensions),
        })
    }
}

/// Encodes a timestamp the way RFC 5280 section 4.1.2.5 requires: UTCTime
/// through 2049, GeneralizedTime from 2050 on. Sub-second precision is dropped.
pub fn to_x509_time(at: OffsetDateTime) -> Result<x509_cert::time::Time> {
    let at = at.to_offset(UtcOffset::UTC);
    let year = u16::try_from(at.year())
        .map_err(|_| CaError::EncodingError(format!("year {} cannot be encoded", at.year())))?;
    let date_time = DateTime::new(
        year,
        at.month().into(),
        at.day(),
        at.hour(),
        at.minute(),
        at.second(),
    )
    .map_err(|e| CaError::EncodingError(format!("cannot encode {at}: {e}")))?;

    if (1950..2050).contains(&year) {
        Ok(x509_cert::time::Time::UtcTime(UtcTime::from_date_time(date_time)?))
    } else {
        Ok(x509_cert::time::Time::GeneralTime(
            GeneralizedTime::from_date_time(date_time),
        ))
    }
}

/// Decodes a certificate timestamp.
pub fn from_x509_time(time: &x509_cert::time::Time) -> Result<OffsetDateTime> {
    let seconds = time.to_unix_duration().as_secs();
    let seconds = i64::try_from(seconds)
        .map_err(|_| CaError::DecodingError(format!("timestamp {seconds} out of range")))?;
    OffsetDateTime::from_unix_timestamp(seconds)
        .map_err(|e| CaError::DecodingError(e.to_string()))
}
