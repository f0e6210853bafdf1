use crate::error::{CaError, Result};

/// Convert DER‑encoded data into a PEM‑encoded string with the provided label.
pub fn der_to_pem(der: &[u8], label: &str) -> String {
    let pem = pem::Pem::new(label, der);
    pem::encode_config(
        &pem,
        pem::EncodeConfig::new().set_line_ending(pem::LineEnding::LF),
    )
}

/// Returns the contents of the first PEM block carrying `label`.
///
/// Blocks with other labels are skipped, so combined certificate and key
/// files are accepted.
pub fn first_block_with_label(pem_str: &str, label: &str) -> Result<Vec<u8>> {
    pem::parse_many(pem_str)?
        .into_iter()
        .find(|block| block.tag() == label)
        .map(|block| block.into_contents())
        .ok_or_else(|| CaError::DecodingError(format!("no '{label}' PEM block found")))
}
