mod util;

use certkit_ca::ca::issue_ca;
use openssl::nid::Nid;
use openssl::pkey::PKey;
use openssl::stack::Stack;
use openssl::x509::store::X509StoreBuilder;
use openssl::x509::{X509, X509StoreContext};
use regex::Regex;
use std::fs;
use std::process::Command;

fn load_x509(path: &std::path::Path) -> X509 {
    X509::from_pem(&fs::read(path).unwrap()).expect("Failed to parse PEM")
}

fn entry(name: &openssl::x509::X509NameRef, nid: Nid) -> String {
    name.entries_by_nid(nid)
        .next()
        .unwrap()
        .data()
        .as_utf8()
        .unwrap()
        .to_string()
}

#[test]
fn test_openssl_validate_cert() {
    let dir = tempfile::tempdir().unwrap();
    let root = util::issue_root(dir.path());

    // Use OpenSSL CLI to print the generated certificate
    let output = Command::new("openssl")
        .arg("x509")
        .arg("-in")
        .arg(&root.certificate_path)
        .arg("-noout")
        .arg("-text")
        .output()
        .expect("Failed to execute OpenSSL command");

    assert!(
        output.status.success(),
        "OpenSSL command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let output_text = String::from_utf8_lossy(&output.stdout);

    assert!(
        output_text.contains("Version: 3 (0x2)"),
        "Version field is incorrect"
    );
    assert!(
        output_text.contains("Serial Number: 1653 (0x675)"),
        "Serial Number field is incorrect"
    );
    assert!(
        output_text.contains("Signature Algorithm: sha256WithRSAEncryption"),
        "Signature Algorithm field is incorrect"
    );
    assert!(
        output_text.contains("Public-Key: (2048 bit)"),
        "Public key size is incorrect"
    );

    let subject_regex = Regex::new(r"Subject: C\s?=\s?US, O\s?=\s?Acme").unwrap();
    let issuer_regex = Regex::new(r"Issuer: C\s?=\s?US, O\s?=\s?Acme").unwrap();
    assert!(subject_regex.is_match(&output_text), "Subject field is incorrect");
    assert!(issuer_regex.is_match(&output_text), "Issuer field is incorrect");

    let basic_regex = Regex::new(r"X509v3 Basic Constraints: critical\s+CA:TRUE").unwrap();
    let key_usage_regex =
        Regex::new(r"X509v3 Key Usage: critical\s+Digital Signature, Certificate Sign").unwrap();
    let eku_regex = Regex::new(
        r"X509v3 Extended Key Usage:\s+TLS Web Client Authentication, TLS Web Server Authentication",
    )
    .unwrap();
    assert!(basic_regex.is_match(&output_text), "Basic constraints are incorrect");
    assert!(key_usage_regex.is_match(&output_text), "Key usage is incorrect");
    assert!(eku_regex.is_match(&output_text), "Extended key usage is incorrect");
    assert!(
        output_text.contains("X509v3 Subject Key Identifier"),
        "Missing subject key identifier"
    );
}

#[test]
fn test_openssl_crate_validate_root() {
    let dir = tempfile::tempdir().unwrap();
    let root = util::issue_root(dir.path());

    let x509 = load_x509(&root.certificate_path);
    assert_eq!(entry(x509.subject_name(), Nid::ORGANIZATIONNAME), "Acme");
    assert_eq!(entry(x509.subject_name(), Nid::COUNTRYNAME), "US");
    assert_eq!(entry(x509.issuer_name(), Nid::ORGANIZATIONNAME), "Acme");
    assert_eq!(x509.version(), 2, "X509 version should be 3 (0-based index)");

    let serial = x509.serial_number().to_bn().unwrap().to_dec_str().unwrap();
    assert_eq!(serial.to_string(), "1653");

    assert_eq!(
        x509.signature_algorithm().object().nid(),
        Nid::SHA256WITHRSAENCRYPTION
    );

    let public_key = x509.public_key().unwrap();
    assert!(x509.verify(&public_key).unwrap(), "Self-signature is invalid");

    // The PKCS#1 key file is readable by OpenSSL and matches the certificate.
    let private_key = PKey::private_key_from_pem(&fs::read(&root.key_path).unwrap()).unwrap();
    assert_eq!(private_key.bits(), 2048);
    assert!(public_key.public_eq(&private_key));
}

#[test]
fn test_openssl_crate_verify_chain() {
    let dir = tempfile::tempdir().unwrap();
    let root = util::issue_root(dir.path());
    let options = util::intermediate_options(dir.path(), "intca", &root);
    let intermediate = issue_ca(&options, &util::config()).unwrap();

    let root_x509 = load_x509(&root.certificate_path);
    let int_x509 = load_x509(&intermediate.certificate_path);

    assert_eq!(
        entry(int_x509.issuer_name(), Nid::ORGANIZATIONNAME),
        entry(root_x509.subject_name(), Nid::ORGANIZATIONNAME)
    );
    assert_eq!(
        entry(int_x509.subject_name(), Nid::ORGANIZATIONNAME),
        "Acme Issuing"
    );
    assert_eq!(
        entry(int_x509.subject_name(), Nid::STATEORPROVINCENAME),
        "California"
    );
    assert!(int_x509.verify(&root_x509.public_key().unwrap()).unwrap());
    assert!(!int_x509.verify(&int_x509.public_key().unwrap()).unwrap());

    let mut store = X509StoreBuilder::new().unwrap();
    store.add_cert(root_x509).unwrap();
    let store = store.build();

    let chain = Stack::new().unwrap();
    let mut context = X509StoreContext::new().unwrap();
    let verified = context
        .init(&store, &int_x509, &chain, |c| c.verify_cert())
        .unwrap();
    assert!(verified, "Intermediate does not chain to the root");
}
