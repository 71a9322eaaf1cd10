use pipette_util::errors::PipetteError;
use pipette_util::hash::{sha256_file, verify_sha256};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

const HELLO_SHA256: &str = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";

fn hello_file() -> NamedTempFile {
    let mut tmp = NamedTempFile::new().unwrap();
    tmp.write_all(b"hello").unwrap();
    tmp.flush().unwrap();
    tmp
}

#[test]
fn test_sha256_file_empty() {
    let tmp = NamedTempFile::new().unwrap();
    assert_eq!(
        sha256_file(tmp.path()).unwrap(),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
}

#[test]
fn test_sha256_file_hello() {
    let tmp = hello_file();
    assert_eq!(sha256_file(tmp.path()).unwrap(), HELLO_SHA256);
}

#[test]
fn test_sha256_file_not_found() {
    let result = sha256_file(Path::new("/nonexistent/path/file.whl"));
    assert!(result.is_err());
}

#[test]
fn test_verify_sha256_accepts_uppercase_digest() {
    let tmp = hello_file();
    verify_sha256(tmp.path(), &HELLO_SHA256.to_uppercase()).unwrap();
}

#[test]
fn test_verify_sha256_mismatch() {
    let tmp = hello_file();
    let err = verify_sha256(tmp.path(), "deadbeef").unwrap_err();
    assert!(matches!(err, PipetteError::Checksum { .. }));
}
