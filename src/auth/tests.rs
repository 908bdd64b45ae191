//! Unit tests for the credential verifiers.

use super::verifier::{BcryptCredentialVerifier, CredentialVerifier, StaticCredentialVerifier};

#[test]
fn test_static_verifier_accepts_exact_match() {
    let verifier = StaticCredentialVerifier::new("aku", "adalah");
    assert!(verifier.verify("aku", "adalah"));
}

#[test]
fn test_static_verifier_rejects_wrong_credentials() {
    let verifier = StaticCredentialVerifier::new("aku", "adalah");
    assert!(!verifier.verify("aku", "salah"));
    assert!(!verifier.verify("bukan", "adalah"));
    assert!(!verifier.verify("", ""));
}

#[test]
fn test_bcrypt_verifier_roundtrip() {
    let hash = bcrypt::hash("rahasia", 4).expect("hash");
    let verifier = BcryptCredentialVerifier::new("admin", hash);
    assert!(verifier.verify("admin", "rahasia"));
    assert!(!verifier.verify("admin", "bukan-rahasia"));
    assert!(!verifier.verify("lain", "rahasia"));
}

#[test]
fn test_bcrypt_verifier_tolerates_bad_hash() {
    let verifier = BcryptCredentialVerifier::new("admin", "not a bcrypt hash");
    assert!(!verifier.verify("admin", "anything"));
}
