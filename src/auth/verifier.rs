//! Pluggable credential verification.
//!
//! Handlers only see the `CredentialVerifier` capability, so the backend can
//! change (env-configured single user, bcrypt hash, a real directory later)
//! without touching the generator or the session layer.

use bcrypt::verify;

/// Capability to check a username/password pair.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// Single fixed user, plaintext comparison. Configured from `APP_USERNAME`
/// and `APP_PASSWORD`; defaults match the original deployment.
pub struct StaticCredentialVerifier {
    username: String,
    password: String,
}

impl StaticCredentialVerifier {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn from_env() -> Self {
        let username = std::env::var("APP_USERNAME").unwrap_or_else(|_| "aku".to_string());
        let password = std::env::var("APP_PASSWORD").unwrap_or_else(|_| "adalah".to_string());
        Self::new(username, password)
    }
}

impl CredentialVerifier for StaticCredentialVerifier {
    fn verify(&self, username: &str, password: &str) -> bool {
        username == self.username && password == self.password
    }
}

/// Single fixed user with a bcrypt password hash.
pub struct BcryptCredentialVerifier {
    username: String,
    password_hash: String,
}

impl BcryptCredentialVerifier {
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
        }
    }
}

impl CredentialVerifier for BcryptCredentialVerifier {
    fn verify(&self, username: &str, password: &str) -> bool {
        username == self.username && verify(password, &self.password_hash).unwrap_or(false)
    }
}
