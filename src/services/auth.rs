// src/services/auth.rs - Admin credential verification
use subtle::ConstantTimeEq;

/// Decides whether a presented admin secret is valid
#[cfg_attr(test, mockall::automock)]
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, secret: &str) -> bool;
}

/// Checks secrets against the single configured admin password
pub struct StaticPasswordVerifier {
    password: String,
}

impl StaticPasswordVerifier {
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
        }
    }
}

impl CredentialVerifier for StaticPasswordVerifier {
    fn verify(&self, secret: &str) -> bool {
        if self.password.is_empty() {
            return false;
        }
        self.password.as_bytes().ct_eq(secret.as_bytes()).into()
    }
}
