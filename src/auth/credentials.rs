use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::PasswordScheme;

const SHA256_PREFIX: &str = "sha256";

/// Checks a presented password against the stored credential.
///
/// Login and user creation only go through this trait, so swapping schemes
/// never touches the handlers.
pub trait CredentialVerifier: Send + Sync {
    fn scheme(&self) -> PasswordScheme;

    /// Encode a new password for storage
    fn hash(&self, password: &str) -> String;

    fn verify(&self, password: &str, stored: &str) -> bool;
}

/// `sha256$<salt>$<hex digest of salt || password>`
#[derive(Debug, Default, Clone, Copy)]
pub struct SaltedSha256;

impl SaltedSha256 {
    fn digest(salt: &str, password: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(salt.as_bytes());
        hasher.update(password.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

impl CredentialVerifier for SaltedSha256 {
    fn scheme(&self) -> PasswordScheme {
        PasswordScheme::SaltedSha256
    }

    fn hash(&self, password: &str) -> String {
        let salt = Uuid::new_v4().simple().to_string();
        let digest = Self::digest(&salt, password);
        format!("{}${}${}", SHA256_PREFIX, salt, digest)
    }

    fn verify(&self, password: &str, stored: &str) -> bool {
        let mut parts = stored.splitn(3, '$');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(SHA256_PREFIX), Some(salt), Some(expected)) => {
                constant_time_eq(Self::digest(salt, password).as_bytes(), expected.as_bytes())
            }
            _ => false,
        }
    }
}

/// Stored value is the password itself. Only for databases seeded that way.
#[derive(Debug, Default, Clone, Copy)]
pub struct Plaintext;

impl CredentialVerifier for Plaintext {
    fn scheme(&self) -> PasswordScheme {
        PasswordScheme::Plaintext
    }

    fn hash(&self, password: &str) -> String {
        password.to_string()
    }

    fn verify(&self, password: &str, stored: &str) -> bool {
        constant_time_eq(password.as_bytes(), stored.as_bytes())
    }
}

pub fn verifier_for(scheme: PasswordScheme) -> Box<dyn CredentialVerifier> {
    match scheme {
        PasswordScheme::SaltedSha256 => Box::new(SaltedSha256),
        PasswordScheme::Plaintext => Box::new(Plaintext),
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
