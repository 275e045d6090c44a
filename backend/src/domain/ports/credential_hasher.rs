//! Port for the pluggable one-way credential hash.
use async_trait::async_trait;

use crate::domain::PasswordHash;

use super::define_port_error;

define_port_error! {
    /// Errors raised by credential hasher adapters.
    pub enum CredentialHasherError {
        /// Producing a hash failed.
        Hashing { message: String } => "password hashing failed: {message}",
        /// The stored hash could not be parsed by the hasher.
        MalformedHash { message: String } => "stored password hash is malformed: {message}",
    }
}

/// Outcome of comparing a plaintext against a stored hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    /// The plaintext produced the stored hash.
    Match,
    /// The plaintext does not correspond to the stored hash.
    Mismatch,
}

/// Hash-and-compare function used for registration and login.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialHasher: Send + Sync {
    /// Derive a stored hash from a plaintext password.
    async fn hash(&self, plaintext: &str) -> Result<PasswordHash, CredentialHasherError>;

    /// Compare a plaintext password against a stored hash.
    async fn verify(
        &self,
        plaintext: &str,
        stored: &PasswordHash,
    ) -> Result<Verification, CredentialHasherError>;
}

const FIXTURE_PREFIX: &[u8] = b"fixture$";

/// Deterministic, non-cryptographic hasher for tests.
///
/// Stores `fixture$<plaintext>`. Never use it for real credentials.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCredentialHasher;

#[async_trait]
impl CredentialHasher for FixtureCredentialHasher {
    async fn hash(&self, plaintext: &str) -> Result<PasswordHash, CredentialHasherError> {
        let mut bytes = FIXTURE_PREFIX.to_vec();
        bytes.extend_from_slice(plaintext.as_bytes());
        Ok(PasswordHash::new(bytes))
    }

    async fn verify(
        &self,
        plaintext: &str,
        stored: &PasswordHash,
    ) -> Result<Verification, CredentialHasherError> {
        let expected = stored
            .as_bytes()
            .strip_prefix(FIXTURE_PREFIX)
            .ok_or_else(|| CredentialHasherError::malformed_hash("missing fixture prefix"))?;
        if expected == plaintext.as_bytes() {
            Ok(Verification::Match)
        } else {
            Ok(Verification::Mismatch)
        }
    }
}
