//! Argon2id adapter for the credential hasher port.
//!
//! Hashes are stored as PHC strings, so the salt and parameters travel with
//! each record. Derivation is CPU-bound and runs on the blocking pool.

use argon2::Argon2;
use argon2::password_hash::{
    self, PasswordHash as PhcHash, PasswordHasher, PasswordVerifier, SaltString,
};
use async_trait::async_trait;
use rand::rngs::OsRng;
use zeroize::Zeroizing;

use crate::domain::PasswordHash;
use crate::domain::ports::{CredentialHasher, CredentialHasherError, Verification};

/// Argon2id hasher with the crate's default parameters.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2CredentialHasher;

impl Argon2CredentialHasher {
    /// Create a hasher.
    pub fn new() -> Self {
        Self
    }
}

fn hash_blocking(plaintext: &str) -> Result<PasswordHash, CredentialHasherError> {
    let salt = SaltString::generate(&mut OsRng);
    let phc = Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|err| CredentialHasherError::hashing(err.to_string()))?;
    Ok(PasswordHash::new(phc.to_string().into_bytes()))
}

fn verify_blocking(plaintext: &str, stored: &[u8]) -> Result<Verification, CredentialHasherError> {
    let encoded = std::str::from_utf8(stored)
        .map_err(|err| CredentialHasherError::malformed_hash(err.to_string()))?;
    let parsed = PhcHash::new(encoded)
        .map_err(|err| CredentialHasherError::malformed_hash(err.to_string()))?;
    match Argon2::default().verify_password(plaintext.as_bytes(), &parsed) {
        Ok(()) => Ok(Verification::Match),
        Err(password_hash::Error::Password) => Ok(Verification::Mismatch),
        Err(err) => Err(CredentialHasherError::malformed_hash(err.to_string())),
    }
}

fn join_error(err: tokio::task::JoinError) -> CredentialHasherError {
    CredentialHasherError::hashing(format!("hashing task failed: {err}"))
}

#[async_trait]
impl CredentialHasher for Argon2CredentialHasher {
    async fn hash(&self, plaintext: &str) -> Result<PasswordHash, CredentialHasherError> {
        let plaintext = Zeroizing::new(plaintext.to_owned());
        tokio::task::spawn_blocking(move || hash_blocking(&plaintext))
            .await
            .map_err(join_error)?
    }

    async fn verify(
        &self,
        plaintext: &str,
        stored: &PasswordHash,
    ) -> Result<Verification, CredentialHasherError> {
        let plaintext = Zeroizing::new(plaintext.to_owned());
        let stored = stored.as_bytes().to_vec();
        tokio::task::spawn_blocking(move || verify_blocking(&plaintext, &stored))
            .await
            .map_err(join_error)?
    }
}
