//! Driving port for login/authentication use-cases.
//!
//! In hexagonal terms this is a *driving* port: the excluded session layer
//! calls it to authenticate credentials without knowing the backing store.
//! Its error codes are the contract that layer uses to choose messaging:
//! `UserNotFound`, `InvalidCredential`, or a transient `StorageFailure`.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, UserId};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated user id.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error>;
}
