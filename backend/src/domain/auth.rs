//! Plaintext credentials accepted by registration and login.
//!
//! Callers validate raw strings here once; the entity stores and the
//! authentication gate only ever see well-formed values.

use std::fmt;

use zeroize::Zeroizing;

use super::Username;

/// Reasons raw credential input is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    /// Username was missing or blank once trimmed.
    #[error("username must not be empty")]
    EmptyUsername,
    /// Password was empty.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Username and plaintext password pair.
///
/// The username is trimmed; the password is kept byte-for-byte, so
/// surrounding whitespace is part of the secret. The password buffer is wiped
/// on drop and never printed by `Debug`.
///
/// # Examples
/// ```
/// use chirp::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" alice ", "pw").unwrap();
/// assert_eq!(creds.username().as_str(), "alice");
/// assert_eq!(creds.password(), "pw");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: Username,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Validate raw inputs.
    ///
    /// # Errors
    ///
    /// [`LoginValidationError::EmptyUsername`] for a blank username and
    /// [`LoginValidationError::EmptyPassword`] for an empty password.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let username =
            Username::new(username.trim()).map_err(|_| LoginValidationError::EmptyUsername)?;
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            username,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Trimmed username.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Plaintext password.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
