//! Failure payload shared by every entity store operation.
//!
//! Errors are transport agnostic. Whatever serves the stores (a CLI, a web
//! layer) chooses its messaging by inspecting [`ErrorCode`]; the message is
//! for humans and logs.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// Stable machine-readable failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Caller input failed validation before reaching the store.
    InvalidRequest,
    /// The referenced entity was never written.
    NotFound,
    /// No user is registered under the supplied username.
    UserNotFound,
    /// The username already belongs to another account.
    UsernameTaken,
    /// The password did not match the stored hash.
    InvalidCredential,
    /// A stored record lacks a required field.
    MissingField,
    /// The key-value store failed or timed out.
    StorageFailure,
    /// An invariant broke inside the crate.
    InternalError,
}

impl ErrorCode {
    /// Snake-case name, identical to the serialised form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::NotFound => "not_found",
            Self::UserNotFound => "user_not_found",
            Self::UsernameTaken => "username_taken",
            Self::InvalidCredential => "invalid_credential",
            Self::MissingField => "missing_field",
            Self::StorageFailure => "storage_failure",
            Self::InternalError => "internal_error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error code plus a non-empty message and optional structured details.
///
/// # Examples
/// ```
/// use chirp::domain::{Error, ErrorCode};
///
/// let err = Error::new(ErrorCode::UsernameTaken, "username taken");
/// assert_eq!(err.code(), ErrorCode::UsernameTaken);
/// assert_eq!(err.to_string(), "username taken");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Error {
    code: ErrorCode,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

/// Reasons [`Error::try_new`] refuses a payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorValidationError {
    /// The message was blank.
    #[error("error message must not be empty")]
    EmptyMessage,
}

macro_rules! error_constructors {
    ($($(#[$meta:meta])* $name:ident => $code:ident;)*) => {
        $(
            $(#[$meta])*
            pub fn $name(message: impl Into<String>) -> Self {
                Self::new(ErrorCode::$code, message)
            }
        )*
    };
}

impl Error {
    /// Create an error.
    ///
    /// # Panics
    ///
    /// Panics when `message` is blank. Every call site in this crate passes a
    /// literal or formatted non-empty message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        match Self::try_new(code, message) {
            Ok(error) => error,
            Err(err) => panic!("invalid error payload: {err}"),
        }
    }

    /// Create an error, rejecting blank messages.
    ///
    /// # Errors
    ///
    /// [`ErrorValidationError::EmptyMessage`] when `message` is blank.
    pub fn try_new(
        code: ErrorCode,
        message: impl Into<String>,
    ) -> Result<Self, ErrorValidationError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(ErrorValidationError::EmptyMessage);
        }
        Ok(Self {
            code,
            message,
            details: None,
        })
    }

    /// Failure category.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable description.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Structured context, when attached.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Attach structured context.
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Whether retrying the same call may succeed. Only store failures are
    /// transient; the crate itself never retries.
    pub fn is_transient(&self) -> bool {
        self.code == ErrorCode::StorageFailure
    }

    error_constructors! {
        /// [`ErrorCode::InvalidRequest`] error.
        invalid_request => InvalidRequest;
        /// [`ErrorCode::NotFound`] error.
        not_found => NotFound;
        /// [`ErrorCode::UserNotFound`] error.
        user_not_found => UserNotFound;
        /// [`ErrorCode::UsernameTaken`] error.
        username_taken => UsernameTaken;
        /// [`ErrorCode::InvalidCredential`] error.
        invalid_credential => InvalidCredential;
        /// [`ErrorCode::MissingField`] error.
        missing_field => MissingField;
        /// [`ErrorCode::StorageFailure`] error.
        storage_failure => StorageFailure;
        /// [`ErrorCode::InternalError`] error.
        internal => InternalError;
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Error {}
