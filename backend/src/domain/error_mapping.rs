//! Shared mapping from port and codec failures to domain errors.

use tracing::debug;

use super::Error;
use super::ports::{CredentialHasherError, StoreError};
use super::record::CodecError;

pub(crate) fn map_store_error(error: StoreError) -> Error {
    debug!(kind = error.kind(), %error, "key-value store operation failed");
    Error::storage_failure(error.to_string())
}

pub(crate) fn map_codec_error(key: &str, error: CodecError) -> Error {
    debug!(%key, %error, "stored record failed to decode");
    match error {
        CodecError::MissingField { field } => {
            Error::missing_field(format!("{key} is missing field `{field}`"))
        }
        CodecError::InvalidField { .. } => Error::internal(format!("{key}: {error}")),
    }
}

pub(crate) fn map_hasher_error(error: CredentialHasherError) -> Error {
    debug!(kind = error.kind(), %error, "credential hasher failed");
    Error::internal(error.to_string())
}
