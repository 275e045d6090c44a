//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod credential_hasher;
mod in_memory_store;
mod key_value_store;
mod login_service;
mod store_key;

#[cfg(test)]
pub use credential_hasher::MockCredentialHasher;
pub use credential_hasher::{
    CredentialHasher, CredentialHasherError, FixtureCredentialHasher, Verification,
};
pub use in_memory_store::InMemoryKeyValueStore;
#[cfg(test)]
pub use key_value_store::MockKeyValueStore;
pub use key_value_store::{
    BatchGuard, BatchOutcome, KeyValueStore, StoreError, WriteBatch, WriteCommand,
};
pub use login_service::LoginService;
#[cfg(test)]
pub use login_service::MockLoginService;
pub use store_key::{StoreKey, StoreKeyValidationError};
