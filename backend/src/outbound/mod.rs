//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **store**: Redis-backed `KeyValueStore` with `bb8` connection pooling.
//! - **hashing**: Argon2id-backed `CredentialHasher`.
//!
//! Adapters are thin translators between the port protocol and the backing
//! technology. They contain no business logic.

pub mod hashing;
pub mod store;
