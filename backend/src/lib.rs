//! User and update persistence over a shared key-value store.
//!
//! - [`domain`]: entity stores, index maintenance, and the ports they use.
//! - [`outbound`]: Redis and Argon2 adapters for those ports.
//! - [`inbound`]: the operator command line.
//! - [`config`]: store settings loaded from the environment.

pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;
