//! Domain primitives, entity stores, and ports.
//!
//! Purpose: persist users and their updates on a key-value store through the
//! [`ports::KeyValueStore`] port. Entity stores hand out id-only handles;
//! attributes are read from the store on every access.
//!
//! Public surface:
//! - Error / ErrorCode: failure payload shared by every operation.
//! - Users / Updates: entity stores.
//! - AuthenticationGate: login use-case implementing [`ports::LoginService`].
//! - IdAllocator, IndexMaintainer, record codec: building blocks the stores
//!   compose.

pub mod auth;
pub mod authentication;
pub mod error;
mod error_mapping;
pub mod feed_index;
pub mod id_allocator;
pub mod ports;
pub mod record;
pub mod update;
pub mod update_service;
pub mod user;
pub mod user_service;

pub use self::auth::{LoginCredentials, LoginValidationError};
pub use self::authentication::AuthenticationGate;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::feed_index::{FeedLimit, FeedLimitError, FeedSelector, IndexMaintainer};
pub use self::id_allocator::{EntityClass, IdAllocator};
pub use self::record::{CodecError, Record, RecordFields, UpdateRecord, UserRecord};
pub use self::update::{Update, UpdateId, UpdateIdError};
pub use self::update_service::Updates;
pub use self::user::{PasswordHash, User, UserId, UserValidationError, Username};
pub use self::user_service::Users;

/// Result alias for domain operations.
///
/// # Examples
/// ```
/// use chirp::domain::{DomainResult, Error};
///
/// fn lookup() -> DomainResult<()> {
///     Err(Error::user_not_found("no user named alice"))
/// }
///
/// assert!(lookup().is_err());
/// ```
pub type DomainResult<T> = Result<T, Error>;
