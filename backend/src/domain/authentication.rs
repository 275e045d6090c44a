//! Authentication gate combining username resolution and hash verification.

use async_trait::async_trait;
use tracing::debug;

use super::ports::LoginService;
use super::{Error, LoginCredentials, User, UserId, Users};

/// Login use-case backed by the user entity store.
///
/// Unknown usernames fail with `UserNotFound` and wrong passwords with
/// `InvalidCredential`, so callers can tell the two apart.
#[derive(Clone)]
pub struct AuthenticationGate {
    users: Users,
}

impl AuthenticationGate {
    /// Create a gate over the user store.
    pub fn new(users: Users) -> Self {
        Self { users }
    }

    /// Register a new account from plaintext credentials.
    ///
    /// # Errors
    ///
    /// As for [`Users::register_user`].
    pub async fn register(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        self.users.register_user(credentials).await
    }
}

#[async_trait]
impl LoginService for AuthenticationGate {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        match self.users.authenticate_by_username(credentials).await {
            Ok(user) => Ok(user.id()),
            Err(error) => {
                debug!(
                    username = %credentials.username(),
                    code = ?error.code(),
                    "authentication failed"
                );
                Err(error)
            }
        }
    }
}
