//! Operator command line for the `chirp` binary.
//!
//! Parses subcommands with clap and drives the entity stores. Every result is
//! written as one `key=value` line so the output stays greppable.

use std::io::{self, Write};
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::domain::ports::{CredentialHasher, KeyValueStore, LoginService};
use crate::domain::{
    AuthenticationGate, Error, FeedLimit, LoginCredentials, LoginValidationError, Update,
    Updates, UserId, Username, Users,
};

/// `chirp` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "chirp",
    about = "Register users, post updates and read feeds from the shared store",
    version
)]
pub struct Cli {
    /// Operation to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported operations.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Create an account.
    Register {
        /// Login name; surrounding whitespace is trimmed.
        username: String,
        /// Plaintext password.
        #[arg(long, value_name = "password")]
        password: String,
    },
    /// Check a username and password.
    Login {
        /// Login name.
        username: String,
        /// Plaintext password.
        #[arg(long, value_name = "password")]
        password: String,
    },
    /// Post an update on behalf of a user.
    Post {
        /// Author id.
        #[arg(long = "user-id", value_name = "id")]
        user_id: UserId,
        /// Update text.
        body: String,
    },
    /// Print the newest updates, globally or for one user.
    Feed {
        /// Restrict to one author.
        #[arg(long = "user-id", value_name = "id")]
        user_id: Option<UserId>,
        /// Maximum number of updates; defaults to the configured limit.
        #[arg(long, value_name = "n", value_parser = parse_feed_limit)]
        limit: Option<FeedLimit>,
    },
    /// Resolve a username to its user id.
    Whois {
        /// Login name.
        username: String,
    },
}

fn parse_feed_limit(raw: &str) -> Result<FeedLimit, String> {
    let limit: usize = raw
        .parse()
        .map_err(|err| format!("invalid limit `{raw}`: {err}"))?;
    FeedLimit::new(limit).map_err(|err| err.to_string())
}

/// Errors surfaced by [`run`].
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// A store operation failed.
    #[error(transparent)]
    Domain(#[from] Error),
    /// Arguments parsed but failed domain validation.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Writing the result failed.
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

impl From<LoginValidationError> for CliError {
    fn from(error: LoginValidationError) -> Self {
        Self::InvalidInput(error.to_string())
    }
}

/// Entity stores wired over one store connection.
#[derive(Clone)]
pub struct Services {
    users: Users,
    updates: Updates,
    gate: AuthenticationGate,
}

impl Services {
    /// Wire the stores over an explicitly passed store and hasher.
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        hasher: Arc<dyn CredentialHasher>,
        feed_limit: FeedLimit,
    ) -> Self {
        let users = Users::new(store.clone(), hasher);
        let updates = Updates::new(store).with_default_limit(feed_limit);
        Self {
            gate: AuthenticationGate::new(users.clone()),
            users,
            updates,
        }
    }

    /// User entity store.
    pub fn users(&self) -> &Users {
        &self.users
    }

    /// Update entity store.
    pub fn updates(&self) -> &Updates {
        &self.updates
    }
}

/// Execute one command, writing its results to `out`.
///
/// # Errors
///
/// Returns [`CliError::Domain`] with the failing operation's error code, or
/// [`CliError::InvalidInput`] when credentials fail validation.
pub async fn run(
    command: Command,
    services: &Services,
    out: &mut impl Write,
) -> Result<(), CliError> {
    match command {
        Command::Register { username, password } => {
            let credentials = LoginCredentials::try_from_parts(&username, &password)?;
            let user = services.gate.register(&credentials).await?;
            writeln!(out, "user_id={} username={}", user.id(), credentials.username())?;
        }
        Command::Login { username, password } => {
            let credentials = LoginCredentials::try_from_parts(&username, &password)?;
            let id = services.gate.authenticate(&credentials).await?;
            writeln!(out, "user_id={id} username={}", credentials.username())?;
        }
        Command::Post { user_id, body } => {
            let update = services.updates.create_update(user_id, &body).await?;
            writeln!(out, "update_id={} user_id={user_id}", update.id())?;
        }
        Command::Feed { user_id, limit } => {
            let limit = limit.unwrap_or_else(|| services.updates.default_limit());
            let feed = match user_id {
                Some(author) => services.updates.get_user_feed(author, limit).await?,
                None => services.updates.get_global_feed(limit).await?,
            };
            for update in feed {
                write_update(services, &update, out).await?;
            }
        }
        Command::Whois { username } => {
            let username = Username::new(username.trim())
                .map_err(|err| CliError::InvalidInput(err.to_string()))?;
            let user = services.users.get_user_by_username(&username).await?;
            writeln!(out, "user_id={} username={username}", user.id())?;
        }
    }
    Ok(())
}

async fn write_update(
    services: &Services,
    update: &Update,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let record = services.updates.load(update).await?;
    writeln!(
        out,
        "update_id={} user_id={} body={:?}",
        record.id, record.author, record.body
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{FixtureCredentialHasher, InMemoryKeyValueStore};
    use rstest::{fixture, rstest};

    #[fixture]
    fn services() -> Services {
        Services::new(
            Arc::new(InMemoryKeyValueStore::new()),
            Arc::new(FixtureCredentialHasher),
            FeedLimit::DEFAULT,
        )
    }

    fn parse(args: &[&str]) -> Command {
        let argv = std::iter::once("chirp").chain(args.iter().copied());
        Cli::try_parse_from(argv).expect("valid arguments").command
    }

    async fn run_to_string(services: &Services, args: &[&str]) -> Result<String, CliError> {
        let mut out = Vec::new();
        run(parse(args), services, &mut out).await?;
        Ok(String::from_utf8(out).expect("utf-8 output"))
    }

    #[rstest]
    #[tokio::test]
    async fn register_login_and_whois(services: Services) {
        let registered = run_to_string(&services, &["register", " alice ", "--password", "pw"])
            .await
            .expect("register");
        assert_eq!(registered, "user_id=1 username=alice\n");

        let login = run_to_string(&services, &["login", "alice", "--password", "pw"])
            .await
            .expect("login");
        assert_eq!(login, "user_id=1 username=alice\n");

        let whois = run_to_string(&services, &["whois", "alice"])
            .await
            .expect("whois");
        assert_eq!(whois, "user_id=1 username=alice\n");
    }

    #[rstest]
    #[tokio::test]
    async fn feed_prints_newest_first(services: Services) {
        for body in ["first", "second", "third"] {
            run_to_string(&services, &["post", "--user-id", "1", body])
                .await
                .expect("post");
        }

        let feed = run_to_string(&services, &["feed", "--limit", "2"])
            .await
            .expect("feed");
        assert_eq!(
            feed,
            "update_id=3 user_id=1 body=\"third\"\nupdate_id=2 user_id=1 body=\"second\"\n"
        );

        let empty = run_to_string(&services, &["feed", "--user-id", "2"])
            .await
            .expect("feed");
        assert!(empty.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn wrong_password_keeps_its_error_code(services: Services) {
        run_to_string(&services, &["register", "alice", "--password", "pw"])
            .await
            .expect("register");

        let err = run_to_string(&services, &["login", "alice", "--password", "nope"])
            .await
            .expect_err("wrong password");
        assert!(matches!(
            err,
            CliError::Domain(ref error) if error.code() == ErrorCode::InvalidCredential
        ));
    }

    #[rstest]
    #[tokio::test]
    async fn blank_username_is_invalid_input(services: Services) {
        let err = run_to_string(&services, &["register", "   ", "--password", "pw"])
            .await
            .expect_err("blank username");
        assert!(matches!(err, CliError::InvalidInput(_)));
    }

    #[rstest]
    #[case(&["feed", "--limit", "0"])]
    #[case(&["post", "--user-id", "0", "hi"])]
    #[case(&["register", "alice"])]
    fn invalid_arguments_are_rejected_by_the_parser(#[case] args: &[&str]) {
        let argv = std::iter::once("chirp").chain(args.iter().copied());
        assert!(Cli::try_parse_from(argv).is_err());
    }
}
