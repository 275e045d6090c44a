//! `chirp` entry-point: loads store settings, connects to Redis, and runs one
//! command.

use std::ffi::OsString;
use std::io::{self, Write};
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::WrapErr;
use ortho_config::OrthoConfig;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use chirp::config::StoreSettings;
use chirp::inbound::cli::{Cli, Services, run};
use chirp::outbound::hashing::Argon2CredentialHasher;
use chirp::outbound::store::{PoolConfig, RedisKeyValueStore, RedisPool};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .with_writer(io::stderr)
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let cli = Cli::parse();
    // Settings come from the environment only; the command line belongs to clap.
    let settings = StoreSettings::load_from_iter([OsString::from("chirp")])
        .wrap_err("load store settings")?;
    let feed_limit = settings.feed_limit().wrap_err("validate CHIRP_FEED_LIMIT")?;

    let pool_config = PoolConfig::new(&settings.redis_url)
        .with_max_size(settings.pool_max_size)
        .with_command_timeout(settings.command_timeout());
    let pool = RedisPool::new(pool_config)
        .await
        .wrap_err("create redis pool")?;

    let services = Services::new(
        Arc::new(RedisKeyValueStore::new(pool)),
        Arc::new(Argon2CredentialHasher::new()),
        feed_limit,
    );

    let mut out = Vec::new();
    run(cli.command, &services, &mut out).await?;
    io::stdout()
        .lock()
        .write_all(&out)
        .wrap_err("write command output")?;
    Ok(())
}
