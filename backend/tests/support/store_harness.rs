//! Shared wiring for integration suites.
//!
//! Suites run against the in-memory store by default. Redis-backed suites
//! read `CHIRP_TEST_REDIS_URL` and print a skip marker when it is unset.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use chirp::domain::ports::{FixtureCredentialHasher, InMemoryKeyValueStore, KeyValueStore};
use chirp::domain::{AuthenticationGate, Updates, Users};

/// Entity stores sharing one store connection.
#[derive(Clone)]
pub struct Stores {
    pub users: Users,
    pub updates: Updates,
    pub gate: AuthenticationGate,
}

impl Stores {
    /// Wire the stores over `store` with the fixture hasher.
    pub fn over(store: Arc<dyn KeyValueStore>) -> Self {
        let users = Users::new(store.clone(), Arc::new(FixtureCredentialHasher));
        Self {
            gate: AuthenticationGate::new(users.clone()),
            updates: Updates::new(store),
            users,
        }
    }

    /// Fresh in-memory stores.
    pub fn in_memory() -> Self {
        Self::over(Arc::new(InMemoryKeyValueStore::new()))
    }
}

/// Redis URL for live suites, or `None` after printing a skip marker.
pub fn redis_url_or_skip(suite: &str) -> Option<String> {
    match std::env::var("CHIRP_TEST_REDIS_URL") {
        Ok(url) if !url.trim().is_empty() => Some(url),
        _ => {
            eprintln!("SKIP-REDIS: {suite} needs CHIRP_TEST_REDIS_URL");
            None
        }
    }
}

/// Username unlikely to collide with data left by earlier runs.
pub fn unique_username(stem: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or_default();
    format!("{stem}-{}-{nanos}", std::process::id())
}
