//! Store contract checks against a live Redis.
//!
//! Set `CHIRP_TEST_REDIS_URL` to run; otherwise each test prints a skip
//! marker and returns. Tests tolerate data left by earlier runs.

#[allow(dead_code)]
#[path = "support/store_harness.rs"]
mod store_harness;

use std::sync::Arc;
use std::time::Duration;

use chirp::domain::ports::{BatchOutcome, KeyValueStore, StoreKey, WriteBatch};
use chirp::domain::{ErrorCode, FeedLimit, LoginCredentials, UserId};
use chirp::outbound::store::{PoolConfig, RedisKeyValueStore, RedisPool};
use rstest::rstest;
use store_harness::{Stores, redis_url_or_skip, unique_username};

async fn redis_store(suite: &str) -> Option<Arc<RedisKeyValueStore>> {
    let url = redis_url_or_skip(suite)?;
    let pool = RedisPool::new(PoolConfig::new(url).with_command_timeout(Duration::from_secs(5)))
        .await
        .expect("redis pool");
    Some(Arc::new(RedisKeyValueStore::new(pool)))
}

fn credentials(username: &str, password: &str) -> LoginCredentials {
    LoginCredentials::try_from_parts(username, password).expect("valid credentials")
}

#[rstest]
#[tokio::test]
async fn counters_strictly_increase() {
    let Some(store) = redis_store("counters_strictly_increase").await else {
        return;
    };
    let key = StoreKey::update_counter();
    let first = store.increment(&key).await.expect("incr");
    let second = store.increment(&key).await.expect("incr");
    assert!(first >= 1);
    assert_eq!(second, first + 1);
}

#[rstest]
#[tokio::test]
async fn guarded_batch_applies_once() {
    let Some(store) = redis_store("guarded_batch_applies_once").await else {
        return;
    };
    let field = unique_username("guard");
    let claim = || {
        let mut batch = WriteBatch::new();
        batch
            .require_field_absent(StoreKey::username_index(), field.clone())
            .hash_set(StoreKey::username_index(), field.clone(), b"0".to_vec());
        batch
    };

    assert_eq!(store.execute(claim()).await.expect("eval"), BatchOutcome::Applied);
    assert_eq!(store.execute(claim()).await.expect("eval"), BatchOutcome::Rejected);
    assert_eq!(
        store
            .hash_get(&StoreKey::username_index(), &field)
            .await
            .expect("hget"),
        Some(b"0".to_vec())
    );
}

#[rstest]
#[tokio::test]
async fn one_key_used_as_two_kinds_applies_nothing() {
    let Some(store) = redis_store("one_key_used_as_two_kinds_applies_nothing").await else {
        return;
    };
    let stem = unique_username("clash");
    let record = StoreKey::new(format!("{stem}:record")).expect("valid key");
    let shared = StoreKey::new(format!("{stem}:shared")).expect("valid key");
    let mut batch = WriteBatch::new();
    batch
        .hash_set(record.clone(), "id", b"1".to_vec())
        .hash_set(shared.clone(), "f", b"v".to_vec())
        .list_push(shared.clone(), b"x".to_vec());

    store.execute(batch).await.expect_err("kind clash");
    assert!(store.hash_get_all(&record).await.expect("hgetall").is_empty());
    assert!(store.hash_get_all(&shared).await.expect("hgetall").is_empty());
}

#[rstest]
#[tokio::test]
async fn registration_login_and_feeds_round_trip() {
    let Some(store) = redis_store("registration_login_and_feeds_round_trip").await else {
        return;
    };
    let stores = Stores::over(store);
    let username = unique_username("redis");

    let user = stores
        .users
        .register_user(&credentials(&username, "pw"))
        .await
        .expect("register");
    let duplicate = stores
        .users
        .register_user(&credentials(&username, "other"))
        .await
        .expect_err("duplicate");
    assert_eq!(duplicate.code(), ErrorCode::UsernameTaken);

    let authenticated = stores
        .users
        .authenticate_by_username(&credentials(&username, "pw"))
        .await
        .expect("login");
    assert_eq!(authenticated, user);

    let first = stores
        .updates
        .create_update(user.id(), "first")
        .await
        .expect("post");
    let second = stores
        .updates
        .create_update(user.id(), "second")
        .await
        .expect("post");
    let feed = stores
        .updates
        .get_user_feed(user.id(), FeedLimit::new(2).expect("valid limit"))
        .await
        .expect("feed");
    assert_eq!(feed, vec![second, first]);
    assert_eq!(
        stores.updates.get_body(&second).await.expect("body"),
        "second"
    );
}

#[rstest]
#[tokio::test]
async fn unknown_records_read_as_empty() {
    let Some(store) = redis_store("unknown_records_read_as_empty").await else {
        return;
    };
    let missing = UserId::new(u64::MAX).expect("valid id");
    let fields = store
        .hash_get_all(&StoreKey::user_record(missing))
        .await
        .expect("hgetall");
    assert!(fields.is_empty());
    let feed = store
        .list_range(&StoreKey::user_feed(missing), 11)
        .await
        .expect("lrange");
    assert!(feed.is_empty());
}
