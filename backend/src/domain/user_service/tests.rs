//! User entity store coverage.

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::{
    CredentialHasherError, FixtureCredentialHasher, InMemoryKeyValueStore, MockCredentialHasher,
    MockKeyValueStore, StoreError,
};
use crate::domain::record::{HASH_FIELD, ID_FIELD, USERNAME_FIELD};
use rstest::{fixture, rstest};

struct Harness {
    store: Arc<InMemoryKeyValueStore>,
    users: Users,
}

#[fixture]
fn harness() -> Harness {
    let store = Arc::new(InMemoryKeyValueStore::new());
    let users = Users::new(store.clone(), Arc::new(FixtureCredentialHasher));
    Harness { store, users }
}

fn credentials(username: &str, password: &str) -> LoginCredentials {
    LoginCredentials::try_from_parts(username, password).expect("valid test credentials")
}

fn name(raw: &str) -> Username {
    Username::new(raw).expect("valid username")
}

#[rstest]
#[tokio::test]
async fn registered_user_authenticates(harness: Harness) {
    let user = harness
        .users
        .register_user(&credentials("alice", "pw"))
        .await
        .expect("registration succeeds");

    assert_eq!(user.id().get(), 1);
    let found = harness
        .users
        .get_user_by_username(&name("alice"))
        .await
        .expect("lookup succeeds");
    assert_eq!(found, user);
    harness
        .users
        .authenticate(&found, "pw")
        .await
        .expect("correct password");

    let err = harness
        .users
        .authenticate(&found, "wrong")
        .await
        .expect_err("wrong password");
    assert_eq!(err.code(), ErrorCode::InvalidCredential);
}

#[rstest]
#[tokio::test]
async fn duplicate_username_is_rejected_and_first_account_survives(harness: Harness) {
    harness
        .users
        .register_user(&credentials("alice", "pw1"))
        .await
        .expect("first registration");

    let err = harness
        .users
        .register_user(&credentials("alice", "pw2"))
        .await
        .expect_err("second registration");
    assert_eq!(err.code(), ErrorCode::UsernameTaken);

    let user = harness
        .users
        .authenticate_by_username(&credentials("alice", "pw1"))
        .await
        .expect("first credentials remain valid");
    assert_eq!(user.id().get(), 1);

    // The losing attempt consumed id 2 but wrote nothing under it.
    let orphan = harness
        .store
        .hash_get_all(&StoreKey::user_record(UserId::new(2).expect("valid id")))
        .await
        .expect("read");
    assert!(orphan.is_empty());
}

#[rstest]
#[tokio::test]
async fn attributes_are_read_back(harness: Harness) {
    let user = harness
        .users
        .create_user(&name("bob"), PasswordHash::new(b"opaque".to_vec()))
        .await
        .expect("create");

    assert_eq!(
        harness.users.get_username(&user).await.expect("username"),
        name("bob")
    );
    assert_eq!(
        harness
            .users
            .get_password_hash(&user)
            .await
            .expect("hash")
            .as_bytes(),
        b"opaque"
    );
}

#[rstest]
#[tokio::test]
async fn unknown_id_fails_on_access_not_construction(harness: Harness) {
    let handle = harness
        .users
        .get_user_by_id(UserId::new(99).expect("valid id"));
    assert_eq!(handle.id().get(), 99);

    let err = harness
        .users
        .get_username(&handle)
        .await
        .expect_err("never allocated");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn unknown_username_is_user_not_found(harness: Harness) {
    let err = harness
        .users
        .authenticate_by_username(&credentials("ghost", "pw"))
        .await
        .expect_err("unknown user");
    assert_eq!(err.code(), ErrorCode::UserNotFound);
}

#[rstest]
#[case(HASH_FIELD)]
#[case(USERNAME_FIELD)]
#[tokio::test]
async fn partial_records_report_missing_field(harness: Harness, #[case] dropped: &str) {
    let id = UserId::new(5).expect("valid id");
    let fields = [
        (ID_FIELD, b"5".to_vec()),
        (USERNAME_FIELD, b"carol".to_vec()),
        (HASH_FIELD, b"fixture$pw".to_vec()),
    ]
    .into_iter()
    .filter(|(field, _)| *field != dropped)
    .map(|(field, value)| (field.to_owned(), value));
    harness.store.put_hash(StoreKey::user_record(id), fields);

    let err = harness
        .users
        .load(&User::new(id))
        .await
        .expect_err("partial record");
    assert_eq!(err.code(), ErrorCode::MissingField);
}

#[rstest]
#[tokio::test]
async fn store_failures_surface_as_storage_failure() {
    let mut store = MockKeyValueStore::new();
    store
        .expect_increment()
        .returning(|_| Err(StoreError::timeout("INCR")));
    store.expect_execute().never();
    let users = Users::new(Arc::new(store), Arc::new(FixtureCredentialHasher));

    let err = users
        .create_user(&name("dave"), PasswordHash::new(b"h".to_vec()))
        .await
        .expect_err("store down");
    assert_eq!(err.code(), ErrorCode::StorageFailure);
    assert!(err.is_transient());
}

#[rstest]
#[tokio::test]
async fn create_writes_record_and_index_in_one_guarded_batch() {
    let mut store = MockKeyValueStore::new();
    store.expect_increment().returning(|_| Ok(3));
    store
        .expect_execute()
        .withf(|batch: &WriteBatch| batch.guards().len() == 1 && batch.commands().len() == 4)
        .times(1)
        .returning(|_| Ok(BatchOutcome::Applied));
    let users = Users::new(Arc::new(store), Arc::new(FixtureCredentialHasher));

    let user = users
        .create_user(&name("erin"), PasswordHash::new(b"h".to_vec()))
        .await
        .expect("create");
    assert_eq!(user.id().get(), 3);
}

#[rstest]
#[tokio::test]
async fn hasher_failures_are_internal_errors(harness: Harness) {
    harness
        .users
        .create_user(&name("frank"), PasswordHash::new(b"not-a-fixture".to_vec()))
        .await
        .expect("create");

    let mut hasher = MockCredentialHasher::new();
    hasher
        .expect_verify()
        .returning(|_, _| Err(CredentialHasherError::malformed_hash("bad")));
    let users = Users::new(harness.store.clone(), Arc::new(hasher));

    let err = users
        .authenticate_by_username(&credentials("frank", "pw"))
        .await
        .expect_err("hasher failure");
    assert_eq!(err.code(), ErrorCode::InternalError);
}
