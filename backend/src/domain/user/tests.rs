//! Validation coverage for user identity types.

use super::*;
use rstest::rstest;

#[rstest]
#[case("1", 1)]
#[case("42", 42)]
#[case("18446744073709551615", u64::MAX)]
fn user_id_parses_positive_integers(#[case] raw: &str, #[case] expected: u64) {
    let id: UserId = raw.parse().expect("valid id");
    assert_eq!(id.get(), expected);
    assert_eq!(id.to_string(), raw);
}

#[rstest]
#[case("0", UserValidationError::ZeroId)]
#[case("-1", UserValidationError::InvalidId)]
#[case("abc", UserValidationError::InvalidId)]
#[case("", UserValidationError::InvalidId)]
fn user_id_rejects_invalid_text(#[case] raw: &str, #[case] expected: UserValidationError) {
    let err = raw.parse::<UserId>().expect_err("invalid id");
    assert_eq!(err, expected);
}

#[rstest]
#[case("", UserValidationError::EmptyUsername)]
#[case("   ", UserValidationError::EmptyUsername)]
#[case(" alice", UserValidationError::PaddedUsername)]
#[case("alice\n", UserValidationError::PaddedUsername)]
fn username_rejects_blank_or_padded(#[case] raw: &str, #[case] expected: UserValidationError) {
    let err = Username::new(raw).expect_err("invalid username");
    assert_eq!(err, expected);
}

#[rstest]
fn username_allows_inner_spaces() {
    let name = Username::new("ada lovelace").expect("valid username");
    assert_eq!(name.as_str(), "ada lovelace");
}

#[rstest]
fn password_hash_debug_hides_bytes() {
    let hash = PasswordHash::new(b"secret-hash".to_vec());
    let rendered = format!("{hash:?}");
    assert!(!rendered.contains("secret"));
    assert!(rendered.contains("11 bytes"));
}

#[rstest]
fn handle_exposes_id_without_lookup() {
    let id = UserId::new(7).expect("valid id");
    let user = User::from(id);
    assert_eq!(user.id(), id);
}

#[rstest]
fn user_id_serialises_as_integer() {
    let id = UserId::new(9).expect("valid id");
    let json = serde_json::to_string(&id).expect("serialises");
    assert_eq!(json, "9");
    let err = serde_json::from_str::<UserId>("0");
    assert!(err.is_err());
}
