//! Validation coverage for user primitives.

use super::*;
use rstest::rstest;

#[rstest]
#[case("Ada", Ok("Ada"))]
#[case("  Bo  ", Ok("Bo"))]
#[case("A", Err(UserValidationError::NameTooShort { field: "firstName", min: PERSON_NAME_MIN }))]
#[case("   ", Err(UserValidationError::NameTooShort { field: "firstName", min: PERSON_NAME_MIN }))]
fn person_name_trims_and_checks_length(
    #[case] raw: &str,
    #[case] expected: Result<&str, UserValidationError>,
) {
    let result = PersonName::new("firstName", raw).map(|name| name.as_ref().to_owned());
    assert_eq!(result, expected.map(str::to_owned));
}

#[rstest]
fn person_name_rejects_long_values() {
    let long = "x".repeat(PERSON_NAME_MAX + 1);
    assert_eq!(
        PersonName::new("lastName", &long),
        Err(UserValidationError::NameTooLong {
            field: "lastName",
            max: PERSON_NAME_MAX
        })
    );
}

#[rstest]
#[case("attendant@lot.io")]
#[case("A.B+tag@sub.example.org")]
fn accepts_plausible_emails(#[case] raw: &str) {
    assert!(EmailAddress::new(raw).is_ok());
}

#[rstest]
#[case("")]
#[case("@example.com")]
#[case("ada@")]
#[case("ada@localhost")]
#[case("ada@@example.com")]
#[case("ada lovelace@example.com")]
#[case("ada@example..com")]
fn rejects_malformed_emails(#[case] raw: &str) {
    assert_eq!(EmailAddress::new(raw), Err(UserValidationError::InvalidEmail));
}

#[rstest]
#[case("admin", UserRole::Admin)]
#[case("ADMIN", UserRole::Admin)]
#[case("attendant", UserRole::Attendant)]
#[case("parking_attendant", UserRole::Attendant)]
fn parses_roles(#[case] raw: &str, #[case] expected: UserRole) {
    assert_eq!(raw.parse::<UserRole>(), Ok(expected));
}

#[rstest]
fn role_serialises_snake_case() {
    let value = serde_json::to_value(UserRole::Attendant).expect("serialises");
    assert_eq!(value, serde_json::json!("attendant"));
}

#[rstest]
fn user_id_rejects_garbage() {
    assert_eq!(UserId::new("nope"), Err(UserValidationError::InvalidId));
}

#[rstest]
#[case(UserRole::Admin, true)]
#[case(UserRole::Attendant, false)]
fn require_admin_matches_role(#[case] role: UserRole, #[case] allowed: bool) {
    let principal = Principal::new(UserId::random(), role);
    assert_eq!(principal.require_admin().is_ok(), allowed);
}

#[rstest]
fn validation_errors_name_their_field() {
    let err = UserProfile::try_from_parts("Ada", "L", "ada@example.com")
        .expect_err("short last name");
    assert_eq!(err.field(), "lastName");
}
