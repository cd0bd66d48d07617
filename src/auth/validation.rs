//! Validation pipeline for account-facing requests.
//!
//! Each mutating endpoint declares an ordered rule set evaluated against the
//! raw payload. Rules collect *all* field failures instead of failing fast,
//! so every problem renders at once. Structural checks run first per field,
//! then the business checks against the store (email uniqueness). A rule set
//! that passes produces the typed, normalized payload handlers act on; raw
//! input never reaches a handler.
//!
//! The storage-layer unique index stays the authoritative defense for the
//! email race; the checks here exist for a friendly field-level error.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use validator::ValidationError;

use crate::auth::account::{
    Account, LoginPayload, ProfileChanges, RegisterPayload, UpdatePasswordPayload,
    UpdateProfilePayload,
};
use crate::domain::AccountId;
use crate::errors::Result;
use crate::storage::AccountRepository;

lazy_static! {
    // Email validation: basic RFC 5322 compliant pattern
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    )
    .expect("EMAIL_REGEX should be a valid regex pattern");
}

/// Minimum password length requirement
const MIN_PASSWORD_LENGTH: usize = 12;

/// Maximum password length to prevent DoS against the hasher
const MAX_PASSWORD_LENGTH: usize = 128;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self { field: field.into(), message: message.into() }
    }
}

/// Outcome of a rule set: the typed payload, or every field failure.
#[derive(Debug)]
pub enum Checked<T> {
    Valid(T),
    Invalid(Vec<FieldError>),
}

/// Validate email format
pub fn validate_email(email: &str) -> std::result::Result<(), ValidationError> {
    if EMAIL_REGEX.is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_email"))
    }
}

/// Validate password strength
/// Requirements:
/// - At least 12 characters, at most 128
/// - Contains at least one uppercase letter, one lowercase letter,
///   one digit, and one special character
pub fn validate_password(password: &str) -> std::result::Result<(), ValidationError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::new("password_too_short"));
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::new("password_too_long"));
    }

    let has_uppercase = password.chars().any(|c| c.is_uppercase());
    let has_lowercase = password.chars().any(|c| c.is_lowercase());
    let has_digit = password.chars().any(|c| c.is_numeric());
    let has_special = password.chars().any(|c| !c.is_alphanumeric());

    if !has_uppercase {
        return Err(ValidationError::new("password_missing_uppercase"));
    }

    if !has_lowercase {
        return Err(ValidationError::new("password_missing_lowercase"));
    }

    if !has_digit {
        return Err(ValidationError::new("password_missing_digit"));
    }

    if !has_special {
        return Err(ValidationError::new("password_missing_special"));
    }

    Ok(())
}

/// Validate a person name (non-empty after trim, bounded, minimum length)
pub fn validate_name(name: &str, min_len: usize) -> std::result::Result<(), ValidationError> {
    let trimmed = name.trim();

    if trimmed.len() < min_len {
        return Err(ValidationError::new("name_too_short"));
    }

    if trimmed.len() > 255 {
        return Err(ValidationError::new("name_too_long"));
    }

    Ok(())
}

const PASSWORD_POLICY_MESSAGE: &str =
    "Password must be 12+ characters and include upper, lower, number, and special character.";

/// Registration payload produced by a passing [`RegisterRules`] check.
#[derive(Debug, Clone)]
pub struct ValidRegistration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// Rule set for the registration endpoint.
pub struct RegisterRules;

impl RegisterRules {
    pub async fn check(
        accounts: &dyn AccountRepository,
        payload: &RegisterPayload,
    ) -> Result<Checked<ValidRegistration>> {
        let mut errors = Vec::new();

        let first_name = payload.first_name.trim().to_string();
        if validate_name(&first_name, 1).is_err() {
            errors.push(FieldError::new("firstName", "Please provide a first name."));
        }

        let last_name = payload.last_name.trim().to_string();
        if validate_name(&last_name, 2).is_err() {
            errors.push(FieldError::new("lastName", "Please provide a last name."));
        }

        let email = Account::normalize_email(&payload.email);
        if validate_email(&email).is_err() {
            errors.push(FieldError::new("email", "A valid email is required."));
        } else if accounts.email_in_use(&email).await? {
            errors.push(FieldError::new(
                "email",
                "Email exists. Please log in or use a different email.",
            ));
        }

        if validate_password(&payload.password).is_err() {
            errors.push(FieldError::new("password", PASSWORD_POLICY_MESSAGE));
        }

        if !errors.is_empty() {
            return Ok(Checked::Invalid(errors));
        }

        Ok(Checked::Valid(ValidRegistration {
            first_name,
            last_name,
            email,
            password: payload.password.clone(),
        }))
    }
}

/// Login payload produced by a passing [`LoginRules`] check.
#[derive(Debug, Clone)]
pub struct ValidLogin {
    pub email: String,
    pub password: String,
}

/// Rule set for the login endpoint. Password strength is deliberately not
/// re-checked here.
pub struct LoginRules;

impl LoginRules {
    pub fn check(payload: &LoginPayload) -> Checked<ValidLogin> {
        let mut errors = Vec::new();

        let email = Account::normalize_email(&payload.email);
        if validate_email(&email).is_err() {
            errors.push(FieldError::new("email", "Please enter a valid email."));
        }

        if payload.password.is_empty() {
            errors.push(FieldError::new("password", "Please provide your password."));
        }

        if !errors.is_empty() {
            return Checked::Invalid(errors);
        }

        Checked::Valid(ValidLogin { email, password: payload.password.clone() })
    }
}

/// Profile update payload produced by a passing [`UpdateProfileRules`] check.
#[derive(Debug, Clone)]
pub struct ValidProfileUpdate {
    pub account_id: AccountId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl ValidProfileUpdate {
    pub fn changes(&self) -> ProfileChanges {
        ProfileChanges {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Rule set for the profile update endpoint. Email uniqueness excludes the
/// account being updated.
pub struct UpdateProfileRules;

impl UpdateProfileRules {
    pub async fn check(
        accounts: &dyn AccountRepository,
        payload: &UpdateProfilePayload,
    ) -> Result<Checked<ValidProfileUpdate>> {
        let mut errors = Vec::new();

        let account_id = match AccountId::parse(payload.account_id.trim()) {
            Ok(id) => Some(id),
            Err(_) => {
                errors.push(FieldError::new("accountId", "Invalid account id."));
                None
            }
        };

        let first_name = payload.first_name.trim().to_string();
        if validate_name(&first_name, 2).is_err() {
            errors.push(FieldError::new(
                "firstName",
                "First name must be at least 2 characters.",
            ));
        }

        let last_name = payload.last_name.trim().to_string();
        if validate_name(&last_name, 2).is_err() {
            errors.push(FieldError::new("lastName", "Last name must be at least 2 characters."));
        }

        let email = Account::normalize_email(&payload.email);
        if validate_email(&email).is_err() {
            errors.push(FieldError::new("email", "A valid email is required."));
        } else if let Some(id) = &account_id {
            if accounts.email_in_use_by_other(&email, id).await? {
                errors.push(FieldError::new("email", "Email already in use."));
            }
        }

        if !errors.is_empty() {
            return Ok(Checked::Invalid(errors));
        }

        Ok(Checked::Valid(ValidProfileUpdate {
            account_id: account_id.expect("account id present when no errors"),
            first_name,
            last_name,
            email,
        }))
    }
}

/// Password update payload produced by a passing [`UpdatePasswordRules`] check.
#[derive(Debug, Clone)]
pub struct ValidPasswordUpdate {
    pub account_id: AccountId,
    pub password: String,
}

/// Rule set for the password update endpoint.
pub struct UpdatePasswordRules;

impl UpdatePasswordRules {
    pub fn check(payload: &UpdatePasswordPayload) -> Checked<ValidPasswordUpdate> {
        let mut errors = Vec::new();

        let account_id = match AccountId::parse(payload.account_id.trim()) {
            Ok(id) => Some(id),
            Err(_) => {
                errors.push(FieldError::new("accountId", "Invalid account id."));
                None
            }
        };

        if validate_password(&payload.password).is_err() {
            errors.push(FieldError::new("password", PASSWORD_POLICY_MESSAGE));
        }

        if !errors.is_empty() {
            return Checked::Invalid(errors);
        }

        Checked::Valid(ValidPasswordUpdate {
            account_id: account_id.expect("account id present when no errors"),
            password: payload.password.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::account::NewAccount;
    use crate::config::DatabaseConfig;
    use crate::storage::{create_pool, SqlxAccountRepository};

    #[test]
    fn email_validation_accepts_valid_emails() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("test.user+tag@example.co.uk").is_ok());
        assert!(validate_email("admin@subdomain.example.com").is_ok());
    }

    #[test]
    fn email_validation_rejects_invalid_emails() {
        assert!(validate_email("notanemail").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("user name@example.com").is_err());
    }

    #[test]
    fn password_validation_accepts_strong_passwords() {
        assert!(validate_password("Str0ng!Pass#1").is_ok());
        assert!(validate_password("MyP@ssw0rd12345").is_ok());
    }

    #[test]
    fn password_validation_rejects_weak_passwords() {
        assert!(validate_password("Sh0rt!pw").is_err()); // under 12 chars
        assert!(validate_password("alllowercase1!aa").is_err()); // no uppercase
        assert!(validate_password("ALLUPPERCASE1!AA").is_err()); // no lowercase
        assert!(validate_password("NoDigitsHere!abc").is_err()); // no digit
        assert!(validate_password("NoSpecial12345ab").is_err()); // no special char
        assert!(validate_password(&"Aa1!".repeat(40)).is_err()); // over 128 chars
    }

    #[test]
    fn name_validation() {
        assert!(validate_name("Jo", 1).is_ok());
        assert!(validate_name("  ", 1).is_err());
        assert!(validate_name("J", 2).is_err());
        assert!(validate_name(&"a".repeat(256), 1).is_err());
    }

    async fn test_accounts() -> SqlxAccountRepository {
        let config = DatabaseConfig {
            url: "sqlite://:memory:".to_string(),
            max_connections: 1,
            auto_migrate: true,
            ..Default::default()
        };
        let pool = create_pool(&config).await.unwrap();
        SqlxAccountRepository::new(pool)
    }

    fn register_payload() -> RegisterPayload {
        RegisterPayload {
            first_name: "Jo".into(),
            last_name: "Doe".into(),
            email: "Jo@Example.com".into(),
            password: "Str0ng!Pass#1".into(),
        }
    }

    #[tokio::test]
    async fn register_rules_normalize_and_pass() {
        let accounts = test_accounts().await;
        let checked = RegisterRules::check(&accounts, &register_payload()).await.unwrap();

        match checked {
            Checked::Valid(valid) => {
                assert_eq!(valid.email, "jo@example.com");
                assert_eq!(valid.first_name, "Jo");
            }
            Checked::Invalid(errors) => panic!("unexpected errors: {:?}", errors),
        }
    }

    #[tokio::test]
    async fn register_rules_collect_all_errors_in_order() {
        let accounts = test_accounts().await;
        let payload = RegisterPayload {
            first_name: "".into(),
            last_name: "D".into(),
            email: "not-an-email".into(),
            password: "weak".into(),
        };

        let checked = RegisterRules::check(&accounts, &payload).await.unwrap();
        match checked {
            Checked::Invalid(errors) => {
                let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["firstName", "lastName", "email", "password"]);
            }
            Checked::Valid(_) => panic!("expected failures"),
        }
    }

    #[tokio::test]
    async fn register_rules_flag_taken_email() {
        let accounts = test_accounts().await;
        accounts
            .insert(NewAccount {
                first_name: "Jo".into(),
                last_name: "Doe".into(),
                email: "jo@example.com".into(),
                password_hash: "hash".into(),
            })
            .await
            .unwrap();

        let checked = RegisterRules::check(&accounts, &register_payload()).await.unwrap();
        match checked {
            Checked::Invalid(errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "email");
                assert!(errors[0].message.contains("Email exists"));
            }
            Checked::Valid(_) => panic!("expected duplicate-email failure"),
        }
    }

    #[test]
    fn login_rules_require_email_shape_and_password() {
        let payload = LoginPayload { email: "nope".into(), password: "".into() };
        match LoginRules::check(&payload) {
            Checked::Invalid(errors) => {
                assert_eq!(errors.len(), 2);
                assert_eq!(errors[0].field, "email");
                assert_eq!(errors[1].field, "password");
            }
            Checked::Valid(_) => panic!("expected failures"),
        }

        let ok = LoginPayload { email: "JO@example.com".into(), password: "anything".into() };
        match LoginRules::check(&ok) {
            Checked::Valid(valid) => assert_eq!(valid.email, "jo@example.com"),
            Checked::Invalid(errors) => panic!("unexpected errors: {:?}", errors),
        }
    }

    #[tokio::test]
    async fn update_profile_rules_exclude_self_from_uniqueness() {
        let accounts = test_accounts().await;
        let account = accounts
            .insert(NewAccount {
                first_name: "Jo".into(),
                last_name: "Doe".into(),
                email: "jo@example.com".into(),
                password_hash: "hash".into(),
            })
            .await
            .unwrap();

        // Same account keeping its own email passes.
        let payload = UpdateProfilePayload {
            account_id: account.id.to_string(),
            first_name: "Joan".into(),
            last_name: "Doe".into(),
            email: "jo@example.com".into(),
        };
        match UpdateProfileRules::check(&accounts, &payload).await.unwrap() {
            Checked::Valid(valid) => assert_eq!(valid.account_id, account.id),
            Checked::Invalid(errors) => panic!("unexpected errors: {:?}", errors),
        }

        // A different account claiming it fails.
        let other = accounts
            .insert(NewAccount {
                first_name: "Sam".into(),
                last_name: "Low".into(),
                email: "sam@example.com".into(),
                password_hash: "hash".into(),
            })
            .await
            .unwrap();

        let stolen = UpdateProfilePayload {
            account_id: other.id.to_string(),
            first_name: "Sam".into(),
            last_name: "Low".into(),
            email: "jo@example.com".into(),
        };
        match UpdateProfileRules::check(&accounts, &stolen).await.unwrap() {
            Checked::Invalid(errors) => {
                assert_eq!(errors[0].field, "email");
                assert_eq!(errors[0].message, "Email already in use.");
            }
            Checked::Valid(_) => panic!("expected duplicate-email failure"),
        }
    }

    #[tokio::test]
    async fn update_profile_rules_reject_bad_account_id() {
        let accounts = test_accounts().await;
        let payload = UpdateProfilePayload {
            account_id: "42".into(),
            first_name: "Jo".into(),
            last_name: "Doe".into(),
            email: "jo@example.com".into(),
        };

        match UpdateProfileRules::check(&accounts, &payload).await.unwrap() {
            Checked::Invalid(errors) => {
                assert_eq!(errors[0].field, "accountId");
            }
            Checked::Valid(_) => panic!("expected account id failure"),
        }
    }

    #[test]
    fn update_password_rules_enforce_strength() {
        let weak = UpdatePasswordPayload {
            account_id: AccountId::new().to_string(),
            password: "weak".into(),
        };
        match UpdatePasswordRules::check(&weak) {
            Checked::Invalid(errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "password");
            }
            Checked::Valid(_) => panic!("expected failure"),
        }

        let strong = UpdatePasswordPayload {
            account_id: AccountId::new().to_string(),
            password: "Str0ng!Pass#1".into(),
        };
        assert!(matches!(UpdatePasswordRules::check(&strong), Checked::Valid(_)));
    }
}
