//! Login service for email/password authentication.

use std::sync::{Arc, LazyLock};

use tracing::{info, instrument, warn};

use crate::auth::account::Account;
use crate::auth::hashing;
use crate::auth::validation::ValidLogin;
use crate::errors::{AuthErrorType, MotorlotError, Result};
use crate::observability::metrics;
use crate::storage::AccountRepository;

/// Pre-computed dummy hash for timing-safe user enumeration prevention.
/// When a non-existent email is used we still run Argon2 verification against
/// this hash so the response time matches real verification.
static DUMMY_HASH: LazyLock<String> = LazyLock::new(|| {
    hashing::hash_password("dummy_startup_value")
        .unwrap_or_else(|_| "$argon2id$v=19$m=19456,t=2,p=1$dW5rbm93bg$dW5rbm93bg".to_string())
});

/// Single user-facing message for every credential failure. Which part was
/// wrong is never revealed.
const INVALID_CREDENTIALS: &str = "Invalid email or password.";

/// Service for handling email/password authentication.
#[derive(Clone)]
pub struct LoginService {
    accounts: Arc<dyn AccountRepository>,
}

impl LoginService {
    pub fn new(accounts: Arc<dyn AccountRepository>) -> Self {
        Self { accounts }
    }

    /// Authenticate with a validated login payload, returning the account
    /// with the password hash already stripped.
    ///
    /// # Errors
    ///
    /// Returns the generic invalid-credentials auth error when the email is
    /// unknown or the password does not match.
    #[instrument(skip(self, login), fields(email = %login.email))]
    pub async fn login(&self, login: &ValidLogin) -> Result<Account> {
        let (account, password_hash) = match self.accounts.find_with_password(&login.email).await?
        {
            Some(found) => found,
            None => {
                if let Err(e) = hashing::verify_password(&login.password, &DUMMY_HASH) {
                    warn!(error = %e, "dummy hash verification failed unexpectedly");
                }
                warn!(email = %login.email, "login attempt for non-existent account");
                metrics::record_authentication("invalid_credentials");
                return Err(MotorlotError::auth(
                    INVALID_CREDENTIALS,
                    AuthErrorType::InvalidCredentials,
                ));
            }
        };

        if !hashing::verify_password(&login.password, &password_hash)? {
            warn!(account_id = %account.id, "login attempt with incorrect password");
            metrics::record_authentication("invalid_credentials");
            return Err(MotorlotError::auth(
                INVALID_CREDENTIALS,
                AuthErrorType::InvalidCredentials,
            ));
        }

        metrics::record_authentication("success");
        info!(account_id = %account.id, "account logged in");

        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::account::NewAccount;
    use crate::config::DatabaseConfig;
    use crate::storage::{create_pool, SqlxAccountRepository};

    async fn service_with_account(email: &str, password: &str) -> LoginService {
        let config = DatabaseConfig {
            url: "sqlite://:memory:".to_string(),
            max_connections: 1,
            auto_migrate: true,
            ..Default::default()
        };
        let pool = create_pool(&config).await.unwrap();
        let accounts = Arc::new(SqlxAccountRepository::new(pool));

        accounts
            .insert(NewAccount {
                first_name: "Jo".into(),
                last_name: "Doe".into(),
                email: email.into(),
                password_hash: hashing::hash_password(password).unwrap(),
            })
            .await
            .unwrap();

        LoginService::new(accounts)
    }

    fn auth_error_message(err: MotorlotError) -> String {
        match err {
            MotorlotError::Auth { message, error_type } => {
                assert_eq!(error_type, AuthErrorType::InvalidCredentials);
                message
            }
            other => panic!("expected auth error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn login_succeeds_with_correct_credentials() {
        let service = service_with_account("jo@example.com", "Str0ng!Pass#1").await;
        let login =
            ValidLogin { email: "jo@example.com".into(), password: "Str0ng!Pass#1".into() };

        let account = service.login(&login).await.unwrap();
        assert_eq!(account.email, "jo@example.com");
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_are_indistinguishable() {
        let service = service_with_account("jo@example.com", "Str0ng!Pass#1").await;

        let wrong_password = service
            .login(&ValidLogin { email: "jo@example.com".into(), password: "wrongpass".into() })
            .await
            .unwrap_err();
        let unknown_email = service
            .login(&ValidLogin { email: "ghost@example.com".into(), password: "wrongpass".into() })
            .await
            .unwrap_err();

        assert_eq!(auth_error_message(wrong_password), auth_error_message(unknown_email));
    }
}
