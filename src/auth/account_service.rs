//! Account lifecycle service: registration, profile updates, password
//! updates.
//!
//! Conflict errors from the store propagate unchanged so the flow layer can
//! translate them into the duplicate-email field error the validation
//! pipeline would have produced.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::auth::account::Account;
use crate::auth::hashing;
use crate::auth::validation::{ValidPasswordUpdate, ValidProfileUpdate, ValidRegistration};
use crate::errors::Result;
use crate::observability::metrics;
use crate::storage::AccountRepository;

/// Service orchestrating account mutations.
#[derive(Clone)]
pub struct AccountService {
    accounts: Arc<dyn AccountRepository>,
}

impl AccountService {
    pub fn new(accounts: Arc<dyn AccountRepository>) -> Self {
        Self { accounts }
    }

    /// Register a new account with role Client. Does not log the caller in.
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: ValidRegistration) -> Result<Account> {
        let password_hash = hashing::hash_password(&registration.password)?;

        let account = self
            .accounts
            .insert(crate::auth::account::NewAccount {
                first_name: registration.first_name,
                last_name: registration.last_name,
                email: registration.email,
                password_hash,
            })
            .await
            .inspect_err(|e| {
                if e.is_conflict() {
                    metrics::record_registration("conflict");
                }
            })?;

        metrics::record_registration("success");
        info!(account_id = %account.id, "account registered");
        Ok(account)
    }

    /// Update names and email. Role is never part of the change set.
    #[instrument(skip(self, update), fields(account_id = %update.account_id))]
    pub async fn update_profile(&self, update: &ValidProfileUpdate) -> Result<Account> {
        let account =
            self.accounts.update_profile(&update.account_id, update.changes()).await?;
        info!(account_id = %account.id, "account profile updated");
        Ok(account)
    }

    /// Replace the stored password hash. The outstanding token is untouched.
    #[instrument(skip(self, update), fields(account_id = %update.account_id))]
    pub async fn update_password(&self, update: &ValidPasswordUpdate) -> Result<()> {
        let password_hash = hashing::hash_password(&update.password)?;
        self.accounts.update_password_hash(&update.account_id, password_hash).await?;
        info!(account_id = %update.account_id, "account password updated");
        Ok(())
    }
}
