//! Account domain models and data structures.
//!
//! Defines the core account entity, its role lifecycle, and the associated
//! request/response DTOs. Raw payload types carry untrusted strings; the
//! validated counterparts in [`crate::auth::validation`] are the only input
//! handlers act on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

use crate::domain::AccountId;

/// Account role, in ascending order of privilege.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccountRole {
    Client,
    Employee,
    Admin,
}

impl AccountRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountRole::Client => "client",
            AccountRole::Employee => "employee",
            AccountRole::Admin => "admin",
        }
    }

    /// Roles allowed into the inventory management area.
    pub fn is_staff(&self) -> bool {
        matches!(self, AccountRole::Employee | AccountRole::Admin)
    }
}

impl Display for AccountRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AccountRole {
    type Err = AccountRoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client" => Ok(AccountRole::Client),
            "employee" => Ok(AccountRole::Employee),
            "admin" => Ok(AccountRole::Admin),
            other => Err(AccountRoleParseError(other.to_string())),
        }
    }
}

/// Error returned when role parsing fails.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid account role: {0}")]
pub struct AccountRoleParseError(pub String);

/// Stored representation of an account. The password hash lives only in the
/// storage layer and is never part of this struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: AccountId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: AccountRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Normalize email to lowercase for consistent storage and comparison.
    pub fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }
}

/// New account creation payload handed to the store. Role is fixed to
/// Client at registration; the store sets the id and timestamps.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
}

/// Profile update payload (names and email only; role is never part of it).
#[derive(Debug, Clone)]
pub struct ProfileChanges {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Raw registration payload as submitted by the client.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterPayload {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// Raw login payload as submitted by the client.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

/// Raw profile update payload. Unknown fields (including a smuggled role)
/// are dropped at deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateProfilePayload {
    pub account_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Raw password update payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdatePasswordPayload {
    pub account_id: String,
    pub password: String,
}

/// Client-facing account projection (no hash, no timestamps).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub id: AccountId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: AccountRole,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            first_name: account.first_name,
            last_name: account.last_name,
            email: account.email,
            role: account.role,
        }
    }
}
