//! Session mirror and auth-cookie construction.
//!
//! The mirror is a best-effort, non-authoritative copy of the latest claim
//! set per account, kept for server-rendered views that prefer direct
//! attribute access. It is never consulted for authorization. Whenever a
//! token is reissued the mirror must be refreshed or cleared in the same
//! operation, so the two cannot diverge.

use std::sync::Arc;

use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;

use crate::auth::account::{Account, AccountRole};
use crate::config::AuthConfig;
use crate::domain::AccountId;

/// Name of the cookie carrying the bearer token.
pub const AUTH_COOKIE_NAME: &str = "ml_auth";

/// Mirrored identity attributes for one logged-in account.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MirrorRecord {
    pub account_id: AccountId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: AccountRole,
    pub refreshed_at: DateTime<Utc>,
}

/// In-process session mirror keyed by account id.
#[derive(Clone, Default)]
pub struct SessionMirror {
    records: Arc<DashMap<AccountId, MirrorRecord>>,
}

impl SessionMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refresh the mirror for an account from its freshly issued claims.
    pub fn refresh(&self, account: &Account) {
        self.records.insert(
            account.id.clone(),
            MirrorRecord {
                account_id: account.id.clone(),
                first_name: account.first_name.clone(),
                last_name: account.last_name.clone(),
                email: account.email.clone(),
                role: account.role,
                refreshed_at: Utc::now(),
            },
        );
    }

    pub fn get(&self, id: &AccountId) -> Option<MirrorRecord> {
        self.records.get(id).map(|entry| entry.value().clone())
    }

    pub fn clear(&self, id: &AccountId) {
        self.records.remove(id);
    }
}

/// Cookie attributes derived from the auth configuration.
#[derive(Debug, Clone)]
pub struct CookieSettings {
    /// `Secure` flag; set only in production
    pub secure: bool,
    /// Cookie lifetime, matching the token TTL
    pub max_age: time::Duration,
}

impl CookieSettings {
    pub fn from_config(config: &AuthConfig) -> Self {
        Self {
            secure: config.production,
            max_age: time::Duration::seconds(config.token_ttl_seconds as i64),
        }
    }
}

/// Build the auth cookie for a freshly issued token.
pub fn auth_cookie(token: String, settings: &CookieSettings) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .secure(settings.secure)
        .same_site(SameSite::Lax)
        .max_age(settings.max_age)
        .build()
}

/// Cookie used to clear the auth transport (logout, stale-token self-heal).
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE_NAME, "")).path("/").build()
}
