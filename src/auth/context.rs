//! Request-scoped identity.
//!
//! [`Identity`] is inserted by the resolve-identity middleware on every
//! request; handlers and guards read it through the request extensions.

use crate::auth::account::AccountRole;
use crate::auth::token::AccountClaims;
use crate::domain::AccountId;

/// Authenticated caller attributes derived from a verified token.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub account_id: AccountId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: AccountRole,
}

impl AuthContext {
    /// Ownership-plus-role rule: a caller may act on the target account when
    /// it is their own or they are an administrator.
    pub fn can_act_on(&self, target: &AccountId) -> bool {
        self.account_id == *target || self.role == AccountRole::Admin
    }
}

impl From<AccountClaims> for AuthContext {
    fn from(claims: AccountClaims) -> Self {
        Self {
            account_id: claims.sub,
            first_name: claims.first_name,
            last_name: claims.last_name,
            email: claims.email,
            role: claims.role,
        }
    }
}

/// Caller identity for the current request: anonymous or authenticated.
#[derive(Debug, Clone, Default)]
pub struct Identity(Option<AuthContext>);

impl Identity {
    pub fn anonymous() -> Self {
        Self(None)
    }

    pub fn authenticated(context: AuthContext) -> Self {
        Self(Some(context))
    }

    pub fn context(&self) -> Option<&AuthContext> {
        self.0.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.0.is_some()
    }
}
