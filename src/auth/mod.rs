//! Authentication, session, and access-control subsystem.

pub mod account;
pub mod account_service;
pub mod context;
pub mod hashing;
pub mod login_service;
pub mod middleware;
pub mod session;
pub mod token;
pub mod validation;

pub use account::{Account, AccountRole};
pub use account_service::AccountService;
pub use context::{AuthContext, Identity};
pub use login_service::LoginService;
pub use session::SessionMirror;
pub use token::{AccountClaims, TokenError, TokenService};
