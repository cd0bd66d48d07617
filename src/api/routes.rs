//! Router construction and shared API state.

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::auth::account::AccountRole;
use crate::auth::account_service::AccountService;
use crate::auth::login_service::LoginService;
use crate::auth::middleware::{require_authenticated, require_role, resolve_identity, RoleState};
use crate::auth::session::{CookieSettings, SessionMirror};
use crate::auth::token::TokenService;
use crate::config::AuthConfig;
use crate::storage::{
    AccountRepository, ClassificationRepository, DbPool, SqlxAccountRepository,
    SqlxClassificationRepository,
};

use super::handlers::{
    account_management_handler, add_vehicle_handler, build_update_view_handler,
    inventory_management_handler, login_handler, logout_handler, register_handler,
    update_password_handler, update_profile_handler,
};

/// Shared state for all API handlers and middleware.
#[derive(Clone)]
pub struct ApiState {
    pub accounts: Arc<dyn AccountRepository>,
    pub classifications: Arc<dyn ClassificationRepository>,
    pub tokens: Arc<TokenService>,
    pub mirror: SessionMirror,
    pub login_service: LoginService,
    pub account_service: AccountService,
    pub cookies: CookieSettings,
}

impl ApiState {
    pub fn new(pool: DbPool, auth_config: &AuthConfig) -> Self {
        let accounts: Arc<dyn AccountRepository> = Arc::new(SqlxAccountRepository::new(pool.clone()));
        let classifications: Arc<dyn ClassificationRepository> =
            Arc::new(SqlxClassificationRepository::new(pool));

        Self {
            tokens: Arc::new(TokenService::from_config(auth_config)),
            mirror: SessionMirror::new(),
            login_service: LoginService::new(accounts.clone()),
            account_service: AccountService::new(accounts.clone()),
            cookies: CookieSettings::from_config(auth_config),
            accounts,
            classifications,
        }
    }
}

/// Build the full router. Identity resolution runs on every request; guards
/// are layered per route group.
pub fn build_router(state: ApiState) -> Router {
    let staff_only: RoleState = Arc::new(vec![AccountRole::Employee, AccountRole::Admin]);

    let public = Router::new()
        .route("/account/register", post(register_handler))
        .route("/account/login", post(login_handler))
        .route("/account/logout", get(logout_handler));

    let protected = Router::new()
        .route("/account", get(account_management_handler))
        .route("/account/update/{account_id}", get(build_update_view_handler))
        .route("/account/update", post(update_profile_handler))
        .route("/account/update-password", post(update_password_handler))
        .route_layer(middleware::from_fn(require_authenticated));

    let staff = Router::new()
        .route("/inv", get(inventory_management_handler))
        .route("/inv/vehicles", post(add_vehicle_handler))
        .route_layer(middleware::from_fn_with_state(staff_only, require_role));

    Router::new()
        .merge(public)
        .merge(protected)
        .merge(staff)
        .layer(middleware::from_fn_with_state(state.clone(), resolve_identity))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
