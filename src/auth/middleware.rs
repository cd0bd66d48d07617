//! Axum middleware for identity resolution and route gating.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Extension,
};
use axum_extra::extract::CookieJar;
use tracing::{debug, warn};

use crate::api::outcome::Outcome;
use crate::api::routes::ApiState;
use crate::auth::account::AccountRole;
use crate::auth::context::Identity;
use crate::auth::session;
use crate::observability::metrics;

/// Allowed-role set handed to [`require_role`] via router state.
pub type RoleState = Arc<Vec<AccountRole>>;

/// Resolve the caller's identity from the auth cookie, once per request.
///
/// A missing cookie is not an error; the request proceeds anonymously. A
/// cookie that fails verification is removed in the response so a stale
/// token self-heals, and the request still proceeds anonymously;
/// verification failure never aborts the pipeline.
pub async fn resolve_identity(
    State(state): State<ApiState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let (jar, identity) = match jar.get(session::AUTH_COOKIE_NAME) {
        None => (jar, Identity::anonymous()),
        Some(cookie) => match state.tokens.verify(cookie.value()) {
            Ok(claims) => {
                debug!(account_id = %claims.sub, "resolved authenticated caller");
                (jar, Identity::authenticated(claims.into()))
            }
            Err(err) => {
                warn!(reason = err.as_str(), "discarding auth cookie that failed verification");
                metrics::record_authentication(err.as_str());
                (jar.remove(session::removal_cookie()), Identity::anonymous())
            }
        },
    };

    request.extensions_mut().insert(identity);
    let response = next.run(request).await;
    (jar, response).into_response()
}

/// Gate a route on any authenticated caller. Anonymous callers are
/// redirected to the login entry with a notice.
pub async fn require_authenticated(
    Extension(identity): Extension<Identity>,
    request: Request,
    next: Next,
) -> Response {
    if identity.is_authenticated() {
        return next.run(request).await;
    }

    metrics::record_authorization_denial("login_required");
    Outcome::redirect("/account/login", "Please log in.").into_response()
}

/// Gate a route on an allowed-role set. Anonymous callers and callers whose
/// role is not allowed get a forbidden response rendering the login surface.
pub async fn require_role(
    State(allowed): State<RoleState>,
    Extension(identity): Extension<Identity>,
    request: Request,
    next: Next,
) -> Response {
    match identity.context() {
        Some(context) if allowed.contains(&context.role) => next.run(request).await,
        Some(context) => {
            warn!(account_id = %context.account_id, role = %context.role, "role check failed");
            metrics::record_authorization_denial("role");
            forbidden_login_render()
        }
        None => {
            metrics::record_authorization_denial("role");
            forbidden_login_render()
        }
    }
}

fn forbidden_login_render() -> Response {
    Outcome::render("account/login")
        .with_status(StatusCode::FORBIDDEN)
        .with_notice("You must be signed in as an employee or administrator to access that area.")
        .into_response()
}
