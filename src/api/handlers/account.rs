//! Account flow handlers: registration, login, logout, management view,
//! profile update, password update.
//!
//! Handlers orchestrate rule sets, services, token issuance, and the
//! cookie/mirror pair, and translate every collaborator failure into a
//! rendered outcome. Nothing below this layer reaches the client without a
//! generic fallback.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use axum_extra::extract::CookieJar;
use serde_json::{json, Value};
use tracing::error;

use crate::api::outcome::Outcome;
use crate::api::routes::ApiState;
use crate::auth::account::{
    Account, LoginPayload, RegisterPayload, UpdatePasswordPayload, UpdateProfilePayload,
};
use crate::auth::context::Identity;
use crate::auth::session;
use crate::auth::validation::{
    Checked, FieldError, LoginRules, RegisterRules, UpdatePasswordRules, UpdateProfileRules,
};
use crate::domain::AccountId;
use crate::errors::MotorlotError;
use crate::observability::metrics;

const OWN_ACCOUNT_ONLY: &str = "You can only update your own account.";
const ACCOUNT_NOT_FOUND: &str = "Account not found.";

fn infrastructure_failure(view: &'static str, form: Value, err: MotorlotError) -> Response {
    error!(error = %err, "flow failed on infrastructure error");
    Outcome::failure(view).with_form(form).into_response()
}

fn duplicate_email_error() -> Vec<FieldError> {
    vec![FieldError::new("email", "Email exists. Please log in or use a different email.")]
}

fn register_sticky(payload: &RegisterPayload) -> Value {
    json!({
        "firstName": &payload.first_name,
        "lastName": &payload.last_name,
        "email": &payload.email,
    })
}

/// POST /account/register
pub async fn register_handler(
    State(state): State<ApiState>,
    Json(payload): Json<RegisterPayload>,
) -> Response {
    let sticky = register_sticky(&payload);

    let checked = match RegisterRules::check(state.accounts.as_ref(), &payload).await {
        Ok(checked) => checked,
        Err(err) => return infrastructure_failure("account/register", sticky, err),
    };

    let registration = match checked {
        Checked::Valid(registration) => registration,
        Checked::Invalid(errors) => {
            metrics::record_validation_failure("register");
            return Outcome::render("account/register")
                .with_status(StatusCode::BAD_REQUEST)
                .with_errors(errors)
                .with_form(sticky)
                .into_response();
        }
    };

    match state.account_service.register(registration).await {
        Ok(account) => Outcome::render("account/login")
            .with_status(StatusCode::CREATED)
            .with_notice(format!(
                "Congratulations, you're registered {}. Please log in.",
                account.first_name
            ))
            .into_response(),
        // The unique index caught a race the validation-time check missed.
        Err(err) if err.is_conflict() => Outcome::render("account/register")
            .with_status(StatusCode::BAD_REQUEST)
            .with_errors(duplicate_email_error())
            .with_form(sticky)
            .into_response(),
        Err(err) => {
            error!(error = %err, "registration failed");
            Outcome::render("account/register")
                .with_status(StatusCode::INTERNAL_SERVER_ERROR)
                .with_notice("Sorry, the registration failed.")
                .with_form(sticky)
                .into_response()
        }
    }
}

/// POST /account/login
pub async fn login_handler(
    State(state): State<ApiState>,
    jar: CookieJar,
    Json(payload): Json<LoginPayload>,
) -> Response {
    let sticky = json!({ "email": &payload.email });

    let login = match LoginRules::check(&payload) {
        Checked::Valid(login) => login,
        Checked::Invalid(errors) => {
            metrics::record_validation_failure("login");
            return Outcome::render("account/login")
                .with_status(StatusCode::BAD_REQUEST)
                .with_errors(errors)
                .with_form(sticky)
                .into_response();
        }
    };

    let account = match state.login_service.login(&login).await {
        Ok(account) => account,
        Err(MotorlotError::Auth { message, .. }) => {
            return Outcome::render("account/login")
                .with_status(StatusCode::BAD_REQUEST)
                .with_notice(message)
                .with_form(sticky)
                .into_response();
        }
        Err(err) => return infrastructure_failure("account/login", sticky, err),
    };

    let token = match state.tokens.issue(&account) {
        Ok(token) => token,
        Err(err) => return infrastructure_failure("account/login", sticky, err),
    };

    // Token and mirror move together.
    state.mirror.refresh(&account);
    let jar = jar.add(session::auth_cookie(token, &state.cookies));

    (jar, Outcome::redirect("/account", format!("Welcome back, {}!", account.first_name)))
        .into_response()
}

/// GET /account/logout. Always succeeds.
pub async fn logout_handler(
    State(state): State<ApiState>,
    jar: CookieJar,
    Extension(identity): Extension<Identity>,
) -> Response {
    if let Some(context) = identity.context() {
        state.mirror.clear(&context.account_id);
    }

    let jar = jar.remove(session::removal_cookie());
    (jar, Outcome::redirect("/", "You have been logged out.")).into_response()
}

/// GET /account: management view for the logged-in caller.
pub async fn account_management_handler(
    State(state): State<ApiState>,
    Extension(identity): Extension<Identity>,
) -> Response {
    let Some(context) = identity.context() else {
        return Outcome::redirect("/account/login", "Please log in.").into_response();
    };

    // Prefer the mirror when present; fall back to the verified claims.
    let account = match state.mirror.get(&context.account_id) {
        Some(record) => json!(record),
        None => json!({
            "accountId": &context.account_id,
            "firstName": &context.first_name,
            "lastName": &context.last_name,
            "email": &context.email,
            "role": context.role,
        }),
    };

    Outcome::render("account/management").with_form(json!({ "account": account })).into_response()
}

/// GET /account/update/{account_id}: prefilled update view.
pub async fn build_update_view_handler(
    State(state): State<ApiState>,
    Extension(identity): Extension<Identity>,
    Path(account_id): Path<String>,
) -> Response {
    let Some(context) = identity.context() else {
        return Outcome::redirect("/account/login", "Please log in.").into_response();
    };

    let Ok(target) = AccountId::parse(&account_id) else {
        return Outcome::redirect("/account", ACCOUNT_NOT_FOUND).into_response();
    };

    if !context.can_act_on(&target) {
        metrics::record_authorization_denial("ownership");
        return Outcome::redirect("/account", OWN_ACCOUNT_ONLY).into_response();
    }

    match state.accounts.find_by_id(&target).await {
        Ok(Some(account)) => Outcome::render("account/update")
            .with_form(json!({
                "accountId": account.id,
                "firstName": account.first_name,
                "lastName": account.last_name,
                "email": account.email,
            }))
            .into_response(),
        Ok(None) => Outcome::redirect("/account", ACCOUNT_NOT_FOUND).into_response(),
        Err(err) => infrastructure_failure("account/update", Value::Null, err),
    }
}

fn update_sticky(payload: &UpdateProfilePayload) -> Value {
    json!({
        "accountId": &payload.account_id,
        "firstName": &payload.first_name,
        "lastName": &payload.last_name,
        "email": &payload.email,
    })
}

/// POST /account/update: names and email.
pub async fn update_profile_handler(
    State(state): State<ApiState>,
    jar: CookieJar,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<UpdateProfilePayload>,
) -> Response {
    let Some(context) = identity.context() else {
        return Outcome::redirect("/account/login", "Please log in.").into_response();
    };

    // Ownership is decided before validation; a redirect, not a 403.
    if let Ok(target) = AccountId::parse(payload.account_id.trim()) {
        if !context.can_act_on(&target) {
            metrics::record_authorization_denial("ownership");
            return Outcome::redirect("/account", OWN_ACCOUNT_ONLY).into_response();
        }
    }

    let sticky = update_sticky(&payload);

    let checked = match UpdateProfileRules::check(state.accounts.as_ref(), &payload).await {
        Ok(checked) => checked,
        Err(err) => return infrastructure_failure("account/update", sticky, err),
    };

    let update = match checked {
        Checked::Valid(update) => update,
        Checked::Invalid(errors) => {
            metrics::record_validation_failure("update_profile");
            return Outcome::render("account/update")
                .with_status(StatusCode::BAD_REQUEST)
                .with_errors(errors)
                .with_form(sticky)
                .into_response();
        }
    };

    let updated = match state.account_service.update_profile(&update).await {
        Ok(updated) => updated,
        // Write-time uniqueness race: same field error the rules would give.
        Err(err) if err.is_conflict() => {
            return Outcome::render("account/update")
                .with_status(StatusCode::BAD_REQUEST)
                .with_errors(vec![FieldError::new("email", "Email already in use.")])
                .with_form(sticky)
                .into_response();
        }
        Err(MotorlotError::NotFound { .. }) => {
            return Outcome::redirect("/account", ACCOUNT_NOT_FOUND).into_response();
        }
        Err(err) => return infrastructure_failure("account/update", sticky, err),
    };

    if context.account_id == updated.id {
        // Reissue so the header/greeting reflect the change immediately. The
        // role comes from the verified claims, never the submitted payload.
        let refreshed = Account { role: context.role, ..updated };
        let token = match state.tokens.issue(&refreshed) {
            Ok(token) => token,
            Err(err) => return infrastructure_failure("account/update", sticky, err),
        };

        state.mirror.refresh(&refreshed);
        let jar = jar.add(session::auth_cookie(token, &state.cookies));
        return (jar, Outcome::redirect("/account", "Account updated successfully."))
            .into_response();
    }

    // Admin edited someone else: the caller's token is untouched, but the
    // target's mirror must not go stale.
    if state.mirror.get(&updated.id).is_some() {
        state.mirror.refresh(&updated);
    }

    Outcome::redirect("/account", "Account updated successfully.").into_response()
}

/// POST /account/update-password
pub async fn update_password_handler(
    State(state): State<ApiState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<UpdatePasswordPayload>,
) -> Response {
    let Some(context) = identity.context() else {
        return Outcome::redirect("/account/login", "Please log in.").into_response();
    };

    let update = match UpdatePasswordRules::check(&payload) {
        Checked::Valid(update) => update,
        Checked::Invalid(errors) => {
            metrics::record_validation_failure("update_password");
            return Outcome::render("account/update")
                .with_status(StatusCode::BAD_REQUEST)
                .with_errors(errors)
                .with_form(json!({ "accountId": payload.account_id }))
                .into_response();
        }
    };

    if !context.can_act_on(&update.account_id) {
        metrics::record_authorization_denial("ownership");
        return Outcome::redirect("/account", OWN_ACCOUNT_ONLY).into_response();
    }

    match state.account_service.update_password(&update).await {
        Ok(()) => {
            Outcome::redirect("/account", "Password updated successfully.").into_response()
        }
        Err(err) => {
            error!(error = %err, "password update failed");
            Outcome::redirect(
                format!("/account/update/{}", update.account_id),
                "Password update failed. Please try again.",
            )
            .into_response()
        }
    }
}
