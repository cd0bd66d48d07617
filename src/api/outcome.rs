//! Rendered outcomes for the routing layer.
//!
//! View rendering is an external collaborator: handlers describe *what* to
//! render (a view name, a status, a user notice, the field errors, and
//! sticky form values, never secrets) or a redirect target. The
//! description is serialized as JSON for the template renderer.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

use crate::auth::validation::FieldError;

/// Generic notice for infrastructure failures; internals never reach the
/// client.
pub const TRY_AGAIN_NOTICE: &str = "Sorry, something went wrong. Please try again.";

/// A handler outcome: render a view or redirect.
#[derive(Debug)]
pub enum Outcome {
    Render {
        view: &'static str,
        status: StatusCode,
        notice: Option<String>,
        errors: Vec<FieldError>,
        form: Value,
    },
    Redirect {
        location: String,
        notice: Option<String>,
    },
}

#[derive(Serialize)]
struct RenderBody<'a> {
    view: &'static str,
    notice: &'a Option<String>,
    errors: &'a [FieldError],
    form: &'a Value,
}

#[derive(Serialize)]
struct RedirectBody<'a> {
    redirect: &'a str,
    notice: &'a Option<String>,
}

impl Outcome {
    pub fn render(view: &'static str) -> Self {
        Outcome::Render {
            view,
            status: StatusCode::OK,
            notice: None,
            errors: Vec::new(),
            form: Value::Null,
        }
    }

    pub fn redirect(location: impl Into<String>, notice: impl Into<String>) -> Self {
        Outcome::Redirect { location: location.into(), notice: Some(notice.into()) }
    }

    /// Render with the generic failure notice and a 500 status.
    pub fn failure(view: &'static str) -> Self {
        Outcome::render(view).with_status(StatusCode::INTERNAL_SERVER_ERROR).with_notice(TRY_AGAIN_NOTICE)
    }

    pub fn with_status(mut self, new_status: StatusCode) -> Self {
        if let Outcome::Render { ref mut status, .. } = self {
            *status = new_status;
        }
        self
    }

    pub fn with_notice(mut self, new_notice: impl Into<String>) -> Self {
        match self {
            Outcome::Render { ref mut notice, .. } => *notice = Some(new_notice.into()),
            Outcome::Redirect { ref mut notice, .. } => *notice = Some(new_notice.into()),
        }
        self
    }

    pub fn with_errors(mut self, new_errors: Vec<FieldError>) -> Self {
        if let Outcome::Render { ref mut errors, .. } = self {
            *errors = new_errors;
        }
        self
    }

    pub fn with_form(mut self, new_form: Value) -> Self {
        if let Outcome::Render { ref mut form, .. } = self {
            *form = new_form;
        }
        self
    }
}

impl IntoResponse for Outcome {
    fn into_response(self) -> Response {
        match self {
            Outcome::Render { view, status, notice, errors, form } => {
                (status, Json(RenderBody { view, notice: &notice, errors: &errors, form: &form }))
                    .into_response()
            }
            Outcome::Redirect { location, notice } => {
                let mut response = (
                    StatusCode::SEE_OTHER,
                    Json(RedirectBody { redirect: &location, notice: &notice }),
                )
                    .into_response();
                if let Ok(value) = header::HeaderValue::from_str(&location) {
                    response.headers_mut().insert(header::LOCATION, value);
                }
                response
            }
        }
    }
}
