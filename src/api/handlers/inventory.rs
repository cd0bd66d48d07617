//! Inventory handlers. Both routes sit behind the Employee/Admin gate; the
//! intake handler validates and hands the typed payload to the catalog
//! collaborator.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use crate::api::outcome::Outcome;
use crate::api::routes::ApiState;
use crate::auth::validation::Checked;
use crate::inventory::validation::{VehiclePayload, VehicleRules};
use crate::observability::metrics;

/// GET /inv: inventory management view.
pub async fn inventory_management_handler() -> Response {
    Outcome::render("inventory/management").into_response()
}

/// POST /inv/vehicles: validate a vehicle intake submission.
pub async fn add_vehicle_handler(
    State(state): State<ApiState>,
    Json(payload): Json<VehiclePayload>,
) -> Response {
    let sticky = serde_json::to_value(&payload).unwrap_or_default();

    let checked = match VehicleRules::check(state.classifications.as_ref(), &payload).await {
        Ok(checked) => checked,
        Err(err) => {
            error!(error = %err, "vehicle intake failed on infrastructure error");
            return Outcome::failure("inventory/add-vehicle").with_form(sticky).into_response();
        }
    };

    match checked {
        Checked::Valid(vehicle) => Outcome::render("inventory/confirm")
            .with_status(StatusCode::CREATED)
            .with_notice(format!("The {} {} was accepted for listing.", vehicle.make, vehicle.model))
            .with_form(serde_json::to_value(&vehicle).unwrap_or_default())
            .into_response(),
        Checked::Invalid(errors) => {
            metrics::record_validation_failure("add_vehicle");
            Outcome::render("inventory/add-vehicle")
                .with_status(StatusCode::BAD_REQUEST)
                .with_errors(errors)
                .with_form(sticky)
                .into_response()
        }
    }
}
