//! Validation pipeline for vehicle intake.
//!
//! Same collect-all semantics as the account rules: structural checks with
//! explicit string-to-number coercion, then the classification reference
//! check against the store.

use serde::{Deserialize, Serialize};

use crate::auth::validation::{Checked, FieldError};
use crate::errors::Result;
use crate::storage::ClassificationRepository;

/// Raw vehicle intake payload; every field arrives as a string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VehiclePayload {
    pub make: String,
    pub model: String,
    pub year: String,
    pub description: String,
    pub image: String,
    pub thumbnail: String,
    pub price: String,
    pub miles: String,
    pub color: String,
    pub classification_id: String,
}

/// Typed vehicle payload produced by a passing [`VehicleRules`] check,
/// handed onward to the catalog collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidVehicle {
    pub make: String,
    pub model: String,
    pub year: i32,
    pub description: String,
    pub image: String,
    pub thumbnail: String,
    pub price: f64,
    pub miles: i64,
    pub color: String,
    pub classification_id: i64,
}

/// Rule set for vehicle intake.
pub struct VehicleRules;

impl VehicleRules {
    pub async fn check(
        classifications: &dyn ClassificationRepository,
        payload: &VehiclePayload,
    ) -> Result<Checked<ValidVehicle>> {
        let mut errors = Vec::new();

        let make = payload.make.trim().to_string();
        if make.is_empty() {
            errors.push(FieldError::new("make", "Make is required."));
        }

        let model = payload.model.trim().to_string();
        if model.is_empty() {
            errors.push(FieldError::new("model", "Model is required."));
        }

        let year = match payload.year.trim().parse::<i32>() {
            Ok(year) if (1900..=2100).contains(&year) => Some(year),
            _ => {
                errors.push(FieldError::new(
                    "year",
                    "Year must be a whole number between 1900 and 2100.",
                ));
                None
            }
        };

        let description = payload.description.trim().to_string();
        if description.is_empty() {
            errors.push(FieldError::new("description", "Description is required."));
        }

        let image = payload.image.trim().to_string();
        if image.is_empty() {
            errors.push(FieldError::new("image", "Image path is required."));
        }

        let thumbnail = payload.thumbnail.trim().to_string();
        if thumbnail.is_empty() {
            errors.push(FieldError::new("thumbnail", "Thumbnail path is required."));
        }

        let price = match payload.price.trim().parse::<f64>() {
            Ok(price) if price > 0.0 && price.is_finite() => Some(price),
            _ => {
                errors.push(FieldError::new("price", "Price must be a positive number."));
                None
            }
        };

        let miles = match payload.miles.trim().parse::<i64>() {
            Ok(miles) if miles >= 0 => Some(miles),
            _ => {
                errors.push(FieldError::new("miles", "Miles must be 0 or greater."));
                None
            }
        };

        let color = payload.color.trim().to_string();
        if color.is_empty() {
            errors.push(FieldError::new("color", "Color is required."));
        }

        let classification_id = match payload.classification_id.trim().parse::<i64>() {
            Ok(id) if id > 0 => {
                if classifications.exists(id).await? {
                    Some(id)
                } else {
                    errors.push(FieldError::new("classificationId", "Choose a classification."));
                    None
                }
            }
            _ => {
                errors.push(FieldError::new("classificationId", "Choose a classification."));
                None
            }
        };

        if !errors.is_empty() {
            return Ok(Checked::Invalid(errors));
        }

        Ok(Checked::Valid(ValidVehicle {
            make,
            model,
            year: year.expect("year present when no errors"),
            description,
            image,
            thumbnail,
            price: price.expect("price present when no errors"),
            miles: miles.expect("miles present when no errors"),
            color,
            classification_id: classification_id.expect("classification present when no errors"),
        }))
    }
}
