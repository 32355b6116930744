use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use shared_models::auth::UserSummary;
use shared_models::error::AppError;

/// Day keys accepted in a doctor's `available_times` mapping.
pub const WEEKDAYS: [&str; 7] = [
    "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub user_id: Uuid,
    pub specialization: String,
    #[serde(skip_serializing)]
    pub license_number: String,
    pub experience_years: u32,
    /// Day name to list of `HH:MM` slots.
    #[serde(default = "empty_schedule")]
    pub available_times: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
}

pub fn empty_schedule() -> Value {
    Value::Object(serde_json::Map::new())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDoctorRequest {
    pub user_id: Uuid,
    pub specialization: String,
    pub license_number: String,
    #[serde(default)]
    pub experience_years: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("License number {license_number} is already registered")]
    LicenseAlreadyRegistered { license_number: String },

    #[error("Invalid schedule format: {0}")]
    InvalidSchedule(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<anyhow::Error> for DoctorError {
    fn from(err: anyhow::Error) -> Self {
        DoctorError::DatabaseError(err.to_string())
    }
}

impl From<DoctorError> for AppError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::NotFound => AppError::NotFound(err.to_string()),
            DoctorError::LicenseAlreadyRegistered { .. } => AppError::Conflict(err.to_string()),
            DoctorError::InvalidSchedule(_) | DoctorError::ValidationError(_) => {
                AppError::ValidationError(err.to_string())
            }
            DoctorError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}
