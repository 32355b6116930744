use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::NaiveDate;

use shared_models::auth::UserSummary;
use shared_models::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub blood_group: String,
    #[serde(default)]
    pub medical_history: String,
    #[serde(default)]
    pub emergency_contact: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
}

impl Patient {
    pub fn age(&self) -> Option<u32> {
        let today = chrono::Utc::now().date_naive();
        today.years_since(self.date_of_birth?)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePatientRequest {
    pub user_id: Uuid,
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub blood_group: String,
    #[serde(default)]
    pub medical_history: String,
    #[serde(default)]
    pub emergency_contact: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatientRecordsQuery {
    pub patient_id: Option<String>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum PatientError {
    #[error("Patient not found")]
    NotFound,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<anyhow::Error> for PatientError {
    fn from(err: anyhow::Error) -> Self {
        PatientError::DatabaseError(err.to_string())
    }
}

impl From<PatientError> for AppError {
    fn from(err: PatientError) -> Self {
        match err {
            PatientError::NotFound => AppError::NotFound(err.to_string()),
            PatientError::ValidationError(msg) => AppError::ValidationError(msg),
            PatientError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn patient_without_birth_date_has_no_age() {
        let patient: Patient = serde_json::from_value(json!({
            "id": Uuid::new_v4(),
            "user_id": Uuid::new_v4(),
            "date_of_birth": null
        }))
        .unwrap();

        assert_eq!(patient.age(), None);
        assert_eq!(patient.blood_group, "");
    }

    #[test]
    fn age_counts_whole_years() {
        let mut patient: Patient = serde_json::from_value(json!({
            "id": Uuid::new_v4(),
            "user_id": Uuid::new_v4(),
            "date_of_birth": "1990-01-01"
        }))
        .unwrap();
        assert!(patient.age().unwrap() >= 35);

        patient.date_of_birth = Some(chrono::Utc::now().date_naive());
        assert_eq!(patient.age(), Some(0));
    }
}
