use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{all_rows, first_row, ApiError, SupabaseClient};
use shared_models::auth::USER_EMBED;

use crate::models::{CreateDoctorRequest, Doctor, DoctorError};
use crate::services::schedule::validate_available_times;

pub struct DoctorService {
    supabase: SupabaseClient,
}

impl DoctorService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn license_exists(&self, license_number: &str, auth_token: &str) -> Result<bool, DoctorError> {
        let path = format!(
            "/rest/v1/doctors?license_number=eq.{}&select=id",
            urlencoding::encode(license_number)
        );
        let existing: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await?;

        Ok(!existing.is_empty())
    }

    /// Create the doctor profile for a freshly registered user
    pub async fn create_doctor(
        &self,
        request: CreateDoctorRequest,
        auth_token: &str,
    ) -> Result<Doctor, DoctorError> {
        debug!("Creating doctor profile for user: {}", request.user_id);

        if request.license_number.trim().is_empty() {
            return Err(DoctorError::ValidationError("License number is required".to_string()));
        }

        if self.license_exists(&request.license_number, auth_token).await? {
            return Err(DoctorError::LicenseAlreadyRegistered {
                license_number: request.license_number,
            });
        }

        let doctor_data = json!({
            "user_id": request.user_id,
            "specialization": request.specialization,
            "license_number": request.license_number,
            "experience_years": request.experience_years,
            "available_times": {}
        });

        // The unique index still guards against a concurrent registration
        // slipping past the check above.
        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::POST,
            "/rest/v1/doctors",
            Some(auth_token),
            Some(doctor_data),
            Some(SupabaseClient::representation_headers()),
        ).await.map_err(|e| {
            if ApiError::is_conflict(&e) {
                DoctorError::LicenseAlreadyRegistered { license_number: request.license_number.clone() }
            } else {
                DoctorError::from(e)
            }
        })?;

        let doctor: Doctor = first_row(result)?
            .ok_or_else(|| DoctorError::DatabaseError("Failed to create doctor profile".to_string()))?;

        info!("Doctor profile {} created for user {}", doctor.id, doctor.user_id);
        Ok(doctor)
    }

    pub async fn get_doctor(&self, doctor_id: Uuid, auth_token: &str) -> Result<Doctor, DoctorError> {
        debug!("Fetching doctor profile: {}", doctor_id);

        let path = format!("/rest/v1/doctors?id=eq.{}&select=*,{}", doctor_id, USER_EMBED);
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await?;

        first_row(result)?.ok_or(DoctorError::NotFound)
    }

    pub async fn find_by_user(&self, user_id: Uuid, auth_token: &str) -> Result<Option<Doctor>, DoctorError> {
        let path = format!("/rest/v1/doctors?user_id=eq.{}", user_id);
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await?;

        Ok(first_row(result)?)
    }

    /// Directory shown to patients when booking
    pub async fn list_doctors(&self, auth_token: &str) -> Result<Vec<Doctor>, DoctorError> {
        let path = format!("/rest/v1/doctors?select=*,{}&order=specialization.asc", USER_EMBED);
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await?;

        Ok(all_rows(result)?)
    }

    pub async fn get_schedule(&self, doctor_id: Uuid, auth_token: &str) -> Result<Value, DoctorError> {
        let doctor = self.get_doctor(doctor_id, auth_token).await?;
        Ok(doctor.available_times)
    }

    /// Replace the doctor's availability wholesale. Nothing is written when
    /// the payload fails validation.
    pub async fn update_schedule(
        &self,
        doctor_id: Uuid,
        available_times: &Value,
        auth_token: &str,
    ) -> Result<Value, DoctorError> {
        let schedule = Value::Object(validate_available_times(available_times)?);

        let path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::PATCH,
            &path,
            Some(auth_token),
            Some(json!({ "available_times": schedule })),
            Some(SupabaseClient::representation_headers()),
        ).await?;

        let doctor: Doctor = first_row(result)?.ok_or(DoctorError::NotFound)?;
        info!("Schedule updated for doctor {}", doctor_id);

        Ok(doctor.available_times)
    }
}
