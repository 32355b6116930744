use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{all_rows, first_row, SupabaseClient};
use shared_models::auth::USER_EMBED;

use crate::models::{CreatePatientRequest, Patient, PatientError};

pub struct PatientService {
    supabase: SupabaseClient,
}

impl PatientService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Create the patient profile for a freshly registered user
    pub async fn create_patient(
        &self,
        request: CreatePatientRequest,
        auth_token: &str,
    ) -> Result<Patient, PatientError> {
        debug!("Creating patient profile for user: {}", request.user_id);

        let patient_data = json!({
            "user_id": request.user_id,
            "date_of_birth": request.date_of_birth,
            "blood_group": request.blood_group,
            "medical_history": request.medical_history,
            "emergency_contact": request.emergency_contact
        });

        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::POST,
            "/rest/v1/patients",
            Some(auth_token),
            Some(patient_data),
            Some(SupabaseClient::representation_headers()),
        ).await?;

        let patient: Patient = first_row(result)?
            .ok_or_else(|| PatientError::DatabaseError("Failed to create patient profile".to_string()))?;

        info!("Patient profile {} created for user {}", patient.id, patient.user_id);
        Ok(patient)
    }

    pub async fn get_patient(&self, patient_id: Uuid, auth_token: &str) -> Result<Patient, PatientError> {
        debug!("Fetching patient profile: {}", patient_id);

        let path = format!("/rest/v1/patients?id=eq.{}&select=*,{}", patient_id, USER_EMBED);
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await?;

        first_row(result)?.ok_or(PatientError::NotFound)
    }

    /// Fetches several profiles in one round trip, returned in the order of
    /// `patient_ids`. Unknown ids are skipped.
    pub async fn get_many(&self, patient_ids: &[Uuid], auth_token: &str) -> Result<Vec<Patient>, PatientError> {
        if patient_ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids = patient_ids
            .iter()
            .map(Uuid::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let path = format!("/rest/v1/patients?id=in.({})&select=*,{}", ids, USER_EMBED);
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await?;

        let mut patients: Vec<Patient> = all_rows(result)?;
        patients.sort_by_key(|p| patient_ids.iter().position(|id| *id == p.id));

        Ok(patients)
    }

    pub async fn find_by_user(&self, user_id: Uuid, auth_token: &str) -> Result<Option<Patient>, PatientError> {
        let path = format!("/rest/v1/patients?user_id=eq.{}", user_id);
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await?;

        Ok(first_row(result)?)
    }
}
