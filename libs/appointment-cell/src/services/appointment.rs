// libs/appointment-cell/src/services/appointment.rs
use std::collections::HashSet;

use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, error, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{all_rows, first_row, SupabaseClient};
use doctor_cell::{DoctorError, DoctorService};

use crate::models::{
    Appointment, AppointmentError, AppointmentStatus, BookAppointmentRequest,
};
use crate::services::lifecycle::AppointmentLifecycleService;

pub struct AppointmentService {
    supabase: SupabaseClient,
    doctors: DoctorService,
    lifecycle: AppointmentLifecycleService,
}

impl AppointmentService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            doctors: DoctorService::new(config),
            lifecycle: AppointmentLifecycleService::new(config.enforce_status_transitions),
        }
    }

    /// Book a pending appointment for `patient_id` with the requested doctor.
    pub async fn book(
        &self,
        patient_id: Uuid,
        request: BookAppointmentRequest,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Booking appointment for patient {} with doctor {}", patient_id, request.doctor_id);

        let doctor = self.doctors
            .get_doctor(request.doctor_id, auth_token)
            .await
            .map_err(|e| match e {
                DoctorError::NotFound => AppointmentError::DoctorNotFound,
                other => AppointmentError::DatabaseError(other.to_string()),
            })?;

        let appointment_data = json!({
            "doctor_id": doctor.id,
            "patient_id": patient_id,
            "date": request.date,
            "time": request.time.format("%H:%M:%S").to_string(),
            "status": AppointmentStatus::Pending,
            "symptoms": request.symptoms,
            "diagnosis": "",
            "prescription": "",
            "meeting_link": ""
        });

        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::POST,
            "/rest/v1/appointments",
            Some(auth_token),
            Some(appointment_data),
            Some(SupabaseClient::representation_headers()),
        ).await.map_err(|e| {
            error!("Failed to store appointment for patient {}: {}", patient_id, e);
            AppointmentError::from(e)
        })?;

        let appointment: Appointment = first_row(result)?
            .ok_or_else(|| AppointmentError::DatabaseError("Failed to create appointment".to_string()))?;

        info!("Appointment {} booked with doctor {}", appointment.id, appointment.doctor_id);
        Ok(appointment)
    }

    pub async fn get(&self, appointment_id: Uuid, auth_token: &str) -> Result<Appointment, AppointmentError> {
        debug!("Fetching appointment: {}", appointment_id);

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await?;

        first_row(result)?.ok_or(AppointmentError::NotFound)
    }

    pub async fn list_for_doctor(&self, doctor_id: Uuid, auth_token: &str) -> Result<Vec<Appointment>, AppointmentError> {
        self.list(&format!("doctor_id=eq.{}&order=date.asc,time.asc", doctor_id), auth_token).await
    }

    pub async fn list_for_patient(&self, patient_id: Uuid, auth_token: &str) -> Result<Vec<Appointment>, AppointmentError> {
        self.list(&format!("patient_id=eq.{}&order=date.asc,time.asc", patient_id), auth_token).await
    }

    /// Appointments shared by one doctor and one patient, newest first.
    pub async fn list_between(
        &self,
        doctor_id: Uuid,
        patient_id: Uuid,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        self.list(
            &format!(
                "doctor_id=eq.{}&patient_id=eq.{}&order=date.desc,time.desc",
                doctor_id, patient_id
            ),
            auth_token,
        ).await
    }

    /// Distinct patients with at least one appointment with the doctor, in
    /// first-appointment order.
    pub async fn patient_ids_for_doctor(&self, doctor_id: Uuid, auth_token: &str) -> Result<Vec<Uuid>, AppointmentError> {
        let path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&select=patient_id&order=date.asc,time.asc",
            doctor_id
        );
        let rows: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await?;

        let mut seen = HashSet::new();
        let ids = rows
            .iter()
            .filter_map(|row| row.get("patient_id")?.as_str())
            .filter_map(|raw| Uuid::parse_str(raw).ok())
            .filter(|id| seen.insert(*id))
            .collect();

        Ok(ids)
    }

    /// Moves `appointment` to `new_status` after the lifecycle check.
    pub async fn update_status(
        &self,
        appointment: &Appointment,
        new_status: AppointmentStatus,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        self.lifecycle.validate_status_transition(&appointment.status, &new_status)?;

        let updated = self.patch(appointment.id, json!({ "status": new_status }), auth_token).await?;
        info!("Appointment {} status {} -> {}", appointment.id, appointment.status, new_status);

        Ok(updated)
    }

    /// Writes the prescription and closes the appointment. The status is
    /// forced to completed whatever it was before. A blank diagnosis leaves
    /// the stored one alone.
    pub async fn create_prescription(
        &self,
        appointment_id: Uuid,
        prescription: &str,
        diagnosis: Option<&str>,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let mut update = json!({
            "prescription": prescription,
            "status": AppointmentStatus::Completed
        });
        if let Some(diagnosis) = diagnosis.map(str::trim).filter(|d| !d.is_empty()) {
            update["diagnosis"] = json!(diagnosis);
        }

        let updated = self.patch(appointment_id, update, auth_token).await?;
        info!("Prescription recorded for appointment {}", appointment_id);

        Ok(updated)
    }

    async fn list(&self, query: &str, auth_token: &str) -> Result<Vec<Appointment>, AppointmentError> {
        let path = format!("/rest/v1/appointments?{}", query);
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await?;

        Ok(all_rows(result)?)
    }

    async fn patch(&self, appointment_id: Uuid, update: Value, auth_token: &str) -> Result<Appointment, AppointmentError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::PATCH,
            &path,
            Some(auth_token),
            Some(update),
            Some(SupabaseClient::representation_headers()),
        ).await.map_err(|e| {
            error!("Failed to update appointment {}: {}", appointment_id, e);
            AppointmentError::from(e)
        })?;

        first_row(result)?.ok_or(AppointmentError::NotFound)
    }
}
