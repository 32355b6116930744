use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use doctor_cell::{CreateDoctorRequest, DoctorError, DoctorService};
use patient_cell::{CreatePatientRequest, PatientService};
use shared_config::AppConfig;
use shared_database::{first_row, ApiError, SupabaseClient};
use shared_models::auth::{Actor, Role, SessionResponse};
use shared_utils::{jwt, password};

use crate::models::{AuthError, LoginRequest, RegisterRequest, UserRow};

/// Registration and login. Both run before the caller has a session, so
/// every database call is made with the service role key.
pub struct AccountService {
    supabase: SupabaseClient,
    doctors: DoctorService,
    patients: PatientService,
    service_key: String,
    jwt_secret: String,
    session_ttl_hours: i64,
}

impl AccountService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            doctors: DoctorService::new(config),
            patients: PatientService::new(config),
            service_key: config.supabase_service_role_key.clone(),
            jwt_secret: config.supabase_jwt_secret.clone(),
            session_ttl_hours: config.session_ttl_hours,
        }
    }

    /// Creates the user, then exactly one doctor or patient profile. When the
    /// profile cannot be stored the user row is removed again.
    pub async fn register(&self, request: RegisterRequest) -> Result<SessionResponse, AuthError> {
        let role = request.validate()?;
        let username = request.username.trim().to_string();
        debug!("Registering {} account: {}", role, username);

        if self.find_user(&username).await?.is_some() {
            warn!("Registration rejected, username taken: {}", username);
            return Err(AuthError::UsernameTaken);
        }
        if let Some(license) = request.license().filter(|_| role == Role::Doctor) {
            if self.doctors.license_exists(license, &self.service_key).await.map_err(map_doctor_error)? {
                warn!("Registration rejected, license already registered: {}", license);
                return Err(AuthError::LicenseTaken(license.to_string()));
            }
        }

        let password_hash = password::hash_password(&request.password)
            .map_err(|e| AuthError::Hashing(e.to_string()))?;

        let user = self.insert_user(&request, &username, role, &password_hash).await?;

        let profile_id = match self.create_profile(user.id, role, &request).await {
            Ok(id) => id,
            Err(e) => {
                error!("Profile creation failed for user {}: {}", user.id, e);
                self.delete_user(user.id).await;
                return Err(e);
            }
        };

        info!("Registered {} {} with profile {}", role, user.id, profile_id);
        self.open_session(&user, Some(profile_id))
    }

    pub async fn login(&self, request: LoginRequest) -> Result<SessionResponse, AuthError> {
        debug!("Login attempt for: {}", request.username);

        let user = match self.find_user(request.username.trim()).await? {
            Some(user) => user,
            None => {
                warn!("Login failed for unknown user: {}", request.username);
                return Err(AuthError::InvalidCredentials);
            }
        };

        let verified = password::verify_password(&request.password, &user.password_hash)
            .map_err(|e| AuthError::Hashing(e.to_string()))?;
        if !verified {
            warn!("Login failed for user: {}", user.id);
            return Err(AuthError::InvalidCredentials);
        }

        let profile_id = match user.role {
            Role::Doctor => self.doctors
                .find_by_user(user.id, &self.service_key)
                .await
                .map_err(map_doctor_error)?
                .map(|d| d.id),
            Role::Patient => self.patients
                .find_by_user(user.id, &self.service_key)
                .await
                .map_err(|e| AuthError::DatabaseError(e.to_string()))?
                .map(|p| p.id),
            Role::Unassigned => None,
        };

        info!("User {} logged in as {}", user.id, user.role);
        self.open_session(&user, profile_id)
    }

    async fn find_user(&self, username: &str) -> Result<Option<UserRow>, AuthError> {
        let path = format!("/rest/v1/users?username=eq.{}", urlencoding::encode(username));
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            Some(&self.service_key),
            None,
        ).await?;

        Ok(first_row(result)?)
    }

    async fn insert_user(
        &self,
        request: &RegisterRequest,
        username: &str,
        role: Role,
        password_hash: &str,
    ) -> Result<UserRow, AuthError> {
        let user_data = json!({
            "username": username,
            "email": request.email,
            "password_hash": password_hash,
            "role": role,
            "phone_number": request.phone_number,
            "address": request.address
        });

        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::POST,
            "/rest/v1/users",
            Some(&self.service_key),
            Some(user_data),
            Some(SupabaseClient::representation_headers()),
        ).await.map_err(|e| {
            if ApiError::is_conflict(&e) {
                AuthError::UsernameTaken
            } else {
                AuthError::from(e)
            }
        })?;

        first_row(result)?
            .ok_or_else(|| AuthError::DatabaseError("Failed to create user".to_string()))
    }

    async fn create_profile(&self, user_id: Uuid, role: Role, request: &RegisterRequest) -> Result<Uuid, AuthError> {
        match role {
            Role::Doctor => {
                let doctor = self.doctors.create_doctor(
                    CreateDoctorRequest {
                        user_id,
                        specialization: request.specialization.clone(),
                        license_number: request.license().unwrap_or_default().to_string(),
                        experience_years: request.experience_years,
                    },
                    &self.service_key,
                ).await.map_err(map_doctor_error)?;
                Ok(doctor.id)
            }
            Role::Patient => {
                let patient = self.patients.create_patient(
                    CreatePatientRequest {
                        user_id,
                        date_of_birth: request.date_of_birth,
                        blood_group: request.blood_group.clone(),
                        medical_history: request.medical_history.clone(),
                        emergency_contact: request.emergency_contact.clone(),
                    },
                    &self.service_key,
                ).await.map_err(|e| AuthError::DatabaseError(e.to_string()))?;
                Ok(patient.id)
            }
            Role::Unassigned => Err(AuthError::Validation("user_type must be doctor or patient".to_string())),
        }
    }

    async fn delete_user(&self, user_id: Uuid) {
        let path = format!("/rest/v1/users?id=eq.{}", user_id);
        if let Err(e) = self.supabase.execute(Method::DELETE, &path, Some(&self.service_key), None).await {
            error!("Failed to remove user {} after profile failure: {}", user_id, e);
        }
    }

    fn open_session(&self, user: &UserRow, profile_id: Option<Uuid>) -> Result<SessionResponse, AuthError> {
        let actor = Actor {
            user_id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            profile_id: match user.role {
                Role::Unassigned => None,
                _ => profile_id,
            },
            authenticated_at: Some(Utc::now()),
        };

        let (token, expires_at) = jwt::issue_token(&actor, &self.jwt_secret, self.session_ttl_hours)
            .map_err(AuthError::Token)?;

        Ok(SessionResponse { token, expires_at, actor })
    }
}

fn map_doctor_error(err: DoctorError) -> AuthError {
    match err {
        DoctorError::LicenseAlreadyRegistered { license_number } => AuthError::LicenseTaken(license_number),
        DoctorError::ValidationError(msg) => AuthError::Validation(msg),
        other => AuthError::DatabaseError(other.to_string()),
    }
}
