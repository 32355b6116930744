use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::auth::Role;
use shared_models::error::AppError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    pub user_type: String,
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub address: String,

    // Doctor profile
    #[serde(default)]
    pub specialization: String,
    pub license_number: Option<String>,
    #[serde(default)]
    pub experience_years: u32,

    // Patient profile
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub blood_group: String,
    #[serde(default)]
    pub medical_history: String,
    #[serde(default)]
    pub emergency_contact: String,
}

impl RegisterRequest {
    /// Checks the form and returns the single role the new user will hold.
    pub fn validate(&self) -> Result<Role, AuthError> {
        if self.password != self.password_confirmation {
            return Err(AuthError::PasswordMismatch);
        }
        if self.username.trim().is_empty() {
            return Err(AuthError::Validation("Username is required".to_string()));
        }
        if self.password.is_empty() {
            return Err(AuthError::Validation("Password is required".to_string()));
        }

        let role = match self.user_type.as_str() {
            "doctor" => Role::Doctor,
            "patient" => Role::Patient,
            _ => return Err(AuthError::Validation("user_type must be doctor or patient".to_string())),
        };

        if role == Role::Doctor && self.license().is_none() {
            return Err(AuthError::Validation("License number is required for doctors".to_string()));
        }

        Ok(role)
    }

    pub fn license(&self) -> Option<&str> {
        self.license_number
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// A `users` row as stored. Never serialized back to clients.
#[derive(Debug, Clone, Deserialize)]
pub struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("{0}")]
    Validation(String),

    #[error("Username already exists")]
    UsernameTaken,

    #[error("License number {0} is already registered")]
    LicenseTaken(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("{0}")]
    Token(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        AuthError::DatabaseError(err.to_string())
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::PasswordMismatch => AppError::ValidationError(err.to_string()),
            AuthError::Validation(msg) => AppError::ValidationError(msg),
            AuthError::UsernameTaken | AuthError::LicenseTaken(_) => AppError::Conflict(err.to_string()),
            AuthError::InvalidCredentials => AppError::Auth(err.to_string()),
            AuthError::Token(msg) | AuthError::Hashing(msg) => AppError::Internal(msg),
            AuthError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}
