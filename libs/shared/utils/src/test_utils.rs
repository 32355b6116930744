use std::sync::Arc;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use base64::{Engine as _, engine::general_purpose};
use serde_json::json;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::{Actor, Role, DATABASE_ROLE};

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_service_role_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            supabase_service_role_key: "test-service-role-key".to_string(),
        }
    }
}

impl TestConfig {
    pub fn with_url(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            supabase_service_role_key: self.supabase_service_role_key.clone(),
            supabase_jwt_secret: self.jwt_secret.clone(),
            health_record_bucket: "health-records".to_string(),
            session_ttl_hours: 24,
            enforce_status_transitions: false,
            bind_addr: ([127, 0, 0, 1], 0).into(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub profile_id: Uuid,
}

impl Default for TestUser {
    fn default() -> Self {
        Self::new("test@example.com", Role::Patient)
    }
}

impl TestUser {
    pub fn new(email: &str, role: Role) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            username: email.split('@').next().unwrap_or(email).to_string(),
            email: email.to_string(),
            role,
            profile_id: Uuid::new_v4(),
        }
    }

    pub fn doctor(email: &str) -> Self {
        Self::new(email, Role::Doctor)
    }

    pub fn patient(email: &str) -> Self {
        Self::new(email, Role::Patient)
    }

    pub fn unassigned(email: &str) -> Self {
        Self::new(email, Role::Unassigned)
    }

    pub fn user_id(&self) -> Uuid {
        Uuid::parse_str(&self.id).expect("test user id is a uuid")
    }

    pub fn to_actor(&self) -> Actor {
        Actor {
            user_id: self.user_id(),
            username: self.username.clone(),
            email: Some(self.email.clone()),
            role: self.role,
            profile_id: match self.role {
                Role::Unassigned => None,
                _ => Some(self.profile_id),
            },
            authenticated_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": user.id,
            "email": user.email,
            "role": DATABASE_ROLE,
            "app_metadata": user.to_actor().metadata(),
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

/// PostgREST row shapes used across cell tests.
pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn user_row(user_id: &str, username: &str, role: Role, password_hash: &str) -> serde_json::Value {
        json!({
            "id": user_id,
            "username": username,
            "email": format!("{}@example.com", username),
            "password_hash": password_hash,
            "role": role,
            "phone_number": "",
            "address": "",
            "created_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn doctor_row(doctor_id: &str, user_id: &str, license_number: &str) -> serde_json::Value {
        json!({
            "id": doctor_id,
            "user_id": user_id,
            "specialization": "General Practice",
            "license_number": license_number,
            "experience_years": 10,
            "available_times": {}
        })
    }

    pub fn patient_row(patient_id: &str, user_id: &str) -> serde_json::Value {
        json!({
            "id": patient_id,
            "user_id": user_id,
            "date_of_birth": "1990-01-01",
            "blood_group": "O+",
            "medical_history": "",
            "emergency_contact": "555-0100",
            "user": {
                "id": user_id,
                "username": "patient",
                "email": "patient@example.com",
                "phone_number": "",
                "address": ""
            }
        })
    }

    pub fn appointment_row(
        appointment_id: &str,
        doctor_id: &str,
        patient_id: &str,
        status: &str,
    ) -> serde_json::Value {
        json!({
            "id": appointment_id,
            "doctor_id": doctor_id,
            "patient_id": patient_id,
            "date": "2025-03-10",
            "time": "09:30:00",
            "status": status,
            "symptoms": "fever",
            "diagnosis": "",
            "prescription": "",
            "meeting_link": "",
            "created_at": "2025-03-01T08:00:00Z",
            "updated_at": "2025-03-01T08:00:00Z"
        })
    }

    pub fn health_record_row(record_id: &str, patient_id: &str, record_type: &str) -> serde_json::Value {
        json!({
            "id": record_id,
            "patient_id": patient_id,
            "date": "2025-02-14",
            "record_type": record_type,
            "file_url": null,
            "description": "Routine blood panel",
            "is_private": true,
            "created_at": "2025-02-14T10:00:00Z"
        })
    }

    pub fn medicine_row(medicine_id: &str, name: &str, manufacturer: &str, price: f64) -> serde_json::Value {
        json!({
            "id": medicine_id,
            "name": name,
            "manufacturer": manufacturer,
            "description": "",
            "is_available": true,
            "price": price,
            "stock": 100
        })
    }

    pub fn pharmacy_stock_row(medicine_id: &str, pharmacy_name: &str, stock: i32) -> serde_json::Value {
        json!({
            "pharmacy_id": Uuid::new_v4(),
            "medicine_id": medicine_id,
            "stock": stock,
            "last_updated": "2025-03-01T08:00:00Z",
            "pharmacy": {
                "id": Uuid::new_v4(),
                "name": pharmacy_name,
                "address": format!("1 {} Street", pharmacy_name),
                "phone_number": "555-0199",
                "email": "store@example.com"
            }
        })
    }

    pub fn error_response(message: &str, code: &str) -> serde_json::Value {
        json!({
            "message": message,
            "code": code
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = TestConfig::default();
        let app_config = config.to_app_config();

        assert_eq!(app_config.supabase_url, "http://localhost:54321");
        assert_eq!(app_config.supabase_anon_key, "test-anon-key");
        assert!(!app_config.supabase_jwt_secret.is_empty());
        assert!(app_config.is_configured());
    }

    #[test]
    fn test_user_creation() {
        let user = TestUser::doctor("doc@example.com");
        assert_eq!(user.email, "doc@example.com");
        assert_eq!(user.username, "doc");
        assert_eq!(user.role, Role::Doctor);

        let actor = user.to_actor();
        assert_eq!(actor.email, Some(user.email.clone()));
        assert_eq!(actor.doctor_id(), Some(user.profile_id));
        assert_eq!(actor.user_id.to_string(), user.id);
    }

    #[test]
    fn test_jwt_token_creation() {
        let user = TestUser::default();
        let token = JwtTestUtils::create_test_token(&user, "test-secret", Some(1));

        assert_eq!(token.split('.').count(), 3);
    }
}
