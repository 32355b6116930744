use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Postgres role every clinic session runs as; the clinic role lives in `app_metadata`.
pub const DATABASE_ROLE: &str = "authenticated";

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtHeader {
    pub alg: String,
    pub typ: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub exp: Option<u64>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub app_metadata: Option<serde_json::Value>,
    pub user_metadata: Option<serde_json::Value>,
    pub aud: Option<String>,
    pub iat: Option<u64>,
}

/// Capability class of a user. Stored as one column so a user can never be
/// both doctor and patient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Doctor,
    Patient,
    Unassigned,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Doctor => "doctor",
            Role::Patient => "patient",
            Role::Unassigned => "unassigned",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "doctor" => Ok(Role::Doctor),
            "patient" => Ok(Role::Patient),
            "unassigned" => Ok(Role::Unassigned),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicMetadata {
    pub clinic_role: Role,
    pub profile_id: Option<Uuid>,
    pub username: String,
}

/// The authenticated identity performing an operation. Built from the session
/// token by the auth middleware and passed explicitly into every handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub role: Role,
    /// Id of the Doctor or Patient row matching `role`.
    pub profile_id: Option<Uuid>,
    pub authenticated_at: Option<DateTime<Utc>>,
}

impl Actor {
    pub fn from_claims(claims: JwtClaims) -> Result<Self, String> {
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| "Invalid subject claim".to_string())?;

        let metadata: ClinicMetadata = match claims.app_metadata {
            Some(value) => serde_json::from_value(value)
                .map_err(|_| "Invalid clinic metadata".to_string())?,
            None => return Err("Missing clinic metadata".to_string()),
        };

        let authenticated_at = claims
            .iat
            .and_then(|ts| DateTime::<Utc>::from_timestamp(ts as i64, 0));

        Ok(Self {
            user_id,
            username: metadata.username,
            email: claims.email,
            role: metadata.clinic_role,
            profile_id: match metadata.clinic_role {
                Role::Unassigned => None,
                _ => metadata.profile_id,
            },
            authenticated_at,
        })
    }

    pub fn metadata(&self) -> ClinicMetadata {
        ClinicMetadata {
            clinic_role: self.role,
            profile_id: self.profile_id,
            username: self.username.clone(),
        }
    }

    pub fn doctor_id(&self) -> Option<Uuid> {
        match self.role {
            Role::Doctor => self.profile_id,
            _ => None,
        }
    }

    pub fn patient_id(&self) -> Option<Uuid> {
        match self.role {
            Role::Patient => self.profile_id,
            _ => None,
        }
    }
}

/// Public part of a user row, embedded in doctor and patient payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub address: String,
}

/// PostgREST `select` embedding the owning user's public columns.
pub const USER_EMBED: &str = "user:users(id,username,email,phone_number,address)";

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub valid: bool,
    pub user_id: String,
    pub email: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub actor: Actor,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims(metadata: serde_json::Value) -> JwtClaims {
        JwtClaims {
            sub: Uuid::new_v4().to_string(),
            exp: None,
            email: Some("doc@example.com".to_string()),
            role: Some(DATABASE_ROLE.to_string()),
            app_metadata: Some(metadata),
            user_metadata: None,
            aud: None,
            iat: Some(1_700_000_000),
        }
    }

    #[test]
    fn doctor_claims_expose_only_doctor_id() {
        let profile_id = Uuid::new_v4();
        let actor = Actor::from_claims(claims(json!({
            "clinic_role": "doctor",
            "profile_id": profile_id,
            "username": "drhouse"
        })))
        .unwrap();

        assert_eq!(actor.role, Role::Doctor);
        assert_eq!(actor.doctor_id(), Some(profile_id));
        assert_eq!(actor.patient_id(), None);
        assert!(actor.authenticated_at.is_some());
    }

    #[test]
    fn unassigned_actor_never_carries_a_profile() {
        let actor = Actor::from_claims(claims(json!({
            "clinic_role": "unassigned",
            "profile_id": Uuid::new_v4(),
            "username": "ghost"
        })))
        .unwrap();

        assert_eq!(actor.profile_id, None);
        assert_eq!(actor.doctor_id(), None);
        assert_eq!(actor.patient_id(), None);
    }

    #[test]
    fn claims_without_metadata_are_rejected() {
        let mut c = claims(json!({}));
        c.app_metadata = None;
        assert_eq!(Actor::from_claims(c).unwrap_err(), "Missing clinic metadata");
    }

    #[test]
    fn role_round_trips_through_str() {
        for role in [Role::Doctor, Role::Patient, Role::Unassigned] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("admin".parse::<Role>().is_err());
    }
}
