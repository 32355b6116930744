use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

use shared_models::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Medicine {
    pub id: Uuid,
    pub name: String,
    pub manufacturer: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_available")]
    pub is_available: bool,
    pub price: f64,
    #[serde(default)]
    pub stock: u32,
}

fn default_available() -> bool {
    true
}

impl Medicine {
    /// Case-insensitive literal substring match on name or manufacturer.
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self.manufacturer.to_lowercase().contains(&needle)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pharmacy {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub email: String,
}

/// A `pharmacy_medicines` row with its pharmacy embedded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PharmacyStock {
    pub pharmacy_id: Uuid,
    pub medicine_id: Uuid,
    pub stock: u32,
    pub last_updated: Option<DateTime<Utc>>,
    pub pharmacy: Pharmacy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Availability {
    pub pharmacy_name: String,
    pub pharmacy_address: String,
    pub stock: u32,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicineAvailability {
    pub id: Uuid,
    pub name: String,
    pub manufacturer: String,
    pub description: String,
    pub available_at: Vec<Availability>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MedicineSearchQuery {
    pub query: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum PharmacyError {
    #[error("No search query provided")]
    EmptyQuery,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<anyhow::Error> for PharmacyError {
    fn from(err: anyhow::Error) -> Self {
        PharmacyError::DatabaseError(err.to_string())
    }
}

impl From<PharmacyError> for AppError {
    fn from(err: PharmacyError) -> Self {
        match err {
            PharmacyError::EmptyQuery => AppError::ValidationError(err.to_string()),
            PharmacyError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn medicine(name: &str, manufacturer: &str) -> Medicine {
        Medicine {
            id: Uuid::new_v4(),
            name: name.to_string(),
            manufacturer: manufacturer.to_string(),
            description: String::new(),
            is_available: true,
            price: 4.5,
            stock: 10,
        }
    }

    #[test]
    fn matches_name_or_manufacturer_ignoring_case() {
        assert!(medicine("ColdAway", "Acme").matches("cold"));
        assert!(medicine("Ibuprofen", "ColdCure Labs").matches("COLD"));
        assert!(!medicine("Ibuprofen", "Acme").matches("cold"));
    }

    #[test]
    fn wildcard_characters_are_literal() {
        assert!(!medicine("Aspirin", "Bayer").matches("%"));
        assert!(!medicine("Aspirin", "Bayer").matches("a_p"));
        assert!(medicine("100% Relief", "Bayer").matches("0%"));
    }
}
