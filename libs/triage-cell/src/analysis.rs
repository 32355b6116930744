//! Keyword-based symptom triage.
//!
//! A static lookup, not a diagnosis: every keyword found in the free text
//! contributes its candidate conditions, and the severity label is derived
//! from how many distinct conditions were hit and from intensity words.

use serde::{Deserialize, Serialize};
use std::fmt;

use shared_models::error::AppError;

const CONDITION_TABLE: &[(&str, &[&str])] = &[
    ("fever", &["Common cold", "Flu", "COVID-19"]),
    ("headache", &["Migraine", "Tension headache", "Sinus infection"]),
    ("cough", &["Common cold", "Bronchitis", "Asthma"]),
    ("fatigue", &["Anemia", "Depression", "Sleep disorder"]),
    ("nausea", &["Food poisoning", "Migraine", "Stomach virus"]),
];

const INTENSITY_WORDS: &[&str] = &["severe", "intense"];

const CONSULT_DOCTOR: &str = "Please consult with a doctor for accurate diagnosis.";
const MONITOR_AT_HOME: &str = "Monitor your symptoms and rest. Consult a doctor if symptoms worsen.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Moderate,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Moderate => write!(f, "moderate"),
            Severity::High => write!(f, "high"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageReport {
    pub possible_conditions: Vec<String>,
    pub severity: Severity,
    pub recommendation: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SymptomsRequest {
    #[serde(default)]
    pub symptoms: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    #[error("No symptoms provided")]
    NoSymptoms,
}

impl From<TriageError> for AppError {
    fn from(err: TriageError) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

pub fn analyze_symptoms(symptoms: &str) -> Result<TriageReport, TriageError> {
    if symptoms.trim().is_empty() {
        return Err(TriageError::NoSymptoms);
    }
    let text = symptoms.to_lowercase();

    let mut possible_conditions: Vec<String> = Vec::new();
    for (keyword, conditions) in CONDITION_TABLE {
        if !text.contains(keyword) {
            continue;
        }
        for condition in *conditions {
            if !possible_conditions.iter().any(|c| c == condition) {
                possible_conditions.push(condition.to_string());
            }
        }
    }

    let severity = if INTENSITY_WORDS.iter().any(|w| text.contains(w)) {
        Severity::High
    } else if possible_conditions.len() > 2 {
        Severity::Moderate
    } else {
        Severity::Low
    };

    let recommendation = match severity {
        Severity::Low => MONITOR_AT_HOME,
        Severity::Moderate | Severity::High => CONSULT_DOCTOR,
    };

    Ok(TriageReport {
        possible_conditions,
        severity,
        recommendation: recommendation.to_string(),
    })
}
