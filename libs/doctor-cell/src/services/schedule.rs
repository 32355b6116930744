use chrono::NaiveTime;
use serde_json::{Map, Value};

use crate::models::{DoctorError, WEEKDAYS};

/// Checks the shape of an `available_times` payload: a mapping from a
/// lowercase weekday to a list of `HH:MM` slot strings.
///
/// Returns the mapping unchanged on success so it can be stored wholesale.
pub fn validate_available_times(value: &Value) -> Result<Map<String, Value>, DoctorError> {
    let days = value
        .as_object()
        .ok_or_else(|| DoctorError::InvalidSchedule("available_times must be a mapping".to_string()))?;

    for (day, slots) in days {
        if !WEEKDAYS.contains(&day.as_str()) {
            return Err(DoctorError::InvalidSchedule(format!("unknown day '{}'", day)));
        }

        let slots = slots.as_array().ok_or_else(|| {
            DoctorError::InvalidSchedule(format!("slots for '{}' must be a list", day))
        })?;

        for slot in slots {
            let raw = slot.as_str().ok_or_else(|| {
                DoctorError::InvalidSchedule(format!("slot for '{}' must be a string", day))
            })?;
            if NaiveTime::parse_from_str(raw, "%H:%M").is_err() {
                return Err(DoctorError::InvalidSchedule(format!(
                    "slot '{}' for '{}' is not HH:MM",
                    raw, day
                )));
            }
        }
    }

    Ok(days.clone())
}
