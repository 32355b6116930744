use std::collections::HashMap;

use reqwest::Method;
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{all_rows, SupabaseClient};

use crate::models::{Availability, Medicine, MedicineAvailability, PharmacyError, PharmacyStock};

pub struct MedicineSearchService {
    supabase: SupabaseClient,
}

/// Quotes a value for a PostgREST logic tree so commas and parentheses in
/// user input cannot alter the filter.
fn quoted_pattern(query: &str) -> String {
    let escaped = query.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"*{}*\"", escaped)
}

impl MedicineSearchService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Medicines whose name or manufacturer contains `query`, each with the
    /// pharmacies that currently stock it.
    pub async fn search(&self, query: &str, auth_token: &str) -> Result<Vec<MedicineAvailability>, PharmacyError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(PharmacyError::EmptyQuery);
        }
        debug!("Searching medicines for '{}'", query);

        let medicines = self.find_medicines(query, auth_token).await?;
        if medicines.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = medicines.iter().map(|m| m.id).collect();
        let mut stock_by_medicine: HashMap<Uuid, Vec<PharmacyStock>> = HashMap::new();
        for row in self.stocked_at(&ids, auth_token).await? {
            stock_by_medicine.entry(row.medicine_id).or_default().push(row);
        }

        let results: Vec<MedicineAvailability> = medicines
            .into_iter()
            .map(|medicine| {
                let available_at = stock_by_medicine
                    .remove(&medicine.id)
                    .unwrap_or_default()
                    .into_iter()
                    .filter(|row| row.stock > 0)
                    .map(|row| Availability {
                        pharmacy_name: row.pharmacy.name,
                        pharmacy_address: row.pharmacy.address,
                        stock: row.stock,
                        price: medicine.price,
                    })
                    .collect();

                MedicineAvailability {
                    id: medicine.id,
                    name: medicine.name,
                    manufacturer: medicine.manufacturer,
                    description: medicine.description,
                    available_at,
                }
            })
            .collect();

        info!("Medicine search '{}' returned {} results", query, results.len());
        Ok(results)
    }

    async fn find_medicines(&self, query: &str, auth_token: &str) -> Result<Vec<Medicine>, PharmacyError> {
        // `%` and `_` still act as wildcards inside ilike, so the database
        // result is a superset that gets narrowed below.
        let pattern = quoted_pattern(query);
        let filter = format!("(name.ilike.{},manufacturer.ilike.{})", pattern, pattern);
        let path = format!("/rest/v1/medicines?or={}", urlencoding::encode(&filter));

        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await?;

        let medicines: Vec<Medicine> = all_rows(result)?;
        Ok(medicines.into_iter().filter(|m| m.matches(query)).collect())
    }

    async fn stocked_at(&self, medicine_ids: &[Uuid], auth_token: &str) -> Result<Vec<PharmacyStock>, PharmacyError> {
        let ids = medicine_ids
            .iter()
            .map(Uuid::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let path = format!(
            "/rest/v1/pharmacy_medicines?medicine_id=in.({})&stock=gt.0&select=*,pharmacy:pharmacies(*)",
            ids
        );

        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await?;

        Ok(all_rows(result)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_is_quoted_and_escaped() {
        assert_eq!(quoted_pattern("cold"), "\"*cold*\"");
        assert_eq!(quoted_pattern("a,b)"), "\"*a,b)*\"");
        assert_eq!(quoted_pattern("say \"hi\""), "\"*say \\\"hi\\\"*\"");
    }
}
