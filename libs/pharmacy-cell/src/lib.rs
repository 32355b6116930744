pub mod handlers;
pub mod router;
pub mod models;
pub mod services;

pub use models::{Availability, Medicine, MedicineAvailability, Pharmacy, PharmacyError, PharmacyStock};
pub use services::MedicineSearchService;
pub use router::pharmacy_routes;
