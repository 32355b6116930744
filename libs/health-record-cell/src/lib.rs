// Health Record Cell
pub mod handlers;
pub mod router;
pub mod models;
pub mod services;

pub use models::{HealthRecord, HealthRecordError, NewHealthRecord, UploadedFile};
pub use router::health_record_routes;

pub mod api {
    pub use crate::services::record::HealthRecordService;
}
