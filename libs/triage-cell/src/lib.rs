pub mod analysis;
pub mod handlers;
pub mod router;

pub use analysis::{analyze_symptoms, Severity, TriageError, TriageReport};
pub use router::triage_routes;
