pub mod handlers;
pub mod router;
pub mod models;
pub mod services;

pub use models::{Appointment, AppointmentError, AppointmentStatus};
pub use services::{AppointmentLifecycleService, AppointmentService};
pub use router::appointment_routes;
