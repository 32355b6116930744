use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use appointment_cell::appointment_routes;
use auth_cell::router::auth_routes;
use doctor_cell::doctor_routes;
use health_record_cell::health_record_routes;
use patient_cell::patient_routes;
use pharmacy_cell::pharmacy_routes;
use shared_config::AppConfig;
use triage_cell::triage_routes;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    let api = Router::new()
        .merge(health_record_routes(state.clone()))
        .merge(appointment_routes(state.clone()))
        .merge(doctor_routes(state.clone()))
        .merge(patient_routes(state.clone()))
        .merge(pharmacy_routes(state.clone()))
        .merge(triage_routes(state.clone()));

    Router::new()
        .route("/", get(|| async { "Clinic API is running!" }))
        .nest("/auth", auth_routes(state.clone()))
        .nest("/api", api)
}
