use axum::extract::{rejection::QueryRejection, Extension, Query, State};
use axum_extra::TypedHeader;
use assert_matches::assert_matches;
use headers::{Authorization, authorization::Bearer};
use serde_json::json;
use uuid::Uuid;
use wiremock::{MockServer, Mock, ResponseTemplate};
use wiremock::matchers::{method, path, query_param};

use patient_cell::handlers::*;
use patient_cell::models::PatientRecordsQuery;
use shared_models::error::AppError;
use shared_utils::test_utils::{JwtTestUtils, MockSupabaseResponses, TestConfig, TestUser};

fn create_auth_header(token: &str) -> TypedHeader<Authorization<Bearer>> {
    TypedHeader(Authorization::bearer(token).unwrap())
}

fn records_query(patient_id: Option<&str>) -> Result<Query<PatientRecordsQuery>, QueryRejection> {
    Ok(Query(PatientRecordsQuery { patient_id: patient_id.map(str::to_string) }))
}

#[tokio::test]
async fn test_roster_lists_each_patient_once() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_url(&mock_server.uri()).to_arc();
    let doctor = TestUser::doctor("house@example.com");
    let token = JwtTestUtils::create_test_token(&doctor, &config.supabase_jwt_secret, Some(1));
    let first = Uuid::new_v4();
    let second = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("doctor_id", format!("eq.{}", doctor.profile_id)))
        .and(query_param("select", "patient_id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "patient_id": first },
            { "patient_id": second },
            { "patient_id": first }
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .and(query_param("id", format!("in.({},{})", first, second)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::patient_row(&second.to_string(), &Uuid::new_v4().to_string()),
            MockSupabaseResponses::patient_row(&first.to_string(), &Uuid::new_v4().to_string())
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let body = list_patients(State(config), create_auth_header(&token), Extension(doctor.to_actor()))
        .await
        .unwrap();

    let patients = body.0.as_array().unwrap().clone();
    assert_eq!(patients.len(), 2);
    assert_eq!(patients[0]["id"], json!(first));
    assert_eq!(patients[1]["id"], json!(second));
    assert_eq!(patients[0]["user"]["username"], "patient");
}

#[tokio::test]
async fn test_roster_without_appointments_skips_patient_lookup() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_url(&mock_server.uri()).to_arc();
    let doctor = TestUser::doctor("house@example.com");
    let token = JwtTestUtils::create_test_token(&doctor, &config.supabase_jwt_secret, Some(1));

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let body = list_patients(State(config), create_auth_header(&token), Extension(doctor.to_actor()))
        .await
        .unwrap();

    assert_eq!(body.0, json!([]));
}

#[tokio::test]
async fn test_roster_is_doctor_only() {
    let config = TestConfig::default().to_arc();
    let patient = TestUser::patient("jane@example.com");
    let token = JwtTestUtils::create_test_token(&patient, &config.supabase_jwt_secret, Some(1));

    let result = list_patients(State(config), create_auth_header(&token), Extension(patient.to_actor())).await;

    assert_matches!(result, Err(AppError::Forbidden(msg)) if msg == "User is not a doctor");
}

#[tokio::test]
async fn test_record_bundle_combines_profile_records_and_appointments() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_url(&mock_server.uri()).to_arc();
    let doctor = TestUser::doctor("house@example.com");
    let token = JwtTestUtils::create_test_token(&doctor, &config.supabase_jwt_secret, Some(1));
    let patient_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .and(query_param("id", format!("eq.{}", patient_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::patient_row(&patient_id.to_string(), &Uuid::new_v4().to_string())
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/health_records"))
        .and(query_param("patient_id", format!("eq.{}", patient_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::health_record_row(&Uuid::new_v4().to_string(), &patient_id.to_string(), "lab")
        ])))
        .mount(&mock_server)
        .await;

    let mut older = MockSupabaseResponses::appointment_row(
        &Uuid::new_v4().to_string(),
        &doctor.profile_id.to_string(),
        &patient_id.to_string(),
        "completed",
    );
    older["date"] = json!("2025-01-05");

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("doctor_id", format!("eq.{}", doctor.profile_id)))
        .and(query_param("patient_id", format!("eq.{}", patient_id)))
        .and(query_param("order", "date.desc,time.desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::appointment_row(
                &Uuid::new_v4().to_string(),
                &doctor.profile_id.to_string(),
                &patient_id.to_string(),
                "pending",
            ),
            older
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let body = get_patient_records(
        State(config),
        create_auth_header(&token),
        Extension(doctor.to_actor()),
        records_query(Some(&patient_id.to_string())),
    )
    .await
    .unwrap();

    assert_eq!(body.0["patient"]["id"], json!(patient_id));
    assert_eq!(body.0["health_records"].as_array().unwrap().len(), 1);
    let appointments = body.0["appointments"].as_array().unwrap();
    assert_eq!(appointments.len(), 2);
    assert_eq!(appointments[0]["date"], "2025-03-10");
    assert_eq!(appointments[1]["date"], "2025-01-05");
}

#[tokio::test]
async fn test_record_bundle_requires_valid_patient_id() {
    let config = TestConfig::default().to_arc();
    let doctor = TestUser::doctor("house@example.com");
    let token = JwtTestUtils::create_test_token(&doctor, &config.supabase_jwt_secret, Some(1));

    for query in [None, Some(""), Some("42")] {
        let result = get_patient_records(
            State(config.clone()),
            create_auth_header(&token),
            Extension(doctor.to_actor()),
            records_query(query),
        )
        .await;

        assert_matches!(result, Err(AppError::ValidationError(_)));
    }
}

#[tokio::test]
async fn test_record_bundle_for_unknown_patient_is_not_found() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_url(&mock_server.uri()).to_arc();
    let doctor = TestUser::doctor("house@example.com");
    let token = JwtTestUtils::create_test_token(&doctor, &config.supabase_jwt_secret, Some(1));

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let result = get_patient_records(
        State(config),
        create_auth_header(&token),
        Extension(doctor.to_actor()),
        records_query(Some(&Uuid::new_v4().to_string())),
    )
    .await;

    assert_matches!(result, Err(AppError::NotFound(_)));
}
