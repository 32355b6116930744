use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use tower::ServiceExt;
use serde_json::{json, Value};
use wiremock::{MockServer, Mock, ResponseTemplate};
use wiremock::matchers::{method, path, query_param};
use uuid::Uuid;

use appointment_cell::router::appointment_routes;
use shared_utils::test_utils::{JwtTestUtils, MockSupabaseResponses, TestConfig, TestUser};

fn create_test_app(supabase_url: &str) -> Router {
    appointment_routes(TestConfig::with_url(supabase_url).to_arc())
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_appointments_require_token() {
    let app = create_test_app("http://localhost:54321");

    let response = app
        .oneshot(Request::builder().uri("/appointments/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_booking_body_is_validation_error() {
    let config = TestConfig::default();
    let patient = TestUser::patient("jane@example.com");
    let token = JwtTestUtils::create_test_token(&patient, &config.jwt_secret, Some(1));
    let app = create_test_app(&config.supabase_url);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/appointments/")
                .header("authorization", format!("Bearer {}", token))
                .header("content-type", "application/json")
                .body(Body::from(json!({ "doctor_id": "not-a-uuid", "date": "2025-03-10" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn test_status_update_by_other_doctor_is_403() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_url(&mock_server.uri());
    let assigned = TestUser::doctor("house@example.com");
    let intruder = TestUser::doctor("wilson@example.com");
    let patient = TestUser::patient("jane@example.com");
    let token = JwtTestUtils::create_test_token(&intruder, &config.jwt_secret, Some(1));
    let appointment_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", format!("eq.{}", appointment_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::appointment_row(
                &appointment_id.to_string(),
                &assigned.profile_id.to_string(),
                &patient.profile_id.to_string(),
                "pending",
            )
        ])))
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server.uri());
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/appointments/{}/status/", appointment_id))
                .header("authorization", format!("Bearer {}", token))
                .header("content-type", "application/json")
                .body(Body::from(json!({ "status": "cancelled" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await, json!({ "error": "Permission denied" }));
}

#[tokio::test]
async fn test_doctor_lists_own_appointments_over_http() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_url(&mock_server.uri());
    let doctor = TestUser::doctor("house@example.com");
    let patient = TestUser::patient("jane@example.com");
    let token = JwtTestUtils::create_test_token(&doctor, &config.jwt_secret, Some(1));

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("doctor_id", format!("eq.{}", doctor.profile_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::appointment_row(
                &Uuid::new_v4().to_string(),
                &doctor.profile_id.to_string(),
                &patient.profile_id.to_string(),
                "confirmed",
            )
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server.uri());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/appointments/")
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body[0]["time"], "09:30:00");
    assert_eq!(body[0]["status"], "confirmed");
}

#[tokio::test]
async fn test_non_uuid_appointment_id_is_json_error() {
    let config = TestConfig::default();
    let doctor = TestUser::doctor("house@example.com");
    let token = JwtTestUtils::create_test_token(&doctor, &config.jwt_secret, Some(1));

    for (verb, uri) in [("POST", "/appointments/42/status/"), ("GET", "/appointments/42/meeting/")] {
        let app = create_test_app(&config.supabase_url);
        let response = app
            .oneshot(
                Request::builder()
                    .method(verb)
                    .uri(uri)
                    .header("authorization", format!("Bearer {}", token))
                    .header("content-type", "application/json")
                    .body(Body::from(json!({ "status": "confirmed" }).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
        assert!(body_json(response).await["error"].is_string(), "{}", uri);
    }
}
