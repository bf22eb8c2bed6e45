use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use appointment_cell::router::appointment_routes;
use shared_database::AppState;
use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};

fn bearer(user: &TestUser) -> String {
    let token = JwtTestUtils::create_test_token(user, &TestConfig::default().jwt_secret, None);
    format!("Bearer {}", token)
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_invalid_signature_is_rejected() {
    let app = appointment_routes(Arc::new(AppState::new(TestConfig::default().to_app_config())));
    let token = JwtTestUtils::create_invalid_signature_token(&TestUser::employee("sarah@sr.com"));

    let response = app
        .oneshot(
            Request::get("/")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(body_json(response).await["message"].is_string());
}

#[tokio::test]
async fn test_booking_unknown_patient_returns_404_message() {
    let app = appointment_routes(Arc::new(AppState::new(TestConfig::default().to_app_config())));
    let payload = json!({
        "patientId": Uuid::new_v4(),
        "doctorId": Uuid::new_v4(),
        "date": "2024-06-10",
        "time": "10:00"
    });

    let response = app
        .oneshot(
            Request::post("/")
                .header("Authorization", bearer(&TestUser::employee("sarah@sr.com")))
                .header("Content-Type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["message"], "Patient not found");
}

#[tokio::test]
async fn test_status_must_be_a_known_tag() {
    let app = appointment_routes(Arc::new(AppState::new(TestConfig::default().to_app_config())));

    let response = app
        .oneshot(
            Request::put(format!("/{}", Uuid::new_v4()))
                .header("Authorization", bearer(&TestUser::employee("sarah@sr.com")))
                .header("Content-Type", "application/json")
                .body(Body::from(json!({ "status": "no_show" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
