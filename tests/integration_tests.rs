use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use std::sync::Arc;
use tower::Service;
use viamentor_scheduling::conflict::ConflictChecker;
use viamentor_scheduling::ical::PlanningExporter;
use viamentor_scheduling::models::ConflictResult;
use viamentor_scheduling::settings::Settings;
use viamentor_scheduling::{AppState, build_router};

/// Helper function to create test app state
fn create_test_state() -> AppState {
    let settings = Settings {
        debug: true,
        auth_token: "test-token-123".to_string(),
        enable_swagger: true,
        port: 8080,
        default_max_capacity: 12,
        suggestion_step_minutes: 30,
        suggestion_window_slots: 4,
        suggestion_limit: 3,
        calendar_name: Some("Planning de test".to_string()),
    };

    AppState {
        settings,
        checker: Arc::new(ConflictChecker::new(30, 4, 3)),
        exporter: Arc::new(PlanningExporter::new()),
    }
}

/// Helper to extract response body as string
async fn response_body_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn json_request(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_root_endpoint() {
    // Arrange
    let state = create_test_state();
    let mut app = build_router(state);

    // Act
    let response = app
        .call(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_body_string(response.into_body()).await;
    assert!(body.contains("Viamentor Scheduling API"));
    assert!(body.contains("/lessons/validate"));
    assert!(body.contains("/planning.ical"));
}

#[tokio::test]
async fn test_healthz_live() {
    // Arrange
    let state = create_test_state();
    let mut app = build_router(state);

    // Act
    let response = app
        .call(
            Request::builder()
                .uri("/healthz/live")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_body_string(response.into_body()).await;
    assert!(body.contains(r#""status":"ok"#));
}

#[tokio::test]
async fn test_healthz_ready() {
    // Arrange
    let state = create_test_state();
    let mut app = build_router(state);

    // Act
    let response = app
        .call(
            Request::builder()
                .uri("/healthz/ready")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_body_string(response.into_body()).await;
    assert!(body.contains(r#""status":"ok"#));
}

#[tokio::test]
async fn test_validate_no_auth_token() {
    // Arrange
    let state = create_test_state();
    let mut app = build_router(state);

    // Act
    let response = app
        .call(json_request(
            "/lessons/validate",
            serde_json::json!({
                "date": "2025-01-20",
                "start_time": "14:00",
                "duration_minutes": 60
            }),
        ))
        .await
        .unwrap();

    // Assert - should fail without token
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_validate_invalid_auth_token() {
    // Arrange
    let state = create_test_state();
    let mut app = build_router(state);

    // Act
    let response = app
        .call(json_request(
            "/lessons/validate?token=invalid-token",
            serde_json::json!({
                "date": "2025-01-20",
                "start_time": "14:00",
                "duration_minutes": 60
            }),
        ))
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_validate_room_double_booking() {
    // Arrange
    let state = create_test_state();
    let mut app = build_router(state);

    // Act - candidate 14:30-15:30 against an existing 14:00-15:30 in R1
    let payload = serde_json::json!({
        "date": "2025-01-20",
        "start_time": "14:30",
        "duration_minutes": 60,
        "room_id": "R1",
        "lessons": [{
            "id": "l1",
            "name": "Cours de sensibilisation",
            "date": "2025-01-20",
            "start_time": "14:00",
            "end_time": "15:30",
            "room_id": "R1",
            "instructor_id": null,
            "enrolled_count": 5,
            "capacity": 12
        }]
    });
    let response = app
        .call(
            Request::builder()
                .method("POST")
                .uri("/lessons/validate")
                .header(header::AUTHORIZATION, "Bearer test-token-123")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_body_string(response.into_body()).await;
    let result: ConflictResult = serde_json::from_str(&body).unwrap();
    assert!(result.has_conflict);
    assert_eq!(result.conflicts.len(), 1);
    assert!(result.conflicts[0].message.contains("R1"));
    assert!(!result.suggestions.is_empty());
    assert!(result.suggestions.len() <= 3);
}

#[tokio::test]
async fn test_validate_adjacent_slot_is_clean() {
    // Arrange
    let state = create_test_state();
    let mut app = build_router(state);

    // Act - candidate starts exactly when the existing lesson ends
    let response = app
        .call(json_request(
            "/lessons/validate?token=test-token-123",
            serde_json::json!({
                "date": "2025-01-20",
                "start_time": "15:30",
                "duration_minutes": 60,
                "room_id": "R1",
                "lessons": [{
                    "id": "l1",
                    "name": null,
                    "date": "2025-01-20",
                    "start_time": "14:00",
                    "end_time": "15:30",
                    "room_id": "R1",
                    "instructor_id": null,
                    "enrolled_count": 5,
                    "capacity": 12
                }]
            }),
        ))
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_body_string(response.into_body()).await;
    let result: ConflictResult = serde_json::from_str(&body).unwrap();
    assert!(!result.has_conflict);
    assert!(result.conflicts.is_empty());
    assert!(result.suggestions.is_empty());
}

#[tokio::test]
async fn test_validate_malformed_time() {
    // Arrange
    let state = create_test_state();
    let mut app = build_router(state);

    // Act
    let response = app
        .call(json_request(
            "/lessons/validate?token=test-token-123",
            serde_json::json!({
                "date": "2025-01-20",
                "start_time": "14h30",
                "duration_minutes": 60
            }),
        ))
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_validate_negative_duration() {
    // Arrange
    let state = create_test_state();
    let mut app = build_router(state);

    // Act
    let response = app
        .call(json_request(
            "/lessons/validate?token=test-token-123",
            serde_json::json!({
                "date": "2025-01-20",
                "start_time": "14:00",
                "duration_minutes": -30
            }),
        ))
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_validate_midnight_crossing() {
    // Arrange
    let state = create_test_state();
    let mut app = build_router(state);

    // Act - 23:30 + 60 minutes runs past midnight
    let response = app
        .call(json_request(
            "/lessons/validate?token=test-token-123",
            serde_json::json!({
                "date": "2025-01-20",
                "start_time": "23:30",
                "duration_minutes": 60
            }),
        ))
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_validate_full_lesson_capacity() {
    // Arrange
    let state = create_test_state();
    let mut app = build_router(state);

    // Act - candidate matches a full 20/20 lesson exactly
    let response = app
        .call(json_request(
            "/lessons/validate?token=test-token-123",
            serde_json::json!({
                "date": "2025-01-20",
                "start_time": "14:00",
                "duration_minutes": 90,
                "lessons": [{
                    "id": "l1",
                    "name": null,
                    "date": "2025-01-20",
                    "start_time": "14:00",
                    "end_time": "15:30",
                    "room_id": null,
                    "instructor_id": null,
                    "enrolled_count": 20,
                    "capacity": 20
                }]
            }),
        ))
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_body_string(response.into_body()).await;
    let result: ConflictResult = serde_json::from_str(&body).unwrap();
    assert!(result.has_conflict);
    assert!(result.conflicts[0].message.contains("Capacité"));
    assert!(body.contains(r#""severity":"error""#));
}

#[tokio::test]
async fn test_validate_availability_warning_only() {
    // Arrange
    let state = create_test_state();
    let mut app = build_router(state);

    // Act - the room is only open mornings, no overlapping lessons
    let response = app
        .call(json_request(
            "/lessons/validate?token=test-token-123",
            serde_json::json!({
                "date": "2025-01-20",
                "start_time": "14:00",
                "duration_minutes": 60,
                "room_id": "R1",
                "rooms": [{
                    "id": "R1",
                    "capacity": 12,
                    "availability": [
                        {"start_time": "08:00", "end_time": "12:00"}
                    ]
                }]
            }),
        ))
        .await
        .unwrap();

    // Assert - a warning alone does not block the slot
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_body_string(response.into_body()).await;
    let result: ConflictResult = serde_json::from_str(&body).unwrap();
    assert!(!result.has_conflict);
    assert_eq!(result.conflicts.len(), 1);
    assert!(result.suggestions.is_empty());
    assert!(body.contains(r#""severity":"warning""#));
}

#[tokio::test]
async fn test_ical_endpoint_no_auth() {
    // Arrange
    let state = create_test_state();
    let mut app = build_router(state);

    // Act
    let response = app
        .call(json_request(
            "/planning.ical",
            serde_json::json!({"lessons": []}),
        ))
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_ical_endpoint_empty_lessons() {
    // Arrange
    let state = create_test_state();
    let mut app = build_router(state);

    // Act
    let response = app
        .call(json_request(
            "/planning.ical?token=test-token-123",
            serde_json::json!({"lessons": []}),
        ))
        .await
        .unwrap();

    // Assert - should return 404 when there is nothing to export
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_ical_endpoint_with_lessons() {
    // Arrange
    let state = create_test_state();
    let mut app = build_router(state);

    // Act
    let response = app
        .call(json_request(
            "/planning.ical?token=test-token-123",
            serde_json::json!({
                "lessons": [{
                    "id": "l1",
                    "name": "Cours de sensibilisation",
                    "date": "2025-01-20",
                    "start_time": "14:00",
                    "end_time": "15:30",
                    "room_id": "R1",
                    "instructor_id": "I1",
                    "enrolled_count": 8,
                    "capacity": 12
                }]
            }),
        ))
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status(), StatusCode::OK);

    // Check content type
    let content_type = response.headers().get(header::CONTENT_TYPE).unwrap();
    assert_eq!(content_type, "text/calendar");

    // Check content disposition
    let content_disposition = response.headers().get(header::CONTENT_DISPOSITION).unwrap();
    assert!(
        content_disposition
            .to_str()
            .unwrap()
            .contains("viamentor_planning.ics")
    );

    // Check body contains iCal format
    let body = response_body_string(response.into_body()).await;
    assert!(body.contains("BEGIN:VCALENDAR"));
    assert!(body.contains("BEGIN:VEVENT"));
    assert!(body.contains("Cours de sensibilisation"));
}
