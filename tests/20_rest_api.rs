mod common;

use axum::http::StatusCode;
use common::{authed, empty, json_body, send};

#[tokio::test]
async fn authorization_precedes_body_parsing() {
    let request = json_body(authed("POST", "/api/v1/finance/transactions", "viewer"), "{not json");
    assert_eq!(send(request).await.0, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn malformed_json_is_rejected() {
    let request = json_body(authed("POST", "/api/v1/finance/transactions", "member"), "{not json");
    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_JSON");
}

#[tokio::test]
async fn non_positive_amount_fails_validation() {
    let request = json_body(
        authed("POST", "/api/v1/finance/transactions", "member"),
        r#"{"kind":"expense","amount":"-5.00"}"#,
    );
    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"]["amount"].is_string());
}

#[tokio::test]
async fn unknown_enum_value_is_invalid_json() {
    let request = json_body(
        authed("POST", "/api/v1/finance/transactions", "member"),
        r#"{"kind":"refund","amount":"5.00"}"#,
    );
    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_JSON");
}

#[tokio::test]
async fn emergency_contact_priority_is_bounded() {
    let request = json_body(
        authed("POST", "/api/v1/emergency-contacts", "member"),
        r#"{"name":"Grace","relationship":"sister","phone":"+1 555 0100","priority":11}"#,
    );
    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn job_history_end_before_start_fails_validation() {
    let request = json_body(
        authed("POST", "/api/v1/job-history", "member"),
        r#"{"company":"Initech","title":"Engineer","start_date":"2024-06-01","end_date":"2024-01-01"}"#,
    );
    assert_eq!(send(request).await.0, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_record_id_is_a_bad_request() {
    let (status, body) = send(empty(authed("GET", "/api/v1/contacts/not-a-uuid", "member"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn unknown_filter_key_is_a_bad_request() {
    let (status, _) = send(empty(authed("GET", "/api/v1/contacts?password=hunter2", "member"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn non_numeric_limit_is_a_bad_request() {
    let (status, _) = send(empty(authed("GET", "/api/v1/finance/transactions?limit=ten", "member"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn inverted_date_range_is_a_bad_request() {
    let uri = "/api/v1/finance/transactions/summary?from=2024-02-01&to=2024-01-01";
    let (status, _) = send(empty(authed("GET", uri, "member"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn search_rejects_non_object_where() {
    let request = json_body(
        authed("POST", "/api/v1/contacts/search", "member"),
        r#"{"where":["first_name"]}"#,
    );
    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn setting_keys_are_validated() {
    let request = json_body(
        authed("PUT", "/api/v1/settings/bad%20key", "admin"),
        r#"{"value":true}"#,
    );
    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}
