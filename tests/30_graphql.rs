mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use common::{authed, json_body, send, token};
use serde_json::{json, Value};

fn graphql(roles: &str, query: &str) -> Request<Body> {
    json_body(
        authed("POST", "/api/v1/graphql", roles),
        &json!({ "query": query }).to_string(),
    )
}

fn first_error(body: &Value) -> &Value {
    &body["errors"][0]
}

#[tokio::test]
async fn graphql_requires_a_session() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/graphql")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"query":"{ me { id } }"}"#))
        .unwrap();
    assert_eq!(send(request).await.0, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn graphql_requires_an_org() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/graphql")
        .header(header::AUTHORIZATION, format!("Bearer {}", token()))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"query":"{ me { id } }"}"#))
        .unwrap();
    assert_eq!(send(request).await.0, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn forbidden_fields_report_a_code() {
    let (status, body) = send(graphql("member", "{ auditLogs { id action } }")).await;
    assert_eq!(status, StatusCode::OK);
    let error = first_error(&body);
    assert_eq!(error["extensions"]["code"], "FORBIDDEN");
    assert_eq!(error["extensions"]["status"], 403);
}

#[tokio::test]
async fn me_requires_a_known_role() {
    let (status, body) = send(graphql("bogus", "{ me { id } }")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["me"], Value::Null);
    let error = first_error(&body);
    assert_eq!(error["extensions"]["code"], "FORBIDDEN");
    assert_eq!(error["path"][0], "me");
}

#[tokio::test]
async fn mutation_inputs_are_validated() {
    let query = r#"mutation { createTransaction(input: { kind: EXPENSE, amount: "-1" }) { id } }"#;
    let (_, body) = send(graphql("member", query)).await;
    assert_eq!(first_error(&body)["extensions"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn setting_value_must_be_json() {
    let query = r#"mutation { upsertSetting(key: "theme", valueJson: "{oops") { key } }"#;
    let (_, body) = send(graphql("admin", query)).await;
    assert_eq!(first_error(&body)["extensions"]["code"], "INVALID_JSON");
}

#[tokio::test]
async fn pipeline_payload_must_be_json() {
    let query = r#"mutation { createPipelineJob(input: { name: "nightly", pipeline: "etl", payloadJson: "[1," }) { id } }"#;
    let (_, body) = send(graphql("member", query)).await;
    assert_eq!(first_error(&body)["extensions"]["code"], "INVALID_JSON");
}
