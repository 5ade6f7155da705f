mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use common::{config, send, ORG_ID};
use orgsuite_api::services::finance::{sign_payload, SIGNATURE_HEADER};

fn webhook(body: &str, signature: Option<String>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/v1/webhooks/payments")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(signature) = signature {
        builder = builder.header(SIGNATURE_HEADER, signature);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn signed(body: &str) -> Request<Body> {
    let signature = sign_payload(&config().security.webhook_secret, body.as_bytes());
    webhook(body, signature)
}

#[tokio::test]
async fn unsigned_webhook_is_rejected() {
    let body = format!(r#"{{"event":"payment.succeeded","reference":"inv-1","organization_id":"{}"}}"#, ORG_ID);
    let (status, body) = send(webhook(&body, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn wrong_signature_is_rejected() {
    let body = format!(r#"{{"event":"payment.succeeded","reference":"inv-1","organization_id":"{}"}}"#, ORG_ID);
    let forged = sign_payload("not-the-secret", body.as_bytes());
    assert_eq!(send(webhook(&body, forged)).await.0, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn signed_garbage_is_invalid_json() {
    let (status, body) = send(signed("not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_JSON");
}

#[tokio::test]
async fn unsupported_event_is_a_bad_request() {
    let body = format!(r#"{{"event":"payment.refunded","reference":"inv-1","organization_id":"{}"}}"#, ORG_ID);
    let (status, body) = send(signed(&body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}
