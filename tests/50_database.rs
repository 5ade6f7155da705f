mod common;

use anyhow::Result;
use axum::http::StatusCode;
use axum::Router;
use serde_json::{json, Value};
use uuid::Uuid;

use common::{as_user, config, db_app, empty, json_body, send_raw, send_to, EXPORT_CAP};
use orgsuite_api::services::finance::{sign_payload, SIGNATURE_HEADER};

async fn create(app: &Router, uri: &str, org: Uuid, user: Uuid, body: Value) -> Result<Value> {
    let request = json_body(as_user("POST", uri, org, user, "member"), &body.to_string());
    let (status, body) = send_to(app, request).await;
    assert_eq!(status, StatusCode::CREATED, "create {} failed: {}", uri, body);
    Ok(body["data"].clone())
}

fn contact(first_name: &str) -> Value {
    json!({ "first_name": first_name, "company": "Initech" })
}

fn expense(amount: &str, reference: Option<&str>, status: &str) -> Value {
    json!({
        "kind": "expense",
        "amount": amount,
        "category": "office",
        "status": status,
        "reference": reference,
    })
}

#[tokio::test]
async fn records_are_invisible_across_organizations() -> Result<()> {
    let Some(app) = db_app().await else { return Ok(()) };
    let (org, other_org, user) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

    let row = create(&app, "/api/v1/contacts", org, user, contact("Ada")).await?;
    let uri = format!("/api/v1/contacts/{}", row["id"].as_str().unwrap_or_default());
    assert_eq!(row["organization_id"], json!(org));
    assert_eq!(row["user_id"], json!(user));

    let (status, body) = send_to(&app, empty(as_user("GET", &uri, other_org, user, "admin"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND, "foreign org read: {}", body);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, body) = send_to(&app, empty(as_user("GET", "/api/v1/contacts", other_org, user, "admin"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 0);

    let (status, body) = send_to(&app, empty(as_user("GET", &uri, org, Uuid::new_v4(), "viewer"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["first_name"], "Ada");
    Ok(())
}

#[tokio::test]
async fn members_cannot_modify_each_others_rows() -> Result<()> {
    let Some(app) = db_app().await else { return Ok(()) };
    let (org, owner, colleague) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

    let row = create(&app, "/api/v1/contacts", org, owner, contact("Grace")).await?;
    let uri = format!("/api/v1/contacts/{}", row["id"].as_str().unwrap_or_default());

    let patch = json_body(as_user("PATCH", &uri, org, colleague, "member"), r#"{"company":"Globex"}"#);
    assert_eq!(send_to(&app, patch).await.0, StatusCode::NOT_FOUND);
    let delete = empty(as_user("DELETE", &uri, org, colleague, "member"));
    assert_eq!(send_to(&app, delete).await.0, StatusCode::NOT_FOUND);

    let patch = json_body(as_user("PATCH", &uri, org, Uuid::new_v4(), "manager"), r#"{"company":"Globex"}"#);
    let (status, body) = send_to(&app, patch).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["company"], "Globex");
    assert_eq!(body["data"]["user_id"], json!(owner));
    Ok(())
}

#[tokio::test]
async fn write_lifecycle_is_audited() -> Result<()> {
    let Some(app) = db_app().await else { return Ok(()) };
    let (org, user) = (Uuid::new_v4(), Uuid::new_v4());

    let row = create(&app, "/api/v1/contacts", org, user, contact("Linus")).await?;
    let id = row["id"].as_str().unwrap_or_default().to_string();
    let uri = format!("/api/v1/contacts/{}", id);

    let put = json_body(
        as_user("PUT", &uri, org, user, "member"),
        r#"{"first_name":"Linus","last_name":"Torvalds"}"#,
    );
    let (status, body) = send_to(&app, put).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["last_name"], "Torvalds");
    assert_eq!(body["data"]["company"], Value::Null);

    let patch = json_body(as_user("PATCH", &uri, org, user, "member"), r#"{"city":"Portland"}"#);
    let (status, body) = send_to(&app, patch).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["city"], "Portland");
    assert_eq!(body["data"]["last_name"], "Torvalds");

    let (status, _) = send_to(&app, empty(as_user("DELETE", &uri, org, user, "member"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(send_to(&app, empty(as_user("GET", &uri, org, user, "member"))).await.0, StatusCode::NOT_FOUND);

    let audit_uri = format!("/api/v1/audit-logs?entity_id={}&limit=10", id);
    let (status, body) = send_to(&app, empty(as_user("GET", &audit_uri, org, user, "admin"))).await;
    assert_eq!(status, StatusCode::OK);
    let mut actions: Vec<&str> = body["data"]["items"]
        .as_array()
        .map(|items| items.iter().filter_map(|i| i["action"].as_str()).collect())
        .unwrap_or_default();
    actions.sort_unstable();
    assert_eq!(actions, vec!["create", "delete", "update", "update"]);
    assert!(body["data"]["items"].as_array().into_iter().flatten().all(|i| {
        i["entity_type"] == "contact" && i["organization_id"] == json!(org) && i["user_id"] == json!(user)
    }));
    Ok(())
}

#[tokio::test]
async fn signed_webhook_completes_the_transaction() -> Result<()> {
    let Some(app) = db_app().await else { return Ok(()) };
    let (org, user) = (Uuid::new_v4(), Uuid::new_v4());
    let reference = format!("inv-{}", Uuid::new_v4());

    let row = create(
        &app,
        "/api/v1/finance/transactions",
        org,
        user,
        expense("42.50", Some(&reference), "pending"),
    )
    .await?;
    assert_eq!(row["status"], "pending");

    let payload = json!({ "event": "payment.succeeded", "reference": reference, "organization_id": org }).to_string();
    let signature = sign_payload(&config().security.webhook_secret, payload.as_bytes()).unwrap_or_default();
    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/api/v1/webhooks/payments")
        .header(axum::http::header::CONTENT_TYPE, "application/json")
        .header(SIGNATURE_HEADER, signature)
        .body(axum::body::Body::from(payload))?;
    let (status, body) = send_to(&app, request).await;
    assert_eq!(status, StatusCode::OK, "webhook: {}", body);
    assert_eq!(body["data"]["updated"], 1);
    assert_eq!(body["data"]["status"], "completed");

    let uri = format!("/api/v1/finance/transactions/{}", row["id"].as_str().unwrap_or_default());
    let (_, body) = send_to(&app, empty(as_user("GET", &uri, org, user, "viewer"))).await;
    assert_eq!(body["data"]["status"], "completed");
    Ok(())
}

#[tokio::test]
async fn summary_covers_rows_beyond_the_export_cap() -> Result<()> {
    let Some(app) = db_app().await else { return Ok(()) };
    let (org, user) = (Uuid::new_v4(), Uuid::new_v4());

    for amount in ["10.00", "20.00", "30.00"] {
        create(&app, "/api/v1/finance/transactions", org, user, expense(amount, None, "completed")).await?;
    }
    create(&app, "/api/v1/finance/transactions", org, user, expense("99.00", None, "pending")).await?;

    let list = as_user("GET", "/api/v1/finance/transactions?status=completed", org, user, "viewer");
    let (_, body) = send_to(&app, empty(list)).await;
    assert_eq!(body["data"]["total"], 3);

    let export = as_user("GET", "/api/v1/finance/transactions/export?status=completed", org, user, "manager");
    let (status, csv) = send_raw(&app, empty(export)).await;
    assert_eq!(status, StatusCode::OK);
    let lines = String::from_utf8(csv)?.lines().filter(|l| !l.is_empty()).count();
    assert_eq!(lines, EXPORT_CAP + 1);

    let summary = as_user("GET", "/api/v1/finance/transactions/summary", org, user, "viewer");
    let (status, body) = send_to(&app, empty(summary)).await;
    assert_eq!(status, StatusCode::OK, "summary: {}", body);
    let summary = &body["data"];
    assert_eq!(summary["count"], 4);
    assert_eq!(summary["total_expense"], "60.00");
    assert_eq!(summary["net"], "-60.00");
    assert_eq!(summary["by_category"][0]["category"], "office");
    assert_eq!(summary["by_category"][0]["count"], 3);
    assert_eq!(summary["by_category"][0]["percentage"], 100.0);
    assert_eq!(summary["by_status"][0]["status"], "pending");
    assert_eq!(summary["by_status"][0]["percentage"], 25.0);

    let query = json!({ "query": "{ transactionSummary { count totalExpense } }" }).to_string();
    let (_, body) = send_to(&app, json_body(as_user("POST", "/api/v1/graphql", org, user, "viewer"), &query)).await;
    assert_eq!(body["data"]["transactionSummary"]["count"], 4);
    assert_eq!(body["data"]["transactionSummary"]["totalExpense"], "60.00");
    Ok(())
}

#[tokio::test]
async fn mistyped_search_values_are_client_errors() -> Result<()> {
    let Some(app) = db_app().await else { return Ok(()) };
    let (org, user) = (Uuid::new_v4(), Uuid::new_v4());

    for (uri, body) in [
        ("/api/v1/contacts/search", r#"{"where":{"id":5}}"#),
        ("/api/v1/job-history/search", r#"{"where":{"is_current":5}}"#),
        ("/api/v1/finance/transactions/search", r#"{"where":{"amount":true}}"#),
    ] {
        let (status, response) = send_to(&app, json_body(as_user("POST", uri, org, user, "viewer"), body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{} {}: {}", uri, body, response);
        assert_eq!(response["code"], "BAD_REQUEST");
    }

    let search = json_body(
        as_user("POST", "/api/v1/job-history/search", org, user, "viewer"),
        r#"{"where":{"is_current":true}}"#,
    );
    let (status, body) = send_to(&app, search).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 0);
    Ok(())
}
