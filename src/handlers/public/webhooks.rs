// POST /api/v1/webhooks/payments - signed payment processor callbacks

use axum::{body::Bytes, extract::State, http::HeaderMap};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::finance::{apply_payment_event, verify_signature, PaymentEvent, SIGNATURE_HEADER};
use crate::services::AuditService;
use crate::state::AppState;

pub async fn payments(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> ApiResult<Value> {
    let signature = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());
    if !verify_signature(&state.config().security.webhook_secret, &body, signature) {
        tracing::warn!("Rejected payment webhook with missing or invalid signature");
        return Err(ApiError::unauthorized("Invalid webhook signature"));
    }

    let event: PaymentEvent =
        serde_json::from_slice(&body).map_err(|e| ApiError::invalid_json(e.to_string()))?;
    let status = event
        .target_status()
        .ok_or_else(|| ApiError::bad_request(format!("Unsupported event '{}'", event.event)))?;

    let audit = AuditService::new(state.pool().clone(), state.config().security.enable_audit_logging);
    let rows = apply_payment_event(state.pool(), &audit, &event, status).await?;
    if rows.is_empty() {
        return Err(ApiError::not_found(format!(
            "No transaction with reference '{}'",
            event.reference
        )));
    }

    Ok(ApiResponse::success(json!({
        "updated": rows.len(),
        "status": status.as_str(),
        "transactions": rows.iter().map(|r| r.id).collect::<Vec<_>>(),
    })))
}
