// GET / - service descriptor

use axum::response::Json;
use serde_json::{json, Value};

pub async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Multi-tenant back office API",
            "endpoints": {
                "health": "/health",
                "rest": "/api/v1",
                "graphql": "/api/v1/graphql",
                "webhooks": "/api/v1/webhooks/payments"
            }
        }
    }))
}
