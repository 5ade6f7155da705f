use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{AuditLog, AuditLogRow};
use crate::database::query_builder::{fetch_optional_as, insert_sql};
use crate::database::resource::{col, Column, Resource};
use crate::types::AuditAction;

/// One audit entry before it is written.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub organization_id: Uuid,
    /// `None` for system actors such as inbound webhooks.
    pub user_id: Option<Uuid>,
    pub action: AuditAction,
    pub entity_type: &'static str,
    pub entity_id: Option<Uuid>,
    pub changes: Option<Value>,
}

/// Writes the audit trail. Failures are logged and never propagate.
#[derive(Clone)]
pub struct AuditService {
    pool: PgPool,
    enabled: bool,
}

impl AuditService {
    pub fn new(pool: PgPool, enabled: bool) -> Self {
        Self { pool, enabled }
    }

    pub fn from_config(pool: PgPool) -> Self {
        Self::new(pool, crate::config::config().security.enable_audit_logging)
    }

    pub async fn record(&self, entry: AuditEntry) {
        tracing::info!(
            organization_id = %entry.organization_id,
            user_id = ?entry.user_id,
            action = entry.action.as_str(),
            entity_type = entry.entity_type,
            entity_id = ?entry.entity_id,
            "audit"
        );
        if !self.enabled {
            return;
        }

        let sql = insert_sql(AuditLog::TABLE, &Self::values(&entry));
        if let Err(e) = fetch_optional_as::<AuditLogRow>(&self.pool, &sql).await {
            tracing::error!(
                entity_type = entry.entity_type,
                entity_id = ?entry.entity_id,
                "Failed to write audit record: {}",
                e
            );
        }
    }

    fn values(entry: &AuditEntry) -> Vec<(Column, Value)> {
        vec![
            (col("organization_id", "uuid"), json!(entry.organization_id)),
            (col("user_id", "uuid"), json!(entry.user_id)),
            (col("action", "text"), json!(entry.action.as_str())),
            (col("entity_type", "text"), json!(entry.entity_type)),
            (col("entity_id", "uuid"), json!(entry.entity_id)),
            (col("changes", "jsonb"), entry.changes.clone().unwrap_or(Value::Null)),
        ]
    }
}
