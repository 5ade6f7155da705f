use async_graphql::{ComplexObject, SimpleObject};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::auth::Policy;
use crate::database::resource::{col, Column, Resource};

/// Append-only change history; written by the audit service, read by admins.
pub struct AuditLog;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, SimpleObject)]
#[graphql(complex)]
pub struct AuditLogRow {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub user_id: Option<Uuid>,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<Uuid>,
    #[graphql(skip)]
    pub changes: Option<Value>,
    pub created_at: DateTime<Utc>,
}

#[ComplexObject]
impl AuditLogRow {
    async fn changes_json(&self) -> Option<String> {
        self.changes.as_ref().map(Value::to_string)
    }
}

impl Resource for AuditLog {
    type Row = AuditLogRow;

    const TABLE: &'static str = "audit_logs";
    const ENTITY: &'static str = "audit_log";
    const COLUMNS: &'static [Column] = &[
        col("user_id", "uuid"),
        col("action", "text"),
        col("entity_type", "text"),
        col("entity_id", "uuid"),
        col("changes", "jsonb"),
    ];
    const SYSTEM_COLUMNS: &'static [Column] = &[
        col("id", "uuid"),
        col("organization_id", "uuid"),
        col("created_at", "timestamptz"),
    ];
    const FILTERABLE: &'static [&'static str] = &["action", "entity_type", "entity_id", "user_id"];
    const DATE_COLUMN: Option<&'static str> = Some("created_at");
    const POLICY: Policy = Policy::AUDIT;

    fn row_id(row: &AuditLogRow) -> Uuid {
        row.id
    }
}
