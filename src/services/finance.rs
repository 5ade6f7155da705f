use async_graphql::SimpleObject;
use hmac::{Hmac, Mac};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::Sha256;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::database::models::{Transaction, TransactionRow, TransactionStatus};
use crate::database::TenantRepository;
use crate::filter::FilterData;
use crate::database::query_builder::{fetch_all_as, update_sql};
use crate::database::resource::{col, Resource};
use crate::database::DatabaseError;
use crate::services::audit::{AuditEntry, AuditService};
use crate::types::AuditAction;

pub const SIGNATURE_HEADER: &str = "x-webhook-signature";
const SIGNATURE_PREFIX: &str = "sha256=";
const UNCATEGORIZED: &str = "Uncategorized";

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, PartialEq, Serialize, SimpleObject)]
pub struct StatusBreakdown {
    pub status: String,
    pub count: i64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, SimpleObject)]
pub struct CategoryBreakdown {
    pub category: String,
    pub total: Decimal,
    pub count: i64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, SimpleObject)]
pub struct TransactionSummary {
    pub count: i64,
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub net: Decimal,
    pub by_status: Vec<StatusBreakdown>,
    pub by_category: Vec<CategoryBreakdown>,
}

/// `part / whole * 100` rounded to two places; zero when `whole` is zero.
fn percentage(part: Decimal, whole: Decimal) -> f64 {
    if whole.is_zero() {
        return 0.0;
    }
    (part / whole * Decimal::ONE_HUNDRED)
        .round_dp(2)
        .to_f64()
        .unwrap_or(0.0)
}

/// One `GROUP BY status, kind, category` bucket of a tenant's transactions.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct TransactionGroup {
    pub status: String,
    pub kind: String,
    pub category: Option<String>,
    pub count: i64,
    pub total: Decimal,
}

const GROUP_BY: [&str; 3] = ["status", "kind", "category"];
const AGGREGATES: [&str; 2] = ["COUNT(*) AS count", "COALESCE(SUM(\"amount\"), 0) AS total"];

/// Summary over every transaction matching `data` in the caller's organization.
pub async fn transaction_summary(
    repo: &TenantRepository<Transaction>,
    data: FilterData,
) -> Result<TransactionSummary, DatabaseError> {
    let groups: Vec<TransactionGroup> = repo.aggregate(data, &GROUP_BY, &AGGREGATES).await?;
    Ok(summarize(&groups))
}

/// Fold grouped buckets. Only completed transactions count toward money totals.
pub fn summarize(groups: &[TransactionGroup]) -> TransactionSummary {
    let completed = TransactionStatus::Completed.as_str();
    let mut count = 0;
    let mut total_income = Decimal::ZERO;
    let mut total_expense = Decimal::ZERO;
    let mut status_counts: HashMap<&str, i64> = HashMap::new();
    let mut categories: HashMap<&str, (Decimal, i64)> = HashMap::new();

    for group in groups {
        count += group.count;
        *status_counts.entry(group.status.as_str()).or_default() += group.count;
        if group.status != completed {
            continue;
        }
        match group.kind.as_str() {
            "income" => total_income += group.total,
            "expense" => {
                total_expense += group.total;
                let entry = categories
                    .entry(group.category.as_deref().filter(|c| !c.is_empty()).unwrap_or(UNCATEGORIZED))
                    .or_insert((Decimal::ZERO, 0));
                entry.0 += group.total;
                entry.1 += group.count;
            }
            other => tracing::warn!(kind = other, rows = group.count, "Unknown transaction kind"),
        }
    }

    let by_status = [
        TransactionStatus::Pending,
        TransactionStatus::Completed,
        TransactionStatus::Failed,
    ]
    .iter()
    .map(|status| {
        let n = status_counts.get(status.as_str()).copied().unwrap_or(0);
        StatusBreakdown {
            status: status.as_str().to_string(),
            count: n,
            percentage: percentage(Decimal::from(n), Decimal::from(count)),
        }
    })
    .collect();

    let mut by_category: Vec<CategoryBreakdown> = categories
        .into_iter()
        .map(|(category, (total, n))| CategoryBreakdown {
            category: category.to_string(),
            total,
            count: n,
            percentage: percentage(total, total_expense),
        })
        .collect();
    by_category.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.category.cmp(&b.category)));

    TransactionSummary {
        count,
        total_income,
        total_expense,
        net: total_income - total_expense,
        by_status,
        by_category,
    }
}

/// Inbound payment processor notification.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentEvent {
    pub event: String,
    pub reference: String,
    pub organization_id: Uuid,
}

impl PaymentEvent {
    pub fn target_status(&self) -> Option<TransactionStatus> {
        match self.event.as_str() {
            "payment.succeeded" => Some(TransactionStatus::Completed),
            "payment.failed" => Some(TransactionStatus::Failed),
            _ => None,
        }
    }
}

/// Hex HMAC-SHA256 of `body`, in the `sha256=<hex>` header form.
pub fn sign_payload(secret: &str, body: &[u8]) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(body);
    Some(format!("{}{}", SIGNATURE_PREFIX, hex::encode(mac.finalize().into_bytes())))
}

/// Constant-time check of a `sha256=<hex>` signature.
pub fn verify_signature(secret: &str, body: &[u8], header: Option<&str>) -> bool {
    if secret.is_empty() {
        return false;
    }
    let Some(signature) = header.and_then(|h| h.trim().strip_prefix(SIGNATURE_PREFIX)) else {
        return false;
    };
    let Ok(expected) = hex::decode(signature) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

/// Set the status of every transaction matching the event's reference.
/// Runs as the system actor; each updated row gets its own audit entry.
pub async fn apply_payment_event(
    pool: &PgPool,
    audit: &AuditService,
    event: &PaymentEvent,
    status: TransactionStatus,
) -> Result<Vec<TransactionRow>, DatabaseError> {
    let sql = update_sql(
        Transaction::TABLE,
        &[(col("status", "text"), json!(status.as_str()))],
        &[
            (col("organization_id", "uuid"), json!(event.organization_id)),
            (col("reference", "text"), json!(event.reference)),
        ],
    );
    let rows: Vec<TransactionRow> = fetch_all_as(pool, &sql).await?;

    for row in &rows {
        audit
            .record(AuditEntry {
                organization_id: row.organization_id,
                user_id: None,
                action: AuditAction::Update,
                entity_type: Transaction::ENTITY,
                entity_id: Some(row.id),
                changes: Some(json!({ "status": status.as_str(), "event": event.event })),
            })
            .await;
    }
    tracing::info!(
        organization_id = %event.organization_id,
        reference = %event.reference,
        updated = rows.len(),
        "Applied payment event {}",
        event.event
    );
    Ok(rows)
}
