// GET /api/v1/finance/transactions/summary - aggregated totals

use axum::extract::{Query, State};
use std::collections::HashMap;

use crate::database::models::Transaction;
use crate::database::{Resource, TenantRepository};
use crate::filter::ListQuery;
use crate::middleware::{ApiResponse, ApiResult, TenantContext};
use crate::services::finance::{transaction_summary, TransactionSummary};
use crate::state::AppState;

/// Accepts the same filters as the transaction list; paging is ignored.
pub async fn summary(
    ctx: TenantContext,
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<TransactionSummary> {
    ctx.authorize(Transaction::POLICY.read)?;
    let query = ListQuery::from_params(params)?;
    let filter = query.to_filter_data(&TenantRepository::<Transaction>::list_spec())?;
    let repo = TenantRepository::<Transaction>::new(state.pool().clone(), ctx);
    let summary = transaction_summary(&repo, filter).await?;
    Ok(ApiResponse::success(summary))
}
