use async_graphql::{Context, Object, Result};
use chrono::NaiveDate;
use uuid::Uuid;

use super::inputs::ListArgs;
use super::{repository, scope, GraphqlResultExt};
use crate::auth::Role;
use crate::database::models::*;
use crate::database::{DatabaseError, Resource, TenantRepository};
use crate::filter::ListQuery;
use crate::services::finance::{self, TransactionSummary};
use crate::services::{ProfileService, SettingsService};

pub struct QueryRoot;

async fn list_rows<E: Resource>(ctx: &Context<'_>, args: Option<ListArgs>) -> Result<Vec<E::Row>> {
    let (tenant, state) = scope(ctx)?;
    tenant.authorize(E::POLICY.read).gql()?;
    let query: ListQuery = args.unwrap_or_default().into();
    let page = repository::<E>(tenant, state).list(&query).await.gql()?;
    Ok(page.items)
}

async fn get_row<E: Resource>(ctx: &Context<'_>, id: Uuid) -> Result<Option<E::Row>> {
    let (tenant, state) = scope(ctx)?;
    tenant.authorize(E::POLICY.read).gql()?;
    match repository::<E>(tenant, state).get(id).await {
        Ok(row) => Ok(Some(row)),
        Err(DatabaseError::NotFound(_)) => Ok(None),
        Err(e) => Err(e).gql(),
    }
}

#[Object]
impl QueryRoot {
    /// The caller's profile in the current organization, if one exists.
    async fn me(&self, ctx: &Context<'_>) -> Result<Option<ProfileRow>> {
        let (tenant, state) = scope(ctx)?;
        tenant.authorize(Role::Viewer).gql()?;
        match ProfileService::new(state.pool().clone(), tenant.clone()).me().await {
            Ok(profile) => Ok(Some(profile)),
            Err(DatabaseError::NotFound(_)) => Ok(None),
            Err(e) => Err(e).gql(),
        }
    }

    async fn profiles(&self, ctx: &Context<'_>, args: Option<ListArgs>) -> Result<Vec<ProfileRow>> {
        list_rows::<Profile>(ctx, args).await
    }

    async fn contacts(&self, ctx: &Context<'_>, args: Option<ListArgs>) -> Result<Vec<ContactRow>> {
        list_rows::<Contact>(ctx, args).await
    }

    async fn contact(&self, ctx: &Context<'_>, id: Uuid) -> Result<Option<ContactRow>> {
        get_row::<Contact>(ctx, id).await
    }

    async fn emergency_contacts(
        &self,
        ctx: &Context<'_>,
        args: Option<ListArgs>,
    ) -> Result<Vec<EmergencyContactRow>> {
        list_rows::<EmergencyContact>(ctx, args).await
    }

    async fn job_history(&self, ctx: &Context<'_>, args: Option<ListArgs>) -> Result<Vec<JobHistoryRow>> {
        list_rows::<JobHistory>(ctx, args).await
    }

    async fn transactions(&self, ctx: &Context<'_>, args: Option<ListArgs>) -> Result<Vec<TransactionRow>> {
        list_rows::<Transaction>(ctx, args).await
    }

    async fn transaction(&self, ctx: &Context<'_>, id: Uuid) -> Result<Option<TransactionRow>> {
        get_row::<Transaction>(ctx, id).await
    }

    /// Totals over transactions dated within `from..=to`.
    async fn transaction_summary(
        &self,
        ctx: &Context<'_>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<TransactionSummary> {
        let (tenant, state) = scope(ctx)?;
        tenant.authorize(Transaction::POLICY.read).gql()?;
        let repo = repository::<Transaction>(tenant, state);
        let query = ListQuery {
            from,
            to,
            ..Default::default()
        };
        let filter = query
            .to_filter_data(&TenantRepository::<Transaction>::list_spec())
            .gql()?;
        finance::transaction_summary(&repo, filter).await.gql()
    }

    async fn marketplace_resources(
        &self,
        ctx: &Context<'_>,
        args: Option<ListArgs>,
    ) -> Result<Vec<MarketplaceResourceRow>> {
        list_rows::<MarketplaceResource>(ctx, args).await
    }

    async fn pipeline_jobs(&self, ctx: &Context<'_>, args: Option<ListArgs>) -> Result<Vec<PipelineJobRow>> {
        list_rows::<PipelineJob>(ctx, args).await
    }

    async fn pipeline_job(&self, ctx: &Context<'_>, id: Uuid) -> Result<Option<PipelineJobRow>> {
        get_row::<PipelineJob>(ctx, id).await
    }

    async fn settings(&self, ctx: &Context<'_>, args: Option<ListArgs>) -> Result<Vec<SettingRow>> {
        list_rows::<Setting>(ctx, args).await
    }

    async fn setting(&self, ctx: &Context<'_>, key: String) -> Result<Option<SettingRow>> {
        let (tenant, state) = scope(ctx)?;
        tenant.authorize(Setting::POLICY.read).gql()?;
        match SettingsService::new(state.pool().clone(), tenant.clone()).get(&key).await {
            Ok(row) => Ok(Some(row)),
            Err(DatabaseError::NotFound(_)) => Ok(None),
            Err(e) => Err(e).gql(),
        }
    }

    /// Admin only.
    async fn audit_logs(&self, ctx: &Context<'_>, args: Option<ListArgs>) -> Result<Vec<AuditLogRow>> {
        list_rows::<AuditLog>(ctx, args).await
    }
}
