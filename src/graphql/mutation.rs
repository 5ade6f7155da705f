use async_graphql::{Context, Object, Result};
use uuid::Uuid;

use super::inputs::{PipelineJobInput, PipelineJobPatch};
use super::{repository, scope, GraphqlResultExt};
use crate::auth::Role;
use crate::database::models::*;
use crate::database::{Resource, Writable};
use crate::error::ApiError;
use crate::services::{ProfileService, SettingsService};
use crate::validation::Validate;

pub struct MutationRoot;

async fn create_row<E: Writable>(ctx: &Context<'_>, input: E::Create) -> Result<E::Row> {
    let (tenant, state) = scope(ctx)?;
    tenant.authorize(E::POLICY.write).gql()?;
    input.validate().gql()?;
    repository::<E>(tenant, state).create(&input).await.gql()
}

async fn update_row<E: Writable>(ctx: &Context<'_>, id: Uuid, patch: E::Update) -> Result<E::Row> {
    let (tenant, state) = scope(ctx)?;
    tenant.authorize(E::POLICY.write).gql()?;
    patch.validate().gql()?;
    repository::<E>(tenant, state).patch(id, &patch).await.gql()
}

async fn delete_row<E: Writable>(ctx: &Context<'_>, id: Uuid) -> Result<E::Row> {
    let (tenant, state) = scope(ctx)?;
    tenant.authorize(E::POLICY.delete).gql()?;
    repository::<E>(tenant, state).delete(id).await.gql()
}

#[Object]
impl MutationRoot {
    async fn create_contact(&self, ctx: &Context<'_>, input: CreateContact) -> Result<ContactRow> {
        create_row::<Contact>(ctx, input).await
    }

    async fn update_contact(&self, ctx: &Context<'_>, id: Uuid, input: UpdateContact) -> Result<ContactRow> {
        update_row::<Contact>(ctx, id, input).await
    }

    async fn delete_contact(&self, ctx: &Context<'_>, id: Uuid) -> Result<ContactRow> {
        delete_row::<Contact>(ctx, id).await
    }

    async fn create_emergency_contact(
        &self,
        ctx: &Context<'_>,
        input: CreateEmergencyContact,
    ) -> Result<EmergencyContactRow> {
        create_row::<EmergencyContact>(ctx, input).await
    }

    async fn update_emergency_contact(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        input: UpdateEmergencyContact,
    ) -> Result<EmergencyContactRow> {
        update_row::<EmergencyContact>(ctx, id, input).await
    }

    async fn delete_emergency_contact(&self, ctx: &Context<'_>, id: Uuid) -> Result<EmergencyContactRow> {
        delete_row::<EmergencyContact>(ctx, id).await
    }

    async fn create_job_history(&self, ctx: &Context<'_>, input: CreateJobHistory) -> Result<JobHistoryRow> {
        create_row::<JobHistory>(ctx, input).await
    }

    async fn update_job_history(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        input: UpdateJobHistory,
    ) -> Result<JobHistoryRow> {
        update_row::<JobHistory>(ctx, id, input).await
    }

    async fn delete_job_history(&self, ctx: &Context<'_>, id: Uuid) -> Result<JobHistoryRow> {
        delete_row::<JobHistory>(ctx, id).await
    }

    async fn create_transaction(&self, ctx: &Context<'_>, input: CreateTransaction) -> Result<TransactionRow> {
        create_row::<Transaction>(ctx, input).await
    }

    async fn update_transaction(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        input: UpdateTransaction,
    ) -> Result<TransactionRow> {
        update_row::<Transaction>(ctx, id, input).await
    }

    async fn delete_transaction(&self, ctx: &Context<'_>, id: Uuid) -> Result<TransactionRow> {
        delete_row::<Transaction>(ctx, id).await
    }

    async fn create_marketplace_resource(
        &self,
        ctx: &Context<'_>,
        input: CreateMarketplaceResource,
    ) -> Result<MarketplaceResourceRow> {
        create_row::<MarketplaceResource>(ctx, input).await
    }

    async fn update_marketplace_resource(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        input: UpdateMarketplaceResource,
    ) -> Result<MarketplaceResourceRow> {
        update_row::<MarketplaceResource>(ctx, id, input).await
    }

    async fn delete_marketplace_resource(&self, ctx: &Context<'_>, id: Uuid) -> Result<MarketplaceResourceRow> {
        delete_row::<MarketplaceResource>(ctx, id).await
    }

    async fn create_pipeline_job(&self, ctx: &Context<'_>, input: PipelineJobInput) -> Result<PipelineJobRow> {
        let input = CreatePipelineJob::try_from(input).gql()?;
        create_row::<PipelineJob>(ctx, input).await
    }

    async fn update_pipeline_job(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        input: PipelineJobPatch,
    ) -> Result<PipelineJobRow> {
        let patch = UpdatePipelineJob::try_from(input).gql()?;
        update_row::<PipelineJob>(ctx, id, patch).await
    }

    async fn delete_pipeline_job(&self, ctx: &Context<'_>, id: Uuid) -> Result<PipelineJobRow> {
        delete_row::<PipelineJob>(ctx, id).await
    }

    async fn upsert_profile(&self, ctx: &Context<'_>, input: ProfileInput) -> Result<ProfileRow> {
        let (tenant, state) = scope(ctx)?;
        tenant.authorize(Role::Viewer).gql()?;
        input.validate().gql()?;
        ProfileService::new(state.pool().clone(), tenant.clone())
            .upsert(&input)
            .await
            .gql()
    }

    /// `valueJson` must be a JSON document.
    async fn upsert_setting(
        &self,
        ctx: &Context<'_>,
        key: String,
        value_json: String,
        description: Option<String>,
    ) -> Result<SettingRow> {
        let (tenant, state) = scope(ctx)?;
        tenant.authorize(Setting::POLICY.write).gql()?;
        let value = serde_json::from_str(&value_json)
            .map_err(|e| ApiError::invalid_json(format!("valueJson: {}", e)))
            .gql()?;
        let input = SettingBody { value, description }.with_key(key);
        input.validate().gql()?;
        SettingsService::new(state.pool().clone(), tenant.clone())
            .put(&input)
            .await
            .gql()
    }

    async fn delete_setting(&self, ctx: &Context<'_>, key: String) -> Result<SettingRow> {
        let (tenant, state) = scope(ctx)?;
        tenant.authorize(Setting::POLICY.delete).gql()?;
        SettingsService::new(state.pool().clone(), tenant.clone())
            .delete(&key)
            .await
            .gql()
    }
}
