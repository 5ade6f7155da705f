// /api/v1/settings/:key - key-addressed organization settings

use axum::extract::{Path, State};

use crate::database::models::{Setting, SettingBody, SettingRow};
use crate::database::Resource;
use crate::middleware::{ApiResponse, ApiResult, JsonBody, TenantContext};
use crate::services::SettingsService;
use crate::state::AppState;
use crate::validation::Validate;

pub async fn get(
    ctx: TenantContext,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<SettingRow> {
    ctx.authorize(Setting::POLICY.read)?;
    let row = SettingsService::new(state.pool().clone(), ctx).get(&key).await?;
    Ok(ApiResponse::success(row))
}

pub async fn put(
    ctx: TenantContext,
    State(state): State<AppState>,
    Path(key): Path<String>,
    body: JsonBody<SettingBody>,
) -> ApiResult<SettingRow> {
    ctx.authorize(Setting::POLICY.write)?;
    let input = body.validated()?.with_key(key);
    input.validate()?;
    let row = SettingsService::new(state.pool().clone(), ctx).put(&input).await?;
    Ok(ApiResponse::success(row))
}

pub async fn delete(
    ctx: TenantContext,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<SettingRow> {
    ctx.authorize(Setting::POLICY.delete)?;
    let row = SettingsService::new(state.pool().clone(), ctx).delete(&key).await?;
    Ok(ApiResponse::success(row))
}
