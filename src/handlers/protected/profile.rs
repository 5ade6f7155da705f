// GET/PUT /api/v1/profile - the caller's own profile

use axum::extract::State;

use crate::auth::Role;
use crate::database::models::{ProfileInput, ProfileRow};
use crate::middleware::{ApiResponse, ApiResult, JsonBody, TenantContext};
use crate::services::ProfileService;
use crate::state::AppState;

pub async fn me(ctx: TenantContext, State(state): State<AppState>) -> ApiResult<ProfileRow> {
    ctx.authorize(Role::Viewer)?;
    let profile = ProfileService::new(state.pool().clone(), ctx).me().await?;
    Ok(ApiResponse::success(profile))
}

/// Any member of the organization may maintain their own profile.
pub async fn upsert(
    ctx: TenantContext,
    State(state): State<AppState>,
    body: JsonBody<ProfileInput>,
) -> ApiResult<ProfileRow> {
    ctx.authorize(Role::Viewer)?;
    let input = body.validated()?;
    let profile = ProfileService::new(state.pool().clone(), ctx).upsert(&input).await?;
    Ok(ApiResponse::success(profile))
}
