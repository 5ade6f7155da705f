//! Generic CRUD handlers shared by every tenant resource.
//!
//! Each handler follows the same steps: resolve the tenant context,
//! authorize against the resource policy, validate the input, make one
//! repository call, and wrap the result in the response envelope.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use std::collections::HashMap;
use uuid::Uuid;

use crate::api::export::{CsvDownload, CsvRecord};
use crate::database::{Page, Resource, TenantRepository, Writable};
use crate::error::ApiError;
use crate::filter::{FilterData, ListQuery};
use crate::middleware::{ApiResponse, ApiResult, JsonBody, TenantContext};
use crate::state::AppState;

pub fn repository<E: Resource>(state: &AppState, ctx: TenantContext) -> TenantRepository<E> {
    TenantRepository::new(state.pool().clone(), ctx)
}

pub fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request(format!("Invalid id '{}'", raw)))
}

/// Full CRUD router: list, create, search, show, replace, patch, delete.
pub fn crud_routes<E: Writable>() -> Router<AppState> {
    Router::new()
        .route("/", get(list::<E>).post(create::<E>))
        .route("/search", post(search::<E>))
        .route(
            "/:id",
            get(show::<E>).put(replace::<E>).patch(update::<E>).delete(remove::<E>),
        )
}

/// [`crud_routes`] plus `GET /export`.
pub fn exportable_routes<E>() -> Router<AppState>
where
    E: Writable,
    E::Row: CsvRecord,
{
    crud_routes::<E>().route("/export", get(export::<E>))
}

/// Read-only list and show.
pub fn read_routes<E: Resource>() -> Router<AppState> {
    Router::new()
        .route("/", get(list::<E>))
        .route("/:id", get(show::<E>))
}

pub async fn list<E: Resource>(
    ctx: TenantContext,
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Page<E::Row>> {
    ctx.authorize(E::POLICY.read)?;
    let query = ListQuery::from_params(params)?;
    let page = repository::<E>(&state, ctx).list(&query).await?;
    Ok(ApiResponse::success(page))
}

pub async fn search<E: Resource>(
    ctx: TenantContext,
    State(state): State<AppState>,
    body: JsonBody<FilterData>,
) -> ApiResult<Page<E::Row>> {
    ctx.authorize(E::POLICY.read)?;
    let filter = body.validated()?;
    let page = repository::<E>(&state, ctx).search(filter).await?;
    Ok(ApiResponse::success(page))
}

pub async fn show<E: Resource>(
    ctx: TenantContext,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<E::Row> {
    ctx.authorize(E::POLICY.read)?;
    let id = parse_id(&id)?;
    let row = repository::<E>(&state, ctx).get(id).await?;
    Ok(ApiResponse::success(row))
}

pub async fn create<E: Writable>(
    ctx: TenantContext,
    State(state): State<AppState>,
    body: JsonBody<E::Create>,
) -> ApiResult<E::Row> {
    ctx.authorize(E::POLICY.write)?;
    let input = body.validated()?;
    let row = repository::<E>(&state, ctx).create(&input).await?;
    Ok(ApiResponse::created(row))
}

pub async fn replace<E: Writable>(
    ctx: TenantContext,
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: JsonBody<E::Create>,
) -> ApiResult<E::Row> {
    ctx.authorize(E::POLICY.write)?;
    let id = parse_id(&id)?;
    let input = body.validated()?;
    let row = repository::<E>(&state, ctx).replace(id, &input).await?;
    Ok(ApiResponse::success(row))
}

pub async fn update<E: Writable>(
    ctx: TenantContext,
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: JsonBody<E::Update>,
) -> ApiResult<E::Row> {
    ctx.authorize(E::POLICY.write)?;
    let id = parse_id(&id)?;
    let patch = body.validated()?;
    let row = repository::<E>(&state, ctx).patch(id, &patch).await?;
    Ok(ApiResponse::success(row))
}

pub async fn remove<E: Writable>(
    ctx: TenantContext,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<E::Row> {
    ctx.authorize(E::POLICY.delete)?;
    let id = parse_id(&id)?;
    let row = repository::<E>(&state, ctx).delete(id).await?;
    Ok(ApiResponse::success(row))
}

pub async fn export<E>(
    ctx: TenantContext,
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<CsvDownload, ApiError>
where
    E: Resource,
    E::Row: CsvRecord,
{
    ctx.authorize(E::POLICY.export)?;
    let query = ListQuery::from_params(params)?;
    let rows = repository::<E>(&state, ctx).export(&query).await?;
    CsvDownload::new(&E::TABLE.replace('_', "-"), Utc::now().date_naive(), &rows)
}
