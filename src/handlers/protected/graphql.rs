// POST /api/v1/graphql

use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::extract::State;

use crate::middleware::TenantContext;
use crate::state::AppState;

/// The tenant context is resolved before execution, so a missing session or
/// organization fails the HTTP request rather than individual fields.
pub async fn execute(ctx: TenantContext, State(state): State<AppState>, request: GraphQLRequest) -> GraphQLResponse {
    let request = request.into_inner().data(ctx).data(state.clone());
    state.schema().execute(request).await.into()
}
