//! GraphQL surface at `/api/v1/graphql`.
//!
//! Resolvers are thin: each one reads the [`TenantContext`] placed in the
//! request data by the HTTP handler, applies the same policy and validation
//! rules as REST, then makes a single repository or service call.

pub mod inputs;
pub mod mutation;
pub mod query;

use async_graphql::{Context, EmptySubscription, ErrorExtensions, Schema};

use crate::database::{Resource, TenantRepository};
use crate::error::ApiError;
use crate::middleware::TenantContext;
use crate::state::AppState;

pub use mutation::MutationRoot;
pub use query::QueryRoot;

pub type AppSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub fn build_schema() -> AppSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .limit_depth(12)
        .finish()
}

/// Convert any error the REST layer understands into a GraphQL error with
/// `code` and `status` extensions.
pub(crate) trait GraphqlResultExt<T> {
    fn gql(self) -> async_graphql::Result<T>;
}

impl<T, E: Into<ApiError>> GraphqlResultExt<T> for Result<T, E> {
    fn gql(self) -> async_graphql::Result<T> {
        self.map_err(|e| e.into().extend())
    }
}

pub(crate) fn scope<'a>(ctx: &Context<'a>) -> async_graphql::Result<(&'a TenantContext, &'a AppState)> {
    let tenant = ctx.data::<TenantContext>()?;
    let state = ctx.data::<AppState>()?;
    Ok((tenant, state))
}

pub(crate) fn repository<E: Resource>(tenant: &TenantContext, state: &AppState) -> TenantRepository<E> {
    TenantRepository::new(state.pool().clone(), tenant.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_exposes_expected_roots() {
        let sdl = build_schema().sdl();
        for field in [
            "me",
            "contacts",
            "transactionSummary",
            "pipelineJob",
            "auditLogs",
            "createTransaction",
            "upsertSetting",
            "deleteSetting",
            "payloadJson",
            "valueJson",
        ] {
            assert!(sdl.contains(field), "schema is missing {}", field);
        }
    }

    #[test]
    fn api_errors_carry_code_and_status() {
        let result: Result<(), ApiError> = Err(ApiError::forbidden("Requires admin role"));
        let err = result.gql().unwrap_err();
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["message"], "Requires admin role");
        assert_eq!(json["extensions"]["code"], "FORBIDDEN");
        assert_eq!(json["extensions"]["status"], 403);
    }
}
