use serde_json::json;
use sqlx::PgPool;

use crate::database::models::{Profile, ProfileInput, ProfileRow};
use crate::database::{DatabaseError, TenantRepository};
use crate::middleware::TenantContext;

/// The caller's own profile within the current organization.
pub struct ProfileService {
    repo: TenantRepository<Profile>,
}

impl ProfileService {
    pub fn new(pool: PgPool, ctx: TenantContext) -> Self {
        Self {
            repo: TenantRepository::new(pool, ctx),
        }
    }

    pub async fn me(&self) -> Result<ProfileRow, DatabaseError> {
        let user_id = self.repo.context().user_id;
        self.repo
            .find_one(json!({ "user_id": user_id }))
            .await?
            .ok_or_else(|| DatabaseError::NotFound("profile not found".to_string()))
    }

    pub async fn upsert(&self, input: &ProfileInput) -> Result<ProfileRow, DatabaseError> {
        self.repo.upsert(&["organization_id", "user_id"], input).await
    }
}
