use serde_json::json;
use sqlx::PgPool;

use crate::database::models::{Setting, SettingInput, SettingRow};
use crate::database::{DatabaseError, TenantRepository};
use crate::middleware::TenantContext;

/// Key-addressed access to organization settings.
pub struct SettingsService {
    repo: TenantRepository<Setting>,
}

impl SettingsService {
    pub fn new(pool: PgPool, ctx: TenantContext) -> Self {
        Self {
            repo: TenantRepository::new(pool, ctx),
        }
    }

    pub fn repository(&self) -> &TenantRepository<Setting> {
        &self.repo
    }

    pub async fn get(&self, key: &str) -> Result<SettingRow, DatabaseError> {
        self.repo
            .find_one(json!({ "key": key }))
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("setting '{}' not found", key)))
    }

    pub async fn put(&self, input: &SettingInput) -> Result<SettingRow, DatabaseError> {
        self.repo.upsert(&["organization_id", "key"], input).await
    }

    pub async fn delete(&self, key: &str) -> Result<SettingRow, DatabaseError> {
        let existing = self.get(key).await?;
        self.repo.delete(existing.id).await
    }
}
