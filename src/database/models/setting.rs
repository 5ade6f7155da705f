use async_graphql::{ComplexObject, SimpleObject};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::auth::Policy;
use crate::database::resource::{col, Column, Resource, Writable};
use crate::validation::{Validate, ValidationErrors};

/// Organization-wide key/value settings.
pub struct Setting;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, SimpleObject)]
#[graphql(complex)]
pub struct SettingRow {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub key: String,
    #[graphql(skip)]
    pub value: Value,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[ComplexObject]
impl SettingRow {
    async fn value_json(&self) -> String {
        self.value.to_string()
    }
}

/// Full setting document, keyed by the path segment on REST.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingInput {
    pub key: String,
    pub value: Value,
    pub description: Option<String>,
}

/// Body of `PUT /settings/:key`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingBody {
    pub value: Value,
    pub description: Option<String>,
}

impl SettingBody {
    pub fn with_key(self, key: impl Into<String>) -> SettingInput {
        SettingInput {
            key: key.into(),
            value: self.value,
            description: self.description,
        }
    }
}

impl Validate for SettingBody {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.optional_text("description", self.description.as_deref(), 1000);
        errors.into_result()
    }
}

impl Validate for SettingInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.key("key", &self.key);
        errors.optional_text("description", self.description.as_deref(), 1000);
        errors.into_result()
    }
}

impl Resource for Setting {
    type Row = SettingRow;

    const TABLE: &'static str = "settings";
    const ENTITY: &'static str = "setting";
    const COLUMNS: &'static [Column] = &[col("key", "text"), col("value", "jsonb"), col("description", "text")];
    const SEARCHABLE: &'static [&'static str] = &["key", "description"];
    const DEFAULT_ORDER: &'static str = "key asc";
    const POLICY: Policy = Policy::RESTRICTED;

    fn row_id(row: &SettingRow) -> Uuid {
        row.id
    }
}

impl Writable for Setting {
    type Create = SettingInput;
    type Update = SettingInput;
}
