use async_graphql::{ComplexObject, Enum, SimpleObject};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::resource::{col, Column, Resource, Writable};
use crate::validation::{Validate, ValidationErrors};

pub struct PipelineJob;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Enum)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, SimpleObject)]
#[graphql(complex)]
pub struct PipelineJobRow {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub pipeline: String,
    pub status: String,
    pub priority: i32,
    pub assigned_to: Option<Uuid>,
    pub due_date: Option<NaiveDate>,
    #[graphql(skip)]
    pub payload: Option<Value>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[ComplexObject]
impl PipelineJobRow {
    async fn payload_json(&self) -> Option<String> {
        self.payload.as_ref().map(Value::to_string)
    }
}

fn default_priority() -> i32 {
    50
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePipelineJob {
    pub name: String,
    pub pipeline: String,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default = "default_priority")]
    pub priority: i32,
    pub assigned_to: Option<Uuid>,
    pub due_date: Option<NaiveDate>,
    pub payload: Option<Value>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePipelineJob {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pipeline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl Validate for CreatePipelineJob {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.required_text("name", &self.name, 200);
        errors.required_text("pipeline", &self.pipeline, 100);
        errors.range_i32("priority", Some(self.priority), 0, 100);
        errors.optional_text("error_message", self.error_message.as_deref(), 4000);
        errors.into_result()
    }
}

impl Validate for UpdatePipelineJob {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.present_text("name", self.name.as_deref(), 200);
        errors.present_text("pipeline", self.pipeline.as_deref(), 100);
        errors.range_i32("priority", self.priority, 0, 100);
        errors.optional_text("error_message", self.error_message.as_deref(), 4000);
        errors.into_result()
    }
}

impl Resource for PipelineJob {
    type Row = PipelineJobRow;

    const TABLE: &'static str = "pipeline_jobs";
    const ENTITY: &'static str = "pipeline_job";
    const COLUMNS: &'static [Column] = &[
        col("name", "text"),
        col("pipeline", "text"),
        col("status", "text"),
        col("priority", "integer"),
        col("assigned_to", "uuid"),
        col("due_date", "date"),
        col("payload", "jsonb"),
        col("error_message", "text"),
    ];
    const OWNED: bool = true;
    const FILTERABLE: &'static [&'static str] = &["status", "pipeline", "assigned_to", "user_id"];
    const SEARCHABLE: &'static [&'static str] = &["name", "pipeline"];
    const DATE_COLUMN: Option<&'static str> = Some("due_date");
    const DEFAULT_ORDER: &'static str = "priority desc, created_at desc";

    fn row_id(row: &PipelineJobRow) -> Uuid {
        row.id
    }
}

impl Writable for PipelineJob {
    type Create = CreatePipelineJob;
    type Update = UpdatePipelineJob;
}
