use async_graphql::InputObject;
use chrono::NaiveDate;
use serde_json::Value;
use uuid::Uuid;

use crate::database::models::{CreatePipelineJob, JobStatus, UpdatePipelineJob};
use crate::error::ApiError;
use crate::filter::ListQuery;

#[derive(Debug, Clone, InputObject)]
pub struct FieldFilter {
    pub field: String,
    pub value: String,
}

/// GraphQL spelling of the REST list query string.
#[derive(Debug, Clone, Default, InputObject)]
pub struct ListArgs {
    pub search: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub order: Option<String>,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
    pub filters: Option<Vec<FieldFilter>>,
}

impl From<ListArgs> for ListQuery {
    fn from(args: ListArgs) -> Self {
        ListQuery {
            filters: args
                .filters
                .unwrap_or_default()
                .into_iter()
                .map(|f| (f.field, f.value))
                .collect(),
            search: args.search,
            from: args.from,
            to: args.to,
            order: args.order,
            limit: args.limit,
            offset: args.offset,
        }
    }
}

fn parse_payload(raw: Option<String>) -> Result<Option<Value>, ApiError> {
    raw.map(|text| {
        serde_json::from_str(&text).map_err(|e| ApiError::invalid_json(format!("payloadJson: {}", e)))
    })
    .transpose()
}

#[derive(Debug, Clone, InputObject)]
pub struct PipelineJobInput {
    pub name: String,
    pub pipeline: String,
    #[graphql(default)]
    pub status: JobStatus,
    #[graphql(default = 50)]
    pub priority: i32,
    pub assigned_to: Option<Uuid>,
    pub due_date: Option<NaiveDate>,
    pub payload_json: Option<String>,
    pub error_message: Option<String>,
}

impl TryFrom<PipelineJobInput> for CreatePipelineJob {
    type Error = ApiError;

    fn try_from(input: PipelineJobInput) -> Result<Self, Self::Error> {
        Ok(CreatePipelineJob {
            name: input.name,
            pipeline: input.pipeline,
            status: input.status,
            priority: input.priority,
            assigned_to: input.assigned_to,
            due_date: input.due_date,
            payload: parse_payload(input.payload_json)?,
            error_message: input.error_message,
        })
    }
}

#[derive(Debug, Clone, Default, InputObject)]
pub struct PipelineJobPatch {
    pub name: Option<String>,
    pub pipeline: Option<String>,
    pub status: Option<JobStatus>,
    pub priority: Option<i32>,
    pub assigned_to: Option<Uuid>,
    pub due_date: Option<NaiveDate>,
    pub payload_json: Option<String>,
    pub error_message: Option<String>,
}

impl TryFrom<PipelineJobPatch> for UpdatePipelineJob {
    type Error = ApiError;

    fn try_from(patch: PipelineJobPatch) -> Result<Self, Self::Error> {
        Ok(UpdatePipelineJob {
            name: patch.name,
            pipeline: patch.pipeline,
            status: patch.status,
            priority: patch.priority,
            assigned_to: patch.assigned_to,
            due_date: patch.due_date,
            payload: parse_payload(patch.payload_json)?,
            error_message: patch.error_message,
        })
    }
}
