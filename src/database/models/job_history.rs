use async_graphql::{Enum, InputObject, SimpleObject};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::api::export::CsvRecord;
use crate::database::resource::{col, Column, Resource, Writable};
use crate::validation::{Validate, ValidationErrors};

pub struct JobHistory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Enum)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    #[default]
    FullTime,
    PartTime,
    Contract,
    Internship,
    Temporary,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, SimpleObject)]
pub struct JobHistoryRow {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub company: String,
    pub title: String,
    pub employment_type: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_current: bool,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, InputObject)]
pub struct CreateJobHistory {
    pub company: String,
    pub title: String,
    #[serde(default)]
    #[graphql(default)]
    pub employment_type: EmploymentType,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    #[graphql(default)]
    pub is_current: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, InputObject)]
pub struct UpdateJobHistory {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employment_type: Option<EmploymentType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_current: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn check_current(errors: &mut ValidationErrors, is_current: Option<bool>, end_date: Option<NaiveDate>) {
    if is_current == Some(true) && end_date.is_some() {
        errors.add("end_date", "must be empty for a current position");
    }
}

impl Validate for CreateJobHistory {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.required_text("company", &self.company, 200);
        errors.required_text("title", &self.title, 200);
        errors.optional_text("description", self.description.as_deref(), 4000);
        errors.date_order("end_date", Some(self.start_date), self.end_date);
        check_current(&mut errors, Some(self.is_current), self.end_date);
        errors.into_result()
    }
}

impl Validate for UpdateJobHistory {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.present_text("company", self.company.as_deref(), 200);
        errors.present_text("title", self.title.as_deref(), 200);
        errors.optional_text("description", self.description.as_deref(), 4000);
        errors.date_order("end_date", self.start_date, self.end_date);
        check_current(&mut errors, self.is_current, self.end_date);
        errors.into_result()
    }
}

impl Resource for JobHistory {
    type Row = JobHistoryRow;

    const TABLE: &'static str = "job_history";
    const ENTITY: &'static str = "job_history";
    const COLUMNS: &'static [Column] = &[
        col("company", "text"),
        col("title", "text"),
        col("employment_type", "text"),
        col("start_date", "date"),
        col("end_date", "date"),
        col("is_current", "boolean"),
        col("description", "text"),
    ];
    const OWNED: bool = true;
    const FILTERABLE: &'static [&'static str] = &["user_id", "employment_type", "is_current"];
    const SEARCHABLE: &'static [&'static str] = &["company", "title"];
    const DATE_COLUMN: Option<&'static str> = Some("start_date");
    const DEFAULT_ORDER: &'static str = "start_date desc";

    fn row_id(row: &JobHistoryRow) -> Uuid {
        row.id
    }
}

impl Writable for JobHistory {
    type Create = CreateJobHistory;
    type Update = UpdateJobHistory;
}

impl CsvRecord for JobHistoryRow {
    const HEADERS: &'static [&'static str] = &[
        "Company",
        "Title",
        "Employment Type",
        "Start Date",
        "End Date",
        "Current",
        "Description",
    ];

    fn record(&self) -> Vec<String> {
        vec![
            self.company.clone(),
            self.title.clone(),
            self.employment_type.clone(),
            self.start_date.to_string(),
            self.end_date.map(|d| d.to_string()).unwrap_or_default(),
            if self.is_current { "Yes" } else { "No" }.to_string(),
            self.description.clone().unwrap_or_default(),
        ]
    }
}
