use async_graphql::{Enum, InputObject, SimpleObject};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::api::export::CsvRecord;
use crate::database::resource::{col, Column, Resource, Writable};
use crate::validation::{Validate, ValidationErrors};

pub struct Transaction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Enum)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Enum)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, SimpleObject)]
pub struct TransactionRow {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub amount: Decimal,
    pub currency: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub status: String,
    pub reference: Option<String>,
    pub occurred_on: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub fn default_currency() -> String {
    "USD".to_string()
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[derive(Debug, Clone, Serialize, Deserialize, InputObject)]
pub struct CreateTransaction {
    pub kind: TransactionKind,
    pub amount: Decimal,
    #[serde(default = "default_currency")]
    #[graphql(default_with = "default_currency()")]
    pub currency: String,
    pub category: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    #[graphql(default)]
    pub status: TransactionStatus,
    pub reference: Option<String>,
    #[serde(default = "today")]
    #[graphql(default_with = "today()")]
    pub occurred_on: NaiveDate,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, InputObject)]
pub struct UpdateTransaction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<TransactionKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TransactionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurred_on: Option<NaiveDate>,
}

impl Validate for CreateTransaction {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.positive("amount", Some(self.amount));
        errors.currency("currency", Some(&self.currency));
        errors.optional_text("category", self.category.as_deref(), 100);
        errors.optional_text("description", self.description.as_deref(), 1000);
        errors.optional_text("reference", self.reference.as_deref(), 200);
        errors.into_result()
    }
}

impl Validate for UpdateTransaction {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.positive("amount", self.amount);
        errors.currency("currency", self.currency.as_deref());
        errors.optional_text("category", self.category.as_deref(), 100);
        errors.optional_text("description", self.description.as_deref(), 1000);
        errors.optional_text("reference", self.reference.as_deref(), 200);
        errors.into_result()
    }
}

impl Resource for Transaction {
    type Row = TransactionRow;

    const TABLE: &'static str = "transactions";
    const ENTITY: &'static str = "transaction";
    const COLUMNS: &'static [Column] = &[
        col("kind", "text"),
        col("amount", "numeric"),
        col("currency", "text"),
        col("category", "text"),
        col("description", "text"),
        col("status", "text"),
        col("reference", "text"),
        col("occurred_on", "date"),
    ];
    const OWNED: bool = true;
    const FILTERABLE: &'static [&'static str] = &["status", "kind", "category", "user_id", "currency"];
    const SEARCHABLE: &'static [&'static str] = &["description", "category", "reference"];
    const DATE_COLUMN: Option<&'static str> = Some("occurred_on");
    const DEFAULT_ORDER: &'static str = "occurred_on desc, created_at desc";

    fn row_id(row: &TransactionRow) -> Uuid {
        row.id
    }
}

impl Writable for Transaction {
    type Create = CreateTransaction;
    type Update = UpdateTransaction;
}

impl CsvRecord for TransactionRow {
    const HEADERS: &'static [&'static str] = &[
        "Date",
        "Kind",
        "Amount",
        "Currency",
        "Category",
        "Description",
        "Status",
        "Reference",
    ];

    fn record(&self) -> Vec<String> {
        vec![
            self.occurred_on.to_string(),
            self.kind.clone(),
            self.amount.round_dp(2).to_string(),
            self.currency.clone(),
            self.category.clone().unwrap_or_default(),
            self.description.clone().unwrap_or_default(),
            self.status.clone(),
            self.reference.clone().unwrap_or_default(),
        ]
    }
}
