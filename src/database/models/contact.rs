use async_graphql::{InputObject, SimpleObject};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::api::export::CsvRecord;
use crate::api::format::{format_address, format_phone, AddressParts};
use crate::database::resource::{col, Column, Resource, Writable};
use crate::validation::{Validate, ValidationErrors};

pub struct Contact;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, SimpleObject)]
pub struct ContactRow {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub job_title: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContactRow {
    pub fn address(&self) -> AddressParts<'_> {
        AddressParts {
            line1: self.address_line1.as_deref(),
            line2: self.address_line2.as_deref(),
            city: self.city.as_deref(),
            region: self.region.as_deref(),
            postal_code: self.postal_code.as_deref(),
            country: self.country.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, InputObject)]
pub struct CreateContact {
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub job_title: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, InputObject)]
pub struct UpdateContact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_line1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

fn check_optional_fields(
    errors: &mut ValidationErrors,
    email: Option<&str>,
    phone: Option<&str>,
    text: [(&str, Option<&str>, usize); 10],
) {
    errors.email("email", email);
    errors.phone("phone", phone);
    for (field, value, max) in text {
        errors.optional_text(field, value, max);
    }
}

impl Validate for CreateContact {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.required_text("first_name", &self.first_name, 100);
        check_optional_fields(
            &mut errors,
            self.email.as_deref(),
            self.phone.as_deref(),
            [
                ("last_name", self.last_name.as_deref(), 100),
                ("company", self.company.as_deref(), 200),
                ("job_title", self.job_title.as_deref(), 200),
                ("address_line1", self.address_line1.as_deref(), 200),
                ("address_line2", self.address_line2.as_deref(), 200),
                ("city", self.city.as_deref(), 100),
                ("region", self.region.as_deref(), 100),
                ("postal_code", self.postal_code.as_deref(), 20),
                ("country", self.country.as_deref(), 100),
                ("notes", self.notes.as_deref(), 4000),
            ],
        );
        errors.into_result()
    }
}

impl Validate for UpdateContact {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.present_text("first_name", self.first_name.as_deref(), 100);
        check_optional_fields(
            &mut errors,
            self.email.as_deref(),
            self.phone.as_deref(),
            [
                ("last_name", self.last_name.as_deref(), 100),
                ("company", self.company.as_deref(), 200),
                ("job_title", self.job_title.as_deref(), 200),
                ("address_line1", self.address_line1.as_deref(), 200),
                ("address_line2", self.address_line2.as_deref(), 200),
                ("city", self.city.as_deref(), 100),
                ("region", self.region.as_deref(), 100),
                ("postal_code", self.postal_code.as_deref(), 20),
                ("country", self.country.as_deref(), 100),
                ("notes", self.notes.as_deref(), 4000),
            ],
        );
        errors.into_result()
    }
}

impl Resource for Contact {
    type Row = ContactRow;

    const TABLE: &'static str = "contacts";
    const ENTITY: &'static str = "contact";
    const COLUMNS: &'static [Column] = &[
        col("first_name", "text"),
        col("last_name", "text"),
        col("email", "text"),
        col("phone", "text"),
        col("company", "text"),
        col("job_title", "text"),
        col("address_line1", "text"),
        col("address_line2", "text"),
        col("city", "text"),
        col("region", "text"),
        col("postal_code", "text"),
        col("country", "text"),
        col("notes", "text"),
    ];
    const OWNED: bool = true;
    const FILTERABLE: &'static [&'static str] = &["company", "user_id"];
    const SEARCHABLE: &'static [&'static str] = &["first_name", "last_name", "email", "company"];

    fn row_id(row: &ContactRow) -> Uuid {
        row.id
    }
}

impl Writable for Contact {
    type Create = CreateContact;
    type Update = UpdateContact;
}

impl CsvRecord for ContactRow {
    const HEADERS: &'static [&'static str] = &[
        "First Name",
        "Last Name",
        "Email",
        "Phone",
        "Company",
        "Job Title",
        "Address",
        "Notes",
        "Created At",
    ];

    fn record(&self) -> Vec<String> {
        vec![
            self.first_name.clone(),
            self.last_name.clone().unwrap_or_default(),
            self.email.clone().unwrap_or_default(),
            self.phone.as_deref().map(format_phone).unwrap_or_default(),
            self.company.clone().unwrap_or_default(),
            self.job_title.clone().unwrap_or_default(),
            format_address(&self.address()),
            self.notes.clone().unwrap_or_default(),
            self.created_at.to_rfc3339(),
        ]
    }
}
