use async_graphql::{InputObject, SimpleObject};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::api::export::CsvRecord;
use crate::api::format::format_phone;
use crate::database::resource::{col, Column, Resource, Writable};
use crate::validation::{Validate, ValidationErrors};

pub struct EmergencyContact;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, SimpleObject)]
pub struct EmergencyContactRow {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub relationship: String,
    pub phone: String,
    pub email: Option<String>,
    pub is_primary: bool,
    pub priority: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_priority() -> i32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize, InputObject)]
pub struct CreateEmergencyContact {
    pub name: String,
    pub relationship: String,
    pub phone: String,
    pub email: Option<String>,
    #[serde(default)]
    #[graphql(default)]
    pub is_primary: bool,
    #[serde(default = "default_priority")]
    #[graphql(default = 1)]
    pub priority: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, InputObject)]
pub struct UpdateEmergencyContact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_primary: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
}

impl Validate for CreateEmergencyContact {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.required_text("name", &self.name, 200);
        errors.required_text("relationship", &self.relationship, 100);
        errors.required_text("phone", &self.phone, 32);
        errors.phone("phone", Some(&self.phone));
        errors.email("email", self.email.as_deref());
        errors.range_i32("priority", Some(self.priority), 1, 10);
        errors.into_result()
    }
}

impl Validate for UpdateEmergencyContact {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.present_text("name", self.name.as_deref(), 200);
        errors.present_text("relationship", self.relationship.as_deref(), 100);
        errors.present_text("phone", self.phone.as_deref(), 32);
        errors.phone("phone", self.phone.as_deref());
        errors.email("email", self.email.as_deref());
        errors.range_i32("priority", self.priority, 1, 10);
        errors.into_result()
    }
}

impl Resource for EmergencyContact {
    type Row = EmergencyContactRow;

    const TABLE: &'static str = "emergency_contacts";
    const ENTITY: &'static str = "emergency_contact";
    const COLUMNS: &'static [Column] = &[
        col("name", "text"),
        col("relationship", "text"),
        col("phone", "text"),
        col("email", "text"),
        col("is_primary", "boolean"),
        col("priority", "integer"),
    ];
    const OWNED: bool = true;
    const FILTERABLE: &'static [&'static str] = &["user_id", "relationship", "is_primary"];
    const SEARCHABLE: &'static [&'static str] = &["name", "relationship"];
    const DEFAULT_ORDER: &'static str = "is_primary desc, priority asc";

    fn row_id(row: &EmergencyContactRow) -> Uuid {
        row.id
    }
}

impl Writable for EmergencyContact {
    type Create = CreateEmergencyContact;
    type Update = UpdateEmergencyContact;
}

impl CsvRecord for EmergencyContactRow {
    const HEADERS: &'static [&'static str] =
        &["Name", "Relationship", "Phone", "Email", "Primary", "Priority", "Created At"];

    fn record(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.relationship.clone(),
            format_phone(&self.phone),
            self.email.clone().unwrap_or_default(),
            if self.is_primary { "Yes" } else { "No" }.to_string(),
            self.priority.to_string(),
            self.created_at.to_rfc3339(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn phone_is_required() {
        let input: CreateEmergencyContact =
            serde_json::from_value(json!({"name": "Sam", "relationship": "sibling", "phone": ""})).unwrap();
        let errors = input.validate().unwrap_err();
        assert_eq!(errors.get("phone"), Some("is required"));
    }

    #[test]
    fn defaults_apply_when_omitted() {
        let input: CreateEmergencyContact =
            serde_json::from_value(json!({"name": "Sam", "relationship": "sibling", "phone": "+1 555 010 9999"}))
                .unwrap();
        assert!(!input.is_primary);
        assert_eq!(input.priority, 1);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn priority_outside_range_is_rejected() {
        let patch = UpdateEmergencyContact {
            priority: Some(11),
            ..Default::default()
        };
        assert_eq!(patch.validate().unwrap_err().get("priority"), Some("must be between 1 and 10"));
    }
}
