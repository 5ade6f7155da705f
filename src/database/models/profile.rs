use async_graphql::{InputObject, SimpleObject};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::resource::{col, Column, Resource, Writable};
use crate::validation::{Validate, ValidationErrors};

/// Per-user profile; at most one per user within an organization.
pub struct Profile;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, SimpleObject)]
pub struct ProfileRow {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub job_title: Option<String>,
    pub department: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub timezone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, InputObject)]
pub struct ProfileInput {
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub job_title: Option<String>,
    pub department: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub timezone: Option<String>,
}

impl Validate for ProfileInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.required_text("full_name", &self.full_name, 200);
        errors.email("email", self.email.as_deref());
        errors.phone("phone", self.phone.as_deref());
        errors.optional_text("job_title", self.job_title.as_deref(), 200);
        errors.optional_text("department", self.department.as_deref(), 200);
        errors.optional_text("bio", self.bio.as_deref(), 4000);
        errors.url("avatar_url", self.avatar_url.as_deref());
        errors.optional_text("timezone", self.timezone.as_deref(), 64);
        errors.into_result()
    }
}

impl Resource for Profile {
    type Row = ProfileRow;

    const TABLE: &'static str = "profiles";
    const ENTITY: &'static str = "profile";
    const COLUMNS: &'static [Column] = &[
        col("full_name", "text"),
        col("email", "text"),
        col("phone", "text"),
        col("job_title", "text"),
        col("department", "text"),
        col("bio", "text"),
        col("avatar_url", "text"),
        col("timezone", "text"),
    ];
    const OWNED: bool = true;
    const FILTERABLE: &'static [&'static str] = &["department", "user_id"];
    const SEARCHABLE: &'static [&'static str] = &["full_name", "email", "job_title"];
    const DEFAULT_ORDER: &'static str = "full_name asc";

    fn row_id(row: &ProfileRow) -> Uuid {
        row.id
    }
}

impl Writable for Profile {
    type Create = ProfileInput;
    type Update = ProfileInput;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> ProfileInput {
        ProfileInput {
            full_name: "Ada Lovelace".to_string(),
            email: Some("ada@example.com".to_string()),
            phone: Some("+44 20 7946 0958".to_string()),
            job_title: None,
            department: Some("Engineering".to_string()),
            bio: None,
            avatar_url: Some("https://cdn.example.com/ada.png".to_string()),
            timezone: Some("Europe/London".to_string()),
        }
    }

    #[test]
    fn accepts_complete_profile() {
        assert!(input().validate().is_ok());
    }

    #[test]
    fn reports_each_bad_field() {
        let mut bad = input();
        bad.full_name = "  ".to_string();
        bad.email = Some("not-an-email".to_string());
        bad.avatar_url = Some("ftp://example.com/a.png".to_string());
        let errors = bad.validate().unwrap_err();
        assert_eq!(errors.get("full_name"), Some("is required"));
        assert!(errors.get("email").is_some());
        assert!(errors.get("avatar_url").is_some());
        assert!(errors.get("phone").is_none());
    }
}
