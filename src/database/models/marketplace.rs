use async_graphql::{Enum, InputObject, SimpleObject};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::transaction::default_currency;
use crate::database::resource::{col, Column, Resource, Writable};
use crate::validation::{Validate, ValidationErrors};

pub struct MarketplaceResource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Enum)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, SimpleObject)]
pub struct MarketplaceResourceRow {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Decimal,
    pub currency: String,
    pub status: String,
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, InputObject)]
pub struct CreateMarketplaceResource {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    #[graphql(default)]
    pub price: Decimal,
    #[serde(default = "default_currency")]
    #[graphql(default_with = "default_currency()")]
    pub currency: String,
    #[serde(default)]
    #[graphql(default)]
    pub status: ListingStatus,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, InputObject)]
pub struct UpdateMarketplaceResource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ListingStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Validate for CreateMarketplaceResource {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.required_text("name", &self.name, 200);
        errors.optional_text("description", self.description.as_deref(), 4000);
        errors.optional_text("category", self.category.as_deref(), 100);
        errors.non_negative("price", Some(self.price));
        errors.currency("currency", Some(&self.currency));
        errors.url("url", self.url.as_deref());
        errors.into_result()
    }
}

impl Validate for UpdateMarketplaceResource {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.present_text("name", self.name.as_deref(), 200);
        errors.optional_text("description", self.description.as_deref(), 4000);
        errors.optional_text("category", self.category.as_deref(), 100);
        errors.non_negative("price", self.price);
        errors.currency("currency", self.currency.as_deref());
        errors.url("url", self.url.as_deref());
        errors.into_result()
    }
}

impl Resource for MarketplaceResource {
    type Row = MarketplaceResourceRow;

    const TABLE: &'static str = "marketplace_resources";
    const ENTITY: &'static str = "marketplace_resource";
    const COLUMNS: &'static [Column] = &[
        col("name", "text"),
        col("description", "text"),
        col("category", "text"),
        col("price", "numeric"),
        col("currency", "text"),
        col("status", "text"),
        col("url", "text"),
    ];
    const OWNED: bool = true;
    const FILTERABLE: &'static [&'static str] = &["status", "category", "user_id"];
    const SEARCHABLE: &'static [&'static str] = &["name", "description", "category"];

    fn row_id(row: &MarketplaceResourceRow) -> Uuid {
        row.id
    }
}

impl Writable for MarketplaceResource {
    type Create = CreateMarketplaceResource;
    type Update = UpdateMarketplaceResource;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn free_listing_is_valid() {
        let input: CreateMarketplaceResource =
            serde_json::from_value(json!({"name": "Onboarding checklist"})).unwrap();
        assert_eq!(input.price, Decimal::ZERO);
        assert_eq!(input.status, ListingStatus::Draft);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn negative_price_and_bad_url_are_rejected() {
        let patch = UpdateMarketplaceResource {
            price: Some(Decimal::new(-100, 2)),
            url: Some("javascript:alert(1)".to_string()),
            ..Default::default()
        };
        let errors = patch.validate().unwrap_err();
        assert_eq!(errors.get("price"), Some("must not be negative"));
        assert!(errors.get("url").is_some());
    }
}
