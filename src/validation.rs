//! Request body validation.
//!
//! Inputs implement [`Validate`] and collect every failing field into a
//! [`ValidationErrors`] map, which surfaces as a 400 with `field_errors`.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));
static CURRENCY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{3}$").expect("valid currency regex"));
static KEY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.\-]{1,100}$").expect("valid key regex"));

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure; the first message for a field wins.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn into_map(self) -> HashMap<String, String> {
        self.fields.into_iter().collect()
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    pub fn required_text(&mut self, field: &str, value: &str, max: usize) {
        if value.trim().is_empty() {
            self.add(field, "is required");
        } else if value.chars().count() > max {
            self.add(field, format!("must be at most {} characters", max));
        }
    }

    pub fn optional_text(&mut self, field: &str, value: Option<&str>, max: usize) {
        if let Some(value) = value {
            if value.chars().count() > max {
                self.add(field, format!("must be at most {} characters", max));
            }
        }
    }

    /// Like `required_text`, but only when the field is present (PATCH bodies).
    pub fn present_text(&mut self, field: &str, value: Option<&str>, max: usize) {
        if let Some(value) = value {
            self.required_text(field, value, max);
        }
    }

    pub fn email(&mut self, field: &str, value: Option<&str>) {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            if value.len() > 254 || !EMAIL_RE.is_match(value) {
                self.add(field, "must be a valid email address");
            }
        }
    }

    pub fn phone(&mut self, field: &str, value: Option<&str>) {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            if !is_valid_phone(value) {
                self.add(field, "must be a valid phone number");
            }
        }
    }

    pub fn url(&mut self, field: &str, value: Option<&str>) {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            match url::Url::parse(value) {
                Ok(parsed) if parsed.scheme() == "http" || parsed.scheme() == "https" => {}
                _ => self.add(field, "must be an http(s) URL"),
            }
        }
    }

    pub fn currency(&mut self, field: &str, value: Option<&str>) {
        if let Some(value) = value {
            if !CURRENCY_RE.is_match(value) {
                self.add(field, "must be a 3-letter uppercase currency code");
            }
        }
    }

    pub fn key(&mut self, field: &str, value: &str) {
        if !KEY_RE.is_match(value) {
            self.add(field, "must be 1-100 characters of letters, digits, '_', '.' or '-'");
        }
    }

    pub fn range_i32(&mut self, field: &str, value: Option<i32>, min: i32, max: i32) {
        if let Some(value) = value {
            if value < min || value > max {
                self.add(field, format!("must be between {} and {}", min, max));
            }
        }
    }

    pub fn positive(&mut self, field: &str, value: Option<Decimal>) {
        if let Some(value) = value {
            if value <= Decimal::ZERO {
                self.add(field, "must be greater than zero");
            }
        }
    }

    pub fn non_negative(&mut self, field: &str, value: Option<Decimal>) {
        if let Some(value) = value {
            if value < Decimal::ZERO {
                self.add(field, "must not be negative");
            }
        }
    }

    pub fn date_order(&mut self, field: &str, start: Option<NaiveDate>, end: Option<NaiveDate>) {
        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                self.add(field, "must not be before the start date");
            }
        }
    }
}

/// 7-15 digits once common separators are stripped.
pub fn is_valid_phone(value: &str) -> bool {
    let mut digits = 0;
    for (i, c) in value.trim().chars().enumerate() {
        match c {
            '0'..='9' => digits += 1,
            '+' if i == 0 => {}
            ' ' | '-' | '(' | ')' | '.' => {}
            _ => return false,
        }
    }
    (7..=15).contains(&digits)
}
