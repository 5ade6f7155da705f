use chrono::NaiveDate;
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashMap};

use super::error::FilterError;
use super::types::FilterData;

/// Query-string shape shared by every list and export endpoint.
///
/// `?status=completed&search=rent&from=2024-01-01&to=2024-01-31&order=amount desc&limit=20&offset=40`
///
/// Reserved keys are parsed into their own fields; everything else is an
/// equality filter, checked against the resource's filterable columns when
/// converted with [`ListQuery::to_filter_data`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub filters: BTreeMap<String, String>,
    pub search: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub order: Option<String>,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

/// Per-resource knobs for turning a [`ListQuery`] into a filter.
#[derive(Debug, Clone, Copy)]
pub struct ListSpec {
    pub filterable: &'static [&'static str],
    pub searchable: &'static [&'static str],
    pub date_column: Option<&'static str>,
    pub default_order: &'static str,
    pub default_limit: i32,
}

impl ListQuery {
    pub fn from_params(params: HashMap<String, String>) -> Result<Self, FilterError> {
        let mut query = ListQuery::default();
        for (key, value) in params {
            let value = value.trim().to_string();
            if value.is_empty() {
                continue;
            }
            match key.as_str() {
                "search" | "q" => query.search = Some(value),
                "from" => query.from = Some(parse_date("from", &value)?),
                "to" => query.to = Some(parse_date("to", &value)?),
                "order" | "sort" => query.order = Some(value),
                "limit" => {
                    query.limit = Some(
                        value
                            .parse()
                            .map_err(|_| FilterError::InvalidLimit(format!("'{}' is not an integer", value)))?,
                    )
                }
                "offset" => {
                    query.offset = Some(
                        value
                            .parse()
                            .map_err(|_| FilterError::InvalidOffset(format!("'{}' is not an integer", value)))?,
                    )
                }
                _ => {
                    query.filters.insert(key, value);
                }
            }
        }
        Ok(query)
    }

    pub fn to_filter_data(&self, spec: &ListSpec) -> Result<FilterData, FilterError> {
        let mut clauses = Vec::new();

        if !self.filters.is_empty() {
            let mut equals = Map::new();
            for (field, value) in &self.filters {
                if !spec.filterable.contains(&field.as_str()) {
                    return Err(FilterError::UnknownColumn(field.clone()));
                }
                equals.insert(field.clone(), Value::String(value.clone()));
            }
            clauses.push(Value::Object(equals));
        }

        if let Some(term) = self.search.as_deref().filter(|t| !t.is_empty()) {
            if !spec.searchable.is_empty() {
                let pattern = format!("%{}%", escape_like(term));
                let any: Vec<Value> = spec
                    .searchable
                    .iter()
                    .map(|column| json!({ *column: { "$ilike": pattern } }))
                    .collect();
                clauses.push(json!({ "$or": any }));
            }
        }

        if self.from.is_some() || self.to.is_some() {
            let column = spec
                .date_column
                .ok_or_else(|| FilterError::InvalidDateRange("not supported for this resource".to_string()))?;
            if let (Some(from), Some(to)) = (self.from, self.to) {
                if to < from {
                    return Err(FilterError::InvalidDateRange("'to' must not be before 'from'".to_string()));
                }
            }
            let mut range = Map::new();
            if let Some(from) = self.from {
                range.insert("$gte".to_string(), json!(from.to_string()));
            }
            // Exclusive upper bound keeps `to` inclusive for timestamp columns too
            if let Some(to) = self.to {
                let end = to
                    .succ_opt()
                    .ok_or_else(|| FilterError::InvalidDateRange("'to' is out of range".to_string()))?;
                range.insert("$lt".to_string(), json!(end.to_string()));
            }
            clauses.push(json!({ column: Value::Object(range) }));
        }

        if let Some(limit) = self.limit {
            if limit < 0 {
                return Err(FilterError::InvalidLimit("Limit must be non-negative".to_string()));
            }
        }
        if let Some(offset) = self.offset {
            if offset < 0 {
                return Err(FilterError::InvalidOffset("Offset must be non-negative".to_string()));
            }
        }

        let where_clause = match clauses.len() {
            0 => None,
            1 => clauses.pop(),
            _ => Some(json!({ "$and": clauses })),
        };

        Ok(FilterData {
            where_clause,
            order: Some(Value::String(
                self.order.clone().unwrap_or_else(|| spec.default_order.to_string()),
            )),
            limit: Some(self.limit.unwrap_or(spec.default_limit)),
            offset: self.offset,
        })
    }
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, FilterError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| FilterError::InvalidDateRange(format!("'{}' must be a YYYY-MM-DD date", field)))
}

/// Escape LIKE wildcards so user input matches literally.
pub fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPEC: ListSpec = ListSpec {
        filterable: &["status", "kind"],
        searchable: &["description", "reference"],
        date_column: Some("occurred_on"),
        default_order: "occurred_on desc",
        default_limit: 50,
    };

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn splits_reserved_keys_from_filters() {
        let q = ListQuery::from_params(params(&[
            ("status", "completed"),
            ("search", "rent"),
            ("from", "2024-01-01"),
            ("limit", "10"),
            ("offset", ""),
        ]))
        .unwrap();
        assert_eq!(q.filters.get("status").map(String::as_str), Some("completed"));
        assert_eq!(q.search.as_deref(), Some("rent"));
        assert_eq!(q.from, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(q.limit, Some(10));
        assert_eq!(q.offset, None);
    }

    #[test]
    fn rejects_malformed_numbers_and_dates() {
        assert!(matches!(
            ListQuery::from_params(params(&[("limit", "ten")])),
            Err(FilterError::InvalidLimit(_))
        ));
        assert!(ListQuery::from_params(params(&[("to", "31/01/2024")])).is_err());
    }

    #[test]
    fn builds_where_with_search_and_range() {
        let q = ListQuery::from_params(params(&[
            ("kind", "expense"),
            ("search", "50%_off"),
            ("from", "2024-01-01"),
            ("to", "2024-01-31"),
        ]))
        .unwrap();
        let data = q.to_filter_data(&SPEC).unwrap();
        assert_eq!(
            data.where_clause,
            Some(json!({"$and": [
                {"kind": "expense"},
                {"$or": [
                    {"description": {"$ilike": "%50\\%\\_off%"}},
                    {"reference": {"$ilike": "%50\\%\\_off%"}}
                ]},
                {"occurred_on": {"$gte": "2024-01-01", "$lt": "2024-02-01"}}
            ]}))
        );
        assert_eq!(data.order, Some(json!("occurred_on desc")));
        assert_eq!(data.limit, Some(50));
    }

    #[test]
    fn unknown_filter_key_is_rejected() {
        let q = ListQuery::from_params(params(&[("password", "x")])).unwrap();
        assert!(matches!(q.to_filter_data(&SPEC), Err(FilterError::UnknownColumn(_))));
    }

    #[test]
    fn negative_paging_and_inverted_range_are_rejected() {
        let q = ListQuery::from_params(params(&[("limit", "-1")])).unwrap();
        assert!(q.to_filter_data(&SPEC).is_err());
        let q = ListQuery::from_params(params(&[("from", "2024-02-01"), ("to", "2024-01-01")])).unwrap();
        assert!(q.to_filter_data(&SPEC).is_err());
    }
}
