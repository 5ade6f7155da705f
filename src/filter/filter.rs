use serde_json::Value;

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{ColumnTypes, FilterData, FilterOrderInfo, SqlResult};

pub struct Filter {
    table_name: String,
    columns: ColumnTypes,
    where_data: Option<Value>,
    order_data: Vec<FilterOrderInfo>,
    limit: Option<i32>,
    offset: Option<i32>,
}

impl Filter {
    pub fn new(table_name: impl Into<String>, columns: ColumnTypes) -> Result<Self, FilterError> {
        let table_name = table_name.into();
        validate_identifier(&table_name).map_err(FilterError::InvalidTableName)?;
        Ok(Self {
            table_name,
            columns,
            where_data: None,
            order_data: vec![],
            limit: None,
            offset: None,
        })
    }

    pub fn assign(&mut self, data: FilterData) -> Result<&mut Self, FilterError> {
        if let Some(where_clause) = data.where_clause { self.where_clause(where_clause)?; }
        if let Some(order) = data.order { self.order(order)?; }
        if let Some(limit) = data.limit { self.limit(limit, data.offset)?; }
        else if let Some(offset) = data.offset { self.offset(offset)?; }
        Ok(self)
    }

    pub fn where_clause(&mut self, conditions: Value) -> Result<&mut Self, FilterError> {
        FilterWhere::validate(&conditions)?;
        self.where_data = Some(conditions);
        Ok(self)
    }

    pub fn order(&mut self, order_spec: Value) -> Result<&mut Self, FilterError> {
        self.order_data = FilterOrder::validate_and_parse(&order_spec, &self.columns)?;
        Ok(self)
    }

    pub fn limit(&mut self, limit: i32, offset: Option<i32>) -> Result<&mut Self, FilterError> {
        if limit < 0 { return Err(FilterError::InvalidLimit("Limit must be non-negative".to_string())); }

        // Apply max limit from config
        let max_limit = crate::config::CONFIG.filter.max_limit.unwrap_or(i32::MAX);
        let applied_limit = if limit > max_limit {
            if crate::config::CONFIG.filter.debug_logging {
                tracing::warn!("Limit {} exceeds max {}, capping to max", limit, max_limit);
            }
            max_limit
        } else {
            limit
        };

        self.limit = Some(applied_limit);
        if let Some(off) = offset { self.offset(off)?; }
        Ok(self)
    }

    /// Set a limit that bypasses the page cap; used for bulk export.
    pub fn hard_limit(&mut self, limit: i32) -> Result<&mut Self, FilterError> {
        if limit < 0 { return Err(FilterError::InvalidLimit("Limit must be non-negative".to_string())); }
        self.limit = Some(limit);
        Ok(self)
    }

    pub fn offset(&mut self, offset: i32) -> Result<&mut Self, FilterError> {
        if offset < 0 { return Err(FilterError::InvalidOffset("Offset must be non-negative".to_string())); }
        self.offset = Some(offset);
        Ok(self)
    }

    pub fn applied_limit(&self) -> Option<i32> {
        self.limit
    }

    pub fn applied_offset(&self) -> i32 {
        self.offset.unwrap_or(0)
    }

    pub fn to_sql(&self) -> Result<SqlResult, FilterError> {
        let where_result = self.to_where_sql()?;
        let order_clause = FilterOrder::generate(&self.order_data);
        let limit_clause = self.build_limit_clause();

        let query = [
            "SELECT *".to_string(),
            format!("FROM \"{}\"", self.table_name),
            format!("WHERE {}", where_result.query),
            order_clause,
            limit_clause,
        ].into_iter().filter(|s| !s.is_empty()).collect::<Vec<_>>().join(" ");

        Ok(SqlResult { query, params: where_result.params })
    }

    pub fn to_where_sql(&self) -> Result<SqlResult, FilterError> {
        let (query, params) = match self.where_data {
            Some(ref where_data) => FilterWhere::generate(where_data, &self.columns, 0)?,
            None => ("1=1".to_string(), vec![]),
        };
        Ok(SqlResult { query, params })
    }

    pub fn to_count_sql(&self) -> Result<SqlResult, FilterError> {
        let where_result = self.to_where_sql()?;
        let query = format!("SELECT COUNT(*) AS count FROM \"{}\" WHERE {}", self.table_name, where_result.query);
        Ok(SqlResult { query, params: where_result.params })
    }

    /// `SELECT <group_by>, <aggregates> ... GROUP BY <group_by>` over every
    /// matching row. Order, limit and offset do not apply.
    pub fn to_group_sql(&self, group_by: &[&str], aggregates: &[&str]) -> Result<SqlResult, FilterError> {
        let mut columns = Vec::with_capacity(group_by.len());
        for name in group_by {
            if !self.columns.contains_key(*name) {
                return Err(FilterError::UnknownColumn(name.to_string()));
            }
            columns.push(format!("\"{}\"", name));
        }
        let where_result = self.to_where_sql()?;
        let select = columns.iter().map(String::as_str).chain(aggregates.iter().copied()).collect::<Vec<_>>();

        let mut query = format!(
            "SELECT {} FROM \"{}\" WHERE {}",
            select.join(", "),
            self.table_name,
            where_result.query
        );
        if !columns.is_empty() {
            query.push_str(&format!(" GROUP BY {}", columns.join(", ")));
        }
        Ok(SqlResult { query, params: where_result.params })
    }

    fn build_limit_clause(&self) -> String {
        match (self.limit, self.offset) {
            (Some(l), Some(o)) => format!("LIMIT {} OFFSET {}", l, o),
            (Some(l), None) => format!("LIMIT {}", l),
            (None, Some(o)) => format!("OFFSET {}", o),
            (None, None) => String::new(),
        }
    }
}

/// Identifiers are quoted everywhere, but must still look like identifiers.
pub fn validate_identifier(name: &str) -> Result<(), String> {
    let mut chars = name.chars();
    match chars.next() {
        None => Err("name cannot be empty".to_string()),
        Some(first) if !(first.is_ascii_alphabetic() || first == '_') => {
            Err(format!("invalid name format: {}", name))
        }
        Some(_) if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') => {
            Err(format!("invalid name format: {}", name))
        }
        Some(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn columns() -> ColumnTypes {
        ColumnTypes::from([
            ("organization_id", "uuid"),
            ("status", "text"),
            ("created_at", "timestamptz"),
        ])
    }

    #[test]
    fn builds_select_with_where_order_and_limit() {
        let mut filter = Filter::new("transactions", columns()).unwrap();
        filter
            .assign(FilterData {
                where_clause: Some(json!({"status": "pending"})),
                order: Some(json!("created_at desc")),
                limit: Some(10),
                offset: Some(20),
            })
            .unwrap();

        let sql = filter.to_sql().unwrap();
        assert_eq!(
            sql.query,
            "SELECT * FROM \"transactions\" WHERE \"status\" = $1::text ORDER BY \"created_at\" DESC LIMIT 10 OFFSET 20"
        );
        assert_eq!(sql.params, vec![json!("pending")]);
    }

    #[test]
    fn count_ignores_order_and_limit() {
        let mut filter = Filter::new("transactions", columns()).unwrap();
        filter.where_clause(json!({"status": "failed"})).unwrap();
        filter.limit(5, None).unwrap();
        let sql = filter.to_count_sql().unwrap();
        assert_eq!(sql.query, "SELECT COUNT(*) AS count FROM \"transactions\" WHERE \"status\" = $1::text");
    }

    #[test]
    fn grouping_spans_every_matching_row() {
        let mut filter = Filter::new("transactions", columns()).unwrap();
        filter.where_clause(json!({"organization_id": "7f0c8a1e-3b7d-4a53-9f51-0a4c6a1d2b11"})).unwrap();
        filter.order(json!("created_at desc")).unwrap();
        filter.hard_limit(2).unwrap();

        let sql = filter.to_group_sql(&["status"], &["COUNT(*) AS count"]).unwrap();
        assert_eq!(
            sql.query,
            "SELECT \"status\", COUNT(*) AS count FROM \"transactions\" WHERE \"organization_id\" = $1::uuid GROUP BY \"status\""
        );
        assert!(matches!(
            filter.to_group_sql(&["amount"], &["COUNT(*) AS count"]),
            Err(FilterError::UnknownColumn(_))
        ));
    }

    #[test]
    fn limit_is_capped_by_config() {
        let mut filter = Filter::new("transactions", columns()).unwrap();
        filter.limit(i32::MAX, None).unwrap();
        let max = crate::config::CONFIG.filter.max_limit.unwrap_or(i32::MAX);
        assert_eq!(filter.applied_limit(), Some(max));
        assert!(filter.limit(-1, None).is_err());
        assert!(filter.offset(-5).is_err());
    }

    #[test]
    fn hard_limit_ignores_page_cap() {
        let mut filter = Filter::new("transactions", columns()).unwrap();
        filter.hard_limit(50_000).unwrap();
        assert_eq!(filter.applied_limit(), Some(50_000));
    }

    #[test]
    fn validates_table_names() {
        assert!(Filter::new("job_history", columns()).is_ok());
        assert!(Filter::new("bad-name", columns()).is_err());
        assert!(Filter::new("1table", columns()).is_err());
        assert!(Filter::new("", columns()).is_err());
    }
}
