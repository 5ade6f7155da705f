use serde_json::Value;

use super::error::FilterError;
use super::types::{ColumnTypes, FilterOrderInfo, SortDirection};

pub struct FilterOrder;

impl FilterOrder {
    pub fn validate_and_parse(order: &Value, columns: &ColumnTypes) -> Result<Vec<FilterOrderInfo>, FilterError> {
        let infos = match order {
            Value::Null => vec![],
            Value::String(s) => Self::parse_order_string(s)?,
            Value::Array(arr) => {
                // Expect array of strings like ["created_at desc", "name asc"]
                let mut out = Vec::new();
                for v in arr {
                    match v {
                        Value::String(s) => out.extend(Self::parse_order_string(s)?),
                        other => return Err(FilterError::InvalidOrder(format!("expected string, got {}", other))),
                    }
                }
                out
            }
            Value::Object(obj) => {
                // { "created_at": "desc", "name": "asc" }
                let mut out = Vec::new();
                for (k, v) in obj {
                    let sort = Self::parse_direction(v.as_str().unwrap_or("asc"))?;
                    out.push(FilterOrderInfo { column: k.clone(), sort });
                }
                out
            }
            other => return Err(FilterError::InvalidOrder(format!("unsupported order value {}", other))),
        };

        for info in &infos {
            if !columns.contains_key(info.column.as_str()) {
                return Err(FilterError::UnknownColumn(info.column.clone()));
            }
        }
        Ok(infos)
    }

    pub fn parse_order_string(s: &str) -> Result<Vec<FilterOrderInfo>, FilterError> {
        // split on commas, then each token into column and direction
        let mut out = Vec::new();
        for part in s.split(',') {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                continue;
            }
            let mut it = trimmed.split_whitespace();
            if let Some(col) = it.next() {
                let sort = Self::parse_direction(it.next().unwrap_or("asc"))?;
                if it.next().is_some() {
                    return Err(FilterError::InvalidOrder(trimmed.to_string()));
                }
                out.push(FilterOrderInfo { column: col.to_string(), sort });
            }
        }
        Ok(out)
    }

    fn parse_direction(dir: &str) -> Result<SortDirection, FilterError> {
        match dir.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(FilterError::InvalidOrder(format!("unknown direction '{}'", other))),
        }
    }

    pub fn generate(infos: &[FilterOrderInfo]) -> String {
        if infos.is_empty() {
            return String::new();
        }
        let parts: Vec<String> = infos
            .iter()
            .map(|i| format!("\"{}\" {}", i.column, i.sort.to_sql()))
            .collect();
        format!("ORDER BY {}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn columns() -> ColumnTypes {
        ColumnTypes::from([("created_at", "timestamptz"), ("amount", "numeric")])
    }

    #[test]
    fn parses_comma_separated_order() {
        let infos = FilterOrder::validate_and_parse(&json!("amount desc, created_at"), &columns()).unwrap();
        assert_eq!(FilterOrder::generate(&infos), "ORDER BY \"amount\" DESC, \"created_at\" ASC");
    }

    #[test]
    fn rejects_unknown_columns_and_directions() {
        assert!(matches!(
            FilterOrder::validate_and_parse(&json!("secret asc"), &columns()),
            Err(FilterError::UnknownColumn(_))
        ));
        assert!(matches!(
            FilterOrder::validate_and_parse(&json!("amount sideways"), &columns()),
            Err(FilterError::InvalidOrder(_))
        ));
    }
}
