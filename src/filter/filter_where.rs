use serde_json::Value;

use super::error::FilterError;
use super::types::{ColumnTypes, FilterOp, FilterWhereInfo};

/// Translates a `where` document into a parameterized SQL predicate.
///
/// Every bound parameter is cast to the column's declared type, so values can
/// travel as JSON scalars and still compare against uuid/date/numeric columns.
pub struct FilterWhere<'a> {
    columns: &'a ColumnTypes,
    param_values: Vec<Value>,
    param_index: usize,
}

impl<'a> FilterWhere<'a> {
    pub fn new(columns: &'a ColumnTypes, starting_param_index: usize) -> Self {
        Self {
            columns,
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    pub fn generate(
        where_data: &Value,
        columns: &'a ColumnTypes,
        starting_param_index: usize,
    ) -> Result<(String, Vec<Value>), FilterError> {
        let mut filter_where = Self::new(columns, starting_param_index);
        let sql = filter_where.build(where_data)?;
        Ok((sql, filter_where.param_values))
    }

    pub fn validate(where_data: &Value) -> Result<(), FilterError> {
        match where_data {
            Value::Null | Value::Object(_) => Ok(()),
            _ => Err(FilterError::InvalidWhereClause("WHERE must be an object".to_string())),
        }
    }

    fn build(&mut self, where_data: &Value) -> Result<String, FilterError> {
        let obj = match where_data {
            Value::Null => return Ok("1=1".to_string()),
            Value::Object(obj) => obj,
            _ => return Err(FilterError::InvalidWhereClause("Unsupported WHERE format".to_string())),
        };

        let mut sql_conditions = vec![];
        for (key, value) in obj {
            if key.starts_with('$') {
                sql_conditions.push(self.parse_logical_operator(key, value)?);
            } else {
                for condition in self.parse_field_condition(key, value)? {
                    sql_conditions.push(self.build_sql_condition(&condition)?);
                }
            }
        }

        Ok(if sql_conditions.is_empty() { "1=1".to_string() } else { sql_conditions.join(" AND ") })
    }

    fn parse_logical_operator(&mut self, op: &str, value: &Value) -> Result<String, FilterError> {
        match op {
            "$and" | "$or" => {
                let arr = value
                    .as_array()
                    .ok_or_else(|| FilterError::InvalidOperatorData(format!("{} requires array", op)))?;
                if arr.is_empty() {
                    return Ok(if op == "$and" { "1=1" } else { "1=0" }.to_string());
                }
                let mut sql_parts = Vec::with_capacity(arr.len());
                for v in arr {
                    sql_parts.push(format!("({})", self.build(v)?));
                }
                let joiner = if op == "$and" { " AND " } else { " OR " };
                Ok(format!("({})", sql_parts.join(joiner)))
            }
            "$not" => Ok(format!("NOT ({})", self.build(value)?)),
            _ => Err(FilterError::UnsupportedOperator(op.to_string())),
        }
    }

    fn parse_field_condition(&self, field: &str, value: &Value) -> Result<Vec<FilterWhereInfo>, FilterError> {
        let sql_type = *self
            .columns
            .get(field)
            .ok_or_else(|| FilterError::UnknownColumn(field.to_string()))?;

        match value {
            Value::Object(obj) if obj.keys().any(|k| k.starts_with('$')) => obj
                .iter()
                .map(|(op_key, op_val)| {
                    let operator = FilterOp::parse(op_key)
                        .ok_or_else(|| FilterError::UnsupportedOperator(op_key.clone()))?;
                    Ok(FilterWhereInfo {
                        column: field.to_string(),
                        sql_type,
                        operator,
                        data: op_val.clone(),
                    })
                })
                .collect(),
            // Implicit equality: { field: value }
            _ => Ok(vec![FilterWhereInfo {
                column: field.to_string(),
                sql_type,
                operator: FilterOp::Eq,
                data: value.clone(),
            }]),
        }
    }

    fn build_sql_condition(&mut self, condition: &FilterWhereInfo) -> Result<String, FilterError> {
        let quoted_column = format!("\"{}\"", condition.column);
        let sql_type = condition.sql_type;
        let data = &condition.data;

        Ok(match condition.operator {
            FilterOp::Eq => {
                if data.is_null() {
                    format!("{} IS NULL", quoted_column)
                } else {
                    format!("{} = {}", quoted_column, self.param(data, sql_type))
                }
            }
            FilterOp::Ne => {
                if data.is_null() {
                    format!("{} IS NOT NULL", quoted_column)
                } else {
                    format!("{} <> {}", quoted_column, self.param(data, sql_type))
                }
            }
            FilterOp::Gt => format!("{} > {}", quoted_column, self.param(data, sql_type)),
            FilterOp::Gte => format!("{} >= {}", quoted_column, self.param(data, sql_type)),
            FilterOp::Lt => format!("{} < {}", quoted_column, self.param(data, sql_type)),
            FilterOp::Lte => format!("{} <= {}", quoted_column, self.param(data, sql_type)),
            FilterOp::Like | FilterOp::ILike => {
                if !data.is_string() {
                    return Err(FilterError::InvalidOperatorData(format!(
                        "pattern match on {} requires a string",
                        condition.column
                    )));
                }
                let keyword = if condition.operator == FilterOp::Like { "LIKE" } else { "ILIKE" };
                format!("{}::text {} {}", quoted_column, keyword, self.param(data, "text"))
            }
            FilterOp::In | FilterOp::NIn => {
                let values = match data {
                    Value::Array(values) => values.clone(),
                    other => vec![other.clone()],
                };
                let negate = condition.operator == FilterOp::NIn;
                if values.is_empty() {
                    return Ok(if negate { "1=1" } else { "1=0" }.to_string());
                }
                let params: Vec<String> = values.iter().map(|v| self.param(v, sql_type)).collect();
                let keyword = if negate { "NOT IN" } else { "IN" };
                format!("{} {} ({})", quoted_column, keyword, params.join(", "))
            }
            FilterOp::Between => match data {
                Value::Array(values) if values.len() == 2 => format!(
                    "{} BETWEEN {} AND {}",
                    quoted_column,
                    self.param(&values[0], sql_type),
                    self.param(&values[1], sql_type)
                ),
                _ => {
                    return Err(FilterError::InvalidOperatorData(
                        "$between requires array with 2 values".to_string(),
                    ))
                }
            },
            FilterOp::Null => match data.as_bool() {
                Some(true) => format!("{} IS NULL", quoted_column),
                Some(false) => format!("{} IS NOT NULL", quoted_column),
                None => return Err(FilterError::InvalidOperatorData("$null requires a boolean".to_string())),
            },
        })
    }

    fn param(&mut self, value: &Value, sql_type: &str) -> String {
        self.param_values.push(param_value(value, sql_type));
        self.param_index += 1;
        format!("${}::{}", self.param_index, sql_type)
    }
}

/// Values bound against json columns travel as JSON text, as do numbers and
/// booleans bound against columns of another type.
pub fn param_value(value: &Value, sql_type: &str) -> Value {
    match value {
        Value::Null => Value::Null,
        _ if sql_type == "jsonb" => Value::String(value.to_string()),
        Value::Number(_) if is_numeric_type(sql_type) => value.clone(),
        Value::Bool(_) if sql_type == "boolean" => value.clone(),
        Value::Number(_) | Value::Bool(_) => Value::String(value.to_string()),
        _ => value.clone(),
    }
}

fn is_numeric_type(sql_type: &str) -> bool {
    matches!(
        sql_type,
        "integer" | "bigint" | "smallint" | "numeric" | "real" | "double precision"
    )
}
