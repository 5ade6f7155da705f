use serde_json::Value;
use sqlx::{self, postgres::PgArguments, postgres::PgRow, FromRow, PgPool, Row};
use std::time::Instant;

use crate::database::manager::DatabaseError;
use crate::database::resource::Column;
use crate::filter::filter_where::param_value;
use crate::filter::{ColumnTypes, Filter, FilterData, SqlResult};

pub struct QueryBuilder<T> {
    table_name: String,
    filter: Filter,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> QueryBuilder<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    pub fn new(table_name: impl Into<String>, columns: ColumnTypes) -> Result<Self, DatabaseError> {
        let name = table_name.into();
        let filter = Filter::new(&name, columns)?;
        Ok(Self {
            table_name: name,
            filter,
            _phantom: std::marker::PhantomData,
        })
    }

    pub fn filter(mut self, filter_data: FilterData) -> Result<Self, DatabaseError> {
        self.filter.assign(filter_data)?;
        Ok(self)
    }

    pub fn hard_limit(mut self, limit: i32) -> Result<Self, DatabaseError> {
        self.filter.hard_limit(limit)?;
        Ok(self)
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn applied_limit(&self) -> Option<i32> {
        self.filter.applied_limit()
    }

    pub fn applied_offset(&self) -> i32 {
        self.filter.applied_offset()
    }

    pub async fn select_all(&self, pool: &PgPool) -> Result<Vec<T>, DatabaseError> {
        let sql_result = self.filter.to_sql()?;
        fetch_all_as(pool, &sql_result).await
    }

    pub async fn select_optional(&self, pool: &PgPool) -> Result<Option<T>, DatabaseError> {
        let sql_result = self.filter.to_sql()?;
        fetch_optional_as(pool, &sql_result).await
    }

    /// Grouped aggregate rows; never paged or capped.
    pub async fn select_grouped<G>(
        &self,
        pool: &PgPool,
        group_by: &[&str],
        aggregates: &[&str],
    ) -> Result<Vec<G>, DatabaseError>
    where
        G: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let sql_result = self.filter.to_group_sql(group_by, aggregates)?;
        fetch_all_as(pool, &sql_result).await
    }

    pub async fn count(&self, pool: &PgPool) -> Result<i64, DatabaseError> {
        let sql_result = self.filter.to_count_sql()?;
        let started = Instant::now();
        let mut q = sqlx::query(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query(q, p);
        }
        let row = q.fetch_one(pool).await?;
        observe(&sql_result.query, started);
        let count: i64 = row.try_get("count")?;
        Ok(count)
    }
}

/// `INSERT ... RETURNING *` for the given column values.
pub fn insert_sql(table: &str, values: &[(Column, Value)]) -> SqlResult {
    let names: Vec<String> = values.iter().map(|(c, _)| format!("\"{}\"", c.name)).collect();
    let placeholders: Vec<String> = values
        .iter()
        .enumerate()
        .map(|(i, (c, _))| format!("${}::{}", i + 1, c.sql_type))
        .collect();

    SqlResult {
        query: format!(
            "INSERT INTO \"{}\" ({}) VALUES ({}) RETURNING *",
            table,
            names.join(", "),
            placeholders.join(", ")
        ),
        params: values.iter().map(|(c, v)| param_value(v, c.sql_type)).collect(),
    }
}

/// `INSERT ... ON CONFLICT (..) DO UPDATE` touching every non-conflict column.
pub fn upsert_sql(table: &str, values: &[(Column, Value)], conflict: &[&str]) -> SqlResult {
    let mut sql = insert_sql(table, values);
    let base = sql.query.trim_end_matches(" RETURNING *").to_string();

    let mut updates: Vec<String> = values
        .iter()
        .filter(|(c, _)| !conflict.contains(&c.name))
        .map(|(c, _)| format!("\"{0}\" = EXCLUDED.\"{0}\"", c.name))
        .collect();
    updates.push("\"updated_at\" = now()".to_string());

    let targets: Vec<String> = conflict.iter().map(|c| format!("\"{}\"", c)).collect();
    sql.query = format!(
        "{} ON CONFLICT ({}) DO UPDATE SET {} RETURNING *",
        base,
        targets.join(", "),
        updates.join(", ")
    );
    sql
}

/// `UPDATE ... SET .. WHERE <guards> RETURNING *`; guards are ANDed equality checks.
pub fn update_sql(table: &str, values: &[(Column, Value)], guards: &[(Column, Value)]) -> SqlResult {
    let mut params = Vec::with_capacity(values.len() + guards.len());
    let mut sets = Vec::with_capacity(values.len() + 1);
    for (c, v) in values {
        params.push(param_value(v, c.sql_type));
        sets.push(format!("\"{}\" = ${}::{}", c.name, params.len(), c.sql_type));
    }
    sets.push("\"updated_at\" = now()".to_string());

    let conditions = guard_conditions(guards, &mut params);
    SqlResult {
        query: format!(
            "UPDATE \"{}\" SET {} WHERE {} RETURNING *",
            table,
            sets.join(", "),
            conditions
        ),
        params,
    }
}

/// `DELETE ... WHERE <guards> RETURNING *`.
pub fn delete_sql(table: &str, guards: &[(Column, Value)]) -> SqlResult {
    let mut params = Vec::with_capacity(guards.len());
    let conditions = guard_conditions(guards, &mut params);
    SqlResult {
        query: format!("DELETE FROM \"{}\" WHERE {} RETURNING *", table, conditions),
        params,
    }
}

fn guard_conditions(guards: &[(Column, Value)], params: &mut Vec<Value>) -> String {
    let mut conditions = Vec::with_capacity(guards.len());
    for (c, v) in guards {
        params.push(param_value(v, c.sql_type));
        conditions.push(format!("\"{}\" = ${}::{}", c.name, params.len(), c.sql_type));
    }
    if conditions.is_empty() {
        // never issue an unguarded mutation
        "1=0".to_string()
    } else {
        conditions.join(" AND ")
    }
}

pub async fn fetch_all_as<T>(pool: &PgPool, sql_result: &SqlResult) -> Result<Vec<T>, DatabaseError>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let started = Instant::now();
    let mut q = sqlx::query_as::<_, T>(&sql_result.query);
    for p in sql_result.params.iter() {
        q = bind_param_query_as(q, p);
    }
    let rows = q.fetch_all(pool).await?;
    observe(&sql_result.query, started);
    Ok(rows)
}

pub async fn fetch_optional_as<T>(pool: &PgPool, sql_result: &SqlResult) -> Result<Option<T>, DatabaseError>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let started = Instant::now();
    let mut q = sqlx::query_as::<_, T>(&sql_result.query);
    for p in sql_result.params.iter() {
        q = bind_param_query_as(q, p);
    }
    let row = q.fetch_optional(pool).await?;
    observe(&sql_result.query, started);
    Ok(row)
}

fn observe(query: &str, started: Instant) {
    let db = &crate::config::CONFIG.database;
    let elapsed = started.elapsed();
    if db.enable_query_logging {
        tracing::debug!(elapsed_ms = elapsed.as_millis() as u64, "{}", query);
    }
    if db.enable_slow_query_warning && elapsed.as_millis() as u64 > db.slow_query_threshold_ms {
        tracing::warn!(elapsed_ms = elapsed.as_millis() as u64, "Slow query: {}", query);
    }
}

fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    v: &'q Value,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s.as_str()),
        // Composite values are cast from their JSON text
        Value::Array(_) | Value::Object(_) => q.bind(v.to_string()),
    }
}

fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    v: &'q Value,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s.as_str()),
        Value::Array(_) | Value::Object(_) => q.bind(v.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::resource::col;
    use serde_json::json;

    #[test]
    fn insert_casts_each_placeholder() {
        let sql = insert_sql(
            "transactions",
            &[
                (col("organization_id", "uuid"), json!("7f0c8a1e-3b7d-4a53-9f51-0a4c6a1d2b11")),
                (col("amount", "numeric"), json!("12.50")),
            ],
        );
        assert_eq!(
            sql.query,
            "INSERT INTO \"transactions\" (\"organization_id\", \"amount\") VALUES ($1::uuid, $2::numeric) RETURNING *"
        );
        assert_eq!(sql.params.len(), 2);
    }

    #[test]
    fn update_numbers_guards_after_values() {
        let sql = update_sql(
            "contacts",
            &[(col("first_name", "text"), json!("Ada")), (col("notes", "text"), Value::Null)],
            &[(col("id", "uuid"), json!("a")), (col("organization_id", "uuid"), json!("b"))],
        );
        assert_eq!(
            sql.query,
            "UPDATE \"contacts\" SET \"first_name\" = $1::text, \"notes\" = $2::text, \"updated_at\" = now() \
             WHERE \"id\" = $3::uuid AND \"organization_id\" = $4::uuid RETURNING *"
        );
        assert_eq!(sql.params, vec![json!("Ada"), Value::Null, json!("a"), json!("b")]);
    }

    #[test]
    fn delete_without_guards_matches_nothing() {
        let sql = delete_sql("contacts", &[]);
        assert_eq!(sql.query, "DELETE FROM \"contacts\" WHERE 1=0 RETURNING *");
    }

    #[test]
    fn upsert_updates_non_conflict_columns() {
        let sql = upsert_sql(
            "settings",
            &[
                (col("organization_id", "uuid"), json!("org")),
                (col("key", "text"), json!("theme")),
                (col("value", "jsonb"), json!({"mode": "dark"})),
            ],
            &["organization_id", "key"],
        );
        assert_eq!(
            sql.query,
            "INSERT INTO \"settings\" (\"organization_id\", \"key\", \"value\") VALUES ($1::uuid, $2::text, $3::jsonb) \
             ON CONFLICT (\"organization_id\", \"key\") DO UPDATE SET \"value\" = EXCLUDED.\"value\", \"updated_at\" = now() RETURNING *"
        );
        assert_eq!(sql.params[2], json!("{\"mode\":\"dark\"}"));
    }
}
