use serde::Serialize;
use serde_json::{json, Map, Value};
use sqlx::{postgres::PgRow, FromRow, PgPool};
use std::marker::PhantomData;
use uuid::Uuid;

use crate::config::config;
use crate::database::manager::DatabaseError;
use crate::database::query_builder::{delete_sql, fetch_optional_as, insert_sql, update_sql, upsert_sql, QueryBuilder};
use crate::database::resource::{col, Column, Resource, Writable, OWNER_COLUMN};
use crate::filter::{FilterData, ListQuery, ListSpec};
use crate::middleware::TenantContext;
use crate::services::audit::{AuditEntry, AuditService};
use crate::types::AuditAction;

/// One page of a list or search result.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub limit: Option<i32>,
    pub offset: i32,
}

/// Repository bound to one tenant. Every statement it issues carries
/// `organization_id = ctx.organization_id`.
pub struct TenantRepository<E: Resource> {
    pool: PgPool,
    ctx: TenantContext,
    audit: AuditService,
    _resource: PhantomData<E>,
}

impl<E: Resource> TenantRepository<E> {
    pub fn new(pool: PgPool, ctx: TenantContext) -> Self {
        let audit = AuditService::from_config(pool.clone());
        Self {
            pool,
            ctx,
            audit,
            _resource: PhantomData,
        }
    }

    pub fn context(&self) -> &TenantContext {
        &self.ctx
    }

    pub fn list_spec() -> ListSpec {
        ListSpec {
            filterable: E::FILTERABLE,
            searchable: E::SEARCHABLE,
            date_column: E::DATE_COLUMN,
            default_order: E::DEFAULT_ORDER,
            default_limit: config().filter.default_limit,
        }
    }

    fn scope(&self, where_clause: Option<Value>) -> Value {
        let tenant = json!({ "organization_id": self.ctx.organization_id });
        match where_clause {
            None | Some(Value::Null) => tenant,
            Some(conditions) => json!({ "$and": [tenant, conditions] }),
        }
    }

    fn query(&self, mut data: FilterData) -> Result<QueryBuilder<E::Row>, DatabaseError> {
        data.where_clause = Some(self.scope(data.where_clause.take()));
        QueryBuilder::new(E::TABLE, E::column_types())?.filter(data)
    }

    async fn page(&self, data: FilterData) -> Result<Page<E::Row>, DatabaseError> {
        let builder = self.query(data)?;
        let items = builder.select_all(&self.pool).await?;
        let total = builder.count(&self.pool).await?;
        tracing::debug!(table = E::TABLE, total, returned = items.len(), "list");
        Ok(Page {
            items,
            total,
            limit: builder.applied_limit(),
            offset: builder.applied_offset(),
        })
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Page<E::Row>, DatabaseError> {
        let data = query.to_filter_data(&Self::list_spec())?;
        self.page(data).await
    }

    /// Structured `where`/`order`/`limit`/`offset` search.
    pub async fn search(&self, mut data: FilterData) -> Result<Page<E::Row>, DatabaseError> {
        if data.order.is_none() {
            data.order = Some(Value::String(E::DEFAULT_ORDER.to_string()));
        }
        if data.limit.is_none() {
            data.limit = Some(config().filter.default_limit);
        }
        self.page(data).await
    }

    /// Every matching row, bounded only by the export cap.
    pub async fn find_all(&self, data: FilterData) -> Result<Vec<E::Row>, DatabaseError> {
        let data = FilterData {
            limit: None,
            offset: None,
            ..data
        };
        self.query(data)?
            .hard_limit(config().filter.max_export_rows)?
            .select_all(&self.pool)
            .await
    }

    /// Aggregate every matching row of this tenant, grouped by `group_by`.
    pub async fn aggregate<G>(
        &self,
        data: FilterData,
        group_by: &[&str],
        aggregates: &[&str],
    ) -> Result<Vec<G>, DatabaseError>
    where
        G: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let data = FilterData {
            where_clause: data.where_clause,
            ..Default::default()
        };
        let groups = self
            .query(data)?
            .select_grouped(&self.pool, group_by, aggregates)
            .await?;
        tracing::debug!(table = E::TABLE, groups = groups.len(), "aggregate");
        Ok(groups)
    }

    pub async fn find_one(&self, where_clause: Value) -> Result<Option<E::Row>, DatabaseError> {
        let data = FilterData {
            where_clause: Some(where_clause),
            limit: Some(1),
            ..Default::default()
        };
        self.query(data)?.select_optional(&self.pool).await
    }

    pub async fn get(&self, id: Uuid) -> Result<E::Row, DatabaseError> {
        self.find_one(json!({ "id": id }))
            .await?
            .ok_or_else(|| not_found::<E>())
    }

    pub async fn export(&self, query: &ListQuery) -> Result<Vec<E::Row>, DatabaseError> {
        let data = query.to_filter_data(&Self::list_spec())?;
        let rows = self.find_all(data).await?;
        tracing::debug!(table = E::TABLE, rows = rows.len(), "export");
        Ok(rows)
    }

    async fn record(&self, action: AuditAction, entity_id: Uuid, changes: Option<Value>) {
        self.audit
            .record(AuditEntry {
                organization_id: self.ctx.organization_id,
                user_id: Some(self.ctx.user_id),
                action,
                entity_type: E::ENTITY,
                entity_id: Some(entity_id),
                changes,
            })
            .await;
    }
}

impl<E: Writable> TenantRepository<E> {
    /// Tenant (and owner) columns stamped onto inserted rows.
    fn system_values(&self) -> Vec<(Column, Value)> {
        let mut values = vec![(col("organization_id", "uuid"), json!(self.ctx.organization_id))];
        if E::OWNED {
            values.push((OWNER_COLUMN, json!(self.ctx.user_id)));
        }
        values
    }

    /// Row guards for update and delete. Below manager, owned rows are
    /// only reachable by their owner.
    fn write_guards(&self, id: Uuid) -> Vec<(Column, Value)> {
        let mut guards = vec![
            (col("id", "uuid"), json!(id)),
            (col("organization_id", "uuid"), json!(self.ctx.organization_id)),
        ];
        if E::OWNED && !self.ctx.is_privileged() {
            guards.push((OWNER_COLUMN, json!(self.ctx.user_id)));
        }
        guards
    }

    pub async fn create(&self, input: &E::Create) -> Result<E::Row, DatabaseError> {
        let fields = to_fields(input)?;
        let mut values = self.system_values();
        values.extend(
            E::COLUMNS
                .iter()
                .filter_map(|c| fields.get(c.name).filter(|v| !v.is_null()).map(|v| (*c, v.clone()))),
        );

        let sql = insert_sql(E::TABLE, &values);
        let row = fetch_optional_as::<E::Row>(&self.pool, &sql)
            .await?
            .ok_or_else(|| DatabaseError::QueryError(format!("insert into {} returned no row", E::TABLE)))?;

        self.record(AuditAction::Create, E::row_id(&row), Some(Value::Object(fields)))
            .await;
        Ok(row)
    }

    /// Full replacement; absent fields are written as null.
    pub async fn replace(&self, id: Uuid, input: &E::Create) -> Result<E::Row, DatabaseError> {
        let fields = to_fields(input)?;
        let values: Vec<(Column, Value)> = E::COLUMNS
            .iter()
            .map(|c| (*c, fields.get(c.name).cloned().unwrap_or(Value::Null)))
            .collect();
        self.update_guarded(id, values, fields).await
    }

    /// Partial update of the fields present in `patch`.
    pub async fn patch(&self, id: Uuid, patch: &E::Update) -> Result<E::Row, DatabaseError> {
        let fields = to_fields(patch)?;
        let values: Vec<(Column, Value)> = E::COLUMNS
            .iter()
            .filter_map(|c| fields.get(c.name).map(|v| (*c, v.clone())))
            .collect();
        if values.is_empty() {
            return Err(DatabaseError::InvalidInput("No fields to update".to_string()));
        }
        self.update_guarded(id, values, fields).await
    }

    async fn update_guarded(
        &self,
        id: Uuid,
        values: Vec<(Column, Value)>,
        fields: Map<String, Value>,
    ) -> Result<E::Row, DatabaseError> {
        let sql = update_sql(E::TABLE, &values, &self.write_guards(id));
        let row = fetch_optional_as::<E::Row>(&self.pool, &sql)
            .await?
            .ok_or_else(|| not_found::<E>())?;

        self.record(AuditAction::Update, id, Some(Value::Object(fields))).await;
        Ok(row)
    }

    pub async fn delete(&self, id: Uuid) -> Result<E::Row, DatabaseError> {
        let sql = delete_sql(E::TABLE, &self.write_guards(id));
        let row = fetch_optional_as::<E::Row>(&self.pool, &sql)
            .await?
            .ok_or_else(|| not_found::<E>())?;

        self.record(AuditAction::Delete, id, None).await;
        Ok(row)
    }

    /// Insert or overwrite the row identified by `conflict` within this tenant.
    pub async fn upsert(&self, conflict: &[&str], input: &E::Create) -> Result<E::Row, DatabaseError> {
        let fields = to_fields(input)?;
        let mut values = self.system_values();
        values.extend(
            E::COLUMNS
                .iter()
                .map(|c| (*c, fields.get(c.name).cloned().unwrap_or(Value::Null))),
        );

        let sql = upsert_sql(E::TABLE, &values, conflict);
        let row = fetch_optional_as::<E::Row>(&self.pool, &sql)
            .await?
            .ok_or_else(|| DatabaseError::QueryError(format!("upsert into {} returned no row", E::TABLE)))?;

        self.record(AuditAction::Update, E::row_id(&row), Some(Value::Object(fields)))
            .await;
        Ok(row)
    }
}

fn not_found<E: Resource>() -> DatabaseError {
    DatabaseError::NotFound(format!("{} not found", E::ENTITY.replace('_', " ")))
}

fn to_fields<T: Serialize>(input: &T) -> Result<Map<String, Value>, DatabaseError> {
    match serde_json::to_value(input) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(DatabaseError::InvalidInput(format!("expected an object, got {}", other))),
        Err(e) => Err(DatabaseError::QueryError(format!("failed to serialize input: {}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::config::AppConfig;
    use crate::database::models::{Contact, Setting, UpdateContact};
    use crate::database::DatabaseManager;

    fn repo<E: Resource>(roles: Vec<Role>) -> TenantRepository<E> {
        let pool = DatabaseManager::connect_lazy(&AppConfig::development().database).unwrap();
        let ctx = TenantContext {
            organization_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            email: None,
            roles,
            project_id: None,
        };
        TenantRepository::new(pool, ctx)
    }

    #[tokio::test]
    async fn members_are_confined_to_their_own_rows() {
        let repo = repo::<Contact>(vec![Role::Member]);
        let guards = repo.write_guards(Uuid::nil());
        assert_eq!(guards.len(), 3);
        assert_eq!(guards[2].0, OWNER_COLUMN);
        assert_eq!(guards[2].1, json!(repo.context().user_id));
    }

    #[tokio::test]
    async fn managers_may_modify_any_row_in_the_org() {
        let repo = repo::<Contact>(vec![Role::Manager]);
        let guards = repo.write_guards(Uuid::nil());
        assert_eq!(guards.len(), 2);
        assert_eq!(guards[1].1, json!(repo.context().organization_id));
    }

    #[tokio::test]
    async fn unowned_resources_skip_owner_column() {
        let repo = repo::<Setting>(vec![Role::Viewer]);
        assert_eq!(repo.system_values().len(), 1);
        assert_eq!(repo.write_guards(Uuid::nil()).len(), 2);
    }

    #[tokio::test]
    async fn tenant_predicate_wraps_caller_conditions() {
        let repo = repo::<Contact>(vec![Role::Member]);
        let org = repo.context().organization_id;
        assert_eq!(repo.scope(None), json!({"organization_id": org}));
        assert_eq!(
            repo.scope(Some(json!({"company": "Initech"}))),
            json!({"$and": [{"organization_id": org}, {"company": "Initech"}]})
        );
    }

    #[tokio::test]
    async fn empty_patch_is_rejected_before_the_database() {
        let repo = repo::<Contact>(vec![Role::Member]);
        let err = repo.patch(Uuid::nil(), &UpdateContact::default()).await.unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidInput(_)));
    }
}
