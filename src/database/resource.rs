use serde::{de::DeserializeOwned, Serialize};
use sqlx::{postgres::PgRow, FromRow};
use uuid::Uuid;

use crate::auth::Policy;
use crate::filter::ColumnTypes;
use crate::validation::Validate;

/// A table column and the Postgres type its parameters are cast to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub sql_type: &'static str,
}

pub const fn col(name: &'static str, sql_type: &'static str) -> Column {
    Column { name, sql_type }
}

pub const STANDARD_SYSTEM_COLUMNS: &[Column] = &[
    col("id", "uuid"),
    col("organization_id", "uuid"),
    col("created_at", "timestamptz"),
    col("updated_at", "timestamptz"),
];

pub const OWNER_COLUMN: Column = col("user_id", "uuid");

/// A tenant-scoped table the repository can read.
pub trait Resource: Send + Sync + 'static {
    type Row: for<'r> FromRow<'r, PgRow> + Serialize + Send + Sync + Unpin + 'static;

    const TABLE: &'static str;
    /// Entity name written to audit records.
    const ENTITY: &'static str;
    /// Business columns; the insertable set for writable resources.
    const COLUMNS: &'static [Column];
    const SYSTEM_COLUMNS: &'static [Column] = STANDARD_SYSTEM_COLUMNS;
    /// Rows carry a `user_id` owner filled from the session.
    const OWNED: bool = false;
    const FILTERABLE: &'static [&'static str] = &[];
    const SEARCHABLE: &'static [&'static str] = &[];
    const DATE_COLUMN: Option<&'static str> = None;
    const DEFAULT_ORDER: &'static str = "created_at desc";
    const POLICY: Policy = Policy::STANDARD;

    fn row_id(row: &Self::Row) -> Uuid;

    fn column_types() -> ColumnTypes {
        let mut types: ColumnTypes = Self::SYSTEM_COLUMNS.iter().map(|c| (c.name, c.sql_type)).collect();
        if Self::OWNED {
            types.insert(OWNER_COLUMN.name, OWNER_COLUMN.sql_type);
        }
        types.extend(Self::COLUMNS.iter().map(|c| (c.name, c.sql_type)));
        types
    }

    fn column(name: &str) -> Option<&'static Column> {
        Self::COLUMNS.iter().find(|c| c.name == name)
    }
}

/// A resource that accepts create, replace and patch bodies.
pub trait Writable: Resource {
    type Create: DeserializeOwned + Serialize + Validate + Send + Sync + 'static;
    type Update: DeserializeOwned + Serialize + Validate + Send + Sync + 'static;
}
