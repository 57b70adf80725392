//! Catalog inspector.
//!
//! Read-only queries against the PostgreSQL system catalogs, used to
//! check what compiled statements actually produced.

use sqlx::postgres::PgPool;

use crate::error::Result;

/// Queries system catalog views.
pub struct Catalog<'a> {
    pool: &'a PgPool,
}

impl<'a> Catalog<'a> {
    /// Creates an inspector over `pool`.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Returns `pg_indexes.indexdef` for the named index.
    pub async fn index_definition(&self, index: &str) -> Result<Option<String>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT indexdef FROM pg_indexes WHERE indexname = $1")
                .bind(index)
                .fetch_optional(self.pool)
                .await?;
        Ok(row.map(|(def,)| def))
    }

    /// Returns whether `table` has a constraint named `name`.
    pub async fn has_constraint(&self, table: &str, name: &str) -> Result<bool> {
        let row: Option<(i32,)> = sqlx::query_as(
            "SELECT 1 FROM pg_constraint c \
             JOIN pg_class t ON t.oid = c.conrelid \
             WHERE t.relname = $1 AND c.conname = $2",
        )
        .bind(table)
        .bind(name)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.is_some())
    }

    /// Returns whether a table with this name exists.
    pub async fn has_table(&self, table: &str) -> Result<bool> {
        let row: Option<(i32,)> =
            sqlx::query_as("SELECT 1 FROM pg_tables WHERE tablename = $1")
                .bind(table)
                .fetch_optional(self.pool)
                .await?;
        Ok(row.is_some())
    }

    /// Returns whether a view with this name exists.
    pub async fn has_view(&self, view: &str) -> Result<bool> {
        let row: Option<(i32,)> = sqlx::query_as("SELECT 1 FROM pg_views WHERE viewname = $1")
            .bind(view)
            .fetch_optional(self.pool)
            .await?;
        Ok(row.is_some())
    }

    /// Returns the stored query text of a view.
    pub async fn view_definition(&self, view: &str) -> Result<Option<String>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT definition FROM pg_views WHERE viewname = $1")
                .bind(view)
                .fetch_optional(self.pool)
                .await?;
        Ok(row.map(|(def,)| def))
    }

    /// Returns the column names of `table`, in ordinal order.
    pub async fn column_names(&self, table: &str) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT column_name::text FROM information_schema.columns \
             WHERE table_name = $1 ORDER BY ordinal_position",
        )
        .bind(table)
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    /// Returns the default expression of a column.
    pub async fn column_default(&self, table: &str, column: &str) -> Result<Option<String>> {
        let row: Option<(Option<String>,)> = sqlx::query_as(
            "SELECT column_default::text FROM information_schema.columns \
             WHERE table_name = $1 AND column_name = $2",
        )
        .bind(table)
        .bind(column)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.and_then(|(default,)| default))
    }

    /// Returns the comment on a column.
    pub async fn column_comment(&self, table: &str, column: &str) -> Result<Option<String>> {
        let row: Option<(Option<String>,)> = sqlx::query_as(
            "SELECT col_description(c.oid, a.attnum) FROM pg_class c \
             JOIN pg_attribute a ON a.attrelid = c.oid \
             WHERE c.relname = $1 AND a.attname = $2",
        )
        .bind(table)
        .bind(column)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.and_then(|(comment,)| comment))
    }

    /// Returns the index names of `table`, sorted.
    pub async fn index_names(&self, table: &str) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT indexname::text FROM pg_indexes WHERE tablename = $1 ORDER BY indexname",
        )
        .bind(table)
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }
}
