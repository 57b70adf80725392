//! Statement executor.
//!
//! Runs compiled statements against PostgreSQL, strictly in order. The
//! first failing statement stops the run; errors come straight from the
//! database and are not reinterpreted.

use sqlx::postgres::PgPool;
use tracing::{debug, info};

use crate::error::Result;
use crate::loader::CompiledBlueprint;

/// Executes compiled blueprints on a connection pool.
pub struct PgExecutor {
    pool: PgPool,
}

impl PgExecutor {
    /// Creates a new executor.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns the pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Executes one statement.
    pub async fn execute(&self, sql: &str) -> Result<()> {
        debug!(sql = %sql, "Executing SQL");
        sqlx::query(sql).execute(&self.pool).await?;
        Ok(())
    }

    /// Applies one compiled blueprint.
    pub async fn apply(&self, compiled: &CompiledBlueprint) -> Result<()> {
        info!(
            table = %compiled.table,
            source = %compiled.source.display(),
            "Applying blueprint"
        );
        for sql in &compiled.statements {
            self.execute(sql).await?;
        }
        Ok(())
    }

    /// Applies blueprints in order and returns the number of statements run.
    pub async fn apply_all(&self, compiled: &[CompiledBlueprint]) -> Result<usize> {
        let mut count = 0;
        for blueprint in compiled {
            self.apply(blueprint).await?;
            count += blueprint.statements.len();
        }
        info!(statements = count, "Blueprints applied successfully");
        Ok(count)
    }
}
