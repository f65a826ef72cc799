//! `PostgreSQL` persistence gateway for the Open House registration backend.
//!
//! [`PgGateway`] implements every repository trait of `openhouse-core` over a
//! single connection pool. Queries are built at runtime with `sqlx::query`
//! and decoded through [`sqlx::Row`], so the crate builds without a live
//! database.
//!
//! Concurrency control lives in SQL:
//!
//! - seat counters change only through guarded `UPDATE ... WHERE` statements
//!   whose affected-row count decides the outcome
//! - a partial unique index allows one confirmed booking per (user, workshop)
//! - a unique constraint allows one check-in per (user, booth)
//!
//! # Example
//!
//! ```no_run
//! use openhouse_postgres::PgGateway;
//! use sqlx::PgPool;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = PgPool::connect("postgresql://localhost/openhouse").await?;
//! let gateway = PgGateway::new(pool);
//! gateway.migrate().await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod bookings;
mod booths;
mod users;
mod workshops;

use openhouse_core::error::{DomainError, Result};
use openhouse_core::providers::{PersistenceGateway, UnitOfWork};
use sqlx::migrate::{Migrate, MigrateError, Migrator};
use sqlx::{PgConnection, PgPool, Postgres, Transaction};

/// Embedded reversible migrations.
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// `PostgreSQL` implementation of every repository trait.
#[derive(Clone)]
pub struct PgGateway {
    pool: PgPool,
}

impl PgGateway {
    /// Create a gateway over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run database migrations.
    ///
    /// # Errors
    ///
    /// Returns error if migrations fail.
    pub async fn migrate(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await.map_err(migrate_error)?;
        tracing::info!("Database migrations applied");
        Ok(())
    }

    /// Revert the most recently applied migration.
    ///
    /// Does nothing when no migration has been applied.
    ///
    /// # Errors
    ///
    /// Returns error if the migration history cannot be read or the down
    /// script fails.
    pub async fn migrate_down(&self) -> Result<()> {
        let mut applied = self.applied_versions().await?;
        let Some(latest) = applied.pop() else {
            tracing::info!("No applied migrations to revert");
            return Ok(());
        };
        let target = applied.last().copied().unwrap_or(0);
        MIGRATOR
            .undo(&self.pool, target)
            .await
            .map_err(migrate_error)?;
        tracing::info!(version = latest, "Migration reverted");
        Ok(())
    }

    /// Revert every applied migration.
    ///
    /// # Errors
    ///
    /// Returns error if a down script fails.
    pub async fn migrate_reset(&self) -> Result<()> {
        MIGRATOR.undo(&self.pool, 0).await.map_err(migrate_error)?;
        tracing::info!("All migrations reverted");
        Ok(())
    }

    /// Versions of the applied migrations, ascending.
    async fn applied_versions(&self) -> Result<Vec<i64>> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(db_error("acquire connection"))?;
        let conn: &mut PgConnection = &mut conn;
        conn.ensure_migrations_table()
            .await
            .map_err(migrate_error)?;
        let mut versions: Vec<i64> = conn
            .list_applied_migrations()
            .await
            .map_err(migrate_error)?
            .into_iter()
            .map(|m| m.version)
            .collect();
        versions.sort_unstable();
        Ok(versions)
    }
}

/// An open `PostgreSQL` transaction.
///
/// Dropping it without [`UnitOfWork::commit`] rolls back.
pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

impl UnitOfWork for PgUnitOfWork {
    async fn commit(self) -> Result<()> {
        self.tx
            .commit()
            .await
            .map_err(db_error("commit transaction"))
    }

    async fn rollback(self) -> Result<()> {
        self.tx
            .rollback()
            .await
            .map_err(db_error("roll back transaction"))
    }
}

impl PersistenceGateway for PgGateway {
    type Tx = PgUnitOfWork;

    async fn begin(&self) -> Result<PgUnitOfWork> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("begin transaction"))?;
        Ok(PgUnitOfWork { tx })
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(db_error("ping database"))?;
        Ok(())
    }
}

#[allow(clippy::needless_pass_by_value)]
fn migrate_error(e: MigrateError) -> DomainError {
    DomainError::Database(format!("Migration failed: {e}"))
}

/// Wrap a driver error with the action that failed.
fn db_error(action: &'static str) -> impl Fn(sqlx::Error) -> DomainError {
    move |e| DomainError::Database(format!("Failed to {action}: {e}"))
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

/// Escape `LIKE` metacharacters so user input matches literally.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("robotics"), "robotics");
        assert_eq!(escape_like("100%_fun"), "100\\%\\_fun");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
    }
}
