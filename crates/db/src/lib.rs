//! SQLite access for shelf services: a lazily-initialised shared pool and the
//! runner for module-contributed migrations.

use std::sync::Arc;

use shelf_kernel::settings::DatabaseSettings;
use shelf_kernel::Migration;
use sqlx::sqlite::SqlitePool;
use tokio::sync::OnceCell;

pub mod error;
pub mod pool;
pub mod testing;

pub use error::{DbError, Result};
pub use pool::create_pool;

/// Process-wide database handle.
///
/// Cloning is cheap; every clone shares the same pool. The pool is opened on
/// the first call to [`Database::pool`]; concurrent first callers await the
/// same initialisation and only one pool is ever created.
#[derive(Clone)]
pub struct Database {
    settings: Arc<DatabaseSettings>,
    pool: Arc<OnceCell<SqlitePool>>,
}

impl Database {
    /// Create a handle that connects on first use.
    pub fn lazy(settings: DatabaseSettings) -> Self {
        Self {
            settings: Arc::new(settings),
            pool: Arc::new(OnceCell::new()),
        }
    }

    /// Wrap an already-open pool.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self {
            settings: Arc::new(DatabaseSettings::default()),
            pool: Arc::new(OnceCell::new_with(Some(pool))),
        }
    }

    /// Return the shared pool, opening it if this is the first use.
    pub async fn pool(&self) -> Result<&SqlitePool> {
        self.pool
            .get_or_try_init(|| async {
                tracing::info!(target: "shelf-db", "opening database pool");
                create_pool(&self.settings).await
            })
            .await
    }

    /// Close the pool if it was ever opened.
    pub async fn close(&self) {
        if let Some(pool) = self.pool.get() {
            pool.close().await;
            tracing::info!(target: "shelf-db", "database pool closed");
        }
    }
}

const MIGRATIONS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS _shelf_migrations (
        module     TEXT NOT NULL,
        id         TEXT NOT NULL,
        applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
        PRIMARY KEY (module, id)
    )
"#;

/// Apply module migrations that have not been recorded yet.
///
/// Each migration runs in its own transaction together with its bookkeeping
/// row. Returns the number of migrations applied.
#[tracing::instrument(skip_all, fields(count = migrations.len()))]
pub async fn apply_migrations(
    pool: &SqlitePool,
    migrations: &[(String, Migration)],
) -> Result<usize> {
    sqlx::query(MIGRATIONS_TABLE).execute(pool).await?;

    let mut applied = 0;
    for (module, migration) in migrations {
        let exists: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM _shelf_migrations WHERE module = ?1 AND id = ?2")
                .bind(module)
                .bind(migration.id)
                .fetch_optional(pool)
                .await?;
        if exists.is_some() {
            continue;
        }

        let wrap = |source: sqlx::Error| DbError::Migration {
            module: module.clone(),
            id: migration.id.to_string(),
            source,
        };

        let mut tx = pool.begin().await?;
        sqlx::raw_sql(migration.up)
            .execute(&mut *tx)
            .await
            .map_err(wrap)?;
        sqlx::query("INSERT INTO _shelf_migrations (module, id) VALUES (?1, ?2)")
            .bind(module)
            .bind(migration.id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!(module = %module, id = migration.id, "applied migration");
        applied += 1;
    }

    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn migrations() -> Vec<(String, Migration)> {
        vec![(
            "books".to_string(),
            Migration {
                id: "001_init",
                up: "CREATE TABLE things (id INTEGER PRIMARY KEY); CREATE INDEX things_id ON things (id);",
            },
        )]
    }

    #[tokio::test]
    async fn migrations_apply_once() {
        let pool = testing::create_test_pool().await;

        assert_eq!(apply_migrations(&pool, &migrations()).await.unwrap(), 1);
        assert_eq!(apply_migrations(&pool, &migrations()).await.unwrap(), 0);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM things")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn failed_migration_is_not_recorded() {
        let pool = testing::create_test_pool().await;
        let broken = vec![(
            "books".to_string(),
            Migration {
                id: "001_broken",
                up: "CREATE TABLE (",
            },
        )];

        let err = apply_migrations(&pool, &broken).await.unwrap_err();
        assert!(matches!(err, DbError::Migration { ref id, .. } if id == "001_broken"));

        let recorded: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _shelf_migrations")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(recorded, 0);
    }

    #[tokio::test]
    async fn lazy_handle_connects_on_first_use() {
        let db = Database::lazy(DatabaseSettings {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            ..DatabaseSettings::default()
        });
        assert!(!db.pool.initialized());

        let other = db.clone();
        let (a, b) = tokio::join!(db.pool(), other.pool());
        let (a, b) = (a.unwrap(), b.unwrap());
        assert!(std::ptr::eq(a, b));
        assert!(db.pool.initialized());
    }

    #[tokio::test]
    async fn from_pool_is_already_initialized() {
        let db = Database::from_pool(testing::create_test_pool().await);
        assert!(db.pool.initialized());
        db.close().await;
    }
}
