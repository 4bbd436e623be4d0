use std::str::FromStr;
use std::time::Duration;

use shelf_kernel::settings::DatabaseSettings;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};

use crate::error::DbError;

/// Create a SqlitePool with WAL mode and the configured pool bounds.
///
/// # Errors
/// Returns `DbError::Internal` if the URL is invalid, `DbError::Sqlx` if the
/// first connection cannot be opened.
#[tracing::instrument(skip(settings), fields(max = settings.max_connections))]
pub async fn create_pool(settings: &DatabaseSettings) -> Result<SqlitePool, DbError> {
    let options = SqliteConnectOptions::from_str(&settings.url)
        .map_err(|e| DbError::Internal(format!("Invalid database URL: {e}")))?
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(settings.max_connections.max(1))
        .min_connections(settings.min_connections.min(settings.max_connections))
        .idle_timeout(Duration::from_secs(settings.idle_timeout_secs))
        .connect_with(options)
        .await?;

    tracing::debug!("database pool created");
    Ok(pool)
}
