use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

/// Single-connection in-memory pool; every query sees the same database.
pub async fn create_test_pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap()
}
