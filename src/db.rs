//! Database connection pool, migrations and key-value primitives.
//!
//! This module provides utilities for:
//! - Creating a SQLite connection pool with fully synchronous writes
//! - Running database migrations automatically
//! - Reading and writing single string values by key

use std::path::Path;
use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Pool, Sqlite};

/// Type alias for the SQLite connection pool.
pub type DbPool = Pool<Sqlite>;

/// Path value that selects an ephemeral in-memory store.
pub const IN_MEMORY: &str = ":memory:";

/// Create a new SQLite connection pool.
///
/// # Arguments
///
/// * `path` - Database file, or `:memory:` for a throwaway store
///
/// # Configuration
///
/// - WAL journal, `synchronous = FULL`: a write is on disk once it returns
/// - Missing files (and parent directories) are created
/// - In-memory stores use one connection that is never recycled, since every
///   new connection would see a fresh, empty database
///
/// # Errors
///
/// Returns an error if the file cannot be created or opened.
pub async fn create_pool(path: &str) -> Result<DbPool, sqlx::Error> {
    if path == IN_MEMORY {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        return SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await;
    }

    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Full);

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
}

/// Run database migrations from the `migrations/` directory.
///
/// Migrations are tracked in the `_sqlx_migrations` table, so each one runs only once.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Read the value stored under `key`; `None` when the slot was never written.
pub async fn get_value(pool: &DbPool, key: &str) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT value FROM kv_store WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await
}

/// Store `value` under `key`, replacing any previous value in one statement.
pub async fn set_value(pool: &DbPool, key: &str, value: &str) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO kv_store (key, value)
        VALUES (?, ?)
        ON CONFLICT (key) DO UPDATE SET value = excluded.value
        "#,
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;

    Ok(())
}
