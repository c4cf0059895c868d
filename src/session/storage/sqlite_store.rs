//! `SQLite`-backed durable store.

use chrono::Utc;
use rusqlite::OptionalExtension;
use tokio_rusqlite::Connection;

use crate::session::core::config::StorageConfig;
use crate::session::core::errors::{SessionError, SessionResult};
use crate::session::storage::durable_store::{DurableStore, StoreFuture};

/// `SQLite` implementation of [`DurableStore`].
pub struct SqliteKvStore {
    conn: Connection,
    table: String,
}

impl SqliteKvStore {
    /// Open (or create) the database file named in the config.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened.
    pub async fn new(config: &StorageConfig) -> SessionResult<Self> {
        let conn = Connection::open(&config.sqlite_path).await?;
        Self::with_connection(conn, &config.table).await
    }

    /// Open a private in-memory database.
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub async fn in_memory(table: &str) -> SessionResult<Self> {
        let conn = Connection::open_in_memory().await?;
        Self::with_connection(conn, table).await
    }

    async fn with_connection(conn: Connection, table: &str) -> SessionResult<Self> {
        if table.is_empty() || !table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(SessionError::InvalidConfig(format!(
                "invalid table name: {table}"
            )));
        }
        let table = table.to_string();
        let table_name = table.clone();

        conn.call(move |conn| {
            conn.execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS {table_name} (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL,
                    updated_at INTEGER NOT NULL
                )"
            ))?;
            Ok(())
        })
        .await?;

        Ok(Self { conn, table })
    }
}

impl DurableStore for SqliteKvStore {
    fn save<'a>(&'a self, key: &'a str, value: String) -> StoreFuture<'a, SessionResult<()>> {
        Box::pin(async move {
            let table = self.table.clone();
            let key = key.to_string();
            let updated_at = Utc::now().timestamp_millis();

            self.conn
                .call(move |conn| {
                    conn.execute(
                        &format!(
                            "INSERT OR REPLACE INTO {table} (key, value, updated_at)
                             VALUES (?1, ?2, ?3)"
                        ),
                        rusqlite::params![key, value, updated_at],
                    )?;
                    Ok(())
                })
                .await?;
            Ok(())
        })
    }

    fn load<'a>(&'a self, key: &'a str) -> StoreFuture<'a, SessionResult<Option<String>>> {
        Box::pin(async move {
            let table = self.table.clone();
            let key = key.to_string();

            let value = self
                .conn
                .call(move |conn| {
                    let row = conn
                        .query_row(
                            &format!("SELECT value FROM {table} WHERE key = ?1"),
                            rusqlite::params![key],
                            |row| row.get::<_, String>(0),
                        )
                        .optional()?;
                    Ok(row)
                })
                .await?;
            Ok(value)
        })
    }
}
