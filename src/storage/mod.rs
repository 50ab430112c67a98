//! Record Store: a single `data` table in SQLite.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Row, SqlitePool,
};
use std::{str::FromStr, time::Duration};
use tracing::{info, info_span, Instrument};
use utoipa::ToSchema;

const SAMPLE_RECORDS: [(&str, &str); 3] = [
    ("Sample Entry 1", "This is the first sample entry"),
    ("Sample Entry 2", "This is the second sample entry"),
    ("Sample Entry 3", "This is the third sample entry"),
];

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub created_at: String,
}

fn record_from_row(row: &SqliteRow) -> Record {
    Record {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        created_at: row.get("created_at"),
    }
}

/// Open a pool for `dsn`, creating the database file if missing.
///
/// # Errors
/// Returns an error if the DSN is invalid or the database cannot be opened.
pub async fn connect(dsn: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(dsn)
        .with_context(|| format!("Invalid database DSN: {dsn}"))?
        .create_if_missing(true);

    // In-memory databases live and die with their connection, so keep exactly one alive.
    let in_memory = dsn.contains(":memory:") || dsn.contains("mode=memory");
    let pool_options = if in_memory {
        SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(5)
            .max_lifetime(Duration::from_secs(60 * 2))
    };

    pool_options
        .test_before_acquire(true)
        .connect_with(options)
        .await
        .context("Failed to connect to database")
}

/// Create the schema and seed sample records into an empty table.
///
/// # Errors
/// Returns an error if any statement fails.
pub async fn init(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r"CREATE TABLE IF NOT EXISTS data (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            description TEXT,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create data table")?;

    let count: i64 = sqlx::query("SELECT COUNT(*) AS count FROM data")
        .fetch_one(pool)
        .await
        .context("Failed to count records")?
        .get("count");

    if count == 0 {
        let mut tx = pool.begin().await?;
        for (title, description) in SAMPLE_RECORDS {
            sqlx::query("INSERT INTO data (title, description) VALUES (?, ?)")
                .bind(title)
                .bind(description)
                .execute(&mut *tx)
                .await
                .context("Failed to seed sample records")?;
        }
        tx.commit().await?;
        info!("Seeded {} sample records", SAMPLE_RECORDS.len());
    }

    Ok(())
}

/// All records, newest first.
///
/// # Errors
/// Returns an error if the query fails.
pub async fn list_records(pool: &SqlitePool) -> Result<Vec<Record>> {
    let span = info_span!("db.query", db.system = "sqlite", db.operation = "SELECT");
    let rows = sqlx::query(
        "SELECT id, title, description, CAST(created_at AS TEXT) AS created_at \
         FROM data ORDER BY created_at DESC, id DESC",
    )
    .fetch_all(pool)
    .instrument(span)
    .await
    .context("Failed to list records")?;

    Ok(rows.iter().map(record_from_row).collect())
}

/// # Errors
/// Returns an error if the query fails.
pub async fn get_record(pool: &SqlitePool, id: i64) -> Result<Option<Record>> {
    let row = sqlx::query(
        "SELECT id, title, description, CAST(created_at AS TEXT) AS created_at \
         FROM data WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to fetch record")?;

    Ok(row.as_ref().map(record_from_row))
}

/// Insert a record and return its id.
///
/// # Errors
/// Returns an error if the insert fails.
pub async fn create_record(pool: &SqlitePool, title: &str, description: &str) -> Result<i64> {
    let result = sqlx::query("INSERT INTO data (title, description) VALUES (?, ?)")
        .bind(title)
        .bind(description)
        .execute(pool)
        .await
        .context("Failed to create record")?;

    Ok(result.last_insert_rowid())
}

/// Returns `false` when no record has this id.
///
/// # Errors
/// Returns an error if the update fails.
pub async fn update_record(
    pool: &SqlitePool,
    id: i64,
    title: &str,
    description: &str,
) -> Result<bool> {
    let result = sqlx::query("UPDATE data SET title = ?, description = ? WHERE id = ?")
        .bind(title)
        .bind(description)
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update record")?;

    Ok(result.rows_affected() > 0)
}

/// Returns `false` when no record has this id.
///
/// # Errors
/// Returns an error if the delete fails.
pub async fn delete_record(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM data WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete record")?;

    Ok(result.rows_affected() > 0)
}
