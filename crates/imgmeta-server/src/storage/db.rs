//! SQLite storage for image metadata.

use anyhow::{Context, Result};
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

/// A single stored image-metadata entry.
///
/// Field names serialize in PascalCase to match the wire format
/// (`FileName`, `Description`, `UploadTime`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "PascalCase")]
pub struct ImageRecord {
    pub file_name: String,
    pub description: String,
    pub upload_time: String,
}

pub struct Database {
    pool: SqlitePool,
    table: String,
}

impl Database {
    /// Opens (creating if missing) the SQLite database at `path` and makes
    /// sure the metadata table exists.
    ///
    /// `table` is trusted operator configuration. It is interpolated into
    /// statement text and must never be taken from request data.
    pub async fn new(path: &str, table: &str) -> Result<Self> {
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.with_context(|| {
                    format!("Failed to create database directory: {}", parent.display())
                })?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to connect to SQLite database at: {}", path))?;

        let db = Self {
            pool,
            table: table.to_string(),
        };
        db.ensure_table()
            .await
            .with_context(|| format!("Failed to create table: {}", table))?;

        Ok(db)
    }

    /// Three text columns and nothing else: no key, no indexes, no
    /// constraints. An existing table with a different shape is left alone
    /// and fails at first insert or select instead.
    async fn ensure_table(&self) -> Result<(), sqlx::Error> {
        let statement = format!(
            "CREATE TABLE IF NOT EXISTS {} (FileName TEXT, Description TEXT, UploadTime TEXT)",
            self.table
        );
        sqlx::query(&statement).execute(&self.pool).await?;
        Ok(())
    }

    /// Appends one row. The caller must have assigned `upload_time` before
    /// this call. No transaction, no retry; a failed write is surfaced
    /// as-is.
    pub async fn insert(&self, record: &ImageRecord) -> Result<(), sqlx::Error> {
        let statement = format!(
            "INSERT INTO {} (FileName, Description, UploadTime) VALUES (?1, ?2, ?3)",
            self.table
        );
        sqlx::query(&statement)
            .bind(&record.file_name)
            .bind(&record.description)
            .bind(&record.upload_time)
            .execute(&self.pool)
            .await?;

        tracing::info!(
            "added image: file_name={} description={} upload_time={}",
            record.file_name,
            record.description,
            record.upload_time
        );

        Ok(())
    }

    /// Returns every stored record, in whatever order SQLite yields them.
    /// An empty table yields an empty vec, not an error.
    pub async fn list_all(&self) -> Result<Vec<ImageRecord>, sqlx::Error> {
        let statement = format!(
            "SELECT FileName AS file_name, Description AS description, UploadTime AS upload_time FROM {}",
            self.table
        );
        let records: Vec<ImageRecord> = sqlx::query_as(&statement).fetch_all(&self.pool).await?;

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_db_path(name: &str) -> String {
        let dir = std::env::temp_dir().join(format!(
            "imgmeta_db_{}_{}",
            name,
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir.join("images.db").to_string_lossy().to_string()
    }

    fn record(file_name: &str, description: &str) -> ImageRecord {
        ImageRecord {
            file_name: file_name.to_string(),
            description: description.to_string(),
            upload_time: "2024-05-01T09:30:00+0000".to_string(),
        }
    }

    #[tokio::test]
    async fn test_empty_table_lists_nothing() {
        let path = temp_db_path("empty");
        let db = Database::new(&path, "images").await.unwrap();

        let records = db.list_all().await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_insert_then_list() {
        let path = temp_db_path("roundtrip");
        let db = Database::new(&path, "images").await.unwrap();

        db.insert(&record("cat.png", "a cat")).await.unwrap();

        let records = db.list_all().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0], record("cat.png", "a cat"));
    }

    #[tokio::test]
    async fn test_duplicate_records_both_stored() {
        let path = temp_db_path("dupes");
        let db = Database::new(&path, "images").await.unwrap();

        db.insert(&record("cat.png", "a cat")).await.unwrap();
        db.insert(&record("cat.png", "a cat")).await.unwrap();

        let records = db.list_all().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], records[1]);
    }

    #[tokio::test]
    async fn test_configured_table_name_is_used() {
        let path = temp_db_path("table_name");
        let db = Database::new(&path, "pictures").await.unwrap();

        db.insert(&record("dog.png", "a dog")).await.unwrap();

        let records = db.list_all().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].file_name, "dog.png");
    }

    #[tokio::test]
    async fn test_mismatched_table_fails_at_first_use() {
        let path = temp_db_path("mismatch");

        // Pre-create the table with the wrong shape.
        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .unwrap();
        sqlx::query("CREATE TABLE images (OnlyColumn TEXT)")
            .execute(&pool)
            .await
            .unwrap();
        pool.close().await;

        // Opening still succeeds; the mismatch surfaces on insert.
        let db = Database::new(&path, "images").await.unwrap();
        assert!(db.insert(&record("cat.png", "a cat")).await.is_err());
    }
}
