use std::path::Path;

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteSynchronous};
use sqlx::Row;
use tracing::{debug, info};

/// Marker stored next to every recorded fingerprint.
pub const SEEN_MARKER: i64 = 1;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Durable, grow-only set of content fingerprints that were already notified.
///
/// The store holds a single connection: one process owns the database for the
/// duration of a run. Overlapping runs against the same file are not supported.
pub struct SeenStore {
    pool: SqlitePool,
}

impl SeenStore {
    /// Open (or create) the store at `path` and make sure the schema exists.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .synchronous(SqliteSynchronous::Full);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.setup_schema().await?;

        info!("Opened seen store at {}", path.display());
        Ok(store)
    }

    async fn setup_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS seen_entries (
                content_hash TEXT PRIMARY KEY,
                marker INTEGER NOT NULL,
                recorded_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Check whether a fingerprint was recorded by an earlier run.
    pub async fn contains(&self, content_hash: &str) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM seen_entries WHERE content_hash = ?1")
            .bind(content_hash)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get::<i64, _>("count") > 0)
    }

    /// Record every fingerprint in one transaction.
    ///
    /// Nothing is visible to later runs unless the whole batch commits.
    /// Fingerprints that are already present are left untouched. Returns the
    /// number of newly recorded fingerprints.
    pub async fn record_all(&self, content_hashes: &[String]) -> Result<u64, StoreError> {
        if content_hashes.is_empty() {
            return Ok(0);
        }

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for content_hash in content_hashes {
            let result = sqlx::query(
                r#"
                INSERT OR IGNORE INTO seen_entries (content_hash, marker, recorded_at)
                VALUES (?1, ?2, ?3)
                "#,
            )
            .bind(content_hash)
            .bind(SEEN_MARKER)
            .bind(now)
            .execute(&mut *tx)
            .await?;
            inserted += result.rows_affected();
        }

        tx.commit().await?;
        debug!("Committed {} new fingerprints ({} offered)", inserted, content_hashes.len());
        Ok(inserted)
    }

    pub async fn len(&self) -> Result<u64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM seen_entries")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get::<i64, _>("count") as u64)
    }

    pub async fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len().await? == 0)
    }

    /// Flush and close the underlying connection.
    pub async fn close(self) {
        self.pool.close().await;
    }
}
