use crate::domain::errors::{LockError, LockResult};
use crate::domain::ports::lock_store::LockStore;
use crate::infrastructure::persistence::Database;
use async_trait::async_trait;
use chrono::{DateTime, Datelike, SecondsFormat, Utc};

/// Lock store over a `distributed_locks` table.
///
/// A row whose `expires_at` is in the past counts as absent: acquire takes it
/// over and release ignores it.
#[derive(Clone)]
pub struct DatabaseLockStore {
    db: Database,
}

impl DatabaseLockStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn ensure_schema(&self) -> LockResult<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS distributed_locks (
                key TEXT PRIMARY KEY,
                owner TEXT NOT NULL,
                expires_at TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
        )
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    /// Delete rows whose TTL has passed. Returns the number removed.
    pub async fn purge_expired(&self) -> LockResult<u64> {
        let result = sqlx::query("DELETE FROM distributed_locks WHERE expires_at < ?")
            .bind(timestamp(Utc::now()))
            .execute(self.db.pool())
            .await?;

        let purged = result.rows_affected();
        if purged > 0 {
            tracing::debug!(purged, "Purged expired lock rows");
        }
        Ok(purged)
    }
}

/// `now + ttl_seconds`, limited to years that keep `timestamp` fixed-width
fn expiry(now: DateTime<Utc>, ttl_seconds: u64) -> LockResult<DateTime<Utc>> {
    i64::try_from(ttl_seconds)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .filter(|expires_at| expires_at.year() <= 9999)
        .ok_or(LockError::InvalidTtl(ttl_seconds))
}

/// Fixed-width RFC 3339 so that string comparison orders by time
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[async_trait]
impl LockStore for DatabaseLockStore {
    async fn set_if_absent_with_expiry(
        &self,
        key: &str,
        value: &str,
        ttl_seconds: u64,
    ) -> LockResult<bool> {
        let now = Utc::now();
        let expires_at = expiry(now, ttl_seconds)?;

        // Insert, or take over a row that has already expired
        let query = r#"
            INSERT INTO distributed_locks (key, owner, expires_at, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                owner = excluded.owner,
                expires_at = excluded.expires_at,
                created_at = excluded.created_at
            WHERE distributed_locks.expires_at < ?
        "#;

        let result = sqlx::query(query)
            .bind(key)
            .bind(value)
            .bind(timestamp(expires_at))
            .bind(timestamp(now)) // created_at
            .bind(timestamp(now)) // WHERE expires_at < now
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn compare_and_delete(&self, key: &str, expected: &str) -> LockResult<bool> {
        let query = "DELETE FROM distributed_locks WHERE key = ? AND owner = ? AND expires_at >= ?";
        let result = sqlx::query(query)
            .bind(key)
            .bind(expected)
            .bind(timestamp(Utc::now()))
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
