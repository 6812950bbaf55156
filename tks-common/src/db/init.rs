//! Schema bootstrap
//!
//! Tables are created on demand with `CREATE TABLE IF NOT EXISTS` so a fresh
//! database file and an already-populated one go through the same path.

use crate::Result;
use sqlx::SqlitePool;

/// Create the troubleshooting entries table and its checksum lookup index.
///
/// `checksum` is the dedup key for "does this content already exist";
/// list-valued metadata (keywords, topics, errors) is stored as JSON-array
/// text columns.
pub async fn create_entries_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS troubleshooting_entries (
            guid TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            api TEXT,
            keywords TEXT NOT NULL DEFAULT '[]',
            topics TEXT NOT NULL DEFAULT '[]',
            errors TEXT NOT NULL DEFAULT '[]',
            checksum TEXT NOT NULL,
            github_id TEXT,
            github_url TEXT,
            date_created TEXT NOT NULL,
            date_updated TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_troubleshooting_entries_checksum \
         ON troubleshooting_entries(checksum)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_schema_idempotently() {
        let pool = SqlitePool::connect(":memory:")
            .await
            .expect("Failed to create in-memory database");

        create_entries_table(&pool).await.unwrap();
        // Second call must be a no-op, not an error
        create_entries_table(&pool).await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM troubleshooting_entries")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
