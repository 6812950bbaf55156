//! Entry database operations
//!
//! sqlx implementation of [`EntryStore`] over the shared SQLite pool.
//! List-valued metadata columns hold JSON arrays.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::error::SyncResult;
use crate::store::{EntryRow, EntryStore, NewEntryRow};
use tks_common::Error;

const SELECT_COLUMNS: &str = "guid, title, api, keywords, topics, errors, checksum, \
                              github_id, github_url, date_created, date_updated";

/// sqlx-backed entry store.
pub struct SqliteEntryStore {
    pool: SqlitePool,
}

impl SqliteEntryStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn decode_list(raw: String) -> Vec<String> {
    serde_json::from_str(&raw).unwrap_or_else(|_| Vec::new())
}

fn encode_list(values: &[String]) -> String {
    serde_json::to_string(values).unwrap_or_else(|_| "[]".to_string())
}

fn decode_row(row: SqliteRow) -> EntryRow {
    EntryRow {
        guid: row.get("guid"),
        title: row.get("title"),
        api: row.get("api"),
        keywords: decode_list(row.get("keywords")),
        topics: decode_list(row.get("topics")),
        errors: decode_list(row.get("errors")),
        checksum: row.get("checksum"),
        github_id: row.get("github_id"),
        github_url: row.get("github_url"),
        date_created: row.get("date_created"),
        date_updated: row.get("date_updated"),
    }
}

#[async_trait]
impl EntryStore for SqliteEntryStore {
    async fn find_by_checksum(&self, checksum: &str) -> SyncResult<Option<EntryRow>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM troubleshooting_entries WHERE checksum = ? LIMIT 1",
            SELECT_COLUMNS
        ))
        .bind(checksum)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(decode_row))
    }

    async fn find_by_id(&self, id: &str) -> SyncResult<EntryRow> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM troubleshooting_entries WHERE guid = ?",
            SELECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(decode_row(row)),
            None => Err(Error::NotFound(format!("entry row {}", id)).into()),
        }
    }

    async fn insert(&self, new: &NewEntryRow) -> SyncResult<String> {
        let guid = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO troubleshooting_entries
                (guid, title, api, keywords, topics, errors, checksum,
                 github_id, github_url, date_created, date_updated)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&guid)
        .bind(&new.title)
        .bind(new.api.as_deref())
        .bind(encode_list(&new.keywords))
        .bind(encode_list(&new.topics))
        .bind(encode_list(&new.errors))
        .bind(&new.checksum)
        .bind(&new.github_id)
        .bind(&new.github_url)
        .bind(&new.date_created)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        tracing::debug!(guid = %guid, checksum = %new.checksum, "Inserted entry row");

        Ok(guid)
    }

    async fn update_checksum(&self, id: &str, checksum: &str) -> SyncResult<()> {
        let result = sqlx::query(
            "UPDATE troubleshooting_entries \
             SET checksum = ?, date_updated = ? \
             WHERE guid = ?",
        )
        .bind(checksum)
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("entry row {}", id)).into());
        }

        tracing::debug!(guid = %id, checksum = %checksum, "Updated entry checksum");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_store() -> SqliteEntryStore {
        let pool = SqlitePool::connect(":memory:")
            .await
            .expect("Failed to create in-memory database");
        tks_common::db::init::create_entries_table(&pool)
            .await
            .unwrap();
        SqliteEntryStore::new(pool)
    }

    fn sample_row(checksum: &str) -> NewEntryRow {
        NewEntryRow {
            title: "Connection refused".to_string(),
            api: Some("gateway".to_string()),
            keywords: vec!["network".to_string(), "port".to_string()],
            topics: vec!["connectivity".to_string()],
            errors: vec!["ECONNREFUSED".to_string()],
            checksum: checksum.to_string(),
            github_id: "D_0001".to_string(),
            github_url: "https://github.com/example/help/discussions/1".to_string(),
            date_created: "2024-05-01".to_string(),
        }
    }

    #[tokio::test]
    async fn insert_and_find_by_checksum() {
        let store = setup_store().await;

        let guid = store.insert(&sample_row("abc123")).await.unwrap();

        let found = store
            .find_by_checksum("abc123")
            .await
            .unwrap()
            .expect("row not found");
        assert_eq!(found.guid, guid);
        assert_eq!(found.title, "Connection refused");
        assert_eq!(found.keywords, vec!["network", "port"]);
        assert_eq!(found.github_id.as_deref(), Some("D_0001"));
    }

    #[tokio::test]
    async fn find_by_checksum_misses_cleanly() {
        let store = setup_store().await;
        assert!(store.find_by_checksum("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn find_by_id_round_trip() {
        let store = setup_store().await;
        let guid = store.insert(&sample_row("abc123")).await.unwrap();

        let found = store.find_by_id(&guid).await.unwrap();
        assert_eq!(found.checksum, "abc123");
        assert_eq!(found.errors, vec!["ECONNREFUSED"]);
    }

    #[tokio::test]
    async fn find_by_id_reports_missing_row() {
        let store = setup_store().await;
        let result = store.find_by_id("missing").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn update_checksum_touches_timestamp() {
        let store = setup_store().await;
        let guid = store.insert(&sample_row("old")).await.unwrap();
        let before = store.find_by_id(&guid).await.unwrap();

        store.update_checksum(&guid, "new").await.unwrap();

        let after = store.find_by_id(&guid).await.unwrap();
        assert_eq!(after.checksum, "new");
        assert!(after.date_updated >= before.date_updated);
    }

    #[tokio::test]
    async fn update_checksum_reports_missing_row() {
        let store = setup_store().await;
        assert!(store.update_checksum("missing", "new").await.is_err());
    }
}
