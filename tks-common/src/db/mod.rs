//! Database access shared by TKS tools

pub mod init;

use crate::Result;
use sqlx::SqlitePool;
use std::path::Path;

/// Open (creating if needed) the entry database and bootstrap its schema.
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // Use proper SQLite URI with mode=rwc (read, write, create)
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;

    init::create_entries_table(&pool).await?;

    Ok(pool)
}
