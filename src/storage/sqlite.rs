use anyhow::{Context, Result};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};
use tracing::info;

use crate::models::{Review, ReviewKey};
use crate::storage::Storage;

pub struct SqliteStorage {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStorage {
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path).context("Failed to open SQLite database")?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();

        // comment_uri is the identity key; UNIQUE keeps one row per review
        conn.execute(
            "CREATE TABLE IF NOT EXISTS review (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                author TEXT NOT NULL,
                store TEXT NOT NULL,
                comment_uri TEXT NOT NULL UNIQUE,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        info!("Database migration completed");
        Ok(())
    }

    async fn is_known(&self, key: &ReviewKey) -> Result<bool> {
        let conn = self.conn.lock().unwrap();

        let hit: Option<i64> = conn
            .query_row(
                "SELECT id FROM review WHERE comment_uri = ?1",
                params![&key.0],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to look up review")?;

        Ok(hit.is_some())
    }

    async fn record(&self, review: &Review) -> Result<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "INSERT INTO review (author, store, comment_uri, updated_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                &review.author,
                review.store.key(),
                &review.permalink,
                review.updated_at.to_rfc3339(),
            ],
        )
        .context("Failed to insert review")?;

        Ok(())
    }
}
