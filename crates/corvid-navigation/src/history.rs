//! History management

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension;
use serde::{Deserialize, Serialize};

use crate::Result;
use corvid_storage::Database;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub visited_at: DateTime<Utc>,
    pub visit_count: i32,
}

/// Where visited pages are recorded.
pub trait HistoryStore: Send + Sync {
    /// Record a visit to a URL
    fn record_visit(&self, url: &str, title: &str) -> Result<()>;

    /// Update the stored title for a URL without incrementing visit count.
    fn update_title(&self, url: &str, title: &str) -> Result<()>;

    /// Most recent entries first
    fn recent(&self, limit: usize) -> Result<Vec<HistoryEntry>>;

    fn clear(&self) -> Result<()>;
}

/// SQLite-backed history.
pub struct HistoryManager {
    db: Database,
}

impl HistoryManager {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl HistoryStore for HistoryManager {
    fn record_visit(&self, url: &str, title: &str) -> Result<()> {
        if url.trim().is_empty() {
            return Ok(());
        }

        Ok(self.db.transaction(|conn| {
            let existing: Option<i64> = conn
                .query_row("SELECT id FROM history WHERE url = ?1", [url], |row| {
                    row.get(0)
                })
                .optional()?;

            if let Some(id) = existing {
                conn.execute(
                    "UPDATE history
                     SET title = CASE WHEN ?1 != '' THEN ?1 ELSE title END,
                         visited_at = ?2,
                         visit_count = visit_count + 1
                     WHERE id = ?3",
                    rusqlite::params![title, Utc::now().to_rfc3339(), id],
                )?;
            } else {
                conn.execute(
                    "INSERT INTO history (url, title, visited_at, visit_count) VALUES (?1, ?2, ?3, 1)",
                    rusqlite::params![url, title, Utc::now().to_rfc3339()],
                )?;
            }

            Ok(())
        })?)
    }

    fn update_title(&self, url: &str, title: &str) -> Result<()> {
        if title.trim().is_empty() {
            return Ok(());
        }

        Ok(self.db.with_connection(|conn| {
            conn.execute(
                "UPDATE history SET title = ?1 WHERE url = ?2",
                rusqlite::params![title, url],
            )?;
            Ok(())
        })?)
    }

    fn recent(&self, limit: usize) -> Result<Vec<HistoryEntry>> {
        Ok(self.db.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, url, title, visited_at, visit_count FROM history
                 ORDER BY visited_at DESC, id DESC
                 LIMIT ?1",
            )?;

            let entries: Vec<HistoryEntry> = stmt
                .query_map([limit as i64], |row| {
                    let visited_str: String = row.get(3)?;
                    let visited_at = DateTime::parse_from_rfc3339(&visited_str)
                        .map(|dt| dt.with_timezone(&Utc))
                        .unwrap_or_else(|_| Utc::now());

                    Ok(HistoryEntry {
                        id: row.get(0)?,
                        url: row.get(1)?,
                        title: row.get(2)?,
                        visited_at,
                        visit_count: row.get(4)?,
                    })
                })?
                .filter_map(|r| r.ok())
                .collect();

            Ok(entries)
        })?)
    }

    fn clear(&self) -> Result<()> {
        Ok(self.db.with_connection(|conn| {
            conn.execute("DELETE FROM history", [])?;
            Ok(())
        })?)
    }
}

impl Clone for HistoryManager {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
        }
    }
}

/// History for anonymous mode: nothing is recorded.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnonymousHistory;

impl HistoryStore for AnonymousHistory {
    fn record_visit(&self, _url: &str, _title: &str) -> Result<()> {
        Ok(())
    }

    fn update_title(&self, _url: &str, _title: &str) -> Result<()> {
        Ok(())
    }

    fn recent(&self, _limit: usize) -> Result<Vec<HistoryEntry>> {
        Ok(Vec::new())
    }

    fn clear(&self) -> Result<()> {
        Ok(())
    }
}
