use crate::error::{Error, Result};
use crate::models::{ChangeEvent, ChangeStatus, Commit, TrackedFile};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use std::collections::BTreeMap;
use std::path::Path;

const SCHEMA_VERSION: i32 = 1;

/// Relational store for commits, tracked files and change events.
///
/// All writes belonging to a single commit or revert run inside one
/// transaction obtained from [`Storage::transaction`]; dropping the
/// transaction without committing rolls everything back.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        let storage = Self { conn };
        storage.initialize()?;
        Ok(storage)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let storage = Self { conn };
        storage.initialize()?;
        Ok(storage)
    }

    fn initialize(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS commits (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                message TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS files (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                path TEXT NOT NULL UNIQUE,
                hash TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                commit_id INTEGER NOT NULL,
                file_id INTEGER NOT NULL,
                status TEXT NOT NULL CHECK (status IN ('added', 'modified', 'deleted')),
                created_at TEXT NOT NULL,
                FOREIGN KEY (commit_id) REFERENCES commits(id),
                FOREIGN KEY (file_id) REFERENCES files(id)
            );

            CREATE INDEX IF NOT EXISTS idx_events_commit ON events(commit_id);
            CREATE INDEX IF NOT EXISTS idx_events_file ON events(file_id);
            CREATE INDEX IF NOT EXISTS idx_files_path ON files(path);
            "#,
        )?;

        self.conn.execute(
            "INSERT OR IGNORE INTO meta (key, value) VALUES ('schema_version', ?1)",
            params![SCHEMA_VERSION.to_string()],
        )?;
        self.conn.execute(
            "INSERT OR IGNORE INTO meta (key, value) VALUES ('head', '0')",
            [],
        )?;

        Ok(())
    }

    /// Drops all tables and recreates the empty schema.
    pub fn reset(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            DROP TABLE IF EXISTS events;
            DROP TABLE IF EXISTS files;
            DROP TABLE IF EXISTS commits;
            DROP TABLE IF EXISTS meta;
            "#,
        )?;
        self.initialize()
    }

    pub fn transaction(&self) -> Result<Transaction<'_>> {
        Ok(self.conn.unchecked_transaction()?)
    }

    pub fn vacuum(&self) -> Result<()> {
        self.conn.execute_batch("VACUUM")?;
        Ok(())
    }

    // Head pointer: the commit id the working baseline corresponds to.
    // Revert moves it backwards without touching history.

    pub fn head(&self) -> Result<i64> {
        let value: String =
            self.conn
                .query_row("SELECT value FROM meta WHERE key = 'head'", [], |row| {
                    row.get(0)
                })?;
        value
            .parse()
            .map_err(|_| Error::Integrity(format!("malformed head pointer: {value}")))
    }

    pub fn set_head(&self, commit_id: i64) -> Result<()> {
        self.conn.execute(
            "UPDATE meta SET value = ?1 WHERE key = 'head'",
            params![commit_id.to_string()],
        )?;
        Ok(())
    }

    // Commit operations

    pub fn insert_commit(&self, message: &str, created_at: DateTime<Utc>) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO commits (message, created_at) VALUES (?1, ?2)",
            params![message, created_at.to_rfc3339()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_commit(&self, id: i64) -> Result<Commit> {
        self.conn
            .query_row(
                "SELECT id, message, created_at FROM commits WHERE id = ?1",
                params![id],
                commit_from_row,
            )
            .optional()?
            .ok_or(Error::CommitNotFound(id))
    }

    /// Commits ordered newest first, optionally limited.
    pub fn list_commits(&self, limit: Option<usize>) -> Result<Vec<Commit>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, message, created_at FROM commits ORDER BY id DESC LIMIT ?1",
        )?;
        let limit = limit.map(|n| n as i64).unwrap_or(-1);

        let commits = stmt
            .query_map(params![limit], commit_from_row)?
            .collect::<rusqlite::Result<Vec<Commit>>>()?;

        Ok(commits)
    }

    pub fn commit_count(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM commits", [], |row| row.get(0))?)
    }

    // File operations

    pub fn get_file_by_path(&self, path: &str) -> Result<Option<TrackedFile>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, path, hash FROM files WHERE path = ?1",
                params![path],
                file_from_row,
            )
            .optional()?)
    }

    pub fn get_file_by_id(&self, id: i64) -> Result<TrackedFile> {
        self.conn
            .query_row(
                "SELECT id, path, hash FROM files WHERE id = ?1",
                params![id],
                file_from_row,
            )
            .optional()?
            .ok_or_else(|| Error::FileNotFound(format!("file id {id}")))
    }

    /// Creates the row for a new path, or refreshes the baseline hash of an
    /// existing one. Re-added paths reuse their original row and id.
    pub fn upsert_file(&self, path: &str, hash: &str) -> Result<i64> {
        match self.get_file_by_path(path)? {
            Some(file) => {
                self.update_file_hash(file.id, hash)?;
                Ok(file.id)
            }
            None => {
                self.conn.execute(
                    "INSERT INTO files (path, hash) VALUES (?1, ?2)",
                    params![path, hash],
                )?;
                Ok(self.conn.last_insert_rowid())
            }
        }
    }

    pub fn update_file_hash(&self, id: i64, hash: &str) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE files SET hash = ?1 WHERE id = ?2",
            params![hash, id],
        )?;
        if updated == 0 {
            return Err(Error::FileNotFound(format!("file id {id}")));
        }
        Ok(())
    }

    pub fn list_files(&self) -> Result<Vec<TrackedFile>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, path, hash FROM files ORDER BY path")?;

        let files = stmt
            .query_map([], file_from_row)?
            .collect::<rusqlite::Result<Vec<TrackedFile>>>()?;

        Ok(files)
    }

    pub fn file_count(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM files", [], |row| row.get(0))?)
    }

    // Event operations

    pub fn insert_event(
        &self,
        commit_id: i64,
        file_id: i64,
        status: ChangeStatus,
        created_at: DateTime<Utc>,
    ) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO events (commit_id, file_id, status, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![commit_id, file_id, status.as_str(), created_at.to_rfc3339()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn events_for_commit(&self, commit_id: i64) -> Result<Vec<ChangeEvent>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, commit_id, file_id, status, created_at
             FROM events WHERE commit_id = ?1 ORDER BY id",
        )?;

        let events = stmt
            .query_map(params![commit_id], event_from_row)?
            .collect::<rusqlite::Result<Vec<ChangeEvent>>>()?;

        Ok(events)
    }

    /// The most recent event for a file at or before the given commit id.
    /// `None` means the file had not yet been added at that point.
    pub fn last_event_at(&self, file_id: i64, commit_id: i64) -> Result<Option<ChangeEvent>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, commit_id, file_id, status, created_at
                 FROM events WHERE file_id = ?1 AND commit_id <= ?2
                 ORDER BY commit_id DESC, id DESC LIMIT 1",
                params![file_id, commit_id],
                event_from_row,
            )
            .optional()?)
    }

    pub fn event_count(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))?)
    }

    /// Per-status change counts of one commit, for `log` summaries.
    pub fn change_counts(&self, commit_id: i64) -> Result<(usize, usize, usize)> {
        let mut stmt = self.conn.prepare(
            "SELECT status, COUNT(*) FROM events WHERE commit_id = ?1 GROUP BY status",
        )?;

        let mut counts = (0usize, 0usize, 0usize);
        let rows = stmt.query_map(params![commit_id], |row| {
            let status: String = row.get(0)?;
            let count: i64 = row.get(1)?;
            Ok((status, count))
        })?;

        for row in rows {
            let (status, count) = row?;
            match ChangeStatus::parse(&status) {
                Some(ChangeStatus::Added) => counts.0 = count as usize,
                Some(ChangeStatus::Modified) => counts.1 = count as usize,
                Some(ChangeStatus::Deleted) => counts.2 = count as usize,
                None => {
                    return Err(Error::Integrity(format!("unknown event status: {status}")))
                }
            }
        }

        Ok(counts)
    }

    /// The baseline mapping (path -> fingerprint) implied by all events with
    /// commit id <= `head`: a file is present at its current baseline hash
    /// unless its most recent event at that point is a deletion.
    pub fn tracked_state(&self, head: i64) -> Result<BTreeMap<String, String>> {
        if head <= 0 {
            return Ok(BTreeMap::new());
        }

        let mut stmt = self.conn.prepare(
            "SELECT f.path, f.hash
             FROM files f
             JOIN events e ON e.file_id = f.id
             WHERE e.id = (
                 SELECT e2.id FROM events e2
                 WHERE e2.file_id = f.id AND e2.commit_id <= ?1
                 ORDER BY e2.commit_id DESC, e2.id DESC LIMIT 1
             )
             AND e.status != 'deleted'",
        )?;

        let mut state = BTreeMap::new();
        let rows = stmt.query_map(params![head], |row| {
            let path: String = row.get(0)?;
            let hash: String = row.get(1)?;
            Ok((path, hash))
        })?;

        for row in rows {
            let (path, hash) = row?;
            state.insert(path, hash);
        }

        Ok(state)
    }

    /// Checks the lifecycle of a proposed event against the file's history:
    /// the first event for any file must be an addition, deletions must land
    /// on a live file, and re-additions only on a deleted one.
    pub fn check_lifecycle(
        &self,
        file_id: i64,
        head: i64,
        status: ChangeStatus,
    ) -> Result<()> {
        let last = self.last_event_at(file_id, head)?;
        let live = matches!(
            last.as_ref().map(|e| e.status),
            Some(ChangeStatus::Added) | Some(ChangeStatus::Modified)
        );

        let valid = match status {
            ChangeStatus::Added => !live,
            ChangeStatus::Modified | ChangeStatus::Deleted => live,
        };

        if !valid {
            return Err(Error::Integrity(format!(
                "invalid lifecycle: {} event for file id {file_id} (last state: {})",
                status.as_str(),
                last.map(|e| e.status.as_str().to_string())
                    .unwrap_or_else(|| "untracked".to_string()),
            )));
        }

        Ok(())
    }
}

fn parse_timestamp(idx: usize, value: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                idx,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}

fn commit_from_row(row: &Row) -> rusqlite::Result<Commit> {
    let created_at: String = row.get(2)?;
    Ok(Commit {
        id: row.get(0)?,
        message: row.get(1)?,
        created_at: parse_timestamp(2, created_at)?,
    })
}

fn file_from_row(row: &Row) -> rusqlite::Result<TrackedFile> {
    Ok(TrackedFile {
        id: row.get(0)?,
        path: row.get(1)?,
        hash: row.get(2)?,
    })
}

fn event_from_row(row: &Row) -> rusqlite::Result<ChangeEvent> {
    let status: String = row.get(3)?;
    let created_at: String = row.get(4)?;
    Ok(ChangeEvent {
        id: row.get(0)?,
        commit_id: row.get(1)?,
        file_id: row.get(2)?,
        status: ChangeStatus::parse(&status).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                3,
                rusqlite::types::Type::Text,
                format!("unknown event status: {status}").into(),
            )
        })?,
        created_at: parse_timestamp(4, created_at)?,
    })
}
