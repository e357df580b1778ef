use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status a file can take within a single commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeStatus {
    Added,
    Modified,
    Deleted,
}

impl ChangeStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ChangeStatus::Added => "added",
            ChangeStatus::Modified => "modified",
            ChangeStatus::Deleted => "deleted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "added" => Some(ChangeStatus::Added),
            "modified" => Some(ChangeStatus::Modified),
            "deleted" => Some(ChangeStatus::Deleted),
            _ => None,
        }
    }
}

/// An immutable snapshot record. Ids are assigned by SQLite on insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    pub id: i64,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// A path that has been seen by at least one commit. The row survives the
/// on-disk file: deletion is recorded as an event, never by dropping the row.
/// `hash` is the baseline fingerprint the next scan is diffed against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedFile {
    pub id: i64,
    pub path: String,
    pub hash: String,
}

/// One (commit, file) change record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub id: i64,
    pub commit_id: i64,
    pub file_id: i64,
    pub status: ChangeStatus,
    pub created_at: DateTime<Utc>,
}

/// A commit plus the per-status change counts, as shown by `log`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitInfo {
    pub commit: Commit,
    pub added: usize,
    pub modified: usize,
    pub deleted: usize,
}

impl CommitInfo {
    pub fn total_changes(&self) -> usize {
        self.added + self.modified + self.deleted
    }
}

/// Full per-path breakdown of a commit, as shown by `show`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitDetails {
    pub commit: Commit,
    pub added: Vec<String>,
    pub modified: Vec<String>,
    pub deleted: Vec<String>,
}

impl CommitDetails {
    pub fn total_changes(&self) -> usize {
        self.added.len() + self.modified.len() + self.deleted.len()
    }
}
