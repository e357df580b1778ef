use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("No changes to commit")]
    NoChanges,

    #[error("Commit message cannot be empty")]
    EmptyMessage,

    #[error("Commit not found: {0}")]
    CommitNotFound(i64),

    #[error("Tracked file not found: {0}")]
    FileNotFound(String),

    #[error("Backup blob missing for commit {commit_id}: {path}")]
    BackupMissing { commit_id: i64, path: String },

    #[error("Integrity violation: {0}")]
    Integrity(String),

    #[error("Not a chronotrack repository: {0}")]
    NotInitialized(PathBuf),

    #[error("Repository already initialized at: {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Path is outside the repository root: {0}")]
    OutsideRoot(PathBuf),
}
