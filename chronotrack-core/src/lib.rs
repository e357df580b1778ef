//! # chronotrack-core
//!
//! Core library for chronotrack - a single-user, local version tracker.
//!
//! A snapshot of the working tree is recorded as a commit: the tree is
//! walked, every non-ignored file is fingerprinted, and the resulting map
//! is diffed against the baseline of the previous commit. Changed contents
//! are copied into a backup area so any prior commit can be restored.

pub mod backup;
pub mod config;
pub mod error;
pub mod hash;
pub mod ignore;
pub mod models;
pub mod repo;
pub mod storage;
pub mod tracker;

pub use backup::BackupArea;
pub use config::RepoConfig;
pub use error::{Error, Result};
pub use ignore::IgnoreMatcher;
pub use models::{ChangeEvent, ChangeStatus, Commit, CommitDetails, CommitInfo, TrackedFile};
pub use repo::{RepoStats, Repository, RevertOutcome, RevertPlan, StatusReport};
pub use storage::Storage;
pub use tracker::{detect_changes, scan, ChangeSet, ScanOutcome, SkippedFile};
