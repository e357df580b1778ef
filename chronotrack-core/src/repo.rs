use crate::backup::BackupArea;
use crate::config::RepoConfig;
use crate::error::{Error, Result};
use crate::hash::fingerprint_bytes;
use crate::models::{ChangeStatus, Commit, CommitDetails, CommitInfo, TrackedFile};
use crate::storage::Storage;
use crate::tracker::{self, ChangeSet, SkippedFile};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

const CHRONO_DIR: &str = ".chrono";
const DB_FILE: &str = "chrono.db";
const CONFIG_FILE: &str = "config.json";
const BACKUPS_DIR: &str = "backups";
const EMERGENCY_KEEP: usize = 5;

/// Working-tree state relative to the last commit.
#[derive(Debug)]
pub struct StatusReport {
    pub changes: ChangeSet,
    pub skipped: Vec<SkippedFile>,
}

/// One file restore step of a revert: which commit's blob brings the file
/// back to its state as of the target.
#[derive(Debug, Clone)]
pub struct RestoreEntry {
    pub file_id: i64,
    pub path: String,
    pub blob_commit: i64,
}

#[derive(Debug, Clone)]
pub struct RevertPlan {
    pub target: Commit,
    pub restore: Vec<RestoreEntry>,
    pub remove: Vec<String>,
}

#[derive(Debug)]
pub struct RevertOutcome {
    pub target: Commit,
    pub restored: Vec<String>,
    pub removed: Vec<String>,
    pub emergency_backup: PathBuf,
}

#[derive(Debug, Clone)]
pub struct RepoStats {
    pub commits: i64,
    pub files: i64,
    pub events: i64,
    pub database_size: u64,
    pub backup_size: u64,
    pub root: PathBuf,
}

/// The repository facade: composes the snapshotter, the record store and the
/// backup area behind the command set the CLI drives.
pub struct Repository {
    root: PathBuf,
    config: RepoConfig,
    storage: Storage,
    backups: BackupArea,
}

impl Repository {
    /// Creates the `.chrono` layout (database, config, backup area) under
    /// `root`. With `force`, an existing repository is wiped first.
    pub fn init<P: AsRef<Path>>(root: P, force: bool) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let chrono_dir = root.join(CHRONO_DIR);

        if chrono_dir.join(DB_FILE).exists() && !force {
            return Err(Error::AlreadyInitialized(root));
        }

        fs::create_dir_all(chrono_dir.join(BACKUPS_DIR))?;

        let config = RepoConfig::default();
        config.save(chrono_dir.join(CONFIG_FILE))?;

        let storage = Storage::open(chrono_dir.join(DB_FILE))?;
        let backups = BackupArea::new(chrono_dir.join(BACKUPS_DIR));
        if force {
            storage.reset()?;
            backups.clear()?;
        }

        info!(root = %root.display(), "initialized repository");
        Ok(Self {
            root,
            config,
            storage,
            backups,
        })
    }

    /// Opens an existing repository rooted at `root`.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let chrono_dir = root.join(CHRONO_DIR);

        if !chrono_dir.join(DB_FILE).exists() {
            return Err(Error::NotInitialized(root));
        }

        let config_path = chrono_dir.join(CONFIG_FILE);
        let config = if config_path.exists() {
            RepoConfig::load(config_path)?
        } else {
            RepoConfig::default()
        };

        Ok(Self {
            storage: Storage::open(chrono_dir.join(DB_FILE))?,
            backups: BackupArea::new(chrono_dir.join(BACKUPS_DIR)),
            root,
            config,
        })
    }

    pub fn is_initialized<P: AsRef<Path>>(root: P) -> bool {
        root.as_ref().join(CHRONO_DIR).join(DB_FILE).exists()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &RepoConfig {
        &self.config
    }

    pub fn head(&self) -> Result<i64> {
        self.storage.head()
    }

    /// Diffs the working tree against the baseline of the current head.
    pub fn status(&self) -> Result<StatusReport> {
        let outcome = tracker::scan(&self.root, &self.config.ignore);
        let baseline = self.storage.tracked_state(self.storage.head()?)?;
        let changes = tracker::detect_changes(&outcome.files, &baseline);

        Ok(StatusReport {
            changes,
            skipped: outcome.skipped,
        })
    }

    /// Records the current change set as a new commit. All row writes happen
    /// in one transaction; a failure rolls the store back and discards any
    /// blobs already copied for the doomed commit.
    pub fn commit(&self, message: &str) -> Result<CommitInfo> {
        if message.trim().is_empty() {
            return Err(Error::EmptyMessage);
        }

        let outcome = tracker::scan(&self.root, &self.config.ignore);
        let head = self.storage.head()?;
        let baseline = self.storage.tracked_state(head)?;
        let changes = tracker::detect_changes(&outcome.files, &baseline);

        if changes.is_empty() {
            return Err(Error::NoChanges);
        }

        let now = Utc::now();
        let tx = self.storage.transaction()?;
        let commit_id = self.storage.insert_commit(message, now)?;

        let result: Result<()> = (|| {
            self.record_changes(commit_id, head, &changes, now)?;
            self.storage.set_head(commit_id)?;
            tx.commit()?;
            Ok(())
        })();

        if let Err(error) = result {
            self.backups.discard_commit(commit_id);
            return Err(error);
        }

        info!(
            commit_id,
            added = changes.added.len(),
            modified = changes.modified.len(),
            deleted = changes.deleted.len(),
            "commit created"
        );

        Ok(CommitInfo {
            commit: Commit {
                id: commit_id,
                message: message.to_string(),
                created_at: now,
            },
            added: changes.added.len(),
            modified: changes.modified.len(),
            deleted: changes.deleted.len(),
        })
    }

    fn record_changes(
        &self,
        commit_id: i64,
        head: i64,
        changes: &ChangeSet,
        now: DateTime<Utc>,
    ) -> Result<()> {
        for (path, hash) in &changes.added {
            if let Some(file) = self.storage.get_file_by_path(path)? {
                self.storage
                    .check_lifecycle(file.id, head, ChangeStatus::Added)?;
            }
            let file_id = self.storage.upsert_file(path, hash)?;
            self.storage
                .insert_event(commit_id, file_id, ChangeStatus::Added, now)?;
            self.backups
                .store_blob(commit_id, file_id, &self.root.join(path))?;
            debug!(path, "recorded addition");
        }

        for (path, hash) in &changes.modified {
            let file = self
                .storage
                .get_file_by_path(path)?
                .ok_or_else(|| Error::Integrity(format!("modified path is not tracked: {path}")))?;
            self.storage
                .check_lifecycle(file.id, head, ChangeStatus::Modified)?;
            self.storage.update_file_hash(file.id, hash)?;
            self.storage
                .insert_event(commit_id, file.id, ChangeStatus::Modified, now)?;
            self.backups
                .store_blob(commit_id, file.id, &self.root.join(path))?;
            debug!(path, "recorded modification");
        }

        for path in &changes.deleted {
            let file = self
                .storage
                .get_file_by_path(path)?
                .ok_or_else(|| Error::Integrity(format!("deleted path is not tracked: {path}")))?;
            self.storage
                .check_lifecycle(file.id, head, ChangeStatus::Deleted)?;
            // Baseline hash stays: the prior commit's blob holds the last
            // live bytes, so no copy is needed.
            self.storage
                .insert_event(commit_id, file.id, ChangeStatus::Deleted, now)?;
            debug!(path, "recorded deletion");
        }

        Ok(())
    }

    /// Commit history, newest first, with per-status counts.
    pub fn log(&self, limit: Option<usize>) -> Result<Vec<CommitInfo>> {
        let mut history = Vec::new();
        for commit in self.storage.list_commits(limit)? {
            let (added, modified, deleted) = self.storage.change_counts(commit.id)?;
            history.push(CommitInfo {
                commit,
                added,
                modified,
                deleted,
            });
        }
        Ok(history)
    }

    /// Per-path breakdown of a single commit.
    pub fn show(&self, commit_id: i64) -> Result<CommitDetails> {
        let commit = self.storage.get_commit(commit_id)?;
        let mut details = CommitDetails {
            commit,
            added: Vec::new(),
            modified: Vec::new(),
            deleted: Vec::new(),
        };

        for event in self.storage.events_for_commit(commit_id)? {
            let file = self.storage.get_file_by_id(event.file_id)?;
            match event.status {
                ChangeStatus::Added => details.added.push(file.path),
                ChangeStatus::Modified => details.modified.push(file.path),
                ChangeStatus::Deleted => details.deleted.push(file.path),
            }
        }

        Ok(details)
    }

    /// Computes what a revert to `commit_id` would do, without touching the
    /// working tree: for every tracked file, the last event at or before the
    /// target decides whether it is restored from a blob or removed.
    pub fn revert_plan(&self, commit_id: i64) -> Result<RevertPlan> {
        let target = self.storage.get_commit(commit_id)?;
        let mut restore = Vec::new();
        let mut remove = Vec::new();

        for file in self.storage.list_files()? {
            ensure_inside_root(&file.path)?;
            match self.storage.last_event_at(file.id, commit_id)? {
                Some(event) if event.status != ChangeStatus::Deleted => {
                    restore.push(RestoreEntry {
                        file_id: file.id,
                        path: file.path,
                        blob_commit: event.commit_id,
                    });
                }
                _ => {
                    if self.root.join(&file.path).exists() {
                        remove.push(file.path);
                    }
                }
            }
        }

        Ok(RevertPlan {
            target,
            restore,
            remove,
        })
    }

    /// Restores the working tree to the state implied by all commits up to
    /// and including `commit_id`. History beyond the target is kept; only
    /// the filesystem and the baseline (head pointer plus file hashes) move.
    ///
    /// An emergency backup of the current tree is taken before anything is
    /// overwritten or removed.
    pub fn revert(&self, commit_id: i64) -> Result<RevertOutcome> {
        let plan = self.revert_plan(commit_id)?;

        let current = tracker::scan(&self.root, &self.config.ignore);
        let emergency_backup = self.backups.emergency_backup(&self.root, &current.files)?;

        let mut restored = Vec::new();
        let mut removed = Vec::new();

        let tx = self.storage.transaction()?;

        for entry in &plan.restore {
            let bytes = self
                .backups
                .read_blob(entry.blob_commit, entry.file_id, &entry.path)?;
            let dest = self.root.join(&entry.path);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&dest, &bytes)?;

            // The restored bytes become the new baseline for the next scan.
            self.storage
                .update_file_hash(entry.file_id, &fingerprint_bytes(&bytes))?;
            restored.push(entry.path.clone());
        }

        for path in &plan.remove {
            let dest = self.root.join(path);
            if dest.exists() {
                fs::remove_file(&dest)?;
                removed.push(path.clone());
            }
        }

        self.storage.set_head(commit_id)?;
        tx.commit()?;

        info!(
            commit_id,
            restored = restored.len(),
            removed = removed.len(),
            "reverted working tree"
        );

        Ok(RevertOutcome {
            target: plan.target,
            restored,
            removed,
            emergency_backup,
        })
    }

    pub fn list_files(&self) -> Result<Vec<TrackedFile>> {
        self.storage.list_files()
    }

    pub fn stats(&self) -> Result<RepoStats> {
        let db_path = self.root.join(CHRONO_DIR).join(DB_FILE);
        let database_size = fs::metadata(&db_path).map(|m| m.len()).unwrap_or(0);

        Ok(RepoStats {
            commits: self.storage.commit_count()?,
            files: self.storage.file_count()?,
            events: self.storage.event_count()?,
            database_size,
            backup_size: self.backups.total_size(),
            root: self.root.clone(),
        })
    }

    /// Drops all history, tracked files and backups. The working tree is
    /// left untouched.
    pub fn reset(&self) -> Result<()> {
        self.storage.reset()?;
        self.backups.clear()?;
        info!("repository reset");
        Ok(())
    }

    /// Compacts the database and prunes old emergency backups. Returns the
    /// number of pruned snapshots.
    pub fn cleanup(&self) -> Result<usize> {
        self.storage.vacuum()?;
        self.backups.prune_emergency(EMERGENCY_KEEP)
    }
}

/// Stored paths are always relative and must stay inside the working tree.
fn ensure_inside_root(path: &str) -> Result<()> {
    let p = Path::new(path);
    let escapes = p
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(Error::OutsideRoot(p.to_path_buf()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_inside_root() {
        assert!(ensure_inside_root("a/b.txt").is_ok());
        assert!(ensure_inside_root("./a.txt").is_ok());
        assert!(ensure_inside_root("../outside.txt").is_err());
        assert!(ensure_inside_root("/etc/passwd").is_err());
    }

    #[test]
    fn test_init_twice_requires_force() {
        let dir = tempfile::tempdir().unwrap();

        Repository::init(dir.path(), false).unwrap();
        assert!(matches!(
            Repository::init(dir.path(), false),
            Err(Error::AlreadyInitialized(_))
        ));
        assert!(Repository::init(dir.path(), true).is_ok());
    }

    #[test]
    fn test_open_uninitialized_fails() {
        let dir = tempfile::tempdir().unwrap();

        assert!(!Repository::is_initialized(dir.path()));
        assert!(matches!(
            Repository::open(dir.path()),
            Err(Error::NotInitialized(_))
        ));
    }

    #[test]
    fn test_commit_rejects_empty_message() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path(), false).unwrap();
        fs::write(dir.path().join("a.txt"), b"hello").unwrap();

        assert!(matches!(repo.commit("  "), Err(Error::EmptyMessage)));
    }
}
