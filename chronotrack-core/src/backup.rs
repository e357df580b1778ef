use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

const EMERGENCY_DIR: &str = "emergency";

/// Filesystem storage of historical file contents.
///
/// One blob per (commit, file) pair that introduced or changed content, at
/// `<root>/<commit_id>/<file_id>`. Emergency snapshots of the whole working
/// tree live under `<root>/emergency/<unix-ts>/` and mirror the tree layout.
pub struct BackupArea {
    root: PathBuf,
}

impl BackupArea {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn blob_path(&self, commit_id: i64, file_id: i64) -> PathBuf {
        self.root.join(commit_id.to_string()).join(file_id.to_string())
    }

    /// Copies the current bytes of a working-tree file into the blob for
    /// (commit, file).
    pub fn store_blob(&self, commit_id: i64, file_id: i64, source: &Path) -> Result<()> {
        let blob = self.blob_path(commit_id, file_id);
        if let Some(parent) = blob.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(source, &blob)?;
        Ok(())
    }

    pub fn read_blob(&self, commit_id: i64, file_id: i64, path: &str) -> Result<Vec<u8>> {
        let blob = self.blob_path(commit_id, file_id);
        if !blob.exists() {
            return Err(Error::BackupMissing {
                commit_id,
                path: path.to_string(),
            });
        }
        Ok(fs::read(blob)?)
    }

    /// Removes the blob directory of a commit that failed to persist, so a
    /// rolled-back commit leaves no trace in the backup area.
    pub fn discard_commit(&self, commit_id: i64) {
        let dir = self.root.join(commit_id.to_string());
        if dir.exists() {
            if let Err(error) = fs::remove_dir_all(&dir) {
                warn!(commit_id, %error, "could not discard backup blobs");
            }
        }
    }

    /// Snapshots the given working-tree files before a destructive operation.
    /// Returns the snapshot directory.
    pub fn emergency_backup(
        &self,
        workdir: &Path,
        files: &BTreeMap<String, String>,
    ) -> Result<PathBuf> {
        let stamp = chrono::Utc::now().timestamp();
        let mut target = self.root.join(EMERGENCY_DIR).join(stamp.to_string());
        // Two reverts within the same second get distinct directories.
        let mut suffix = 0;
        while target.exists() {
            suffix += 1;
            target = self
                .root
                .join(EMERGENCY_DIR)
                .join(format!("{stamp}-{suffix}"));
        }
        fs::create_dir_all(&target)?;

        for path in files.keys() {
            let source = workdir.join(path);
            if !source.exists() {
                continue;
            }
            let dest = target.join(path);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(&source, &dest)?;
        }

        info!(dir = %target.display(), "emergency backup created");
        Ok(target)
    }

    /// Deletes all but the `keep` newest emergency snapshots.
    pub fn prune_emergency(&self, keep: usize) -> Result<usize> {
        let dir = self.root.join(EMERGENCY_DIR);
        if !dir.exists() {
            return Ok(0);
        }

        let mut snapshots: Vec<PathBuf> = fs::read_dir(&dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect();
        snapshots.sort();

        let mut removed = 0;
        if snapshots.len() > keep {
            for old in &snapshots[..snapshots.len() - keep] {
                fs::remove_dir_all(old)?;
                removed += 1;
            }
        }

        Ok(removed)
    }

    /// Total bytes held in the backup area.
    pub fn total_size(&self) -> u64 {
        WalkDir::new(&self.root)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| entry.metadata().ok())
            .map(|meta| meta.len())
            .sum()
    }

    /// Clears every blob and emergency snapshot, recreating the empty area.
    pub fn clear(&self) -> Result<()> {
        if self.root.exists() {
            fs::remove_dir_all(&self.root)?;
        }
        fs::create_dir_all(&self.root)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blob_store_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let workdir = dir.path().join("work");
        fs::create_dir_all(&workdir).unwrap();
        fs::write(workdir.join("a.txt"), b"hello").unwrap();

        let area = BackupArea::new(dir.path().join("backups"));
        area.store_blob(1, 7, &workdir.join("a.txt")).unwrap();

        assert_eq!(area.read_blob(1, 7, "a.txt").unwrap(), b"hello");
        assert!(matches!(
            area.read_blob(2, 7, "a.txt"),
            Err(Error::BackupMissing { commit_id: 2, .. })
        ));
    }

    #[test]
    fn test_discard_commit_removes_blobs() {
        let dir = tempfile::tempdir().unwrap();
        let workdir = dir.path().join("work");
        fs::create_dir_all(&workdir).unwrap();
        fs::write(workdir.join("a.txt"), b"hello").unwrap();

        let area = BackupArea::new(dir.path().join("backups"));
        area.store_blob(3, 1, &workdir.join("a.txt")).unwrap();
        area.discard_commit(3);

        assert!(area.read_blob(3, 1, "a.txt").is_err());
    }

    #[test]
    fn test_emergency_backup_mirrors_tree() {
        let dir = tempfile::tempdir().unwrap();
        let workdir = dir.path().join("work");
        fs::create_dir_all(workdir.join("sub")).unwrap();
        fs::write(workdir.join("a.txt"), b"one").unwrap();
        fs::write(workdir.join("sub/b.txt"), b"two").unwrap();

        let mut files = BTreeMap::new();
        files.insert("a.txt".to_string(), "h1".to_string());
        files.insert("sub/b.txt".to_string(), "h2".to_string());

        let area = BackupArea::new(dir.path().join("backups"));
        let snapshot = area.emergency_backup(&workdir, &files).unwrap();

        assert_eq!(fs::read(snapshot.join("a.txt")).unwrap(), b"one");
        assert_eq!(fs::read(snapshot.join("sub/b.txt")).unwrap(), b"two");
    }

    #[test]
    fn test_prune_emergency_keeps_newest() {
        let dir = tempfile::tempdir().unwrap();
        let area = BackupArea::new(dir.path().join("backups"));
        let emergency = dir.path().join("backups").join(EMERGENCY_DIR);
        for stamp in ["100", "200", "300"] {
            fs::create_dir_all(emergency.join(stamp)).unwrap();
        }

        let removed = area.prune_emergency(2).unwrap();

        assert_eq!(removed, 1);
        assert!(!emergency.join("100").exists());
        assert!(emergency.join("200").exists());
        assert!(emergency.join("300").exists());
    }
}
