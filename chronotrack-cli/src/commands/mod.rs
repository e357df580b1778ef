pub mod cleanup;
pub mod commit;
pub mod files;
pub mod init;
pub mod log;
pub mod reset;
pub mod revert;
pub mod show;
pub mod stats;
pub mod status;

use anyhow::{Context, Result};
use chronotrack_core::Repository;
use std::path::Path;

pub fn open_repo(root: &Path) -> Result<Repository> {
    Repository::open(root)
        .with_context(|| format!("No chronotrack repository at {}. Run 'chrono init' first.", root.display()))
}

pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}
