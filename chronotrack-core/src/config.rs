use crate::error::Result;
use crate::ignore::IgnoreMatcher;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Repository configuration, written to `.chrono/config.json` at init and
/// read back on open. The ignore set is fixed configuration: it is not
/// re-read mid-operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoConfig {
    pub version: String,
    pub ignore: IgnoreMatcher,
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            ignore: IgnoreMatcher::default(),
        }
    }
}

impl RepoConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }
}
