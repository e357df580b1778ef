use serde::{Deserialize, Serialize};

/// Decides which paths are excluded from tracking.
///
/// Name patterns apply to every path segment, so matching a directory name
/// excludes its entire subtree. The pattern set is fixed at repository init
/// and read back from the config file on open.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IgnoreMatcher {
    /// Exact segment names: metadata dirs, caches, dependency dirs.
    pub patterns: Vec<String>,
    /// File extensions (with leading dot) for compiled artifacts.
    pub extensions: Vec<String>,
    /// Dot-prefixed names that are tracked despite being hidden.
    pub hidden_allowlist: Vec<String>,
}

impl Default for IgnoreMatcher {
    fn default() -> Self {
        Self {
            patterns: vec![
                ".chrono".to_string(),
                ".git".to_string(),
                ".hg".to_string(),
                ".svn".to_string(),
                "__pycache__".to_string(),
                "node_modules".to_string(),
                "target".to_string(),
                ".venv".to_string(),
                "venv".to_string(),
                ".vscode".to_string(),
                ".idea".to_string(),
                ".DS_Store".to_string(),
                "Thumbs.db".to_string(),
                ".env".to_string(),
            ],
            extensions: vec![
                ".pyc".to_string(),
                ".pyo".to_string(),
                ".pyd".to_string(),
            ],
            hidden_allowlist: vec![".gitignore".to_string()],
        }
    }
}

impl IgnoreMatcher {
    /// Whether a directory name is excluded. Only the explicit pattern set
    /// applies to directories; matching one prunes the whole subtree.
    pub fn matches_dir_name(&self, name: &str) -> bool {
        self.patterns.iter().any(|p| p == name)
    }

    /// Whether a file name is excluded. Files additionally honor the
    /// extension set and the hidden-name rule, which apply to the leaf only:
    /// a dot-directory such as `.github` stays tracked unless listed in
    /// `patterns`.
    pub fn matches_file_name(&self, name: &str) -> bool {
        if self.patterns.iter().any(|p| p == name) {
            return true;
        }

        if self.extensions.iter().any(|ext| name.ends_with(ext.as_str())) {
            return true;
        }

        name.starts_with('.') && !self.hidden_allowlist.iter().any(|a| a == name)
    }

    /// Whether a relative path (with `/` separators) is excluded: directory
    /// segments are matched against the pattern set, the leaf against the
    /// full file rules.
    pub fn should_ignore(&self, relative_path: &str) -> bool {
        let mut segments = relative_path.split('/').peekable();
        while let Some(segment) = segments.next() {
            let ignored = if segments.peek().is_some() {
                self.matches_dir_name(segment)
            } else {
                self.matches_file_name(segment)
            };
            if ignored {
                return true;
            }
        }
        false
    }
}
