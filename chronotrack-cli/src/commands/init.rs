use anyhow::Result;
use chronotrack_core::{Error, Repository};
use colored::Colorize;
use std::path::Path;

pub fn run(root: &Path, force: bool) -> Result<()> {
    match Repository::init(root, force) {
        Ok(repo) => {
            println!(
                "{} {}",
                "✓ Initialized chronotrack repository in".green().bold(),
                repo.root().display()
            );
            Ok(())
        }
        Err(Error::AlreadyInitialized(path)) => {
            println!(
                "{} {}",
                "Repository already initialized at".yellow(),
                path.display()
            );
            println!("Use {} to reinitialize", "--force".cyan());
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
