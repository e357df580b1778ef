use anyhow::Result;
use chronotrack_core::Error;
use colored::Colorize;
use std::path::Path;

pub fn run(root: &Path, message: &str) -> Result<()> {
    let repo = super::open_repo(root)?;

    match repo.commit(message) {
        Ok(summary) => {
            println!("{}", "✓ Commit created successfully!".green().bold());
            println!("  {}: {}", "Commit ID".bold(), summary.commit.id);
            println!("  {}: {}", "Message".bold(), summary.commit.message);
            println!(
                "  {}: {}",
                "Date".bold(),
                summary.commit.created_at.format("%Y-%m-%d %H:%M:%S")
            );
            println!("  {}: {}", "Added".bold(), summary.added);
            println!("  {}: {}", "Modified".bold(), summary.modified);
            println!("  {}: {}", "Deleted".bold(), summary.deleted);
            Ok(())
        }
        Err(Error::NoChanges) => {
            println!("{}", "No changes to commit".yellow());
            Ok(())
        }
        Err(Error::EmptyMessage) => {
            anyhow::bail!("Commit message cannot be empty");
        }
        Err(e) => Err(e.into()),
    }
}
