use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use super::format_size;

pub fn run(root: &Path) -> Result<()> {
    let repo = super::open_repo(root)?;
    let stats = repo.stats()?;

    println!("{}", "Repository Statistics".bold().cyan());
    println!("  {}: {}", "Root".bold(), stats.root.display());
    println!("  {}: {}", "Commits".bold(), stats.commits);
    println!("  {}: {}", "Tracked files".bold(), stats.files);
    println!("  {}: {}", "Change events".bold(), stats.events);
    println!(
        "  {}: {}",
        "Database size".bold(),
        format_size(stats.database_size)
    );
    println!(
        "  {}: {}",
        "Backup size".bold(),
        format_size(stats.backup_size)
    );

    Ok(())
}
