use anyhow::Result;
use colored::Colorize;
use std::path::Path;

pub fn run(root: &Path) -> Result<()> {
    let repo = super::open_repo(root)?;
    let files = repo.list_files()?;

    if files.is_empty() {
        println!("{}", "No files are currently tracked".yellow());
        return Ok(());
    }

    println!("{} ({}):", "Tracked files".bold().cyan(), files.len());
    for file in &files {
        let short_hash = &file.hash[..file.hash.len().min(8)];
        println!("  {} {}", file.path, format!("({short_hash})").dimmed());
    }

    Ok(())
}
