use anyhow::Result;
use colored::Colorize;
use std::path::Path;

pub fn run(root: &Path, limit: usize) -> Result<()> {
    let repo = super::open_repo(root)?;
    let history = repo.log(Some(limit))?;

    if history.is_empty() {
        println!("{}", "No commits yet".yellow());
        return Ok(());
    }

    println!("{}", "Commit History".bold().cyan());
    println!();

    for info in &history {
        println!(
            "{} {}",
            "commit".yellow().bold(),
            info.commit.id.to_string().yellow()
        );
        println!(
            "{}: {}",
            "Date".bold(),
            info.commit.created_at.format("%Y-%m-%d %H:%M:%S")
        );
        println!();
        println!("    {}", info.commit.message);
        println!();

        let mut parts = Vec::new();
        if info.added > 0 {
            parts.push(format!("{} added", info.added).green().to_string());
        }
        if info.modified > 0 {
            parts.push(format!("{} modified", info.modified).yellow().to_string());
        }
        if info.deleted > 0 {
            parts.push(format!("{} deleted", info.deleted).red().to_string());
        }
        println!("    {}", parts.join(", "));
        println!();
    }

    let total = repo.stats()?.commits as usize;
    if total > history.len() {
        println!(
            "{}",
            format!("... and {} more commits", total - history.len()).dimmed()
        );
        println!("Use {} to see more", "--limit N".cyan());
    }

    Ok(())
}
