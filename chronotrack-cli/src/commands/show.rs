use anyhow::Result;
use colored::Colorize;
use std::path::Path;

pub fn run(root: &Path, commit_id: i64) -> Result<()> {
    let repo = super::open_repo(root)?;
    let details = repo.show(commit_id)?;

    println!(
        "{} {}: {}",
        "Commit".bold().cyan(),
        details.commit.id,
        details.commit.message
    );
    println!(
        "{}: {}",
        "Date".bold(),
        details.commit.created_at.format("%Y-%m-%d %H:%M:%S")
    );
    println!("{}: {}", "Total changes".bold(), details.total_changes());

    if !details.added.is_empty() {
        println!();
        println!("{} ({}):", "Added".green().bold(), details.added.len());
        for path in &details.added {
            println!("  {} {}", "+".green(), path);
        }
    }

    if !details.modified.is_empty() {
        println!();
        println!(
            "{} ({}):",
            "Modified".yellow().bold(),
            details.modified.len()
        );
        for path in &details.modified {
            println!("  {} {}", "~".yellow(), path);
        }
    }

    if !details.deleted.is_empty() {
        println!();
        println!("{} ({}):", "Deleted".red().bold(), details.deleted.len());
        for path in &details.deleted {
            println!("  {} {}", "-".red(), path);
        }
    }

    Ok(())
}
