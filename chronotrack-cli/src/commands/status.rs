use anyhow::Result;
use colored::Colorize;
use std::path::Path;

pub fn run(root: &Path) -> Result<()> {
    let repo = super::open_repo(root)?;
    let report = repo.status()?;
    let changes = &report.changes;

    println!("{}", "Repository Status".bold().cyan());
    println!("  {}: {}", "Root".bold(), repo.root().display());
    println!();

    if changes.is_empty() {
        println!("{}", "Working directory is clean".green());
    } else {
        println!(
            "{} {}",
            "Changes detected:".bold(),
            format!("({})", changes.len()).yellow()
        );
        println!();

        for path in changes.added.keys() {
            println!("  {} {}", "+".green(), path);
        }
        for path in changes.modified.keys() {
            println!("  {} {}", "~".yellow(), path);
        }
        for path in &changes.deleted {
            println!("  {} {}", "-".red(), path);
        }

        println!();
        println!(
            "Run {} to record these changes",
            "chrono commit \"message\"".cyan()
        );
    }

    if !report.skipped.is_empty() {
        println!();
        println!("{}", "Unreadable files (skipped):".yellow().bold());
        for skipped in &report.skipped {
            println!("  {} - {}", skipped.path.display(), skipped.error);
        }
    }

    Ok(())
}
