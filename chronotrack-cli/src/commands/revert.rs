use anyhow::Result;
use colored::Colorize;
use dialoguer::Confirm;
use std::path::Path;

pub fn run(root: &Path, commit_id: i64, execute: bool, yes: bool) -> Result<()> {
    let repo = super::open_repo(root)?;
    let plan = repo.revert_plan(commit_id)?;

    println!("{}", "Revert Preview".bold().cyan());
    println!("  {}: {}", "Target Commit".bold(), plan.target.id);
    println!("  {}: {}", "Message".bold(), plan.target.message);
    println!(
        "  {}: {}",
        "Date".bold(),
        plan.target.created_at.format("%Y-%m-%d %H:%M:%S")
    );
    println!();

    if plan.restore.is_empty() && plan.remove.is_empty() {
        println!("{}", "Working tree already matches this commit".green());
        return Ok(());
    }

    for entry in &plan.restore {
        println!("  {} {}", entry.path, "will be restored".yellow());
    }
    for path in &plan.remove {
        println!("  {} {}", path, "will be removed".red());
    }
    println!();

    if !execute {
        println!("{}", "This is a preview only.".yellow());
        println!(
            "Run with {} to actually perform the revert",
            "--execute".cyan()
        );
        return Ok(());
    }

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt("This will overwrite the working tree. Continue?")
            .default(false)
            .interact()?;
        if !confirmed {
            println!("{}", "Revert cancelled".yellow());
            return Ok(());
        }
    }

    let outcome = repo.revert(commit_id)?;

    println!(
        "{}",
        format!(
            "✓ Reverted to commit {} ({} restored, {} removed)",
            outcome.target.id,
            outcome.restored.len(),
            outcome.removed.len()
        )
        .green()
        .bold()
    );
    println!(
        "  {}: {}",
        "Emergency backup".bold(),
        outcome.emergency_backup.display()
    );

    Ok(())
}
