use anyhow::Result;
use colored::Colorize;
use dialoguer::Confirm;
use std::path::Path;

pub fn run(root: &Path, confirm: bool) -> Result<()> {
    let repo = super::open_repo(root)?;

    if !confirm {
        let confirmed = Confirm::new()
            .with_prompt("This will delete all commit history and backups. Continue?")
            .default(false)
            .interact()?;
        if !confirmed {
            println!("{}", "Reset cancelled".yellow());
            return Ok(());
        }
    }

    repo.reset()?;

    println!("{}", "✓ Repository reset successfully".green().bold());
    println!("All commit history and backups have been deleted.");

    Ok(())
}
