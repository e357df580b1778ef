use anyhow::Result;
use colored::Colorize;
use std::path::Path;

pub fn run(root: &Path) -> Result<()> {
    let repo = super::open_repo(root)?;
    let pruned = repo.cleanup()?;

    println!("{}", "✓ Database optimized".green());
    if pruned > 0 {
        println!(
            "{}",
            format!("✓ Pruned {pruned} old emergency backup(s)").green()
        );
    }

    Ok(())
}
