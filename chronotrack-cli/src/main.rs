use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::{cleanup, commit, files, init, log, reset, revert, show, stats, status};

#[derive(Parser)]
#[command(name = "chrono")]
#[command(version, about = "Local snapshot tracking with commit and revert", long_about = None)]
struct Cli {
    /// Repository root (defaults to the current directory)
    #[arg(short = 'C', long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize tracking in a directory
    Init {
        /// Reinitialize even if a repository already exists
        #[arg(long)]
        force: bool,
    },

    /// Show added / modified / deleted files since the last commit
    Status,

    /// Snapshot the current change set with a message
    Commit {
        /// Commit message
        message: String,
    },

    /// Show commit history
    Log {
        /// Number of commits to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Show the files changed by a commit
    Show {
        /// Commit ID
        commit_id: i64,
    },

    /// Restore the working tree to the state of a commit
    Revert {
        /// Commit ID to revert to
        commit_id: i64,

        /// Actually perform the revert (without this, just shows a preview)
        #[arg(long)]
        execute: bool,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// List all tracked files
    Files,

    /// Show repository statistics
    Stats,

    /// Compact the database and prune old emergency backups
    Cleanup,

    /// Delete all history and backups (dangerous!)
    Reset {
        /// Confirm the reset
        #[arg(long)]
        confirm: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Init { force } => init::run(&root, force),
        Commands::Status => status::run(&root),
        Commands::Commit { message } => commit::run(&root, &message),
        Commands::Log { limit } => log::run(&root, limit),
        Commands::Show { commit_id } => show::run(&root, commit_id),
        Commands::Revert {
            commit_id,
            execute,
            yes,
        } => revert::run(&root, commit_id, execute, yes),
        Commands::Files => files::run(&root),
        Commands::Stats => stats::run(&root),
        Commands::Cleanup => cleanup::run(&root),
        Commands::Reset { confirm } => reset::run(&root, confirm),
    }
}
