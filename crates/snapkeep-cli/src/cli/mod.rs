//! CLI for the snapkeep capture history tool.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use snapkeep_core::config;
use std::path::PathBuf;

use commands::{
    run_cleanup, run_clear, run_completions, run_history, run_import, run_log, run_pin, run_remove,
};

/// Top-level CLI for the snapkeep capture history tool.
#[derive(Debug, Parser)]
#[command(name = "snapkeep")]
#[command(about = "snapkeep: capture history with automatic error recovery", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Import a capture file into the history (retries transient failures).
    Import {
        /// Path to the capture file.
        path: PathBuf,

        /// Pin the imported item so automatic cleanup never removes it.
        #[arg(long)]
        pin: bool,
    },

    /// List history items, newest first.
    History,

    /// Toggle the pin flag of an item by its id (prefix allowed).
    Pin {
        /// Item identifier.
        id: String,
    },

    /// Remove one item and its stored file by id (prefix allowed).
    Remove {
        /// Item identifier.
        id: String,
    },

    /// Remove history items. Pinned items are kept unless --all is given.
    Clear {
        /// Also remove pinned items.
        #[arg(long)]
        all: bool,
    },

    /// Free disk space by dropping the oldest unpinned history entries.
    Cleanup,

    /// Print the log directory path.
    Log,

    /// Generate shell completions.
    Completions {
        /// Target shell.
        shell: clap_complete::Shell,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Import { path, pin } => run_import(&cfg, &path, pin).await?,
            CliCommand::History => run_history(&cfg)?,
            CliCommand::Pin { id } => run_pin(&cfg, &id)?,
            CliCommand::Remove { id } => run_remove(&cfg, &id)?,
            CliCommand::Clear { all } => run_clear(&cfg, all)?,
            CliCommand::Cleanup => run_cleanup(&cfg)?,
            CliCommand::Log => run_log()?,
            CliCommand::Completions { shell } => run_completions(shell),
        }

        Ok(())
    }
}
