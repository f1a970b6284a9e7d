//! `snapkeep log` – print the log directory path.

use anyhow::Result;
use snapkeep_core::logging;

pub fn run_log() -> Result<()> {
    println!("{}", logging::log_dir()?.display());
    Ok(())
}
