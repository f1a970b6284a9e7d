//! `snapkeep remove <id>` – remove a history item and its stored file.

use anyhow::Result;
use snapkeep_core::config::SnapConfig;
use snapkeep_core::history::HistoryStore;

pub fn run_remove(cfg: &SnapConfig, id_prefix: &str) -> Result<()> {
    let mut store = HistoryStore::open_default(cfg)?;
    let id = store.find(id_prefix)?.id;
    store.remove(id)?;
    println!("Removed {id_prefix}");
    Ok(())
}
