//! `snapkeep clear` – remove history items, keeping pinned ones by default.

use anyhow::Result;
use snapkeep_core::config::SnapConfig;
use snapkeep_core::history::HistoryStore;

pub fn run_clear(cfg: &SnapConfig, all: bool) -> Result<()> {
    let mut store = HistoryStore::open_default(cfg)?;
    let removed = store.clear(!all)?;
    if all {
        println!("Removed {removed} item(s).");
    } else {
        println!("Removed {removed} unpinned item(s).");
    }
    Ok(())
}
