//! `snapkeep pin <id>` – toggle the pin flag of a history item.

use anyhow::Result;
use snapkeep_core::config::SnapConfig;
use snapkeep_core::history::HistoryStore;

pub fn run_pin(cfg: &SnapConfig, id_prefix: &str) -> Result<()> {
    let mut store = HistoryStore::open_default(cfg)?;
    let id = store.find(id_prefix)?.id;
    let pinned = store.toggle_pin(id)?;
    if pinned {
        println!("Pinned {id_prefix}");
    } else {
        println!("Unpinned {id_prefix}");
    }
    Ok(())
}
