//! `snapkeep cleanup` – drop the oldest unpinned history entries to free
//! disk space (the same pass the import path runs on a full disk).

use anyhow::Result;
use snapkeep_core::config::SnapConfig;
use snapkeep_core::diskspace;
use snapkeep_core::history::HistoryStore;
use snapkeep_core::recovery::attempt_disk_cleanup;

pub fn run_cleanup(cfg: &SnapConfig) -> Result<()> {
    let mut store = HistoryStore::open_default(cfg)?;
    let before = store.items().len();
    if attempt_disk_cleanup(&mut store)? {
        println!("Removed {} item(s).", before - store.items().len());
    } else {
        println!("Nothing to clean up (no unpinned items).");
    }

    let free = diskspace::available_bytes(store.root());
    if free > 0 {
        println!("Free space: {:.1} MiB", free as f64 / (1024.0 * 1024.0));
    }
    Ok(())
}
