//! `snapkeep history` – list history items, newest first.

use anyhow::Result;
use snapkeep_core::config::SnapConfig;
use snapkeep_core::history::HistoryStore;

pub fn run_history(cfg: &SnapConfig) -> Result<()> {
    let store = HistoryStore::open_default(cfg)?;
    if store.items().is_empty() {
        println!("No items in history.");
        return Ok(());
    }

    println!("{:<10} {:<20} {:<10} {:<4} {}", "ID", "DATE", "SIZE", "PIN", "FILE");
    for item in store.items() {
        println!(
            "{:<10} {:<20} {:<10} {:<4} {}",
            item.short_id(),
            item.formatted_date(),
            item.formatted_size(),
            if item.pinned { "*" } else { "" },
            item.file_name
        );
    }
    Ok(())
}
