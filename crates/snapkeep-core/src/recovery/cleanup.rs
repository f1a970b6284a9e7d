//! Disk-cleanup fallback for `DiskFull` failures.
//!
//! Invoked by the caller (not the retry executor) when a result surfaces a
//! full disk: one pass that frees the oldest slice of unpinned history. If
//! the disk is still full afterwards, the caller surfaces the error to the
//! user instead of looping.

use anyhow::Result;

use crate::history::HistoryStore;

/// How many entries one cleanup pass removes: the oldest 30% of unpinned
/// history, at least one. Zero when there is nothing unpinned.
pub fn cleanup_count(unpinned: usize) -> usize {
    if unpinned == 0 {
        0
    } else {
        (unpinned * 3 / 10).max(1)
    }
}

/// Free space by dropping the oldest unpinned history entries. Returns
/// whether anything was removed. Pinned entries are never touched.
pub fn attempt_disk_cleanup(history: &mut HistoryStore) -> Result<bool> {
    let count = cleanup_count(history.unpinned_count());
    if count == 0 {
        tracing::info!("disk cleanup skipped: no unpinned history entries");
        return Ok(false);
    }
    let removed = history.remove_oldest(count)?;
    tracing::info!(removed, "cleaned old captures from history");
    Ok(removed > 0)
}
