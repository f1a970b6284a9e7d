//! History store: JSON index file plus flat image files.

use anyhow::{bail, Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::config::SnapConfig;

use super::item::HistoryItem;

const INDEX_FILE: &str = "index.json";
const IMAGES_DIR: &str = "images";

/// Capture history rooted at a directory. Items are kept newest first; the
/// index is rewritten (write temp, then rename) after every mutation.
pub struct HistoryStore {
    root: PathBuf,
    images_dir: PathBuf,
    index_path: PathBuf,
    items: Vec<HistoryItem>,
    /// Maximum number of unpinned items kept on insert; 0 means unlimited.
    max_count: usize,
}

impl HistoryStore {
    /// Open (or create) a history store at `root`.
    pub fn open(root: impl Into<PathBuf>, max_count: usize) -> Result<Self> {
        let root = root.into();
        let images_dir = root.join(IMAGES_DIR);
        fs::create_dir_all(&images_dir)
            .with_context(|| format!("create history directory: {}", images_dir.display()))?;
        let index_path = root.join(INDEX_FILE);

        let items = if index_path.exists() {
            let data = fs::read_to_string(&index_path)
                .with_context(|| format!("read history index: {}", index_path.display()))?;
            match serde_json::from_str(&data) {
                Ok(items) => items,
                Err(e) => {
                    // A corrupt index loses the listing but not the image files.
                    tracing::warn!(
                        path = %index_path.display(),
                        "history index unreadable, starting empty: {e}"
                    );
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        Ok(Self {
            root,
            images_dir,
            index_path,
            items,
            max_count,
        })
    }

    /// Open the store configured by `cfg`: its `storage_path` if set, else
    /// `~/.local/share/snapkeep/history`.
    pub fn open_default(cfg: &SnapConfig) -> Result<Self> {
        let root = match &cfg.history.storage_path {
            Some(path) => path.clone(),
            None => {
                let xdg_dirs = xdg::BaseDirectories::with_prefix("snapkeep")?;
                xdg_dirs.get_data_home().join("history")
            }
        };
        Self::open(root, cfg.history.max_count)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    /// All items, newest first.
    pub fn items(&self) -> &[HistoryItem] {
        &self.items
    }

    pub fn unpinned_count(&self) -> usize {
        self.items.iter().filter(|i| !i.pinned).count()
    }

    /// Register an imported capture already copied into the images directory.
    /// Evicts the oldest unpinned items beyond `max_count`, then persists the
    /// index.
    pub fn record_import(
        &mut self,
        file_name: &str,
        file_size: u64,
        pinned: bool,
    ) -> Result<HistoryItem> {
        let format = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("png")
            .to_ascii_lowercase();
        let item = HistoryItem {
            id: Uuid::new_v4(),
            timestamp: unix_timestamp(),
            file_name: file_name.to_string(),
            pinned,
            format,
            file_size,
        };
        self.items.insert(0, item.clone());
        self.enforce_max_count();
        self.save_index()?;
        Ok(item)
    }

    /// Find one item by id prefix (as printed by `short_id`). Errors when the
    /// prefix matches nothing or more than one item.
    pub fn find(&self, id_prefix: &str) -> Result<&HistoryItem> {
        let needle = id_prefix.to_ascii_lowercase();
        let mut matches = self
            .items
            .iter()
            .filter(|i| i.id.simple().to_string().starts_with(&needle));
        match (matches.next(), matches.next()) {
            (Some(item), None) => Ok(item),
            (Some(_), Some(_)) => bail!("id prefix '{id_prefix}' is ambiguous"),
            (None, _) => bail!("no history item matches '{id_prefix}'"),
        }
    }

    /// Toggle the pin flag; returns the new state.
    pub fn toggle_pin(&mut self, id: Uuid) -> Result<bool> {
        let item = self
            .items
            .iter_mut()
            .find(|i| i.id == id)
            .with_context(|| format!("no history item with id {id}"))?;
        item.pinned = !item.pinned;
        let pinned = item.pinned;
        self.save_index()?;
        Ok(pinned)
    }

    /// Remove one item and its image file.
    pub fn remove(&mut self, id: Uuid) -> Result<()> {
        let pos = self
            .items
            .iter()
            .position(|i| i.id == id)
            .with_context(|| format!("no history item with id {id}"))?;
        let item = self.items.remove(pos);
        self.delete_image(&item);
        self.save_index()
    }

    /// Remove up to `count` of the oldest unpinned items (ascending
    /// timestamp). Pinned items are never touched. Returns how many were
    /// removed.
    pub fn remove_oldest(&mut self, count: usize) -> Result<usize> {
        let removed = self.drop_oldest_unpinned(count);
        for item in &removed {
            self.delete_image(item);
        }
        if !removed.is_empty() {
            self.save_index()?;
        }
        Ok(removed.len())
    }

    /// Remove everything (or everything unpinned). Returns how many items
    /// were removed.
    pub fn clear(&mut self, keep_pinned: bool) -> Result<usize> {
        let (kept, dropped): (Vec<_>, Vec<_>) = self
            .items
            .drain(..)
            .partition(|i| keep_pinned && i.pinned);
        self.items = kept;
        for item in &dropped {
            self.delete_image(item);
        }
        self.save_index()?;
        Ok(dropped.len())
    }

    fn enforce_max_count(&mut self) {
        if self.max_count == 0 {
            return;
        }
        let excess = self.unpinned_count().saturating_sub(self.max_count);
        if excess > 0 {
            let evicted = self.drop_oldest_unpinned(excess);
            for item in &evicted {
                self.delete_image(item);
            }
            tracing::debug!(evicted = evicted.len(), "history trimmed to max count");
        }
    }

    /// Drop the `count` oldest unpinned items from the in-memory list and
    /// return them. Does not touch files or the index.
    fn drop_oldest_unpinned(&mut self, count: usize) -> Vec<HistoryItem> {
        let mut unpinned: Vec<(i64, Uuid)> = self
            .items
            .iter()
            .filter(|i| !i.pinned)
            .map(|i| (i.timestamp, i.id))
            .collect();
        unpinned.sort_by_key(|(ts, _)| *ts);
        let victims: HashSet<Uuid> = unpinned.into_iter().take(count).map(|(_, id)| id).collect();

        let mut removed = Vec::with_capacity(victims.len());
        self.items.retain(|item| {
            if victims.contains(&item.id) {
                removed.push(item.clone());
                false
            } else {
                true
            }
        });
        removed
    }

    fn delete_image(&self, item: &HistoryItem) {
        let path = self.images_dir.join(&item.file_name);
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %path.display(), "could not delete image: {e}"),
        }
    }

    fn save_index(&self) -> Result<()> {
        let data = serde_json::to_string_pretty(&self.items)?;
        let tmp = self.index_path.with_extension("json.tmp");
        fs::write(&tmp, data)
            .with_context(|| format!("write history index: {}", tmp.display()))?;
        fs::rename(&tmp, &self.index_path)
            .with_context(|| format!("replace history index: {}", self.index_path.display()))?;
        Ok(())
    }

    #[cfg(test)]
    fn insert_for_test(&mut self, item: HistoryItem) {
        self.items.insert(0, item);
    }
}

/// Destination file name for an imported capture: timestamped, with a short
/// random suffix to stay unique within one second.
pub fn import_file_name(source: &Path) -> String {
    let ext = source
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("png")
        .to_ascii_lowercase();
    let suffix = &Uuid::new_v4().simple().to_string()[..8];
    format!("capture_{}_{}.{}", unix_timestamp(), suffix, ext)
}

fn unix_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
