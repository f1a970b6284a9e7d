//! Capture history: JSON index plus flat image files.
//!
//! Layout under the history root: `index.json` describing every item, and
//! `images/<file>` holding the captures themselves. Pinned items survive
//! every automatic eviction path.

mod item;
mod store;

pub use item::HistoryItem;
pub use store::{import_file_name, HistoryStore};
