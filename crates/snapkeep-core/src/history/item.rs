//! History item model stored in the JSON index.

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryItem {
    pub id: Uuid,
    /// Unix timestamp (seconds) of the import.
    pub timestamp: i64,
    /// File name under the store's images directory.
    pub file_name: String,
    #[serde(default)]
    pub pinned: bool,
    /// Image format as a lowercase extension ("png", "jpg", ...).
    pub format: String,
    pub file_size: u64,
}

impl HistoryItem {
    /// Short id prefix used in CLI output and lookups.
    pub fn short_id(&self) -> String {
        self.id.simple().to_string()[..8].to_string()
    }

    pub fn formatted_date(&self) -> String {
        match DateTime::from_timestamp(self.timestamp, 0) {
            Some(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => "-".to_string(),
        }
    }

    pub fn formatted_size(&self) -> String {
        let bytes = self.file_size;
        if bytes >= 1024 * 1024 {
            format!("{:.1} MiB", bytes as f64 / (1024.0 * 1024.0))
        } else if bytes >= 1024 {
            format!("{:.1} KiB", bytes as f64 / 1024.0)
        } else {
            format!("{bytes} B")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(size: u64) -> HistoryItem {
        HistoryItem {
            id: Uuid::new_v4(),
            timestamp: 1_700_000_000,
            file_name: "capture_x.png".to_string(),
            pinned: false,
            format: "png".to_string(),
            file_size: size,
        }
    }

    #[test]
    fn short_id_is_eight_chars() {
        assert_eq!(item(1).short_id().len(), 8);
    }

    #[test]
    fn size_formatting_picks_a_unit() {
        assert_eq!(item(512).formatted_size(), "512 B");
        assert_eq!(item(2048).formatted_size(), "2.0 KiB");
        assert_eq!(item(3 * 1024 * 1024).formatted_size(), "3.0 MiB");
    }

    #[test]
    fn index_json_roundtrip() {
        let original = item(42);
        let json = serde_json::to_string(&original).unwrap();
        let parsed: HistoryItem = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, original.id);
        assert_eq!(parsed.file_name, original.file_name);
        assert_eq!(parsed.file_size, 42);
        assert!(!parsed.pinned);
    }
}
