use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::recovery::RetryConfig;

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Maximum number of attempts per operation (including the first).
    pub max_attempts: u32,
    /// Backoff delay per attempt, in seconds (e.g. 0.5 = 500ms). The last
    /// entry repeats for attempts past the end of the list.
    pub delays_secs: Vec<f64>,
    /// Master switch; when false every operation gets exactly one attempt.
    pub enabled: bool,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delays_secs: vec![0.5, 1.0, 2.0],
            enabled: true,
        }
    }
}

impl RetrySettings {
    /// Build the runtime policy. `max_attempts = 0` is a config mistake and
    /// clamps to 1 with a warning; negative or non-finite delays become 0.
    pub fn to_retry_config(&self) -> RetryConfig {
        let max_attempts = if self.max_attempts == 0 {
            tracing::warn!("retry.max_attempts = 0 in config, clamping to 1");
            1
        } else {
            self.max_attempts
        };
        let delays = self
            .delays_secs
            .iter()
            .map(|&s| {
                let secs = if s.is_finite() && s > 0.0 { s } else { 0.0 };
                Duration::from_secs_f64(secs)
            })
            .collect();
        RetryConfig {
            max_attempts,
            delays,
            enabled: self.enabled,
        }
    }
}

/// History storage parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistorySettings {
    /// Maximum unpinned items kept in history; 0 disables the limit.
    pub max_count: usize,
    /// Custom history directory; defaults to the XDG data dir when unset.
    #[serde(default)]
    pub storage_path: Option<PathBuf>,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            max_count: 20,
            storage_path: None,
        }
    }
}

/// Global configuration loaded from `~/.config/snapkeep/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapConfig {
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetrySettings>,
    #[serde(default)]
    pub history: HistorySettings,
}

impl SnapConfig {
    /// Snapshot of the retry policy for one executor instance.
    pub fn retry_config(&self) -> RetryConfig {
        self.retry
            .clone()
            .unwrap_or_default()
            .to_retry_config()
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("snapkeep")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<SnapConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = SnapConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: SnapConfig = toml::from_str(&data)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = SnapConfig::default();
        assert!(cfg.retry.is_none());
        assert_eq!(cfg.history.max_count, 20);
        assert!(cfg.history.storage_path.is_none());

        let retry = cfg.retry_config();
        assert_eq!(retry.max_attempts, 3);
        assert_eq!(retry.delays.len(), 3);
        assert!(retry.enabled);
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = SnapConfig {
            retry: Some(RetrySettings::default()),
            history: HistorySettings {
                max_count: 50,
                storage_path: Some(PathBuf::from("/tmp/captures")),
            },
        };
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: SnapConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.history.max_count, 50);
        assert_eq!(
            parsed.history.storage_path.as_deref(),
            Some(std::path::Path::new("/tmp/captures"))
        );
        assert!(parsed.retry.is_some());
    }

    #[test]
    fn retry_section_parses() {
        let toml = r#"
            [retry]
            max_attempts = 5
            delays_secs = [0.1, 0.2]
            enabled = false
        "#;
        let cfg: SnapConfig = toml::from_str(toml).unwrap();
        let retry = cfg.retry_config();
        assert_eq!(retry.max_attempts, 5);
        assert_eq!(retry.delays, vec![
            Duration::from_millis(100),
            Duration::from_millis(200)
        ]);
        assert!(!retry.enabled);
    }

    #[test]
    fn zero_max_attempts_clamps_to_one() {
        let settings = RetrySettings {
            max_attempts: 0,
            ..Default::default()
        };
        assert_eq!(settings.to_retry_config().max_attempts, 1);
    }

    #[test]
    fn bad_delay_values_become_zero() {
        let settings = RetrySettings {
            delays_secs: vec![-1.0, f64::NAN, 0.5],
            ..Default::default()
        };
        let retry = settings.to_retry_config();
        assert_eq!(retry.delays[0], Duration::ZERO);
        assert_eq!(retry.delays[1], Duration::ZERO);
        assert_eq!(retry.delays[2], Duration::from_millis(500));
    }
}
