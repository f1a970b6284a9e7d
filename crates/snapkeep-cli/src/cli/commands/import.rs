//! `snapkeep import <path>` – copy a capture into the history under the
//! retry executor, with the disk-cleanup fallback on a full disk.

use anyhow::{bail, Result};
use snapkeep_core::config::SnapConfig;
use snapkeep_core::history::{self, HistoryItem, HistoryStore};
use snapkeep_core::recovery::{
    attempt_disk_cleanup, classify_io_error, ErrorCategory, RecoverableError, RecoveryManager,
    RecoveryResult,
};
use std::path::{Path, PathBuf};

pub async fn run_import(cfg: &SnapConfig, path: &Path, pin: bool) -> Result<()> {
    if !path.is_file() {
        bail!("no such file: {}", path.display());
    }
    let mut store = HistoryStore::open_default(cfg)?;
    let manager = RecoveryManager::new(cfg.retry_config());

    let file_name = history::import_file_name(path);
    let dest = store.images_dir().join(&file_name);

    match copy_with_retry(&manager, path, &dest).await {
        RecoveryResult::Recovered(size) => {
            finish(&mut store, path, &file_name, size, pin)?;
        }
        RecoveryResult::UserActionRequired(err)
            if err.category() == ErrorCategory::DiskFull =>
        {
            tracing::warn!(%err, "import hit a full disk, trying history cleanup");
            if !attempt_disk_cleanup(&mut store)? {
                return report_failure(&err);
            }
            // One direct attempt after cleanup; if the disk is still full the
            // error goes to the user instead of looping.
            let size = tokio::fs::copy(path, &dest)
                .await
                .map_err(|e| classify_io_error(&e, store.images_dir()))?;
            finish(&mut store, path, &file_name, size, pin)?;
        }
        RecoveryResult::Failed(err)
        | RecoveryResult::UserActionRequired(err)
        | RecoveryResult::MaxRetriesExceeded(err) => return report_failure(&err),
        RecoveryResult::Cancelled => bail!("import cancelled"),
    }
    Ok(())
}

async fn copy_with_retry(
    manager: &RecoveryManager,
    src: &Path,
    dest: &Path,
) -> RecoveryResult<u64> {
    let probe = dest
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let src = src.to_path_buf();
    let dest = dest.to_path_buf();

    manager
        .execute_with_retry_observed(
            move || {
                let src = src.clone();
                let dest = dest.clone();
                let probe = probe.clone();
                async move {
                    tokio::fs::copy(&src, &dest)
                        .await
                        .map_err(|e| classify_io_error(&e, &probe))
                }
            },
            |err| tracing::warn!(%err, "capture import attempt failed"),
            |size: &u64| tracing::debug!(bytes = *size, "capture copied into history"),
        )
        .await
}

fn finish(
    store: &mut HistoryStore,
    src: &Path,
    file_name: &str,
    size: u64,
    pin: bool,
) -> Result<()> {
    let item: HistoryItem = store.record_import(file_name, size, pin)?;
    println!(
        "Imported {} as {} ({})",
        src.display(),
        item.short_id(),
        item.formatted_size()
    );
    Ok(())
}

/// Surface a terminal failure: message, recovery suggestion, and the quick
/// action the user can take.
fn report_failure(err: &RecoverableError) -> Result<()> {
    eprintln!("{}", err.recovery_suggestion());
    if let Some(action) = err.quick_action() {
        eprintln!("Suggested action: {}", action.label());
    }
    bail!("import failed: {err}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use snapkeep_core::config::HistorySettings;

    fn test_config(root: &Path) -> SnapConfig {
        SnapConfig {
            retry: None,
            history: HistorySettings {
                max_count: 20,
                storage_path: Some(root.to_path_buf()),
            },
        }
    }

    #[tokio::test]
    async fn import_copies_file_and_records_item() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("shot.png");
        std::fs::write(&src, b"fake image bytes").unwrap();
        let cfg = test_config(&dir.path().join("history"));

        run_import(&cfg, &src, false).await.unwrap();

        let store = HistoryStore::open_default(&cfg).unwrap();
        assert_eq!(store.items().len(), 1);
        let item = &store.items()[0];
        assert_eq!(item.file_size, 16);
        assert_eq!(item.format, "png");
        assert!(store.images_dir().join(&item.file_name).is_file());
    }

    #[tokio::test]
    async fn import_missing_file_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = test_config(&dir.path().join("history"));
        let err = run_import(&cfg, &dir.path().join("gone.png"), false)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no such file"));
    }
}
