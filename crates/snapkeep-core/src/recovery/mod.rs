//! Error recovery and retry policy.
//!
//! This module encapsulates failure classification (permissions, disk space,
//! network, busy system), the bounded retry loop with per-attempt backoff,
//! and the disk-cleanup fallback so that higher layers (CLI, importers) can
//! share a consistent policy.

mod cancel;
mod classify;
mod cleanup;
mod error;
mod policy;
mod run;

pub use cancel::CancelToken;
pub use classify::classify_io_error;
pub use cleanup::{attempt_disk_cleanup, cleanup_count};
pub use error::{ErrorCategory, QuickAction, RecoverableError, RecoveryResult};
pub use policy::RetryConfig;
pub use run::RecoveryManager;
