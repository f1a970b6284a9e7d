//! Recoverable error taxonomy and terminal recovery outcomes.

use thiserror::Error;

/// Coarse error class driving the recovery strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    PermissionDenied,
    SystemBusy,
    DiskFull,
    NetworkError,
    Unknown,
}

impl ErrorCategory {
    /// Whether the executor may retry automatically. `PermissionDenied` and
    /// `DiskFull` need user action first; everything else is worth another try.
    pub fn is_recoverable(self) -> bool {
        match self {
            ErrorCategory::PermissionDenied | ErrorCategory::DiskFull => false,
            ErrorCategory::SystemBusy | ErrorCategory::NetworkError | ErrorCategory::Unknown => {
                true
            }
        }
    }
}

/// Remediation the caller can offer the user alongside an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickAction {
    OpenSystemPreferences,
    CleanupDiskSpace,
    RetryNow,
    CheckNetwork,
    ViewErrorLog,
}

impl QuickAction {
    pub fn label(self) -> &'static str {
        match self {
            QuickAction::OpenSystemPreferences => "grant permission in system settings",
            QuickAction::CleanupDiskSpace => "clean up disk space",
            QuickAction::RetryNow => "retry now",
            QuickAction::CheckNetwork => "check the network connection",
            QuickAction::ViewErrorLog => "view the error log",
        }
    }
}

/// Domain failure with recovery support. Each variant maps to exactly one
/// [`ErrorCategory`] and carries enough context for a useful message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecoverableError {
    #[error("screen capture permission denied")]
    PermissionDenied,
    #[error("system busy (attempt {attempt})")]
    SystemBusy { attempt: u32 },
    #[error("disk full ({} MiB available)", .available_bytes / (1024 * 1024))]
    DiskFull { available_bytes: u64 },
    #[error("network error: {cause}")]
    NetworkError { cause: String },
    #[error("capture failed: {reason}")]
    CaptureFailed { reason: String },
    #[error("image processing failed: {reason}")]
    ProcessingFailed { reason: String },
    #[error("save failed: {reason}")]
    SaveFailed { reason: String },
}

impl RecoverableError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            RecoverableError::PermissionDenied => ErrorCategory::PermissionDenied,
            RecoverableError::SystemBusy { .. } => ErrorCategory::SystemBusy,
            RecoverableError::DiskFull { .. } => ErrorCategory::DiskFull,
            RecoverableError::NetworkError { .. } => ErrorCategory::NetworkError,
            RecoverableError::CaptureFailed { .. }
            | RecoverableError::ProcessingFailed { .. }
            | RecoverableError::SaveFailed { .. } => ErrorCategory::Unknown,
        }
    }

    /// Human-readable hint shown next to the error message.
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            RecoverableError::PermissionDenied => {
                "Allow screen capture for snapkeep in the system privacy settings, then retry."
            }
            RecoverableError::SystemBusy { .. } => {
                "The system is busy with other work; the operation retries automatically."
            }
            RecoverableError::DiskFull { .. } => {
                "Not enough disk space. Clean up the capture history, delete old files, \
                 or move the history to another disk."
            }
            RecoverableError::NetworkError { .. } => {
                "Upload failed; it resumes when the network is back. Check the connection."
            }
            RecoverableError::CaptureFailed { .. } => {
                "Capture failed and is retried automatically. If it keeps failing, restart the tool."
            }
            RecoverableError::ProcessingFailed { .. } => {
                "Image processing failed. Check the image format settings or try another format."
            }
            RecoverableError::SaveFailed { .. } => {
                "Saving failed. Check permissions on the save path and available disk space."
            }
        }
    }

    pub fn quick_action(&self) -> Option<QuickAction> {
        match self {
            RecoverableError::PermissionDenied => Some(QuickAction::OpenSystemPreferences),
            RecoverableError::SystemBusy { .. } => Some(QuickAction::RetryNow),
            RecoverableError::DiskFull { .. } => Some(QuickAction::CleanupDiskSpace),
            RecoverableError::NetworkError { .. } => Some(QuickAction::CheckNetwork),
            RecoverableError::CaptureFailed { .. }
            | RecoverableError::ProcessingFailed { .. }
            | RecoverableError::SaveFailed { .. } => Some(QuickAction::ViewErrorLog),
        }
    }
}

/// Terminal outcome of one `execute_with_retry` invocation.
///
/// The success value rides in `Recovered` so a caller never has to re-run the
/// operation after a successful retry.
#[derive(Debug)]
pub enum RecoveryResult<T> {
    /// Operation succeeded, possibly after retries.
    Recovered(T),
    /// Operation failed and retries were not applicable.
    Failed(RecoverableError),
    /// Failure needs user intervention before a retry can succeed.
    UserActionRequired(RecoverableError),
    /// Failure was recoverable but attempts ran out.
    MaxRetriesExceeded(RecoverableError),
    /// Caller cancelled the retry loop via a [`super::CancelToken`].
    Cancelled,
}

impl<T> RecoveryResult<T> {
    pub fn is_recovered(&self) -> bool {
        matches!(self, RecoveryResult::Recovered(_))
    }

    /// The terminal error, if any.
    pub fn error(&self) -> Option<&RecoverableError> {
        match self {
            RecoveryResult::Failed(e)
            | RecoveryResult::UserActionRequired(e)
            | RecoveryResult::MaxRetriesExceeded(e) => Some(e),
            RecoveryResult::Recovered(_) | RecoveryResult::Cancelled => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            RecoveryResult::Recovered(v) => Some(v),
            _ => None,
        }
    }
}
