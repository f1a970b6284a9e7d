//! Classify raw I/O failures into recoverable error variants.

use std::io;
use std::path::Path;

use crate::diskspace;

use super::error::RecoverableError;

/// Map an I/O error onto the recovery taxonomy.
///
/// `probe_path` is only consulted for the disk-full case, to report how much
/// space is left on the filesystem the write was headed for. Everything else
/// is a pure function of the error itself.
pub fn classify_io_error(e: &io::Error, probe_path: &Path) -> RecoverableError {
    if is_network_kind(e.kind()) {
        return RecoverableError::NetworkError {
            cause: e.to_string(),
        };
    }
    if is_storage_full(e) {
        return RecoverableError::DiskFull {
            available_bytes: diskspace::available_bytes(probe_path),
        };
    }
    if e.kind() == io::ErrorKind::PermissionDenied {
        return RecoverableError::PermissionDenied;
    }
    RecoverableError::CaptureFailed {
        reason: e.to_string(),
    }
}

/// Fallback conversion used by the retry executor's `E: Into<RecoverableError>`
/// bound. Probes the current directory for free space; callers that know the
/// destination should use [`classify_io_error`] with the real path instead.
impl From<io::Error> for RecoverableError {
    fn from(e: io::Error) -> Self {
        classify_io_error(&e, Path::new("."))
    }
}

fn is_network_kind(kind: io::ErrorKind) -> bool {
    matches!(
        kind,
        io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::NotConnected
            | io::ErrorKind::TimedOut
            | io::ErrorKind::HostUnreachable
            | io::ErrorKind::NetworkUnreachable
            | io::ErrorKind::NetworkDown
    )
}

fn is_storage_full(e: &io::Error) -> bool {
    if e.kind() == io::ErrorKind::StorageFull {
        return true;
    }
    #[cfg(unix)]
    if e.raw_os_error() == Some(libc::ENOSPC) {
        return true;
    }
    false
}
