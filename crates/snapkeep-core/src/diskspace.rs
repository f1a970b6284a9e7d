//! Free-space query used by disk-full classification and the cleanup report.

use std::path::Path;

/// Bytes available to unprivileged writes on the filesystem holding `path`.
/// Returns 0 when the query fails; callers treat that as "unknown".
#[cfg(unix)]
pub fn available_bytes(path: &Path) -> u64 {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let Ok(c_path) = CString::new(path.as_os_str().as_bytes()) else {
        return 0;
    };
    let mut stats: libc::statvfs = unsafe { std::mem::zeroed() };
    let rc = unsafe { libc::statvfs(c_path.as_ptr(), &mut stats) };
    if rc != 0 {
        tracing::debug!(path = %path.display(), "statvfs failed");
        return 0;
    }
    (stats.f_bavail as u64).saturating_mul(stats.f_frsize as u64)
}

#[cfg(not(unix))]
pub fn available_bytes(_path: &Path) -> u64 {
    0
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn temp_dir_has_free_space() {
        assert!(available_bytes(&std::env::temp_dir()) > 0);
    }

    #[test]
    fn missing_path_reports_zero() {
        assert_eq!(available_bytes(Path::new("/definitely/not/here")), 0);
    }
}
