use std::path::Path;

/// Get available disk space in bytes for the given path
#[cfg(unix)]
pub fn available_space(path: &Path) -> Option<u64> {
    use nix::sys::statvfs::statvfs;
    let stat = statvfs(path).ok()?;
    Some(stat.blocks_available() as u64 * stat.fragment_size() as u64)
}

#[cfg(not(unix))]
pub fn available_space(_path: &Path) -> Option<u64> {
    None
}

/// Free space in bytes when it is below `min_free_mb`, `None` otherwise
pub fn low_space(path: &Path, min_free_mb: u64) -> Option<u64> {
    if min_free_mb == 0 {
        return None;
    }
    available_space(path).filter(|available| *available < min_free_mb.saturating_mul(1024 * 1024))
}
