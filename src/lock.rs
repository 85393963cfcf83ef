//! File locking and atomic writes for the workspace document.
//!
//! The workspace JSON may be read and written by several taskflow processes
//! (two terminals, a scripted batch). Writers hold an exclusive flock on a
//! sibling `.lock` file and publish via temp-file + rename so readers never
//! observe a half-written document.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use fs2::FileExt;

use crate::error::{Error, Result};

/// Default lock timeout in milliseconds
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5000;

/// Retry interval while waiting for a contended lock
const LOCK_RETRY_INTERVAL_MS: u64 = 50;

fn is_lock_contended(err: &io::Error) -> bool {
    if err.kind() == io::ErrorKind::WouldBlock {
        return true;
    }

    // Windows surfaces sharing violations as "Other"; treat as contention
    // so callers get Err(LockFailed) after the timeout.
    #[cfg(windows)]
    {
        matches!(err.raw_os_error(), Some(32) | Some(33))
    }
    #[cfg(not(windows))]
    {
        false
    }
}

/// An exclusive file lock released on drop.
pub struct FileLock {
    file: File,
    path: PathBuf,
}

impl FileLock {
    /// Acquire an exclusive lock, creating the lock file if needed.
    /// Polls until `timeout_ms` elapses, then fails with `LockFailed`.
    pub fn acquire(path: impl AsRef<Path>, timeout_ms: u64) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let start = Instant::now();
        let timeout = Duration::from_millis(timeout_ms);
        let retry_interval = Duration::from_millis(LOCK_RETRY_INTERVAL_MS);

        loop {
            match file.try_lock_exclusive() {
                Ok(()) => {
                    return Ok(FileLock {
                        file,
                        path: path.to_path_buf(),
                    });
                }
                Err(e) if is_lock_contended(&e) => {
                    if start.elapsed() >= timeout {
                        return Err(Error::LockFailed(path.to_path_buf()));
                    }
                    std::thread::sleep(retry_interval);
                }
                Err(e) => {
                    return Err(Error::Io(e));
                }
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // Ignore unlock errors during drop.
        let _ = self.file.unlock();
    }
}

/// Write a file atomically: temp file in the same directory, fsync, rename.
/// The target either keeps its old contents or holds the full new ones.
pub fn write_atomic(path: impl AsRef<Path>, data: &[u8]) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    // Temp file must live in the same directory for the rename to be atomic.
    let temp_path = path.with_extension(format!(
        "{}.tmp.{}",
        path.extension().and_then(|e| e.to_str()).unwrap_or(""),
        std::process::id()
    ));

    let mut temp_file = File::create(&temp_path)?;
    temp_file.write_all(data)?;
    temp_file.sync_all()?;
    drop(temp_file);

    fs::rename(&temp_path, path)?;
    Ok(())
}

/// Atomic write while holding the sibling `<path>.lock`.
pub fn write_atomic_locked(path: impl AsRef<Path>, data: &[u8], timeout_ms: u64) -> Result<()> {
    let path = path.as_ref();
    let lock_path = lock_path_for(path);
    let _lock = FileLock::acquire(lock_path, timeout_ms)?;
    write_atomic(path, data)
}

/// Read a file while holding the sibling `<path>.lock`, so a concurrent
/// writer cannot interleave.
pub fn read_locked(path: impl AsRef<Path>, timeout_ms: u64) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let lock_path = lock_path_for(path);
    let _lock = FileLock::acquire(lock_path, timeout_ms)?;
    Ok(fs::read(path)?)
}

fn lock_path_for(path: &Path) -> PathBuf {
    PathBuf::from(format!("{}.lock", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_is_exclusive_until_dropped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let lock_path = dir.path().join("ws.lock");

        let first = FileLock::acquire(&lock_path, 1000).expect("first lock");
        let contended = FileLock::acquire(&lock_path, 100);
        assert!(matches!(contended, Err(Error::LockFailed(_))));

        drop(first);
        FileLock::acquire(&lock_path, 1000).expect("relock after drop");
    }

    #[test]
    fn atomic_write_replaces_contents() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("ws.json");
        write_atomic(&path, b"{\"v\":1}").expect("first write");
        write_atomic(&path, b"{\"v\":2}").expect("second write");
        let data = fs::read(&path).expect("read");
        assert_eq!(data, b"{\"v\":2}");
        // No temp files left behind.
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .expect("read_dir")
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().contains(".tmp."))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn read_locked_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("ws.json");
        write_atomic_locked(&path, b"hello", DEFAULT_LOCK_TIMEOUT_MS).expect("write");
        let data = read_locked(&path, DEFAULT_LOCK_TIMEOUT_MS).expect("read");
        assert_eq!(data, b"hello");
    }
}
