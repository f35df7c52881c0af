//! Temporary clone directories.
//!
//! `std::env::temp_dir` returns `TMPDIR` unchanged, which may be relative
//! (`TMPDIR=tmp`). A clone created there would land inside the project being
//! installed into, so relative values are replaced with the platform default.
//!
//! `TempDir` removes itself on drop, which an interrupt skips. Directories
//! registered with [`remove_on_interrupt`] are deleted by a SIGINT/SIGTERM
//! handler before the process exits.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, Once, PoisonError};

/// Exit status after an interrupt (128 + SIGINT)
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

static PENDING: Mutex<Vec<PathBuf>> = Mutex::new(Vec::new());
static HANDLER: Once = Once::new();

/// Directory to create temporary clones in; always absolute.
pub fn temp_dir_base() -> PathBuf {
    let dir = env::temp_dir();
    if dir.is_absolute() {
        return dir;
    }
    #[cfg(windows)]
    {
        env::var("TEMP")
            .or_else(|_| env::var("TMP"))
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Windows\\Temp"))
    }
    #[cfg(not(windows))]
    {
        PathBuf::from("/tmp")
    }
}

/// Keeps a directory on the interrupt cleanup list until dropped
#[derive(Debug)]
pub struct CleanupGuard {
    path: PathBuf,
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        pending().retain(|p| p != &self.path);
    }
}

/// Delete `path` if the process is interrupted while the guard lives.
pub fn remove_on_interrupt(path: &Path) -> CleanupGuard {
    HANDLER.call_once(|| {
        // Fails only when a handler is already installed
        let _ = ctrlc::set_handler(|| {
            let paths = std::mem::take(&mut *pending());
            remove_all(&paths);
            eprintln!("Interrupted.");
            std::process::exit(INTERRUPTED_EXIT_CODE);
        });
    });
    pending().push(path.to_path_buf());
    CleanupGuard {
        path: path.to_path_buf(),
    }
}

fn pending() -> MutexGuard<'static, Vec<PathBuf>> {
    PENDING.lock().unwrap_or_else(PoisonError::into_inner)
}

fn remove_all(paths: &[PathBuf]) {
    for path in paths {
        let _ = std::fs::remove_dir_all(path);
    }
}
