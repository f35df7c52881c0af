//! Transaction support for installs and removals
//!
//! Every mutation of a target root goes through a [`Transaction`] so that a
//! failed run leaves the root as it found it: created files and directories
//! are removed and overwritten or deleted files are restored.
//!
//! ## Usage
//!
//! ```ignore
//! let mut transaction = Transaction::new();
//! transaction.backup_file(&path)?;
//! std::fs::write(&path, new_content)?;
//!
//! // On success:
//! transaction.commit();
//!
//! // On error (automatic via Drop if not committed):
//! // rollback happens automatically
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, read_failed};

/// Original content of a file the transaction overwrote or removed
#[derive(Debug, Clone)]
struct FileBackup {
    path: PathBuf,
    content: Vec<u8>,
    #[cfg(unix)]
    mode: u32,
}

/// A transaction over a set of filesystem mutations
#[derive(Debug, Default)]
pub struct Transaction {
    /// Files created during this transaction
    created_files: HashSet<PathBuf>,

    /// Files overwritten or removed during this transaction
    backups: Vec<FileBackup>,

    /// Directories created during this transaction
    created_dirs: HashSet<PathBuf>,

    /// Whether the transaction has been committed
    committed: bool,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the state of `path` before it is written or removed.
    ///
    /// A missing file is tracked as created, an existing one is backed up
    /// once (the first backup wins, it holds the pre-transaction content).
    pub fn backup_file(&mut self, path: &Path) -> Result<()> {
        if self.created_files.contains(path) || self.backups.iter().any(|b| b.path == path) {
            return Ok(());
        }
        if !path.exists() {
            self.created_files.insert(path.to_path_buf());
            return Ok(());
        }

        let content = fs::read(path).map_err(|e| read_failed(path, e))?;
        self.backups.push(FileBackup {
            path: path.to_path_buf(),
            content,
            #[cfg(unix)]
            mode: file_mode(path),
        });
        Ok(())
    }

    /// Create `dir` and any missing parents, tracking the new ones.
    pub fn create_dir_all(&mut self, dir: &Path) -> std::io::Result<()> {
        let mut missing = Vec::new();
        let mut current = Some(dir);
        while let Some(path) = current {
            if path.as_os_str().is_empty() || path.exists() {
                break;
            }
            missing.push(path.to_path_buf());
            current = path.parent();
        }
        fs::create_dir_all(dir)?;
        self.created_dirs.extend(missing);
        Ok(())
    }

    /// Commit the transaction (prevent rollback)
    pub fn commit(mut self) {
        self.committed = true;
    }

    /// Manually trigger a rollback
    pub fn rollback(&mut self) {
        if self.committed {
            return;
        }

        for path in &self.created_files {
            if path.exists() {
                let _ = fs::remove_file(path);
            }
        }

        for backup in &self.backups {
            if let Some(parent) = backup.path.parent() {
                let _ = fs::create_dir_all(parent);
            }
            if let Err(e) = fs::write(&backup.path, &backup.content) {
                eprintln!(
                    "Warning: Failed to restore {}: {}",
                    backup.path.display(),
                    e
                );
                continue;
            }
            #[cfg(unix)]
            restore_mode(&backup.path, backup.mode);
        }

        // Deepest first so nested directories empty out before their parents
        let mut dirs: Vec<_> = self.created_dirs.iter().collect();
        dirs.sort_by_key(|b| std::cmp::Reverse(b.components().count()));
        for path in dirs {
            if path.is_dir()
                && fs::read_dir(path)
                    .map(|mut d| d.next().is_none())
                    .unwrap_or(false)
            {
                let _ = fs::remove_dir(path);
            }
        }

        self.committed = true;
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        if !self.committed {
            self.rollback();
        }
    }
}

#[cfg(unix)]
fn file_mode(path: &Path) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path).map_or(0o644, |m| m.permissions().mode())
}

#[cfg(unix)]
fn restore_mode(path: &Path, mode: u32) {
    use std::os::unix::fs::PermissionsExt;
    let _ = fs::set_permissions(path, fs::Permissions::from_mode(mode));
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_transaction_commit_keeps_files() {
        let temp = TempDir::new().unwrap();
        let test_file = temp.path().join("test.txt");

        let mut transaction = Transaction::new();
        transaction.backup_file(&test_file).unwrap();
        fs::write(&test_file, "test content").unwrap();
        transaction.commit();

        assert!(test_file.exists());
    }

    #[test]
    fn test_transaction_rollback_created_files() {
        let temp = TempDir::new().unwrap();
        let test_file = temp.path().join("test.txt");

        {
            let mut transaction = Transaction::new();
            transaction.backup_file(&test_file).unwrap();
            fs::write(&test_file, "test content").unwrap();
            // Don't commit - should rollback on drop
        }

        assert!(!test_file.exists());
    }

    #[test]
    fn test_transaction_restores_overwritten_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.json");
        fs::write(&path, "original").unwrap();

        {
            let mut transaction = Transaction::new();
            transaction.backup_file(&path).unwrap();
            fs::write(&path, "modified").unwrap();
            // Second backup must not capture the modified content
            transaction.backup_file(&path).unwrap();
        }

        assert_eq!(fs::read_to_string(&path).unwrap(), "original");
    }

    #[test]
    fn test_transaction_restores_removed_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("skills/a/SKILL.md");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "skill").unwrap();

        {
            let mut transaction = Transaction::new();
            transaction.backup_file(&path).unwrap();
            fs::remove_file(&path).unwrap();
            fs::remove_dir(path.parent().unwrap()).unwrap();
        }

        assert_eq!(fs::read_to_string(&path).unwrap(), "skill");
    }

    #[test]
    fn test_transaction_removes_created_dirs() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("new_dir/inner");

        {
            let mut transaction = Transaction::new();
            transaction.create_dir_all(&nested).unwrap();
            let file = nested.join("file.md");
            transaction.backup_file(&file).unwrap();
            fs::write(&file, "x").unwrap();
        }

        assert!(!temp.path().join("new_dir").exists());
        assert!(temp.path().exists());
    }
}
