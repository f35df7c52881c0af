//! File sinks
//!
//! Adapters never touch the filesystem directly. They describe every mutation
//! to a [`FileSink`]:
//! - [`FsSink`] applies it inside a [`Transaction`] (rolled back on failure)
//! - [`DryRunSink`] records it for the `[DRY RUN]` preview and writes nothing
//!
//! Both sinks keep the set of files written, which is what the manifest
//! records, so a file cannot be written without being listed.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, read_failed, write_failed};
use crate::transaction::Transaction;

/// Who owns a written file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// Written wholesale by the installer, removed by uninstall
    Owned,
    /// Shared with the user (merged settings, Codex document), edited in place
    Shared,
}

/// A planned or applied filesystem mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOp {
    Write { path: PathBuf, ownership: Ownership },
    SetExecutable { path: PathBuf },
    Remove { path: PathBuf },
}

impl FileOp {
    pub fn path(&self) -> &Path {
        match self {
            FileOp::Write { path, .. } | FileOp::SetExecutable { path } | FileOp::Remove { path } => {
                path
            }
        }
    }
}

/// Destination for every filesystem mutation of a run
pub trait FileSink {
    /// Write `contents` to `path`, creating parent directories.
    fn write(&mut self, path: &Path, contents: &[u8], ownership: Ownership) -> Result<()>;

    /// Mark `path` executable (0755 on unix, no-op elsewhere).
    fn set_executable(&mut self, path: &Path) -> Result<()>;

    /// Remove the file at `path`. Missing files are not an error.
    fn remove(&mut self, path: &Path) -> Result<()>;

    /// Every operation in the order it was issued
    fn ops(&self) -> &[FileOp];

    /// Copy a source file to `to`.
    fn copy(&mut self, from: &Path, to: &Path, ownership: Ownership) -> Result<()> {
        let contents = fs::read(from).map_err(|e| read_failed(from, e))?;
        self.write(to, &contents, ownership)
    }

    /// Owned files written so far, sorted
    fn owned_files(&self) -> BTreeSet<PathBuf> {
        self.ops()
            .iter()
            .filter_map(|op| match op {
                FileOp::Write {
                    path,
                    ownership: Ownership::Owned,
                } => Some(path.clone()),
                _ => None,
            })
            .collect()
    }
}

/// Sink that applies operations to disk within a transaction
#[derive(Debug, Default)]
pub struct FsSink {
    transaction: Transaction,
    ops: Vec<FileOp>,
}

impl FsSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep every change made through this sink.
    pub fn commit(self) {
        self.transaction.commit();
    }

    /// Undo every change made through this sink.
    pub fn rollback(mut self) {
        self.transaction.rollback();
    }
}

impl FileSink for FsSink {
    fn write(&mut self, path: &Path, contents: &[u8], ownership: Ownership) -> Result<()> {
        if let Some(parent) = path.parent() {
            self.transaction
                .create_dir_all(parent)
                .map_err(|e| write_failed(parent, e))?;
        }
        self.transaction.backup_file(path)?;
        fs::write(path, contents).map_err(|e| write_failed(path, e))?;
        self.ops.push(FileOp::Write {
            path: path.to_path_buf(),
            ownership,
        });
        Ok(())
    }

    fn set_executable(&mut self, path: &Path) -> Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o755))
                .map_err(|e| write_failed(path, e))?;
        }
        self.ops.push(FileOp::SetExecutable {
            path: path.to_path_buf(),
        });
        Ok(())
    }

    fn remove(&mut self, path: &Path) -> Result<()> {
        if path.exists() {
            self.transaction.backup_file(path)?;
            fs::remove_file(path).map_err(|e| write_failed(path, e))?;
        }
        self.ops.push(FileOp::Remove {
            path: path.to_path_buf(),
        });
        Ok(())
    }

    fn ops(&self) -> &[FileOp] {
        &self.ops
    }
}

/// Sink that records operations without touching the filesystem
#[derive(Debug, Default)]
pub struct DryRunSink {
    ops: Vec<FileOp>,
}

impl DryRunSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FileSink for DryRunSink {
    fn write(&mut self, path: &Path, _contents: &[u8], ownership: Ownership) -> Result<()> {
        self.ops.push(FileOp::Write {
            path: path.to_path_buf(),
            ownership,
        });
        Ok(())
    }

    fn set_executable(&mut self, path: &Path) -> Result<()> {
        self.ops.push(FileOp::SetExecutable {
            path: path.to_path_buf(),
        });
        Ok(())
    }

    fn remove(&mut self, path: &Path) -> Result<()> {
        self.ops.push(FileOp::Remove {
            path: path.to_path_buf(),
        });
        Ok(())
    }

    fn ops(&self) -> &[FileOp] {
        &self.ops
    }

    fn copy(&mut self, from: &Path, to: &Path, ownership: Ownership) -> Result<()> {
        // Surface unreadable sources in previews too
        fs::metadata(from).map_err(|e| read_failed(from, e))?;
        self.write(to, &[], ownership)
    }
}

/// Remove now-empty directories from `start` up to (not including) `stop`.
pub fn prune_empty_dirs(start: &Path, stop: &Path) {
    let mut current = Some(start);
    while let Some(dir) = current {
        if dir == stop || !dir.starts_with(stop) {
            break;
        }
        let is_empty = fs::read_dir(dir)
            .map(|mut d| d.next().is_none())
            .unwrap_or(false);
        if !is_empty || fs::remove_dir(dir).is_err() {
            break;
        }
        current = dir.parent();
    }
}
