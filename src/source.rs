//! Source root resolution
//!
//! The content to install comes from a source tree with `skills/` and
//! `agents/` directories. It is located in this order:
//!
//! 1. `--source` / `AGENTIC_SKILLS_SOURCE`
//! 2. The current directory
//! 3. Ancestors of the running executable (running from a checkout)
//! 4. A shallow clone of the canonical repository into a temporary directory
//!
//! A cloned source is owned by [`SourceRoot`] and deleted when it is dropped,
//! on success and error paths alike, or by the interrupt handler.

use std::path::{Path, PathBuf};

use git2::{ErrorClass, FetchOptions, build::RepoBuilder};
use tempfile::TempDir;

use crate::catalog::is_source_root;
use crate::error::{InstallerError, Result};
use crate::temp::{CleanupGuard, remove_on_interrupt, temp_dir_base};

/// Canonical repository cloned when no local source is found
pub const DEFAULT_REPO_URL: &str = "https://github.com/agentic-skills/agentic-skills.git";

/// Branch cloned by default
pub const DEFAULT_REF: &str = "main";

/// How to locate the source tree
#[derive(Debug, Clone, Copy)]
pub struct SourceOptions<'a> {
    pub explicit: Option<&'a Path>,
    pub repo: &'a str,
    pub git_ref: &'a str,
}

/// A resolved source tree
#[derive(Debug)]
pub enum SourceRoot {
    Local(PathBuf),
    Cloned {
        /// Keeps the clone alive; removed on drop
        dir: TempDir,
        url: String,
        /// Dropped after `dir`; removes the clone on interrupt until then
        guard: CleanupGuard,
    },
}

impl SourceRoot {
    pub fn path(&self) -> &Path {
        match self {
            SourceRoot::Local(path) => path,
            SourceRoot::Cloned { dir, .. } => dir.path(),
        }
    }

    /// Value recorded in the manifest
    pub fn describe(&self) -> String {
        match self {
            SourceRoot::Local(path) => path.display().to_string(),
            SourceRoot::Cloned { url, .. } => url.clone(),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, SourceRoot::Cloned { .. })
    }
}

/// Resolve the source tree for this run.
pub fn resolve(options: SourceOptions<'_>) -> Result<SourceRoot> {
    if let Some(explicit) = options.explicit {
        return local(explicit);
    }

    let cwd = std::env::current_dir().ok();
    let exe = std::env::current_exe().ok();
    if let Some(found) = discover_local(cwd.as_deref(), exe.as_deref()) {
        return Ok(SourceRoot::Local(found));
    }

    clone_source(options.repo, options.git_ref)
}

/// Validate an explicit source root.
pub fn local(path: &Path) -> Result<SourceRoot> {
    if !is_source_root(path) {
        return Err(InstallerError::SourceNotFound {
            path: path.display().to_string(),
        });
    }
    let path = dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    Ok(SourceRoot::Local(path))
}

/// Whether a recorded source names a repository rather than a directory.
pub fn is_repo_url(source: &str) -> bool {
    source.contains("://") || (source.starts_with("git@") && source.contains(':'))
}

/// Find a source tree at `cwd` or above the executable.
pub fn discover_local(cwd: Option<&Path>, exe: Option<&Path>) -> Option<PathBuf> {
    if let Some(cwd) = cwd.filter(|dir| is_source_root(dir)) {
        return Some(cwd.to_path_buf());
    }
    exe?.ancestors()
        .skip(1)
        .find(|dir| is_source_root(dir))
        .map(Path::to_path_buf)
}

/// Shallow-clone `url` at branch `git_ref` into a fresh temporary directory.
pub fn clone_source(url: &str, git_ref: &str) -> Result<SourceRoot> {
    let clone_failed = |reason: String| InstallerError::CloneFailed {
        url: url.to_string(),
        reason,
    };

    let dir = TempDir::with_prefix_in("agentic-skills-", temp_dir_base())
        .map_err(|e| clone_failed(format!("cannot create temporary directory: {e}")))?;
    let guard = remove_on_interrupt(dir.path());

    let mut fetch_options = FetchOptions::new();
    // Shallow fetches are not supported by the local transport
    let is_local = url.starts_with("file://") || Path::new(url).is_absolute();
    if !is_local {
        fetch_options.depth(1);
    }

    let mut builder = RepoBuilder::new();
    builder.fetch_options(fetch_options);
    if !git_ref.is_empty() {
        builder.branch(git_ref);
    }
    builder
        .clone(url, dir.path())
        .map_err(|e| clone_failed(interpret_git_error(&e)))?;

    if !is_source_root(dir.path()) {
        return Err(clone_failed(
            "repository does not contain skills/ and agents/".to_string(),
        ));
    }

    Ok(SourceRoot::Cloned {
        dir,
        url: url.to_string(),
        guard,
    })
}

fn interpret_git_error(err: &git2::Error) -> String {
    let message = err.message().to_lowercase();
    if message.contains("not found") || message.contains("404") {
        "repository or branch not found".to_string()
    } else if message.contains("authentication") || message.contains("credentials") {
        "authentication required".to_string()
    } else if err.class() == ErrorClass::Net
        || message.contains("could not resolve")
        || message.contains("timed out")
    {
        format!("network error: {}", err.message())
    } else {
        err.message().to_string()
    }
}
