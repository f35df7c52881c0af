//! Source catalog
//!
//! Read-only enumeration of the content shipped in a source tree:
//! - `skills/<name>/SKILL.md` plus reference files ([`SkillEntry`])
//! - `agents/<name>.md` ([`AgentEntry`])
//! - `hooks/*.sh`, `hooks/settings.json` and `plugins/opencode/*` ([`HookAssets`])
//!
//! Every list is sorted by name so dry-run previews and manifests are stable.

mod agent;
mod hooks;
mod skill;

use std::path::{Path, PathBuf};

use crate::error::{InstallerError, Result};

pub use agent::{AgentEntry, enumerate_agents};
pub use hooks::{HOOK_SETTINGS_FILE, HOOKS_DIR, HookAssets, enumerate_hooks};
pub use skill::{SkillEntry, enumerate_skills};

/// Directory holding skill packages
pub const SKILLS_DIR: &str = "skills";
/// Directory holding agent definitions
pub const AGENTS_DIR: &str = "agents";

/// Everything a source tree offers for installation
#[derive(Debug, Clone)]
pub struct Catalog {
    pub root: PathBuf,
    pub skills: Vec<SkillEntry>,
    pub agents: Vec<AgentEntry>,
    pub hooks: HookAssets,
}

impl Catalog {
    /// Enumerate a source root. Fails with `SourceNotFound` when `skills/` or
    /// `agents/` is missing.
    pub fn load(root: &Path) -> Result<Self> {
        Ok(Self {
            root: root.to_path_buf(),
            skills: enumerate_skills(root)?,
            agents: enumerate_agents(root)?,
            hooks: enumerate_hooks(root)?,
        })
    }
}

/// Check whether `root` looks like a source tree.
pub fn is_source_root(root: &Path) -> bool {
    root.join(SKILLS_DIR).is_dir() && root.join(AGENTS_DIR).is_dir()
}

fn required_dir(root: &Path, name: &str) -> Result<PathBuf> {
    let dir = root.join(name);
    if dir.is_dir() {
        Ok(dir)
    } else {
        Err(InstallerError::SourceNotFound {
            path: dir.display().to_string(),
        })
    }
}

/// Sorted directory entries of `dir`.
fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let read = std::fs::read_dir(dir).map_err(|e| crate::error::read_failed(dir, e))?;
    let mut paths = Vec::new();
    for entry in read {
        let entry = entry.map_err(|e| crate::error::read_failed(dir, e))?;
        paths.push(entry.path());
    }
    paths.sort();
    Ok(paths)
}


#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_catalog() {
        let temp = TempDir::new().unwrap();
        test_support::sample_source(temp.path());

        let catalog = Catalog::load(temp.path()).unwrap();
        let skills: Vec<_> = catalog.skills.iter().map(|s| s.name.as_str()).collect();
        let agents: Vec<_> = catalog.agents.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(skills, vec!["debugging", "testing"]);
        assert_eq!(agents, vec!["architect", "reviewer"]);
        assert_eq!(catalog.hooks.scripts.len(), 2);
        assert!(catalog.hooks.settings.is_some());
    }

    #[test]
    fn test_missing_skills_dir_is_fatal() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("agents")).unwrap();

        let err = Catalog::load(temp.path()).unwrap_err();
        assert!(matches!(err, InstallerError::SourceNotFound { .. }));
    }

    #[test]
    fn test_missing_agents_dir_is_fatal() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("skills")).unwrap();

        let err = Catalog::load(temp.path()).unwrap_err();
        assert!(matches!(err, InstallerError::SourceNotFound { .. }));
    }

    #[test]
    fn test_is_source_root() {
        let temp = TempDir::new().unwrap();
        assert!(!is_source_root(temp.path()));
        test_support::sample_source(temp.path());
        assert!(is_source_root(temp.path()));
    }
}
