//! Target adapters
//!
//! One [`Adapter`] per target tool decides where catalog entries land and how
//! they are rewritten on the way. The installer drives every adapter through
//! the same sequence:
//!
//! ```text
//! prepare -> materialize_skill* -> materialize_agent* -> install_hooks -> finish
//! ```
//!
//! ## Adding a New Target
//!
//! 1. Add a [`TargetKind`] variant with its base path and capabilities
//! 2. Implement [`Adapter`] in a new module here
//! 3. Return it from [`for_target`]

pub mod claude;
pub mod codex;
pub mod cursor;
pub mod opencode;

use std::path::{Path, PathBuf};

use crate::catalog::{AgentEntry, Catalog, SkillEntry};
use crate::error::Result;
use crate::target::{AgentTransform, TargetKind, TargetSpec};

use super::Warning;
use super::settings::MergeOutcome;
use super::sink::{FileSink, Ownership};

/// Inputs shared by every adapter call of a run
#[derive(Debug, Clone, Copy)]
pub struct InstallContext<'a> {
    pub target: &'a TargetSpec,
    pub catalog: &'a Catalog,
    /// Overwrite guards are skipped
    pub force: bool,
}

impl InstallContext<'_> {
    pub fn base(&self) -> &Path {
        &self.target.base_path
    }
}

/// What hook installation produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HookReport {
    /// Hook script file names
    pub scripts: Vec<String>,
    /// Plugin file names
    pub plugin_files: Vec<String>,
    /// Settings reconciliation, for targets that have a settings file
    pub settings: Option<MergeOutcome>,
    /// Package hook registrations now present in the settings file
    pub registered: Option<serde_json::Value>,
    pub warnings: Vec<Warning>,
}

impl HookReport {
    /// Whether anything hook-related is active after the install
    pub fn enabled(&self) -> bool {
        !self.scripts.is_empty()
            || !self.plugin_files.is_empty()
            || matches!(
                self.settings,
                Some(
                    MergeOutcome::Created
                        | MergeOutcome::AlreadyPresent
                        | MergeOutcome::Merged { .. }
                )
            )
    }
}

/// Placement and transformation rules of one target tool
pub trait Adapter {
    fn kind(&self) -> TargetKind;

    fn supports_hooks(&self) -> bool {
        self.kind().supports_hooks()
    }

    /// Destination paths of a skill below `base`
    fn layout_skill(&self, skill: &SkillEntry, base: &Path) -> Vec<PathBuf>;

    /// Destination paths of an agent below `base`
    fn layout_agent(&self, agent: &AgentEntry, base: &Path) -> Vec<PathBuf>;

    /// Runs before any entry is materialized.
    fn prepare(&mut self, _ctx: &InstallContext<'_>) -> Result<()> {
        Ok(())
    }

    fn materialize_skill(
        &mut self,
        skill: &SkillEntry,
        ctx: &InstallContext<'_>,
        sink: &mut dyn FileSink,
    ) -> Result<()>;

    fn materialize_agent(
        &mut self,
        agent: &AgentEntry,
        ctx: &InstallContext<'_>,
        sink: &mut dyn FileSink,
    ) -> Result<()>;

    /// Install hooks. Targets without hook support report a warning.
    fn install_hooks(
        &mut self,
        _ctx: &InstallContext<'_>,
        _sink: &mut dyn FileSink,
    ) -> Result<HookReport> {
        Ok(HookReport {
            warnings: vec![Warning::UnsupportedComponent {
                component: "hooks",
                target: self.kind(),
            }],
            ..HookReport::default()
        })
    }

    /// Runs after every entry was materialized.
    fn finish(&mut self, _ctx: &InstallContext<'_>, _sink: &mut dyn FileSink) -> Result<()> {
        Ok(())
    }
}

/// Adapter for a target kind
pub fn for_target(kind: TargetKind) -> Box<dyn Adapter> {
    match kind.agent_transform() {
        AgentTransform::Identity => Box::new(claude::ClaudeAdapter::new(kind)),
        AgentTransform::OpencodeSubagent => Box::new(opencode::OpencodeAdapter::new(kind)),
        AgentTransform::CursorRule => Box::new(cursor::CursorAdapter::default()),
        AgentTransform::CodexConcat => Box::new(codex::CodexAdapter::default()),
    }
}

/// `<base>/skills/<name>/<file>` for every file of the skill
fn skill_tree_layout(skill: &SkillEntry, base: &Path) -> Vec<PathBuf> {
    let dir = base.join("skills").join(&skill.name);
    skill.files().map(|rel| dir.join(rel)).collect()
}

/// Copy a skill directory into `<base>/skills/<name>/`.
fn copy_skill_tree(skill: &SkillEntry, base: &Path, sink: &mut dyn FileSink) -> Result<()> {
    let dir = base.join("skills").join(&skill.name);
    for rel in skill.files() {
        sink.copy(&skill.dir.join(&rel), &dir.join(&rel), Ownership::Owned)?;
    }
    Ok(())
}

/// File name of a source path as UTF-8
fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::Path;

    use tempfile::TempDir;

    use crate::catalog::{Catalog, test_support::sample_source};
    use crate::target::{TargetKind, TargetSpec};

    /// Source and target roots for adapter tests
    pub struct Fixture {
        pub source: TempDir,
        pub target: TempDir,
        pub catalog: Catalog,
    }

    impl Fixture {
        pub fn new() -> Self {
            let source = TempDir::new().unwrap();
            sample_source(source.path());
            let catalog = Catalog::load(source.path()).unwrap();
            Self {
                source,
                target: TempDir::new().unwrap(),
                catalog,
            }
        }

        pub fn spec(&self, kind: TargetKind) -> TargetSpec {
            TargetSpec::resolve(kind, Some(self.target.path())).unwrap()
        }

        pub fn read(&self, rel: &str) -> String {
            std::fs::read_to_string(self.target.path().join(rel)).unwrap()
        }

        pub fn exists(&self, rel: &str) -> bool {
            self.target.path().join(rel).exists()
        }

        pub fn source_path(&self) -> &Path {
            self.source.path()
        }
    }
}
