//! Cursor adapter
//!
//! Cursor reads flat rule files, so everything lands directly in the base
//! directory: `<base>/<skill>.md` (primary document only) and
//! `<base>/<agent file>`. Hooks are not supported.
//!
//! Skills and agents share that namespace, so two entries flattening to the
//! same file fail the install instead of overwriting each other.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::{Adapter, InstallContext};
use crate::catalog::{AgentEntry, SkillEntry};
use crate::error::{InstallerError, Result};
use crate::installer::sink::{FileSink, Ownership};
use crate::target::TargetKind;

#[derive(Debug, Default)]
pub struct CursorAdapter {
    /// Rule files written so far in this run
    written: HashSet<PathBuf>,
}

impl CursorAdapter {
    fn claim(&mut self, target: &Path, entry: &str) -> Result<()> {
        if self.written.insert(target.to_path_buf()) {
            return Ok(());
        }
        Err(InstallerError::MaterializationFailed {
            path: target.display().to_string(),
            reason: format!("{entry} flattens to a rule file another entry already wrote"),
        })
    }
}

/// Flat rule file name for a skill: `<name>.md` with no path separators.
pub fn rule_file_name(name: &str) -> String {
    let mut sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '-'
            }
        })
        .collect();
    while sanitized.starts_with('.') {
        sanitized.remove(0);
    }
    if sanitized.is_empty() {
        sanitized.push_str("skill");
    }
    format!("{sanitized}.md")
}

impl Adapter for CursorAdapter {
    fn kind(&self) -> TargetKind {
        TargetKind::Cursor
    }

    fn layout_skill(&self, skill: &SkillEntry, base: &Path) -> Vec<PathBuf> {
        vec![base.join(rule_file_name(&skill.name))]
    }

    fn layout_agent(&self, agent: &AgentEntry, base: &Path) -> Vec<PathBuf> {
        vec![base.join(&agent.file_name)]
    }

    fn materialize_skill(
        &mut self,
        skill: &SkillEntry,
        ctx: &InstallContext<'_>,
        sink: &mut dyn FileSink,
    ) -> Result<()> {
        for target in self.layout_skill(skill, ctx.base()) {
            self.claim(&target, &format!("skill '{}'", skill.name))?;
            sink.copy(&skill.primary_document, &target, Ownership::Owned)?;
        }
        Ok(())
    }

    fn materialize_agent(
        &mut self,
        agent: &AgentEntry,
        ctx: &InstallContext<'_>,
        sink: &mut dyn FileSink,
    ) -> Result<()> {
        for target in self.layout_agent(agent, ctx.base()) {
            self.claim(&target, &format!("agent '{}'", agent.file_name))?;
            sink.write(&target, agent.raw.as_bytes(), Ownership::Owned)?;
        }
        Ok(())
    }
}
