//! OpenCode adapter
//!
//! - Skills → `<base>/skills/<name>/` (same layout as Claude)
//! - Agents → `<base>/agents/<file>` converted to the subagent schema
//! - Hooks → bridged plugin files in `<base>/plugins/`

use std::path::{Path, PathBuf};

use super::{Adapter, HookReport, InstallContext, copy_skill_tree, file_name, skill_tree_layout};
use crate::catalog::{AgentEntry, SkillEntry};
use crate::error::{InstallerError, Result};
use crate::installer::Warning;
use crate::installer::convert;
use crate::installer::sink::{FileSink, Ownership};
use crate::target::TargetKind;

#[derive(Debug)]
pub struct OpencodeAdapter {
    kind: TargetKind,
}

impl OpencodeAdapter {
    pub fn new(kind: TargetKind) -> Self {
        Self { kind }
    }
}

impl Adapter for OpencodeAdapter {
    fn kind(&self) -> TargetKind {
        self.kind
    }

    fn layout_skill(&self, skill: &SkillEntry, base: &Path) -> Vec<PathBuf> {
        skill_tree_layout(skill, base)
    }

    fn layout_agent(&self, agent: &AgentEntry, base: &Path) -> Vec<PathBuf> {
        vec![base.join("agents").join(&agent.file_name)]
    }

    fn materialize_skill(
        &mut self,
        skill: &SkillEntry,
        ctx: &InstallContext<'_>,
        sink: &mut dyn FileSink,
    ) -> Result<()> {
        copy_skill_tree(skill, ctx.base(), sink)
    }

    fn materialize_agent(
        &mut self,
        agent: &AgentEntry,
        ctx: &InstallContext<'_>,
        sink: &mut dyn FileSink,
    ) -> Result<()> {
        let rendered = convert::convert(agent).render().map_err(|e| {
            InstallerError::MaterializationFailed {
                path: agent.path.display().to_string(),
                reason: format!("cannot render agent header: {e}"),
            }
        })?;
        for target in self.layout_agent(agent, ctx.base()) {
            sink.write(&target, rendered.as_bytes(), Ownership::Owned)?;
        }
        Ok(())
    }

    fn install_hooks(
        &mut self,
        ctx: &InstallContext<'_>,
        sink: &mut dyn FileSink,
    ) -> Result<HookReport> {
        let mut report = HookReport::default();
        let plugins = &ctx.catalog.hooks.plugins;

        if plugins.is_empty() {
            report.warnings.push(Warning::MissingHookAssets {
                target: self.kind,
                expected: "plugins/opencode/*.ts".to_string(),
            });
            return Ok(report);
        }

        let plugin_dir = ctx.base().join("plugins");
        for plugin in plugins {
            let name = file_name(plugin);
            sink.copy(plugin, &plugin_dir.join(&name), Ownership::Owned)?;
            report.plugin_files.push(name);
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::installer::adapters::test_support::Fixture;
    use crate::installer::sink::FsSink;

    #[test]
    fn test_agents_are_converted() {
        let fixture = Fixture::new();
        let spec = fixture.spec(TargetKind::OpencodeProject);
        let ctx = InstallContext {
            target: &spec,
            catalog: &fixture.catalog,
            force: false,
        };
        let mut adapter = OpencodeAdapter::new(TargetKind::OpencodeProject);
        let mut sink = FsSink::new();
        for agent in &fixture.catalog.agents {
            adapter.materialize_agent(agent, &ctx, &mut sink).unwrap();
        }
        sink.commit();

        let reviewer = fixture.read("agents/reviewer.md");
        assert!(reviewer.contains("mode: subagent"));
        assert!(reviewer.contains("description: Reviews changes."));
        assert!(reviewer.contains("read: true"));
        assert!(reviewer.contains("grep: true"));
        assert!(!reviewer.contains("Task"));
        assert!(reviewer.ends_with("You review code.\n"));

        // No tools declared: minimum set
        let architect = fixture.read("agents/architect.md");
        assert!(architect.contains("read: true"));
        assert!(architect.contains("glob: true"));
        assert!(architect.contains("grep: true"));
    }

    #[test]
    fn test_hooks_become_plugin() {
        let fixture = Fixture::new();
        let spec = fixture.spec(TargetKind::OpencodeGlobal);
        let ctx = InstallContext {
            target: &spec,
            catalog: &fixture.catalog,
            force: false,
        };
        let mut adapter = OpencodeAdapter::new(TargetKind::OpencodeGlobal);
        let mut sink = FsSink::new();
        let report = adapter.install_hooks(&ctx, &mut sink).unwrap();
        sink.commit();

        assert_eq!(report.plugin_files, vec!["agentic-skills.ts"]);
        assert!(report.scripts.is_empty());
        assert!(fixture.exists("plugins/agentic-skills.ts"));
        assert!(!fixture.exists("hooks"));
    }
}
