//! Claude Code adapter
//!
//! - Skills → `<base>/skills/<name>/` (primary document + references)
//! - Agents → `<base>/agents/<file>` verbatim
//! - Hooks → `<base>/hooks/*.sh` (executable) plus hook registrations merged
//!   into `<base>/settings.json`

use std::path::{Path, PathBuf};

use super::{Adapter, HookReport, InstallContext, copy_skill_tree, file_name, skill_tree_layout};
use crate::catalog::{AgentEntry, SkillEntry};
use crate::error::Result;
use crate::installer::Warning;
use crate::installer::settings::{self, MergeOutcome};
use crate::installer::sink::{FileSink, Ownership};
use crate::target::TargetKind;

/// Settings file hooks are registered in
pub const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug)]
pub struct ClaudeAdapter {
    kind: TargetKind,
}

impl ClaudeAdapter {
    pub fn new(kind: TargetKind) -> Self {
        Self { kind }
    }
}

impl Adapter for ClaudeAdapter {
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
        for target in self.layout_agent(agent, ctx.base()) {
            sink.write(&target, agent.raw.as_bytes(), Ownership::Owned)?;
        }
        Ok(())
    }

    fn install_hooks(
        &mut self,
        ctx: &InstallContext<'_>,
        sink: &mut dyn FileSink,
    ) -> Result<HookReport> {
        let assets = &ctx.catalog.hooks;
        let mut report = HookReport::default();

        if assets.scripts.is_empty() && assets.settings.is_none() {
            report.warnings.push(Warning::MissingHookAssets {
                target: self.kind,
                expected: "hooks/*.sh and hooks/settings.json".to_string(),
            });
            return Ok(report);
        }

        let hooks_dir = ctx.base().join("hooks");
        for script in &assets.scripts {
            let name = file_name(script);
            let target = hooks_dir.join(&name);
            sink.copy(script, &target, Ownership::Owned)?;
            sink.set_executable(&target)?;
            report.scripts.push(name);
        }

        if let Some(package) = &assets.settings {
            let settings_path = ctx.base().join(SETTINGS_FILE);
            let global_base = (self.kind == TargetKind::ClaudeGlobal).then(|| ctx.base());
            let applied = settings::apply(&settings_path, package, global_base, sink)?;
            if let MergeOutcome::Degraded { reason } = &applied.outcome {
                report.warnings.push(Warning::MergeDegraded {
                    path: settings_path.clone(),
                    reason: reason.clone(),
                    reference: package.clone(),
                });
            }
            report.settings = Some(applied.outcome);
            report.registered = applied.package;
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::installer::adapters::test_support::Fixture;
    use crate::installer::sink::FsSink;

    fn run(fixture: &Fixture, kind: TargetKind) -> HookReport {
        let spec = fixture.spec(kind);
        let ctx = InstallContext {
            target: &spec,
            catalog: &fixture.catalog,
            force: false,
        };
        let mut adapter = ClaudeAdapter::new(kind);
        let mut sink = FsSink::new();
        for skill in &fixture.catalog.skills {
            adapter.materialize_skill(skill, &ctx, &mut sink).unwrap();
        }
        for agent in &fixture.catalog.agents {
            adapter.materialize_agent(agent, &ctx, &mut sink).unwrap();
        }
        let report = adapter.install_hooks(&ctx, &mut sink).unwrap();
        sink.commit();
        report
    }

    #[test]
    fn test_layout() {
        let fixture = Fixture::new();
        let adapter = ClaudeAdapter::new(TargetKind::ClaudeProject);
        let base = Path::new("/p/.claude");
        let testing = &fixture.catalog.skills[1];
        assert_eq!(
            adapter.layout_skill(testing, base),
            vec![
                base.join("skills/testing/SKILL.md"),
                base.join("skills/testing/references/fixtures.md")
            ]
        );
        let agent = &fixture.catalog.agents[0];
        assert_eq!(
            adapter.layout_agent(agent, base),
            vec![base.join("agents/architect.md")]
        );
    }

    #[test]
    fn test_materialize_copies_verbatim() {
        let fixture = Fixture::new();
        let report = run(&fixture, TargetKind::ClaudeProject);

        assert!(fixture.exists("skills/testing/references/fixtures.md"));
        assert_eq!(
            fixture.read("agents/reviewer.md"),
            std::fs::read_to_string(fixture.source.path().join("agents/reviewer.md")).unwrap()
        );
        assert_eq!(report.scripts, vec!["pre-compact.sh", "stop.sh"]);
        assert_eq!(report.settings, Some(MergeOutcome::Created));
        assert!(report.registered.is_some());
        assert!(report.enabled());
        assert!(fixture.read("settings.json").contains("$CLAUDE_PROJECT_DIR"));
    }

    #[cfg(unix)]
    #[test]
    fn test_hook_scripts_are_executable() {
        use std::os::unix::fs::PermissionsExt;
        let fixture = Fixture::new();
        run(&fixture, TargetKind::ClaudeProject);

        let mode = std::fs::metadata(fixture.target.path().join("hooks/stop.sh"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o111, 0o111);
    }

    #[test]
    fn test_global_rewrites_hook_commands() {
        let fixture = Fixture::new();
        run(&fixture, TargetKind::ClaudeGlobal);

        let settings = fixture.read("settings.json");
        assert!(!settings.contains("$CLAUDE_PROJECT_DIR"));
        assert!(settings.contains("/hooks/stop.sh"));
    }

    #[test]
    fn test_degraded_merge_is_a_warning() {
        let fixture = Fixture::new();
        std::fs::write(fixture.target.path().join("settings.json"), "{ not json").unwrap();

        let report = run(&fixture, TargetKind::ClaudeProject);

        assert!(matches!(report.settings, Some(MergeOutcome::Degraded { .. })));
        assert_eq!(report.registered, None);
        assert!(
            report
                .warnings
                .iter()
                .any(|w| matches!(w, Warning::MergeDegraded { .. }))
        );
        assert_eq!(fixture.read("settings.json"), "{ not json");
    }
}
