//! Codex CLI adapter
//!
//! Codex reads a single `AGENTS.md`. Every selected skill and agent is
//! rendered as a `## Skill: <name>` / `## Agent: <name>` section and the
//! sections are written as one block between content markers, so user text
//! around the block survives installs and uninstalls.

use std::path::{Path, PathBuf};

use super::{Adapter, InstallContext};
use crate::catalog::{AgentEntry, SkillEntry};
use crate::error::{InstallerError, Result, read_failed};
use crate::frontmatter;
use crate::installer::sink::{FileSink, Ownership};
use crate::target::TargetKind;

/// Document Codex reads instructions from
pub const DOCUMENT_FILE: &str = "AGENTS.md";
pub const BEGIN_MARKER: &str = "<!-- agentic-skills:begin -->";
pub const END_MARKER: &str = "<!-- agentic-skills:end -->";

#[derive(Debug, Default)]
pub struct CodexAdapter {
    /// Document content before this run, `None` when the file is absent
    existing: Option<String>,
    sections: Vec<String>,
}

impl CodexAdapter {
    fn document(base: &Path) -> PathBuf {
        base.join(DOCUMENT_FILE)
    }

    fn push_section(&mut self, heading: &str, name: &str, raw: &str) {
        let body = frontmatter::split(raw).map_or(raw, |(_, body)| body);
        self.sections
            .push(format!("## {heading}: {name}\n\n{}\n", body.trim()));
    }

    fn render_block(&self) -> String {
        format!(
            "{BEGIN_MARKER}\n\n{}\n{END_MARKER}\n",
            self.sections.join("\n")
        )
    }
}

/// Whether `content` carries a generated block
pub fn has_marker(content: &str) -> bool {
    content.contains(BEGIN_MARKER)
}

/// Replace the generated block in `content` with `block`, or append it.
pub fn splice_block(content: &str, block: &str) -> String {
    match block_range(content) {
        Some((start, end)) => format!("{}{}{}", &content[..start], block, &content[end..]),
        None if content.is_empty() => block.to_string(),
        None => {
            let separator = if content.ends_with("\n\n") {
                ""
            } else if content.ends_with('\n') {
                "\n"
            } else {
                "\n\n"
            };
            format!("{content}{separator}{block}")
        }
    }
}

/// Remove the generated block from `content`. Returns `None` without one.
pub fn strip_block(content: &str) -> Option<String> {
    let (start, end) = block_range(content)?;
    let head = content[..start].trim_end_matches('\n');
    let tail = content[end..].trim_start_matches('\n');
    let stripped = match (head.is_empty(), tail.is_empty()) {
        (true, _) => tail.to_string(),
        (false, true) => format!("{head}\n"),
        (false, false) => format!("{head}\n\n{tail}"),
    };
    Some(stripped)
}

/// Byte range of the block including the end marker line's newline
fn block_range(content: &str) -> Option<(usize, usize)> {
    let start = content.find(BEGIN_MARKER)?;
    let end = match content[start..].find(END_MARKER) {
        Some(offset) => {
            let marker_end = start + offset + END_MARKER.len();
            if content[marker_end..].starts_with('\n') {
                marker_end + 1
            } else {
                marker_end
            }
        }
        // Unterminated block: everything after the begin marker is ours
        None => content.len(),
    };
    Some((start, end))
}

impl Adapter for CodexAdapter {
    fn kind(&self) -> TargetKind {
        TargetKind::Codex
    }

    fn layout_skill(&self, _skill: &SkillEntry, base: &Path) -> Vec<PathBuf> {
        vec![Self::document(base)]
    }

    fn layout_agent(&self, _agent: &AgentEntry, base: &Path) -> Vec<PathBuf> {
        vec![Self::document(base)]
    }

    fn prepare(&mut self, ctx: &InstallContext<'_>) -> Result<()> {
        let path = Self::document(ctx.base());
        if !path.exists() {
            self.existing = None;
            return Ok(());
        }
        let content = std::fs::read_to_string(&path).map_err(|e| read_failed(&path, e))?;
        if has_marker(&content) && !ctx.force {
            return Err(InstallerError::AlreadyInstalled {
                path: path.display().to_string(),
            });
        }
        self.existing = Some(content);
        Ok(())
    }

    fn materialize_skill(
        &mut self,
        skill: &SkillEntry,
        _ctx: &InstallContext<'_>,
        _sink: &mut dyn FileSink,
    ) -> Result<()> {
        let raw = std::fs::read_to_string(&skill.primary_document)
            .map_err(|e| read_failed(&skill.primary_document, e))?;
        self.push_section("Skill", &skill.name, &raw);
        Ok(())
    }

    fn materialize_agent(
        &mut self,
        agent: &AgentEntry,
        _ctx: &InstallContext<'_>,
        _sink: &mut dyn FileSink,
    ) -> Result<()> {
        self.push_section("Agent", &agent.name, &agent.raw);
        Ok(())
    }

    fn finish(&mut self, ctx: &InstallContext<'_>, sink: &mut dyn FileSink) -> Result<()> {
        if self.sections.is_empty() {
            return Ok(());
        }
        let block = self.render_block();
        let content = splice_block(self.existing.as_deref().unwrap_or_default(), &block);
        sink.write(
            &Self::document(ctx.base()),
            content.as_bytes(),
            Ownership::Shared,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::installer::adapters::test_support::Fixture;
    use crate::installer::sink::FsSink;

    fn install(fixture: &Fixture, force: bool) -> Result<()> {
        let spec = fixture.spec(TargetKind::Codex);
        let ctx = InstallContext {
            target: &spec,
            catalog: &fixture.catalog,
            force,
        };
        let mut adapter = CodexAdapter::default();
        let mut sink = FsSink::new();
        adapter.prepare(&ctx)?;
        for skill in &fixture.catalog.skills {
            adapter.materialize_skill(skill, &ctx, &mut sink)?;
        }
        for agent in &fixture.catalog.agents {
            adapter.materialize_agent(agent, &ctx, &mut sink)?;
        }
        adapter.finish(&ctx, &mut sink)?;
        sink.commit();
        Ok(())
    }

    #[test]
    fn test_sections_without_front_matter() {
        let fixture = Fixture::new();
        install(&fixture, false).unwrap();

        let doc = fixture.read(DOCUMENT_FILE);
        assert!(doc.starts_with(BEGIN_MARKER));
        assert!(doc.ends_with(&format!("{END_MARKER}\n")));
        assert!(doc.contains("## Skill: debugging\n\n# Debugging\n"));
        assert!(doc.contains("## Skill: testing\n\n# Testing\n"));
        assert!(doc.contains("## Agent: reviewer\n\nYou review code.\n"));
        assert!(!doc.contains("tools: Read"));
        let skill = doc.find("## Skill: testing").unwrap();
        let agent = doc.find("## Agent: architect").unwrap();
        assert!(skill < agent);
    }

    #[test]
    fn test_rerun_without_force_is_refused() {
        let fixture = Fixture::new();
        install(&fixture, false).unwrap();
        let before = fixture.read(DOCUMENT_FILE);

        let err = install(&fixture, false).unwrap_err();
        assert!(matches!(err, InstallerError::AlreadyInstalled { .. }));
        assert_eq!(fixture.read(DOCUMENT_FILE), before);
    }

    #[test]
    fn test_force_replaces_block_and_keeps_user_text() {
        let fixture = Fixture::new();
        std::fs::write(
            fixture.target.path().join(DOCUMENT_FILE),
            "# My notes\n\nKeep me.\n",
        )
        .unwrap();
        install(&fixture, false).unwrap();
        let first = fixture.read(DOCUMENT_FILE);
        assert!(first.starts_with("# My notes\n\nKeep me.\n\n"));

        install(&fixture, true).unwrap();
        let second = fixture.read(DOCUMENT_FILE);
        assert_eq!(first, second);
        assert_eq!(second.matches(BEGIN_MARKER).count(), 1);
    }

    #[test]
    fn test_strip_block_restores_user_text() {
        let user = "# My notes\n\nKeep me.\n";
        let spliced = splice_block(user, &format!("{BEGIN_MARKER}\nx\n{END_MARKER}\n"));
        assert_eq!(strip_block(&spliced).unwrap(), user);

        let around = format!("top\n\n{BEGIN_MARKER}\nx\n{END_MARKER}\n\nbottom\n");
        assert_eq!(strip_block(&around).unwrap(), "top\n\nbottom\n");
        assert_eq!(strip_block("no block\n"), None);
    }

    #[test]
    fn test_nothing_selected_writes_nothing() {
        let fixture = Fixture::new();
        let spec = fixture.spec(TargetKind::Codex);
        let ctx = InstallContext {
            target: &spec,
            catalog: &fixture.catalog,
            force: false,
        };
        let mut adapter = CodexAdapter::default();
        let mut sink = FsSink::new();
        adapter.prepare(&ctx).unwrap();
        adapter.finish(&ctx, &mut sink).unwrap();
        sink.commit();
        assert!(!fixture.exists(DOCUMENT_FILE));
    }
}
