//! Installation targets
//!
//! A [`TargetSpec`] is resolved once per run from CLI input: which tool is
//! being installed for, where its configuration root lives, and how agents
//! have to be transformed for it.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{InstallerError, Result};

/// Closed set of supported targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    ClaudeProject,
    ClaudeGlobal,
    OpencodeProject,
    OpencodeGlobal,
    Cursor,
    Codex,
}

/// How agent files are rewritten for a target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentTransform {
    Identity,
    OpencodeSubagent,
    CursorRule,
    CodexConcat,
}

impl TargetKind {
    pub const ALL: [TargetKind; 6] = [
        TargetKind::ClaudeProject,
        TargetKind::ClaudeGlobal,
        TargetKind::OpencodeProject,
        TargetKind::OpencodeGlobal,
        TargetKind::Cursor,
        TargetKind::Codex,
    ];

    /// Stable identifier, as stored in the manifest
    pub fn id(self) -> &'static str {
        match self {
            TargetKind::ClaudeProject => "claude-project",
            TargetKind::ClaudeGlobal => "claude-global",
            TargetKind::OpencodeProject => "opencode-project",
            TargetKind::OpencodeGlobal => "opencode-global",
            TargetKind::Cursor => "cursor",
            TargetKind::Codex => "codex",
        }
    }

    /// Human-readable label for prompts and summaries
    pub fn label(self) -> &'static str {
        match self {
            TargetKind::ClaudeProject => "Claude Code (this project)",
            TargetKind::ClaudeGlobal => "Claude Code (global)",
            TargetKind::OpencodeProject => "OpenCode (this project)",
            TargetKind::OpencodeGlobal => "OpenCode (global)",
            TargetKind::Cursor => "Cursor (this project)",
            TargetKind::Codex => "Codex CLI (global)",
        }
    }

    pub fn supports_hooks(self) -> bool {
        matches!(
            self,
            TargetKind::ClaudeProject
                | TargetKind::ClaudeGlobal
                | TargetKind::OpencodeProject
                | TargetKind::OpencodeGlobal
        )
    }

    pub fn agent_transform(self) -> AgentTransform {
        match self {
            TargetKind::ClaudeProject | TargetKind::ClaudeGlobal => AgentTransform::Identity,
            TargetKind::OpencodeProject | TargetKind::OpencodeGlobal => {
                AgentTransform::OpencodeSubagent
            }
            TargetKind::Cursor => AgentTransform::CursorRule,
            TargetKind::Codex => AgentTransform::CodexConcat,
        }
    }

    /// Default base path, relative to `project_dir` or `home_dir`.
    pub fn default_base(self, project_dir: &Path, home_dir: Option<&Path>) -> Result<PathBuf> {
        let home = || {
            home_dir.ok_or_else(|| InstallerError::InvalidTarget {
                target: format!("{} (home directory could not be determined)", self.id()),
            })
        };
        Ok(match self {
            TargetKind::ClaudeProject => project_dir.join(".claude"),
            TargetKind::ClaudeGlobal => home()?.join(".claude"),
            TargetKind::OpencodeProject => project_dir.join(".opencode"),
            TargetKind::OpencodeGlobal => home()?.join(".config").join("opencode"),
            TargetKind::Cursor => project_dir.join(".cursor").join("rules"),
            TargetKind::Codex => home()?.join(".codex"),
        })
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for TargetKind {
    type Err = InstallerError;

    fn from_str(s: &str) -> Result<Self> {
        TargetKind::ALL
            .into_iter()
            .find(|kind| kind.id() == s)
            .ok_or_else(|| InstallerError::InvalidTarget {
                target: s.to_string(),
            })
    }
}

/// A resolved installation target
#[derive(Debug, Clone, PartialEq)]
pub struct TargetSpec {
    pub kind: TargetKind,
    pub base_path: PathBuf,
}

impl TargetSpec {
    /// Resolve the base path for `kind`. An explicit `target_dir` wins over
    /// the per-target default.
    pub fn resolve(kind: TargetKind, target_dir: Option<&Path>) -> Result<Self> {
        let base_path = match target_dir {
            Some(dir) => dir.to_path_buf(),
            None => {
                let project_dir = std::env::current_dir().map_err(|e| {
                    InstallerError::InvalidTarget {
                        target: format!("{} ({})", kind.id(), e),
                    }
                })?;
                kind.default_base(&project_dir, dirs::home_dir().as_deref())?
            }
        };
        Ok(Self { kind, base_path })
    }
}
