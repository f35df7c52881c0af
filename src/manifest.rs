//! Install manifest (.agentic-skills.manifest)
//!
//! The manifest is a snapshot of one install run at the root of a target. It
//! is built from the [`InstallReport`] after every entry was materialized and
//! written exactly once, through the same sink, so an aborted run never leaves
//! a manifest behind. Update and uninstall read it back.

use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{InstallerError, Result, read_failed};
use crate::installer::sink::{FileSink, Ownership};
use crate::installer::{Components, InstallReport};
use crate::target::{TargetKind, TargetSpec};

/// Manifest file name at the target root
pub const MANIFEST_FILE: &str = ".agentic-skills.manifest";

/// Persisted record of one installation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallManifest {
    /// Installer version that wrote the manifest
    pub version: String,
    /// RFC 3339 UTC timestamp
    pub installed_at: String,
    /// Source root the content came from
    pub source: String,
    /// Target kind id, e.g. `claude-project`
    pub target: String,
    pub target_path: String,
    pub skills: Vec<String>,
    /// Agent file names
    pub agents: Vec<String>,
    pub hooks: bool,
    pub hook_scripts: Vec<String>,
    pub plugin_files: Vec<String>,

    #[serde(default)]
    pub source_hash: String,
    #[serde(default)]
    pub components: Components,
    /// Owned files relative to `target_path`, `/`-separated, sorted
    #[serde(default)]
    pub files: Vec<String>,
    /// Hook registrations merged into the settings file, exactly as written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hook_settings: Option<serde_json::Value>,
}

impl InstallManifest {
    /// Build the manifest for a finished run.
    pub fn from_report(
        report: &InstallReport,
        target: &TargetSpec,
        source: &str,
        source_hash: &str,
        components: Components,
    ) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            installed_at: timestamp(),
            source: source.to_string(),
            target: target.kind.id().to_string(),
            target_path: target.base_path.display().to_string(),
            skills: report.skills.clone(),
            agents: report.agents.clone(),
            hooks: report.hooks.enabled(),
            hook_scripts: report.hooks.scripts.clone(),
            plugin_files: report.hooks.plugin_files.clone(),
            source_hash: source_hash.to_string(),
            components,
            files: report.files.iter().map(|p| portable(p)).collect(),
            hook_settings: report.hooks.registered.clone(),
        }
    }

    /// Manifest path for a target root
    pub fn path(base: &Path) -> PathBuf {
        base.join(MANIFEST_FILE)
    }

    /// Read the manifest at `base`.
    pub fn read(base: &Path) -> Result<Self> {
        let path = Self::path(base);
        if !path.is_file() {
            return Err(InstallerError::ManifestNotFound {
                path: path.display().to_string(),
            });
        }
        let json = std::fs::read_to_string(&path).map_err(|e| read_failed(&path, e))?;
        Self::from_json(&json, &path)
    }

    /// Parse manifest JSON. `path` is only used for error messages.
    pub fn from_json(json: &str, path: &Path) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| InstallerError::ManifestParseFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Serialize to pretty JSON with a trailing newline
    pub fn to_json(&self) -> Result<String> {
        let mut json =
            serde_json::to_string_pretty(self).map_err(|e| InstallerError::ManifestParseFailed {
                path: MANIFEST_FILE.to_string(),
                reason: e.to_string(),
            })?;
        json.push('\n');
        Ok(json)
    }

    /// Write through `sink`, replacing any previous manifest.
    pub fn write(&self, base: &Path, sink: &mut dyn FileSink) -> Result<()> {
        let json = self.to_json()?;
        sink.write(&Self::path(base), json.as_bytes(), Ownership::Shared)
    }

    pub fn target_kind(&self) -> Result<TargetKind> {
        self.target.parse()
    }

    /// Absolute paths of the owned files below `base`
    pub fn owned_paths(&self, base: &Path) -> Vec<PathBuf> {
        self.files
            .iter()
            .filter(|rel| is_contained(rel))
            .map(|rel| base.join(rel))
            .collect()
    }

    /// Owned files of this installation that `newer` no longer lists
    pub fn stale_paths(&self, newer: &InstallManifest, base: &Path) -> Vec<PathBuf> {
        self.files
            .iter()
            .filter(|rel| is_contained(rel) && !newer.files.contains(rel))
            .map(|rel| base.join(rel))
            .collect()
    }
}

/// Current time as RFC 3339 UTC with second precision
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn portable(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// A recorded path must stay below the target root.
fn is_contained(rel: &str) -> bool {
    let path = Path::new(rel);
    !rel.is_empty()
        && path
            .components()
            .all(|c| matches!(c, std::path::Component::Normal(_)))
}
