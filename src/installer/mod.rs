//! Installation pipeline
//!
//! This module handles:
//! - Driving the target [`adapters::Adapter`] over the selected catalog entries
//! - Collecting non-fatal [`Warning`]s (degraded settings merge, unsupported
//!   components)
//! - Reporting what was written so the manifest can be built from it
//!
//! Every mutation goes through a [`sink::FileSink`]. The pipeline never
//! commits or rolls back itself; the caller owns the sink and decides once the
//! manifest has been written.

pub mod adapters;
pub mod convert;
pub mod settings;
pub mod sink;

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::error::{InstallerError, Result};
use crate::target::{TargetKind, TargetSpec};
use crate::ui::ProgressReporter;

use adapters::{HookReport, InstallContext};
use sink::FileSink;

/// Which kinds of content a run installs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Components {
    pub skills: bool,
    pub agents: bool,
    pub hooks: bool,
}

impl Default for Components {
    fn default() -> Self {
        Self::ALL
    }
}

impl Components {
    pub const ALL: Components = Components {
        skills: true,
        agents: true,
        hooks: true,
    };

    pub fn is_empty(&self) -> bool {
        !self.skills && !self.agents && !self.hooks
    }

    /// Comma-separated list of the selected components
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if self.skills {
            parts.push("skills");
        }
        if self.agents {
            parts.push("agents");
        }
        if self.hooks {
            parts.push("hooks");
        }
        parts.join(", ")
    }
}

/// Reduced functionality that does not fail the run
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// Hook settings could not be merged; the file was left untouched
    MergeDegraded {
        path: PathBuf,
        reason: String,
        /// Package settings to merge by hand
        reference: PathBuf,
    },
    /// A component was requested for a target that cannot hold it
    UnsupportedComponent {
        component: &'static str,
        target: TargetKind,
    },
    /// Hooks were requested but the source ships none for this target
    MissingHookAssets {
        target: TargetKind,
        expected: String,
    },
    /// Hook registrations could not be removed from the settings file
    UnregisterDegraded { path: PathBuf, reason: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::MergeDegraded {
                path,
                reason,
                reference,
            } => write!(
                f,
                "Could not merge hook settings into {} ({}). Merge {} manually.",
                path.display(),
                reason,
                reference.display()
            ),
            Warning::UnsupportedComponent { component, target } => {
                write!(f, "{} are not supported for {}; skipped", component, target)
            }
            Warning::MissingHookAssets { target, expected } => write!(
                f,
                "No hook assets for {} in the source (expected {}); hooks skipped",
                target, expected
            ),
            Warning::UnregisterDegraded { path, reason } => write!(
                f,
                "Could not remove hook registrations from {} ({}). Remove them manually.",
                path.display(),
                reason
            ),
        }
    }
}

/// Options of one install run
#[derive(Debug, Clone, Copy, Default)]
pub struct InstallOptions {
    pub components: Components,
    /// Replace previously installed content without asking
    pub force: bool,
}

/// What an install run did
#[derive(Debug, Clone, Default)]
pub struct InstallReport {
    /// Installed skill names
    pub skills: Vec<String>,
    /// Installed agent file names
    pub agents: Vec<String>,
    pub hooks: HookReport,
    pub warnings: Vec<Warning>,
    /// Owned files written, relative to the target root, sorted
    pub files: Vec<PathBuf>,
}

/// Drives one adapter over a catalog
pub struct Installer<'a> {
    catalog: &'a Catalog,
    target: &'a TargetSpec,
    options: InstallOptions,
}

impl<'a> Installer<'a> {
    pub fn new(catalog: &'a Catalog, target: &'a TargetSpec, options: InstallOptions) -> Self {
        Self {
            catalog,
            target,
            options,
        }
    }

    /// Number of steps `run` reports progress for
    pub fn step_count(&self) -> u64 {
        let components = self.options.components;
        let mut steps = 0;
        if components.skills {
            steps += self.catalog.skills.len();
        }
        if components.agents {
            steps += self.catalog.agents.len();
        }
        if components.hooks {
            steps += 1;
        }
        steps as u64
    }

    /// Materialize the selected components into `sink`.
    ///
    /// Any failure aborts the run; the caller rolls the sink back.
    pub fn run(
        &self,
        sink: &mut dyn FileSink,
        progress: &mut dyn ProgressReporter,
    ) -> Result<InstallReport> {
        let components = self.options.components;
        if components.is_empty() {
            return Err(InstallerError::NothingSelected);
        }

        let ctx = InstallContext {
            target: self.target,
            catalog: self.catalog,
            force: self.options.force,
        };
        let mut adapter = adapters::for_target(self.target.kind);
        let mut report = InstallReport::default();

        adapter.prepare(&ctx)?;
        progress.start(self.step_count());

        if components.skills {
            for skill in &self.catalog.skills {
                progress.step(&format!("skill {}", skill.name));
                adapter
                    .materialize_skill(skill, &ctx, sink)
                    .map_err(|e| entry_failed(&skill.dir, e))?;
                report.skills.push(skill.name.clone());
            }
        }

        if components.agents {
            for agent in &self.catalog.agents {
                progress.step(&format!("agent {}", agent.file_name));
                adapter
                    .materialize_agent(agent, &ctx, sink)
                    .map_err(|e| entry_failed(&agent.path, e))?;
                report.agents.push(agent.file_name.clone());
            }
        }

        if components.hooks {
            progress.step("hooks");
            let hooks = adapter.install_hooks(&ctx, sink)?;
            report.warnings.extend(hooks.warnings.iter().cloned());
            report.hooks = hooks;
        }

        adapter.finish(&ctx, sink)?;
        progress.finish();

        report.files = relative_files(&sink.owned_files(), &self.target.base_path);
        Ok(report)
    }
}

/// Attribute a file-level failure to the entry being materialized.
fn entry_failed(entry: &Path, err: InstallerError) -> InstallerError {
    match err {
        InstallerError::FileReadFailed { .. } | InstallerError::FileWriteFailed { .. } => {
            InstallerError::MaterializationFailed {
                path: entry.display().to_string(),
                reason: err.to_string(),
            }
        }
        other => other,
    }
}

/// Paths below `base`, relative to it
pub fn relative_files(files: &BTreeSet<PathBuf>, base: &Path) -> Vec<PathBuf> {
    files
        .iter()
        .filter_map(|path| path.strip_prefix(base).ok().map(Path::to_path_buf))
        .collect()
}
