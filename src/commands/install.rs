//! Install command implementation
//!
//! The installation process:
//! 1. Pick target and components (flags, or prompts on a terminal)
//! 2. Resolve the target's base path
//! 3. Locate the source tree (local checkout or temporary clone)
//! 4. Enumerate the catalog
//! 5. Materialize entries through the target adapter
//! 6. Write the manifest
//! 7. Commit the transaction (or roll back on error)

use std::path::Path;

use crate::catalog::Catalog;
use crate::cli::InstallArgs;
use crate::commands::is_interactive;
use crate::error::Result;
use crate::hash;
use crate::installer::adapters::claude::SETTINGS_FILE;
use crate::installer::settings::{self, UnmergeOutcome};
use crate::installer::sink::{DryRunSink, FileSink, FsSink, prune_empty_dirs};
use crate::installer::{Components, InstallOptions, InstallReport, Installer, Warning};
use crate::manifest::InstallManifest;
use crate::prompt;
use crate::source::{self, SourceRoot};
use crate::target::{TargetKind, TargetSpec};
use crate::ui::{self, output};

/// Everything [`execute`] needs besides the catalog
pub struct Plan<'a> {
    pub target: &'a TargetSpec,
    pub source: &'a SourceRoot,
    pub options: InstallOptions,
    /// Manifest of the installation being replaced; files it lists that this
    /// run no longer writes are removed
    pub previous: Option<&'a InstallManifest>,
    pub dry_run: bool,
    pub verbose: bool,
}

/// Run the install command
pub fn run(args: InstallArgs, verbose: bool) -> Result<()> {
    let interactive = !args.has_selection_flags() && is_interactive();

    let kind = match args.target.selected() {
        Some(kind) => kind,
        None if interactive => prompt::select_target()?,
        None => TargetKind::ClaudeProject,
    };
    let components = if interactive {
        prompt::select_components(kind)?
    } else {
        args.components.resolve()
    };
    if components.is_empty() {
        return Err(crate::error::InstallerError::NothingSelected);
    }

    let target = TargetSpec::resolve(kind, args.target.target_dir())?;
    let source = source::resolve(args.source.options())?;
    if source.is_remote() {
        output::info(&format!("Using a temporary clone of {}", source.describe()));
    }
    let catalog = Catalog::load(source.path())?;

    let mut force = args.force;
    let manifest_path = InstallManifest::path(&target.base_path);
    if interactive && !force && !args.dry_run && manifest_path.exists() {
        let question = format!(
            "{} already has an installation. Replace it?",
            target.base_path.display()
        );
        if !prompt::confirm(&question, true)? {
            output::info("Cancelled.");
            return Ok(());
        }
        force = true;
    }

    let previous = InstallManifest::read(&target.base_path).ok();
    execute(
        &catalog,
        &Plan {
            target: &target,
            source: &source,
            options: InstallOptions { components, force },
            previous: previous.as_ref(),
            dry_run: args.dry_run,
            verbose,
        },
    )?;
    Ok(())
}

/// Install `catalog` per `plan` and print the outcome.
pub fn execute(catalog: &Catalog, plan: &Plan<'_>) -> Result<InstallManifest> {
    output::heading(&format!(
        "Installing {} for {} into {}",
        plan.options.components.describe(),
        plan.target.kind.label(),
        output::path(&plan.target.base_path)
    ));

    let source_hash = hash::hash_source(&catalog.root)?;

    if plan.dry_run {
        let mut sink = DryRunSink::new();
        let (report, manifest) = install_into(catalog, plan, &source_hash, &mut sink)?;
        output::ops(sink.ops(), true);
        print_summary(&report, plan);
        return Ok(manifest);
    }

    let mut sink = FsSink::new();
    let (report, manifest) = match install_into(catalog, plan, &source_hash, &mut sink) {
        Ok(done) => done,
        Err(e) => {
            sink.rollback();
            return Err(e);
        }
    };
    if plan.verbose {
        output::ops(sink.ops(), false);
    }
    let removed = plan
        .previous
        .map(|previous| previous.stale_paths(&manifest, &plan.target.base_path))
        .unwrap_or_default();
    sink.commit();
    for path in removed {
        if let Some(parent) = path.parent() {
            prune_empty_dirs(parent, &plan.target.base_path);
        }
    }

    print_summary(&report, plan);
    Ok(manifest)
}

/// Run the installer and write the manifest through `sink`.
fn install_into<S: FileSink>(
    catalog: &Catalog,
    plan: &Plan<'_>,
    source_hash: &str,
    sink: &mut S,
) -> Result<(InstallReport, InstallManifest)> {
    let installer = Installer::new(catalog, plan.target, plan.options);
    let mut progress = ui::reporter(plan.dry_run, plan.verbose);

    let mut report = match installer.run(sink, progress.as_mut()) {
        Ok(report) => report,
        Err(e) => {
            progress.abandon();
            return Err(e);
        }
    };

    let manifest = InstallManifest::from_report(
        &report,
        plan.target,
        &plan.source.describe(),
        source_hash,
        plan.options.components,
    );

    if let Some(previous) = plan.previous {
        for stale in previous.stale_paths(&manifest, &plan.target.base_path) {
            sink.remove(&stale)?;
        }
        if let Some(warning) = retire_hooks(previous, &manifest, &plan.target.base_path, sink)? {
            report.warnings.push(warning);
        }
    }

    manifest.write(&plan.target.base_path, sink)?;
    Ok((report, manifest))
}

/// Unregister hooks the previous run registered and this one did not.
///
/// Their scripts are among the stale files, so leaving the registrations
/// would point the settings file at scripts that no longer exist.
fn retire_hooks(
    previous: &InstallManifest,
    manifest: &InstallManifest,
    base: &Path,
    sink: &mut dyn FileSink,
) -> Result<Option<Warning>> {
    let Some(registered) = &previous.hook_settings else {
        return Ok(None);
    };
    let Some(gone) = settings::retired(registered, manifest.hook_settings.as_ref()) else {
        return Ok(None);
    };
    let settings_path = base.join(SETTINGS_FILE);
    match settings::unregister(&settings_path, &gone, sink)? {
        UnmergeOutcome::Degraded { reason } => Ok(Some(Warning::UnregisterDegraded {
            path: settings_path,
            reason,
        })),
        _ => Ok(None),
    }
}

fn print_summary(report: &InstallReport, plan: &Plan<'_>) {
    for warning in &report.warnings {
        output::warning(warning);
    }

    let components = plan.options.components;
    let mut parts = Vec::new();
    if components.skills {
        parts.push(format!("{} skill(s)", report.skills.len()));
    }
    if components.agents {
        parts.push(format!("{} agent(s)", report.agents.len()));
    }
    if components.hooks && report.hooks.enabled() {
        let hook_files = report.hooks.scripts.len() + report.hooks.plugin_files.len();
        parts.push(format!("{hook_files} hook file(s)"));
    }
    let summary = parts.join(", ");

    if plan.dry_run {
        output::dry_run(&format!("Would install {summary}. No files were changed."));
    } else {
        output::success(&format!(
            "Installed {} into {}",
            summary,
            output::path(&plan.target.base_path)
        ));
    }
}

/// Components recorded by a manifest, falling back to everything
pub fn recorded_components(manifest: &InstallManifest) -> Components {
    if manifest.components.is_empty() {
        Components::ALL
    } else {
        manifest.components
    }
}
