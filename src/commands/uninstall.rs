//! Uninstall command implementation
//!
//! Removes exactly what the manifest lists:
//! 1. Owned files (`files[]`), then directories left empty
//! 2. Package hook registrations in the Claude settings file
//! 3. The generated block in the Codex document
//! 4. The manifest itself
//!
//! Files the manifest does not list are never touched.

use std::path::{Path, PathBuf};

use crate::catalog::{HOOK_SETTINGS_FILE, HOOKS_DIR};
use crate::cli::UninstallArgs;
use crate::commands::is_interactive;
use crate::error::{Result, read_failed};
use crate::installer::Warning;
use crate::installer::adapters::claude::SETTINGS_FILE;
use crate::installer::adapters::codex::{self, DOCUMENT_FILE};
use crate::installer::settings::{self, UnmergeOutcome};
use crate::installer::sink::{DryRunSink, FileSink, FsSink, Ownership, prune_empty_dirs};
use crate::manifest::InstallManifest;
use crate::prompt;
use crate::target::{TargetKind, TargetSpec};
use crate::ui::output;

/// Run uninstall command
pub fn run(args: UninstallArgs, verbose: bool) -> Result<()> {
    let kind = args.target.selected().unwrap_or(TargetKind::ClaudeProject);
    let located = TargetSpec::resolve(kind, args.target.target_dir())?;
    let manifest = InstallManifest::read(&located.base_path)?;
    let target = TargetSpec {
        kind: manifest.target_kind()?,
        base_path: located.base_path,
    };

    if !args.yes && !args.dry_run && is_interactive() {
        println!();
        println!(
            "The following will be removed from {}:",
            output::path(&target.base_path)
        );
        println!("  {} skill(s), {} agent(s)", manifest.skills.len(), manifest.agents.len());
        println!("  {} file(s)", manifest.files.len());
        println!();
        if !prompt::confirm("Proceed with uninstall?", true)? {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    if args.dry_run {
        let mut sink = DryRunSink::new();
        let warnings = remove_installation(&manifest, &target, args.source.as_deref(), &mut sink)?;
        output::ops(sink.ops(), true);
        warnings.iter().for_each(output::warning);
        output::dry_run("No files were changed.");
        return Ok(());
    }

    let mut sink = FsSink::new();
    let warnings = match remove_installation(&manifest, &target, args.source.as_deref(), &mut sink) {
        Ok(warnings) => warnings,
        Err(e) => {
            sink.rollback();
            return Err(e);
        }
    };
    if verbose {
        output::ops(sink.ops(), false);
    }
    sink.commit();

    for path in manifest.owned_paths(&target.base_path) {
        if let Some(parent) = path.parent() {
            prune_empty_dirs(parent, &target.base_path);
        }
    }

    warnings.iter().for_each(output::warning);
    output::success(&format!(
        "Uninstalled {} from {}",
        target.kind.label(),
        output::path(&target.base_path)
    ));
    Ok(())
}

/// Issue every removal for `manifest` to `sink`.
pub fn remove_installation(
    manifest: &InstallManifest,
    target: &TargetSpec,
    source_override: Option<&Path>,
    sink: &mut dyn FileSink,
) -> Result<Vec<Warning>> {
    let base = &target.base_path;
    let mut warnings = Vec::new();

    for path in manifest.owned_paths(base) {
        sink.remove(&path)?;
    }

    match target.kind {
        TargetKind::ClaudeProject | TargetKind::ClaudeGlobal
            if manifest.hooks || manifest.hook_settings.is_some() =>
        {
            if let Some(warning) = unregister_hooks(manifest, target, source_override, sink)? {
                warnings.push(warning);
            }
        }
        TargetKind::Codex => strip_codex_block(base, sink)?,
        _ => {}
    }

    sink.remove(&InstallManifest::path(base))?;
    Ok(warnings)
}

/// Reverse-merge the package hook settings out of `settings.json`.
///
/// The registrations recorded in the manifest are used when present; older
/// manifests fall back to the package settings file in the source tree.
fn unregister_hooks(
    manifest: &InstallManifest,
    target: &TargetSpec,
    source_override: Option<&Path>,
    sink: &mut dyn FileSink,
) -> Result<Option<Warning>> {
    let settings_path = target.base_path.join(SETTINGS_FILE);
    if !settings_path.exists() {
        return Ok(None);
    }

    let package = match &manifest.hook_settings {
        Some(recorded) => recorded.clone(),
        None => match package_from_source(manifest, target, source_override) {
            Ok(package) => package,
            Err(reason) => {
                return Ok(Some(Warning::UnregisterDegraded { path: settings_path, reason }));
            }
        },
    };

    match settings::unregister(&settings_path, &package, sink)? {
        UnmergeOutcome::Degraded { reason } => {
            Ok(Some(Warning::UnregisterDegraded { path: settings_path, reason }))
        }
        _ => Ok(None),
    }
}

fn package_from_source(
    manifest: &InstallManifest,
    target: &TargetSpec,
    source_override: Option<&Path>,
) -> std::result::Result<serde_json::Value, String> {
    let source = source_override.map_or_else(|| PathBuf::from(&manifest.source), Path::to_path_buf);
    let package_path = source.join(HOOKS_DIR).join(HOOK_SETTINGS_FILE);
    let text = std::fs::read_to_string(&package_path).map_err(|_| {
        format!(
            "package hook settings are not available at {}",
            package_path.display()
        )
    })?;
    let global_base = (target.kind == TargetKind::ClaudeGlobal).then_some(target.base_path.as_path());
    settings::load_package(&text, global_base)
}

/// Remove the generated block, and the document if nothing else remains.
fn strip_codex_block(base: &Path, sink: &mut dyn FileSink) -> Result<()> {
    let path = base.join(DOCUMENT_FILE);
    if !path.exists() {
        return Ok(());
    }
    let content = std::fs::read_to_string(&path).map_err(|e| read_failed(&path, e))?;
    match codex::strip_block(&content) {
        Some(rest) if rest.trim().is_empty() => sink.remove(&path),
        Some(rest) => sink.write(&path, rest.as_bytes(), Ownership::Shared),
        None => Ok(()),
    }
}
