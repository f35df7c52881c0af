//! Update command implementation
//!
//! Reinstalls what an installation's manifest records, from the same source
//! when it still exists or can be cloned again. A source whose content hash matches the manifest is
//! left alone unless `--force` is given.

use std::path::Path;

use crate::catalog::{Catalog, is_source_root};
use crate::cli::UpdateArgs;
use crate::commands::install::{Plan, execute, recorded_components};
use crate::error::Result;
use crate::hash;
use crate::installer::InstallOptions;
use crate::manifest::InstallManifest;
use crate::source::{self, SourceRoot};
use crate::target::{TargetKind, TargetSpec};
use crate::ui::output;

/// Run update command
pub fn run(args: UpdateArgs, verbose: bool) -> Result<()> {
    let kind = args.target.selected().unwrap_or(TargetKind::ClaudeProject);
    let located = TargetSpec::resolve(kind, args.target.target_dir())?;
    let manifest = InstallManifest::read(&located.base_path)?;

    // The manifest knows which adapter wrote this root
    let target = TargetSpec {
        kind: manifest.target_kind()?,
        base_path: located.base_path,
    };

    let source = resolve_source(&args, &manifest)?;
    let catalog = Catalog::load(source.path())?;

    if !args.force && hash::hash_source(&catalog.root)? == manifest.source_hash {
        output::success(&format!(
            "{} is already up to date",
            output::path(&target.base_path)
        ));
        return Ok(());
    }

    execute(
        &catalog,
        &Plan {
            target: &target,
            source: &source,
            options: InstallOptions {
                components: recorded_components(&manifest),
                force: true,
            },
            previous: Some(&manifest),
            dry_run: args.dry_run,
            verbose,
        },
    )?;
    Ok(())
}

/// `--source` first, then the recorded source, then normal discovery.
///
/// A recorded repository URL is cloned again at `--ref`.
fn resolve_source(args: &UpdateArgs, manifest: &InstallManifest) -> Result<SourceRoot> {
    if args.source.source.is_none() {
        let recorded = Path::new(&manifest.source);
        if recorded.is_absolute() && is_source_root(recorded) {
            return source::local(recorded);
        }
        if source::is_repo_url(&manifest.source) {
            return source::clone_source(&manifest.source, &args.source.git_ref);
        }
    }
    source::resolve(args.source.options())
}
