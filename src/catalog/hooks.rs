//! Hook asset enumeration

use std::path::{Path, PathBuf};

use super::sorted_entries;
use crate::error::Result;

/// Directory holding hook scripts and the package settings file
pub const HOOKS_DIR: &str = "hooks";
/// Package hook configuration merged into Claude settings
pub const HOOK_SETTINGS_FILE: &str = "settings.json";
/// Directory holding the OpenCode bridge plugin
pub const OPENCODE_PLUGIN_DIR: &str = "plugins/opencode";

/// Hook-related assets of a source tree. All parts are optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HookAssets {
    /// `hooks/*.sh`, sorted
    pub scripts: Vec<PathBuf>,
    /// `hooks/settings.json` when present
    pub settings: Option<PathBuf>,
    /// `plugins/opencode/*.{ts,js}`, sorted
    pub plugins: Vec<PathBuf>,
}

impl HookAssets {
    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty() && self.settings.is_none() && self.plugins.is_empty()
    }
}

/// Enumerate hook scripts, the package settings file and plugins.
pub fn enumerate_hooks(root: &Path) -> Result<HookAssets> {
    let mut assets = HookAssets::default();

    let hooks_dir = root.join(HOOKS_DIR);
    if hooks_dir.is_dir() {
        for path in sorted_entries(&hooks_dir)? {
            if path.is_file() && has_extension(&path, &["sh"]) {
                assets.scripts.push(path);
            }
        }
        let settings = hooks_dir.join(HOOK_SETTINGS_FILE);
        if settings.is_file() {
            assets.settings = Some(settings);
        }
    }

    let plugin_dir = root.join(OPENCODE_PLUGIN_DIR);
    if plugin_dir.is_dir() {
        for path in sorted_entries(&plugin_dir)? {
            if path.is_file() && has_extension(&path, &["ts", "js"]) {
                assets.plugins.push(path);
            }
        }
    }

    Ok(assets)
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| extensions.contains(&e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::test_support::write;
    use tempfile::TempDir;

    #[test]
    fn test_missing_hooks_is_empty() {
        let temp = TempDir::new().unwrap();
        let assets = enumerate_hooks(temp.path()).unwrap();
        assert!(assets.is_empty());
    }

    #[test]
    fn test_enumerate_hooks() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "hooks/stop.sh", "#!/bin/sh\n");
        write(temp.path(), "hooks/pre-compact.sh", "#!/bin/sh\n");
        write(temp.path(), "hooks/README.md", "docs\n");
        write(temp.path(), "hooks/settings.json", "{}");
        write(temp.path(), "plugins/opencode/bridge.ts", "export {}\n");

        let assets = enumerate_hooks(temp.path()).unwrap();
        let names: Vec<_> = assets
            .scripts
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["pre-compact.sh", "stop.sh"]);
        assert!(assets.settings.is_some());
        assert_eq!(assets.plugins.len(), 1);
    }
}
