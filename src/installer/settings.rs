//! Claude settings merging
//!
//! The package ships its hook registrations as `hooks/settings.json`
//! (`{"hooks": {"<Event>": [<entry>, ...]}}`). Installing reconciles that with
//! the user's `settings.json`:
//!
//! ```text
//! no settings file                   -> write the package file
//! every package entry already there  -> no-op
//! valid JSON                         -> append missing entries per event
//! invalid JSON / unexpected shape    -> warn, leave the file untouched
//! ```
//!
//! Entries are compared by full structural equality, so re-running an install
//! never registers a hook twice. Keys unrelated to the package are kept as
//! they are, in their original order.

use std::path::Path;

use serde_json::{Map, Value};

use super::sink::{FileSink, Ownership};
use crate::error::{Result, read_failed};

/// Result of reconciling package hooks with a settings file
#[derive(Debug, Clone, PartialEq)]
pub enum MergeOutcome {
    /// No settings file existed; the package file was written as-is
    Created,
    /// Every package entry was already registered
    AlreadyPresent,
    /// `added` entries were appended
    Merged { added: usize },
    /// Merge was not attempted; the file was left untouched
    Degraded { reason: String },
}

/// What [`apply`] did and which registrations it is responsible for
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    pub outcome: MergeOutcome,
    /// Package hooks as registered, after command rewriting. `None` when
    /// degraded.
    pub package: Option<Value>,
}

/// Result of removing package registrations from a settings file
#[derive(Debug, Clone, PartialEq)]
pub enum UnmergeOutcome {
    /// No package entry was registered
    Unchanged,
    /// Package entries were removed, other settings kept
    Updated,
    /// Nothing but package entries was left; the file was deleted
    Removed,
    /// The file could not be processed and was left untouched
    Degraded { reason: String },
}

/// Parse package settings, rewriting hook commands for a global install.
///
/// Project installs reference scripts through `$CLAUDE_PROJECT_DIR/.claude`;
/// global installs have no project directory, so those prefixes are replaced
/// with the absolute hooks base.
pub fn load_package(content: &str, global_base: Option<&Path>) -> std::result::Result<Value, String> {
    let mut value: Value = serde_json::from_str(content).map_err(|e| e.to_string())?;
    hook_events(&value)?;
    if let Some(base) = global_base {
        rewrite_commands(&mut value, base);
    }
    Ok(value)
}

/// Merge `package` into existing settings text.
///
/// Returns the new document and the number of entries appended, or a reason
/// the merge cannot be done safely.
pub fn merge(existing: &str, package: &Value) -> std::result::Result<(Option<String>, usize), String> {
    let mut root: Value =
        serde_json::from_str(existing).map_err(|e| format!("existing settings are not valid JSON: {e}"))?;
    let package_events = hook_events(package)?;

    let root_map = root
        .as_object_mut()
        .ok_or_else(|| "existing settings are not a JSON object".to_string())?;
    let hooks = root_map
        .entry("hooks")
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| "existing \"hooks\" is not an object".to_string())?;

    let mut added = 0;
    for (event, entries) in package_events {
        let slot = hooks
            .entry(event.clone())
            .or_insert_with(|| Value::Array(Vec::new()))
            .as_array_mut()
            .ok_or_else(|| format!("existing hooks for {event} are not an array"))?;
        for entry in entries {
            if !slot.contains(entry) {
                slot.push(entry.clone());
                added += 1;
            }
        }
    }

    if added == 0 {
        return Ok((None, 0));
    }
    Ok((Some(to_pretty(&root)?), added))
}

/// Remove the package's entries from existing settings text.
///
/// Events left empty are dropped, as is an emptied `hooks` object. Returns
/// `None` when nothing had to change.
pub fn unmerge(existing: &str, package: &Value) -> std::result::Result<Option<String>, String> {
    let mut root: Value =
        serde_json::from_str(existing).map_err(|e| format!("existing settings are not valid JSON: {e}"))?;
    let package_events = hook_events(package)?;

    let Some(hooks) = root
        .as_object_mut()
        .and_then(|m| m.get_mut("hooks"))
        .and_then(Value::as_object_mut)
    else {
        return Ok(None);
    };

    let mut changed = false;
    for (event, entries) in package_events {
        let Some(slot) = hooks.get_mut(event).and_then(Value::as_array_mut) else {
            continue;
        };
        let before = slot.len();
        slot.retain(|existing| !entries.contains(existing));
        if slot.len() != before {
            changed = true;
        }
        if slot.is_empty() {
            hooks.shift_remove(event);
        }
    }

    if !changed {
        return Ok(None);
    }
    let hooks_empty = hooks.is_empty();
    if hooks_empty {
        if let Some(map) = root.as_object_mut() {
            map.shift_remove("hooks");
        }
    }
    Ok(Some(to_pretty(&root)?))
}

/// Reconcile the package hook configuration with `settings_path`.
///
/// Never fails on user data: unreadable or malformed settings downgrade to
/// [`MergeOutcome::Degraded`]. Only sink failures propagate.
pub fn apply(
    settings_path: &Path,
    package_path: &Path,
    global_base: Option<&Path>,
    sink: &mut dyn FileSink,
) -> Result<Applied> {
    let degraded = |reason: String| Applied {
        outcome: MergeOutcome::Degraded { reason },
        package: None,
    };

    let package_text =
        std::fs::read_to_string(package_path).map_err(|e| read_failed(package_path, e))?;
    let package = match load_package(&package_text, global_base) {
        Ok(value) => value,
        Err(reason) => {
            return Ok(degraded(format!("package hook settings are invalid: {reason}")));
        }
    };

    if !settings_path.exists() {
        let text = match to_pretty(&package) {
            Ok(text) => text,
            Err(reason) => return Ok(degraded(reason)),
        };
        sink.write(settings_path, text.as_bytes(), Ownership::Shared)?;
        return Ok(Applied {
            outcome: MergeOutcome::Created,
            package: Some(package),
        });
    }

    let existing = match std::fs::read_to_string(settings_path) {
        Ok(text) => text,
        Err(e) => {
            return Ok(degraded(format!(
                "cannot read {}: {e}",
                settings_path.display()
            )));
        }
    };

    let outcome = match merge(&existing, &package) {
        Ok((None, _)) => MergeOutcome::AlreadyPresent,
        Ok((Some(text), added)) => {
            sink.write(settings_path, text.as_bytes(), Ownership::Shared)?;
            MergeOutcome::Merged { added }
        }
        Err(reason) => return Ok(degraded(reason)),
    };
    Ok(Applied {
        outcome,
        package: Some(package),
    })
}

/// Remove the registrations in `package` from `settings_path`.
///
/// A file left with nothing but `{}` is deleted. Like [`apply`], problems
/// with the user's file degrade instead of failing.
pub fn unregister(
    settings_path: &Path,
    package: &Value,
    sink: &mut dyn FileSink,
) -> Result<UnmergeOutcome> {
    if !settings_path.exists() {
        return Ok(UnmergeOutcome::Unchanged);
    }
    let existing = match std::fs::read_to_string(settings_path) {
        Ok(text) => text,
        Err(e) => {
            return Ok(UnmergeOutcome::Degraded {
                reason: format!("cannot read {}: {e}", settings_path.display()),
            });
        }
    };

    match unmerge(&existing, package) {
        Ok(Some(text)) if text.trim() == "{}" => {
            sink.remove(settings_path)?;
            Ok(UnmergeOutcome::Removed)
        }
        Ok(Some(text)) => {
            sink.write(settings_path, text.as_bytes(), Ownership::Shared)?;
            Ok(UnmergeOutcome::Updated)
        }
        Ok(None) => Ok(UnmergeOutcome::Unchanged),
        Err(reason) => Ok(UnmergeOutcome::Degraded { reason }),
    }
}

/// Entries registered by `previous` that `current` no longer registers.
///
/// The result has the package shape (`{"hooks": {...}}`) and can be passed to
/// [`unregister`]. `None` when every previous entry is still registered.
pub fn retired(previous: &Value, current: Option<&Value>) -> Option<Value> {
    let mut events = Map::new();
    let previous_events = previous.get("hooks").and_then(Value::as_object);
    for (event, entries) in previous_events.into_iter().flatten() {
        let Some(entries) = entries.as_array() else {
            continue;
        };
        let kept = current
            .and_then(|c| c.get("hooks"))
            .and_then(|h| h.get(event))
            .and_then(Value::as_array);
        let gone: Vec<Value> = entries
            .iter()
            .filter(|entry| kept.is_none_or(|k| !k.contains(*entry)))
            .cloned()
            .collect();
        if !gone.is_empty() {
            events.insert(event.clone(), Value::Array(gone));
        }
    }
    if events.is_empty() {
        return None;
    }
    let mut root = Map::new();
    root.insert("hooks".to_string(), Value::Object(events));
    Some(Value::Object(root))
}

fn hook_events(package: &Value) -> std::result::Result<Vec<(&String, &Vec<Value>)>, String> {
    let hooks = package
        .get("hooks")
        .and_then(Value::as_object)
        .ok_or_else(|| "missing \"hooks\" object".to_string())?;
    hooks
        .iter()
        .map(|(event, entries)| {
            entries
                .as_array()
                .map(|list| (event, list))
                .ok_or_else(|| format!("hooks for {event} are not an array"))
        })
        .collect()
}

fn rewrite_commands(value: &mut Value, base: &Path) {
    let replacement = format!("\"{}\"", base.display());
    match value {
        Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                if key == "command" {
                    if let Value::String(command) = child {
                        *command = command
                            .replace("\"$CLAUDE_PROJECT_DIR\"/.claude", &replacement)
                            .replace("$CLAUDE_PROJECT_DIR/.claude", &replacement);
                    }
                } else {
                    rewrite_commands(child, base);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                rewrite_commands(item, base);
            }
        }
        _ => {}
    }
}

fn to_pretty(value: &Value) -> std::result::Result<String, String> {
    serde_json::to_string_pretty(value)
        .map(|mut text| {
            text.push('\n');
            text
        })
        .map_err(|e| e.to_string())
}
