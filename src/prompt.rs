//! Interactive selection
//!
//! Used only when stdin is a terminal and no target or component flag was
//! given. Cancelling a prompt (Esc or Ctrl-C) aborts the run with a
//! `Prompt` error.

use inquire::{Confirm, MultiSelect, Select};

use crate::error::Result;
use crate::installer::Components;
use crate::target::TargetKind;

const SKILLS: &str = "Skills";
const AGENTS: &str = "Agents";
const HOOKS: &str = "Hooks";

/// Ask which tool to install for.
pub fn select_target() -> Result<TargetKind> {
    let labels: Vec<&str> = TargetKind::ALL.iter().map(|kind| kind.label()).collect();

    println!();
    let choice = Select::new("Install for which tool?", labels)
        .with_page_size(TargetKind::ALL.len())
        .with_help_message("  ↑↓ navigate  enter select  esc cancel")
        .prompt()?;

    Ok(TargetKind::ALL
        .into_iter()
        .find(|kind| kind.label() == choice)
        .unwrap_or(TargetKind::ClaudeProject))
}

/// Component choices offered for `kind`
fn component_options(kind: TargetKind) -> Vec<&'static str> {
    let mut options = vec![SKILLS, AGENTS];
    if kind.supports_hooks() {
        options.push(HOOKS);
    }
    options
}

fn components_from_selection(selected: &[&str]) -> Components {
    Components {
        skills: selected.contains(&SKILLS),
        agents: selected.contains(&AGENTS),
        hooks: selected.contains(&HOOKS),
    }
}

/// Ask which components to install. Everything available is preselected.
pub fn select_components(kind: TargetKind) -> Result<Components> {
    let options = component_options(kind);
    let defaults: Vec<usize> = (0..options.len()).collect();

    let selected = MultiSelect::new("Install which components?", options)
        .with_default(&defaults)
        .with_help_message("  ↑↓ navigate  space toggle  enter confirm  esc cancel")
        .prompt()?;

    Ok(components_from_selection(&selected))
}

/// Ask a yes/no question.
pub fn confirm(message: &str, default: bool) -> Result<bool> {
    Ok(Confirm::new(message)
        .with_default(default)
        .with_help_message("Press Enter to accept the default, or y/n")
        .prompt()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hooks_offered_only_where_supported() {
        assert_eq!(
            component_options(TargetKind::ClaudeGlobal),
            vec![SKILLS, AGENTS, HOOKS]
        );
        assert_eq!(component_options(TargetKind::Cursor), vec![SKILLS, AGENTS]);
        assert_eq!(component_options(TargetKind::Codex), vec![SKILLS, AGENTS]);
    }

    #[test]
    fn test_selection_to_components() {
        let components = components_from_selection(&[SKILLS, HOOKS]);
        assert!(components.skills);
        assert!(!components.agents);
        assert!(components.hooks);
        assert!(components_from_selection(&[]).is_empty());
    }
}
