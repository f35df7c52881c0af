//! Command implementations for the agentic-skills CLI

pub mod completions;
pub mod install;
pub mod uninstall;
pub mod update;
pub mod version;

use std::io::IsTerminal;

/// Whether prompts may be shown: stdin and stdout are terminals.
pub fn is_interactive() -> bool {
    std::io::stdin().is_terminal() && console::user_attended()
}
