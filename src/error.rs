//! Error types and handling for agentic-skills
//!
//! Uses `thiserror` for error definitions and `miette` for diagnostics.
//! Every variant here is fatal for the run. Reduced-functionality conditions
//! (degraded settings merge, hooks requested for a target without hook
//! support) are reported as [`crate::installer::Warning`] values instead.

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for installer operations
#[derive(Error, Diagnostic, Debug)]
pub enum InstallerError {
    // Source errors
    #[error("Source directory not found: {path}")]
    #[diagnostic(
        code(agentic_skills::source::not_found),
        help("Pass --source pointing at a checkout that contains skills/ and agents/")
    )]
    SourceNotFound { path: String },

    #[error("Failed to clone repository: {url}: {reason}")]
    #[diagnostic(
        code(agentic_skills::source::clone_failed),
        help("Check network access and the --repo URL, then re-run the installer")
    )]
    CloneFailed { url: String, reason: String },

    // Target errors
    #[error("Invalid target: {target}")]
    #[diagnostic(
        code(agentic_skills::target::invalid),
        help(
            "Supported targets: claude-project, claude-global, opencode-project, opencode-global, cursor, codex"
        )
    )]
    InvalidTarget { target: String },

    #[error("Nothing selected to install")]
    #[diagnostic(
        code(agentic_skills::target::nothing_selected),
        help("Drop one of the --no-skills/--no-agents/--no-hooks flags")
    )]
    NothingSelected,

    #[error("Content already installed in {path}")]
    #[diagnostic(
        code(agentic_skills::target::already_installed),
        help("Re-run with --force to replace the previously installed block")
    )]
    AlreadyInstalled { path: String },

    // Materialization errors
    #[error("Failed to install {path}: {reason}")]
    #[diagnostic(code(agentic_skills::install::materialization_failed))]
    MaterializationFailed { path: String, reason: String },

    // File system errors
    #[error("Failed to read file: {path}: {reason}")]
    #[diagnostic(code(agentic_skills::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write file: {path}: {reason}")]
    #[diagnostic(code(agentic_skills::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    // Manifest errors
    #[error("No install manifest found at {path}")]
    #[diagnostic(
        code(agentic_skills::manifest::not_found),
        help("Install first, or pass the same target flag and --target-dir used for the install")
    )]
    ManifestNotFound { path: String },

    #[error("Failed to parse install manifest {path}: {reason}")]
    #[diagnostic(code(agentic_skills::manifest::parse_failed))]
    ManifestParseFailed { path: String, reason: String },

    #[error("Unknown shell: {shell}")]
    #[diagnostic(
        code(agentic_skills::cli::invalid_shell),
        help("Supported shells: bash, elvish, fish, powershell, zsh")
    )]
    InvalidShell { shell: String },

    // Interactive prompt errors
    #[error("Prompt failed: {message}")]
    #[diagnostic(code(agentic_skills::prompt::failed))]
    Prompt { message: String },
}

impl InstallerError {
    /// Renders the error and its help text on one line for stderr.
    pub fn one_line(&self) -> String {
        match self.help() {
            Some(help) => format!("{self} ({help})"),
            None => self.to_string(),
        }
    }
}

impl From<inquire::InquireError> for InstallerError {
    fn from(err: inquire::InquireError) -> Self {
        InstallerError::Prompt {
            message: err.to_string(),
        }
    }
}

/// Result type alias for installer operations
pub type Result<T> = std::result::Result<T, InstallerError>;

/// Builds a read failure for `path`.
pub fn read_failed(path: &std::path::Path, err: impl std::fmt::Display) -> InstallerError {
    InstallerError::FileReadFailed {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

/// Builds a write failure for `path`.
pub fn write_failed(path: &std::path::Path, err: impl std::fmt::Display) -> InstallerError {
    InstallerError::FileWriteFailed {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}
