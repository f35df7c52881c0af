//! CLI definitions using clap derive API

use std::path::{Path, PathBuf};

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Args, Parser, Subcommand};

use crate::installer::Components;
use crate::source::{DEFAULT_REF, DEFAULT_REPO_URL, SourceOptions};
use crate::target::TargetKind;

/// agentic-skills - install skills and agents into AI coding tools
///
/// Without a subcommand, installs. Without any target or component flag on a
/// terminal, asks what to install.
#[derive(Parser, Debug)]
#[command(
    name = "agentic-skills",
    author,
    version,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Install skill guides and agent personas for AI coding tools",
    long_about = "Installs skill guides, agent personas and lifecycle hooks into the \
                  configuration directories of Claude Code, OpenCode, Cursor and Codex, \
                  adapting each to the layout and metadata the tool expects.",
    args_conflicts_with_subcommands = true,
    after_help = "EXAMPLES:\n  \
                  Choose interactively:\n    agentic-skills\n\n\
                  Install everything for Claude Code in this project:\n    agentic-skills --claude\n\n\
                  Preview a global OpenCode install:\n    agentic-skills --opencode-global --dry-run\n\n\
                  Install only skills, replacing earlier files:\n    agentic-skills --claude --skills-only --force\n\n\
                  Update or remove an installation:\n    agentic-skills update --claude\n    agentic-skills uninstall --codex"
)]
pub struct Cli {
    #[command(flatten)]
    pub install: InstallArgs,

    /// Print every file operation
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Disable colored output (also honors NO_COLOR)
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reinstall the components recorded in an installation's manifest
    Update(UpdateArgs),

    /// Remove everything an installation's manifest lists
    Uninstall(UninstallArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),

    /// Show version information
    Version,
}

/// Target tool flags; at most one
#[derive(Args, Debug, Clone, Default)]
#[group(id = "target", multiple = false)]
pub struct TargetFlags {
    /// Claude Code, this project (./.claude)
    #[arg(long)]
    pub claude: bool,

    /// Claude Code, all projects (~/.claude)
    #[arg(long)]
    pub claude_global: bool,

    /// OpenCode, this project (./.opencode)
    #[arg(long)]
    pub opencode: bool,

    /// OpenCode, all projects (~/.config/opencode)
    #[arg(long)]
    pub opencode_global: bool,

    /// Cursor rules (./.cursor/rules)
    #[arg(long)]
    pub cursor: bool,

    /// Codex CLI (~/.codex/AGENTS.md)
    #[arg(long)]
    pub codex: bool,
}

impl TargetFlags {
    pub fn selected(&self) -> Option<TargetKind> {
        let flags = [
            (self.claude, TargetKind::ClaudeProject),
            (self.claude_global, TargetKind::ClaudeGlobal),
            (self.opencode, TargetKind::OpencodeProject),
            (self.opencode_global, TargetKind::OpencodeGlobal),
            (self.cursor, TargetKind::Cursor),
            (self.codex, TargetKind::Codex),
        ];
        flags.into_iter().find(|(set, _)| *set).map(|(_, kind)| kind)
    }
}

/// Where to install
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    #[command(flatten)]
    pub flags: TargetFlags,

    /// Install into DIR instead of the tool's default location
    #[arg(long, value_name = "DIR")]
    pub target_dir: Option<PathBuf>,
}

impl TargetArgs {
    pub fn selected(&self) -> Option<TargetKind> {
        self.flags.selected()
    }

    pub fn target_dir(&self) -> Option<&Path> {
        self.target_dir.as_deref()
    }
}

/// `--*-only` flags; at most one
#[derive(Args, Debug, Clone, Default)]
#[group(id = "only", multiple = false)]
pub struct OnlyFlags {
    /// Install skills only
    #[arg(long)]
    pub skills_only: bool,

    /// Install agents only
    #[arg(long)]
    pub agents_only: bool,

    /// Install hooks only
    #[arg(long)]
    pub hooks_only: bool,
}

/// What to install
#[derive(Args, Debug, Clone, Default)]
pub struct ComponentArgs {
    #[command(flatten)]
    pub only: OnlyFlags,

    /// Skip skills
    #[arg(long, conflicts_with = "only")]
    pub no_skills: bool,

    /// Skip agents
    #[arg(long, conflicts_with = "only")]
    pub no_agents: bool,

    /// Skip hooks
    #[arg(long, conflicts_with = "only")]
    pub no_hooks: bool,
}

impl ComponentArgs {
    /// Whether any component flag was given
    pub fn any(&self) -> bool {
        self.only.skills_only
            || self.only.agents_only
            || self.only.hooks_only
            || self.no_skills
            || self.no_agents
            || self.no_hooks
    }

    pub fn resolve(&self) -> Components {
        let only = &self.only;
        if only.skills_only || only.agents_only || only.hooks_only {
            return Components {
                skills: only.skills_only,
                agents: only.agents_only,
                hooks: only.hooks_only,
            };
        }
        Components {
            skills: !self.no_skills,
            agents: !self.no_agents,
            hooks: !self.no_hooks,
        }
    }
}

/// Where the content comes from
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Source checkout containing skills/ and agents/
    #[arg(long, value_name = "DIR", env = "AGENTIC_SKILLS_SOURCE")]
    pub source: Option<PathBuf>,

    /// Repository cloned when no local source is found
    #[arg(long, value_name = "URL", env = "AGENTIC_SKILLS_REPO", default_value = DEFAULT_REPO_URL)]
    pub repo: String,

    /// Branch of --repo to clone
    #[arg(long = "ref", value_name = "REF", default_value = DEFAULT_REF)]
    pub git_ref: String,
}

impl SourceArgs {
    pub fn options(&self) -> SourceOptions<'_> {
        SourceOptions {
            explicit: self.source.as_deref(),
            repo: &self.repo,
            git_ref: &self.git_ref,
        }
    }
}

impl Default for SourceArgs {
    fn default() -> Self {
        Self {
            source: None,
            repo: DEFAULT_REPO_URL.to_string(),
            git_ref: DEFAULT_REF.to_string(),
        }
    }
}

/// Arguments of the default install run
#[derive(Args, Debug, Clone, Default)]
pub struct InstallArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    #[command(flatten)]
    pub components: ComponentArgs,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Show what would be installed without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Replace previous installations without asking
    #[arg(long)]
    pub force: bool,
}

impl InstallArgs {
    /// Whether flags already decide the run
    pub fn has_selection_flags(&self) -> bool {
        self.target.selected().is_some() || self.components.any()
    }
}

/// Arguments for the update command
#[derive(Args, Debug, Clone, Default)]
#[command(after_help = "EXAMPLES:\n  \
                  Update the project's Claude Code installation:\n    agentic-skills update --claude\n\n\
                  Reinstall even if the source is unchanged:\n    agentic-skills update --codex --force\n\n\
                  Preview an update:\n    agentic-skills update --opencode --dry-run")]
pub struct UpdateArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Show what would change without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Reinstall even when the source has not changed
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the uninstall command
#[derive(Args, Debug, Clone, Default)]
#[command(after_help = "EXAMPLES:\n  \
                  Remove the project's Claude Code installation:\n    agentic-skills uninstall --claude\n\n\
                  Remove without confirmation:\n    agentic-skills uninstall --cursor -y\n\n\
                  Preview a removal:\n    agentic-skills uninstall --codex --dry-run")]
pub struct UninstallArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Source checkout holding hooks/settings.json, for unregistering hooks
    #[arg(long, value_name = "DIR", env = "AGENTIC_SKILLS_SOURCE")]
    pub source: Option<PathBuf>,

    /// Show what would be removed without deleting anything
    #[arg(long)]
    pub dry_run: bool,

    /// Skip confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// Arguments for completions command
#[derive(Args, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    agentic-skills completions --shell bash > ~/.bash_completion.d/agentic-skills\n\n\
                  Generate zsh completions:\n    agentic-skills completions --shell zsh > ~/.zfunc/_agentic-skills\n\n\
                  Generate fish completions:\n    agentic-skills completions --shell fish > ~/.config/fish/completions/agentic-skills.fish")]
pub struct CompletionsArgs {
    /// Shell type (bash, elvish, fish, powershell, zsh)
    #[arg(long)]
    pub shell: String,
}
