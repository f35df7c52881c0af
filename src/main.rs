//! agentic-skills - installer for skill guides and agent personas
//!
//! Copies skills, agents and hooks from a source tree into the configuration
//! directories of AI coding tools (Claude Code, OpenCode, Cursor, Codex),
//! adapting layout and metadata to each, and records every installation in a
//! manifest for later update and removal.

use clap::Parser;

mod catalog;
mod cli;
mod commands;
mod error;
mod frontmatter;
mod hash;
mod installer;
mod manifest;
mod prompt;
mod source;
mod target;
mod temp;
mod transaction;
mod ui;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    ui::output::configure_colors(cli.no_color);

    let result = match cli.command {
        None => commands::install::run(cli.install, cli.verbose),
        Some(Commands::Update(args)) => commands::update::run(args, cli.verbose),
        Some(Commands::Uninstall(args)) => commands::uninstall::run(args, cli.verbose),
        Some(Commands::Completions(args)) => commands::completions::run(args),
        Some(Commands::Version) => commands::version::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e.one_line());
        std::process::exit(1);
    }
}
