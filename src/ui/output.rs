//! Styled status output
//!
//! Success lines are green, warnings yellow, paths cyan. Previews carry a
//! `[DRY RUN]` prefix. Colors follow `console`'s global switch, which
//! [`configure_colors`] turns off for `--no-color` and `NO_COLOR`.

use std::path::Path;

use console::Style;

use crate::installer::Warning;
use crate::installer::sink::FileOp;

/// Prefix of every preview line
pub const DRY_RUN_PREFIX: &str = "[DRY RUN]";

/// Disable colors when requested by flag or environment.
pub fn configure_colors(no_color_flag: bool) {
    if colors_disabled(no_color_flag, std::env::var_os("NO_COLOR").as_deref()) {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }
}

fn colors_disabled(no_color_flag: bool, no_color_env: Option<&std::ffi::OsStr>) -> bool {
    no_color_flag || no_color_env.is_some_and(|v| !v.is_empty())
}

pub fn path(path: &Path) -> String {
    Style::new().cyan().apply_to(path.display()).to_string()
}

pub fn success(message: &str) {
    println!("{} {}", Style::new().green().bold().apply_to("✓"), message);
}

pub fn info(message: &str) {
    println!("{message}");
}

pub fn heading(message: &str) {
    println!("{}", Style::new().bold().apply_to(message));
}

pub fn warning(warning: &Warning) {
    eprintln!(
        "{} {}",
        Style::new().yellow().bold().apply_to("Warning:"),
        warning
    );
}

pub fn dry_run(message: &str) {
    println!(
        "{} {}",
        Style::new().yellow().apply_to(DRY_RUN_PREFIX),
        message
    );
}

/// One line per planned operation
pub fn describe_op(op: &FileOp) -> String {
    match op {
        FileOp::Write { path: p, .. } => format!("write {}", path(p)),
        FileOp::SetExecutable { path: p } => format!("chmod +x {}", path(p)),
        FileOp::Remove { path: p } => format!("remove {}", path(p)),
    }
}

/// Print every operation, as a preview or as a verbose trace.
pub fn ops(ops: &[FileOp], dry_run_mode: bool) {
    for op in ops {
        let line = describe_op(op);
        if dry_run_mode {
            dry_run(&format!("Would {line}"));
        } else {
            info(&format!("  {line}"));
        }
    }
}
