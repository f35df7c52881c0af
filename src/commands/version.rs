//! Version command implementation

use crate::error::Result;
use crate::target::TargetKind;

/// Run version command
pub fn run() -> Result<()> {
    println!("agentic-skills {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Build info:");
    println!("  Rust version: {}", rustc_version());
    println!("  Profile: {}", build_profile());
    println!();
    println!("Targets:");
    for kind in TargetKind::ALL {
        println!("  {:<17} {}", kind.id(), kind.label());
    }

    Ok(())
}

fn rustc_version() -> &'static str {
    // Minimum supported version from the manifest
    env!("CARGO_PKG_RUST_VERSION")
}

fn build_profile() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "release"
    }
}
