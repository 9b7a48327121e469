//! Config Command
//!
//! Manage repoglance configuration.
//!
//! Usage:
//!   repoglance config show [-f json]
//!   repoglance config path
//!   repoglance config init [-g] [--force]

use crate::cli::ui::Output;
use crate::config::ConfigLoader;
use crate::types::Result;

/// Show the merged effective configuration
pub fn show(format: &str) -> Result<()> {
    ConfigLoader::show_config(format == "json")
}

/// Show configuration paths
pub fn path() -> Result<()> {
    ConfigLoader::show_path();
    Ok(())
}

pub fn init(global: bool, force: bool) -> Result<()> {
    let output = Output::new();
    let (path, written) = ConfigLoader::init(global, force)?;
    if written {
        output.success("Initialized configuration");
    } else {
        output.info("Configuration already exists (use --force to overwrite)");
    }
    println!("  Config: {}", path.display());
    Ok(())
}
