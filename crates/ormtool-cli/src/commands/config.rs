//! Config command implementation

use anyhow::{Context, Result};
use std::path::Path;
use std::process::ExitCode;

use ormtool_pack::Settings;

/// Print the effective settings as JSON.
pub fn run(config: Option<&str>) -> Result<ExitCode> {
    let settings = Settings::discover(config.map(Path::new)).context("Failed to load settings")?;
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(ExitCode::SUCCESS)
}
