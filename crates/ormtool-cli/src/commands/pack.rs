//! Pack command implementation
//!
//! Loads the three source maps, packs them into the Unreal and/or Unity layout
//! on a background worker, and reports progress while it runs.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use ormtool_pack::{PackOutcome, PackRequest, PackWorker, Settings, SettingsError};

use super::json_output::{error_codes, JsonError, PackOutput};
use super::progress_line::ProgressLine;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Arguments of the pack command.
#[derive(Debug, Clone, Default)]
pub struct PackOptions {
    pub ao: String,
    pub roughness: String,
    pub metallic: String,
    /// Overrides the Unreal destination from settings
    pub unreal: Option<String>,
    /// Overrides the Unity destination from settings
    pub unity: Option<String>,
    pub no_unreal: bool,
    pub no_unity: bool,
    /// Explicit settings file
    pub config: Option<String>,
}

impl PackOptions {
    /// Settings first, then command-line overrides.
    pub fn to_request(&self) -> Result<PackRequest, SettingsError> {
        let settings = Settings::discover(self.config.as_deref().map(Path::new))?;
        let mut request = settings.request(&self.ao, &self.roughness, &self.metallic);

        if let Some(path) = &self.unreal {
            request = request.with_unreal(path);
        }
        if let Some(path) = &self.unity {
            request = request.with_unity(path);
        }
        if self.no_unreal {
            request = request.without_unreal();
        }
        if self.no_unity {
            request = request.without_unity();
        }
        Ok(request)
    }
}

/// Run the pack command
///
/// # Returns
/// Exit code: 0 on success, 1 on error
pub fn run(options: &PackOptions, json_output: bool) -> Result<ExitCode> {
    if json_output {
        run_json(options)
    } else {
        run_human(options)
    }
}

fn run_human(options: &PackOptions) -> Result<ExitCode> {
    let request = options.to_request().context("Failed to load settings")?;

    println!("{}", "Packing ORM textures:".cyan().bold());
    println!("  {} {}", "AO:".dimmed(), request.ao.display());
    println!("  {} {}", "Roughness:".dimmed(), request.roughness.display());
    println!("  {} {}", "Metallic:".dimmed(), request.metallic.display());
    if request.outputs().is_empty() {
        println!(
            "{}",
            "No outputs requested, only validating sources".yellow()
        );
    }

    match run_worker(request, true)? {
        Ok(summary) => {
            println!(
                "{} {}x{}",
                "Packed".green().bold(),
                summary.width,
                summary.height
            );
            for output in &summary.outputs {
                println!(
                    "  {} {} {}",
                    "✓".green(),
                    output.path.display(),
                    format!("({}, {} channels)", output.layout, output.channels).dimmed()
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("{} {}", "Pack failed:".red().bold(), e);
            Ok(ExitCode::from(1))
        }
    }
}

fn run_json(options: &PackOptions) -> Result<ExitCode> {
    let request = match options.to_request() {
        Ok(request) => request,
        Err(e) => {
            let mut error = JsonError::new(error_codes::SETTINGS, e.to_string());
            if let Some(config) = &options.config {
                error = error.with_file(config.as_str());
            }
            let output = PackOutput::failure(vec![error]);
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(ExitCode::from(1));
        }
    };

    let (output, code) = match run_worker(request, false)? {
        Ok(summary) => (PackOutput::success(summary), ExitCode::SUCCESS),
        Err(e) => (PackOutput::failure(vec![JsonError::from(&e)]), ExitCode::from(1)),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(code)
}

/// Run `request` on a worker, polling progress until it finishes.
fn run_worker(request: PackRequest, show_progress: bool) -> Result<PackOutcome> {
    let mut worker = PackWorker::new();
    worker.start(request)?;

    let mut line = ProgressLine::new(show_progress);
    let mut polls = 0u32;
    while worker.is_busy() {
        line.tick(worker.progress());
        thread::sleep(POLL_INTERVAL);
        polls += 1;
    }
    line.finish();
    log::debug!("pack worker finished after {} polls", polls);

    Ok(worker.wait()?)
}
