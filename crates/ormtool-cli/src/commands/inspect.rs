//! Inspect command implementation
//!
//! Reports the dimensions of each source map and whether the three can be
//! packed together. Nothing is written.

use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use std::process::ExitCode;

use ormtool_pack::{GrayscaleImage, SourceMap};

use super::json_output::{error_codes, InspectOutput, JsonError, SourceInfo};

/// Run the inspect command
///
/// # Returns
/// Exit code: 0 if the maps are packable, 1 otherwise
pub fn run(ao: &str, roughness: &str, metallic: &str, json_output: bool) -> Result<ExitCode> {
    let report = inspect([
        (SourceMap::Ao, ao),
        (SourceMap::Roughness, roughness),
        (SourceMap::Metallic, metallic),
    ]);

    if json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_human(&report);
    }

    Ok(if report.packable {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

/// Load each map and check that all three agree in size.
pub fn inspect(sources: [(SourceMap, &str); 3]) -> InspectOutput {
    let mut infos = Vec::with_capacity(3);
    let mut errors = Vec::new();

    for (map, path) in sources {
        match GrayscaleImage::load(Path::new(path)) {
            Ok(img) => infos.push(SourceInfo::loaded(map, path.to_string(), img.width(), img.height())),
            Err(e) => {
                errors.push(
                    JsonError::new(error_codes::LOAD_FAILED, e.to_string())
                        .with_file(path)
                        .with_map(map),
                );
                infos.push(SourceInfo::unreadable(map, path.to_string()));
            }
        }
    }

    if errors.is_empty() {
        let dims: Vec<_> = infos.iter().filter_map(SourceInfo::dimensions).collect();
        if dims.windows(2).any(|w| w[0] != w[1]) {
            let described: Vec<String> = infos
                .iter()
                .filter_map(|info| {
                    info.dimensions()
                        .map(|(w, h)| format!("{} {}x{}", info.map, w, h))
                })
                .collect();
            errors.push(JsonError::new(
                error_codes::SIZE_MISMATCH,
                format!("Size mismatch: {}", described.join(", ")),
            ));
        }
    }

    InspectOutput {
        packable: errors.is_empty(),
        errors,
        sources: infos,
    }
}

fn print_human(report: &InspectOutput) {
    println!("{}", "Source maps:".cyan().bold());
    for info in &report.sources {
        let size = match info.dimensions() {
            Some((w, h)) => format!("{}x{}", w, h),
            None => "unreadable".red().to_string(),
        };
        let preset = info
            .preset
            .map(|p| format!(" (preset {})", p).dimmed().to_string())
            .unwrap_or_default();
        println!(
            "  {:<10} {}{}  {}",
            format!("{}:", info.map),
            size,
            preset,
            info.path.dimmed()
        );
    }

    for error in &report.errors {
        println!("  {} {}", error.code.red(), error.message);
    }

    if report.packable {
        println!("{}", "Packable".green().bold());
    } else {
        println!("{}", "Not packable".red().bold());
    }
}
