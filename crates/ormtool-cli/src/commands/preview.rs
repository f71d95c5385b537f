//! Preview command implementation
//!
//! Writes one channel view of a packed texture: the full RGB image or a single
//! channel as grayscale.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use std::process::ExitCode;

use ormtool_pack::{ChannelView, PackedPreview, PngConfig, TextureError};

use super::json_output::{error_codes, JsonError, PreviewOutput, PreviewResult};

/// Run the preview command
///
/// # Arguments
/// * `input` - Packed texture to preview
/// * `channel` - Channel view to export
/// * `out` - Destination; format follows the extension
/// * `json_output` - Whether to output machine-readable JSON
pub fn run(input: &str, channel: ChannelView, out: &str, json_output: bool) -> Result<ExitCode> {
    if json_output {
        run_json(input, channel, out)
    } else {
        run_human(input, channel, out)
    }
}

fn run_human(input: &str, channel: ChannelView, out: &str) -> Result<ExitCode> {
    let result = write_preview(input, channel, out)
        .with_context(|| format!("Failed to preview {}", input))?;

    println!("{} {}", "Preview:".cyan().bold(), input);
    println!(
        "  {} {}x{} (aspect {:.3})",
        "Size:".dimmed(),
        result.width,
        result.height,
        result.aspect
    );
    println!("  {} {}", "Channel:".dimmed(), channel);
    println!("{} {}", "Wrote".green().bold(), out);
    Ok(ExitCode::SUCCESS)
}

fn run_json(input: &str, channel: ChannelView, out: &str) -> Result<ExitCode> {
    let (output, code) = match write_preview(input, channel, out) {
        Ok(result) => (PreviewOutput::success(result), ExitCode::SUCCESS),
        Err(e) => {
            let error = JsonError::new(error_codes::PREVIEW, e.to_string()).with_file(input);
            (PreviewOutput::failure(vec![error]), ExitCode::from(1))
        }
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(code)
}

fn write_preview(input: &str, channel: ChannelView, out: &str) -> Result<PreviewResult, TextureError> {
    let preview = PackedPreview::load(Path::new(input))?;
    preview
        .view(channel)
        .write(Path::new(out), &PngConfig::default())?;

    Ok(PreviewResult {
        input: input.to_string(),
        output: out.to_string(),
        channel: channel.label().to_string(),
        width: preview.width(),
        height: preview.height(),
        aspect: preview.aspect(),
    })
}
