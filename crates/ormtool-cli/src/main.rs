//! ORMTool CLI - pack AO, roughness and metallic maps into ORM textures
//!
//! This binary provides commands for packing source maps into engine layouts,
//! previewing packed results, and inspecting source sets.

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use ormtool_cli::commands;
use ormtool_pack::ChannelView;

/// ORMTool - ORM channel packer for Unreal and Unity
#[derive(Parser)]
#[command(name = "ormtool")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Log progress of the library at info level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pack three grayscale maps into Unreal (RGB) and/or Unity (RGBA) textures
    Pack {
        /// Ambient occlusion map
        #[arg(long)]
        ao: String,

        /// Roughness map
        #[arg(long)]
        roughness: String,

        /// Metallic map
        #[arg(long)]
        metallic: String,

        /// Unreal output path (enables the Unreal output)
        #[arg(long)]
        unreal: Option<String>,

        /// Unity output path (enables the Unity output)
        #[arg(long)]
        unity: Option<String>,

        /// Skip the Unreal output
        #[arg(long)]
        no_unreal: bool,

        /// Skip the Unity output
        #[arg(long)]
        no_unity: bool,

        /// Settings file (default: ./ormtool.json, then the user config dir)
        #[arg(short, long)]
        config: Option<String>,

        /// Output machine-readable JSON diagnostics (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Export one channel view of a packed texture
    Preview {
        /// Packed texture to read
        #[arg(short, long)]
        input: String,

        /// Channel to export (all, ao, roughness, metallic)
        #[arg(long, default_value = "all")]
        channel: ChannelView,

        /// Output path; format follows the extension
        #[arg(short, long)]
        out: String,

        /// Output machine-readable JSON diagnostics (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Report source map dimensions and whether they can be packed
    Inspect {
        /// Ambient occlusion map
        #[arg(long)]
        ao: String,

        /// Roughness map
        #[arg(long)]
        roughness: String,

        /// Metallic map
        #[arg(long)]
        metallic: String,

        /// Output machine-readable JSON diagnostics (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Print the effective settings as JSON
    Config {
        /// Settings file (default: ./ormtool.json, then the user config dir)
        #[arg(short, long)]
        config: Option<String>,
    },
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Pack {
            ao,
            roughness,
            metallic,
            unreal,
            unity,
            no_unreal,
            no_unity,
            config,
            json,
        } => commands::pack::run(
            &commands::pack::PackOptions {
                ao,
                roughness,
                metallic,
                unreal,
                unity,
                no_unreal,
                no_unity,
                config,
            },
            json,
        ),
        Commands::Preview {
            input,
            channel,
            out,
            json,
        } => commands::preview::run(&input, channel, &out, json),
        Commands::Inspect {
            ao,
            roughness,
            metallic,
            json,
        } => commands::inspect::run(&ao, &roughness, &metallic, json),
        Commands::Config { config } => commands::config::run(config.as_deref()),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_pack() {
        let cli = Cli::try_parse_from([
            "ormtool",
            "pack",
            "--ao",
            "ao.png",
            "--roughness",
            "r.png",
            "--metallic",
            "m.png",
            "--unity",
            "out/unity.tga",
            "--no-unreal",
        ])
        .unwrap();
        match cli.command {
            Commands::Pack {
                ao,
                unreal,
                unity,
                no_unreal,
                no_unity,
                json,
                ..
            } => {
                assert_eq!(ao, "ao.png");
                assert_eq!(unreal, None);
                assert_eq!(unity.as_deref(), Some("out/unity.tga"));
                assert!(no_unreal);
                assert!(!no_unity);
                assert!(!json);
            }
            _ => panic!("expected pack command"),
        }
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_pack_requires_all_sources() {
        assert!(Cli::try_parse_from(["ormtool", "pack", "--ao", "ao.png"]).is_err());
    }

    #[test]
    fn test_cli_parses_preview_channel() {
        let cli = Cli::try_parse_from([
            "ormtool", "preview", "-i", "orm.png", "--channel", "g", "-o", "g.png",
        ])
        .unwrap();
        match cli.command {
            Commands::Preview { channel, .. } => assert_eq!(channel, ChannelView::Roughness),
            _ => panic!("expected preview command"),
        }
    }

    #[test]
    fn test_cli_preview_defaults_to_all() {
        let cli =
            Cli::try_parse_from(["ormtool", "preview", "--input", "a.png", "--out", "b.png"])
                .unwrap();
        match cli.command {
            Commands::Preview { channel, json, .. } => {
                assert_eq!(channel, ChannelView::All);
                assert!(!json);
            }
            _ => panic!("expected preview command"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_channel() {
        assert!(Cli::try_parse_from([
            "ormtool", "preview", "-i", "a.png", "--channel", "alpha", "-o", "b.png"
        ])
        .is_err());
    }

    #[test]
    fn test_cli_verbose_is_global() {
        let cli = Cli::try_parse_from(["ormtool", "config", "--verbose"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Config { config: None }));
    }
}
